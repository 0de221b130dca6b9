use crate::regexp::RegExp;

fn match_length(pattern: &str, input: &str) -> Option<usize> {
    let regexp = RegExp::new(pattern, false).unwrap();
    regexp.match_from_position(input, 0)
}

#[test]
fn character_class_test() {
    assert_eq!(match_length("[A-Za-z]+", "Hello"), Some(5));
    assert_eq!(match_length("[A-Za-z]+", "123"), None);
    assert_eq!(match_length("[^0-9]+", "ab1"), Some(2));
    assert_eq!(match_length("[-a-c]+", "-ab-"), Some(4));
    assert_eq!(match_length("[\\d\\.]+", "3.14!"), Some(4));
}

#[test]
fn greedy_matching_test() {
    assert_eq!(match_length("a*aa", "aaaa"), Some(4));
    assert_eq!(match_length("a*", "aaab"), Some(3));
    assert_eq!(match_length("a*", "b"), Some(0));
    assert_eq!(match_length("(a|ab)c", "abc"), Some(3));
}

#[test]
fn reluctant_matching_test() {
    assert_eq!(match_length("a*?b", "aaab"), Some(4));
    assert_eq!(match_length("a*?", "aaa"), Some(0));
    assert_eq!(match_length("a+?", "aaa"), Some(1));
    assert_eq!(match_length("a{2,4}?", "aaaa"), Some(2));
}

#[test]
fn possessive_matching_test() {
    assert_eq!(match_length("a?+a", "a"), None);
    assert_eq!(match_length("a*+b", "aaab"), Some(4));
    assert_eq!(match_length("a*+ab", "aaab"), None);
    assert_eq!(match_length("a{1,2}+ab", "aab"), None);
    assert_eq!(match_length("(ab)++c", "ababc"), Some(5));
}

#[test]
fn bounded_repetition_test() {
    assert_eq!(match_length("a{3}", "aaaa"), Some(3));
    assert_eq!(match_length("a{3}", "aa"), None);
    assert_eq!(match_length("a{2,}", "aaaa"), Some(4));
    assert_eq!(match_length("a{2,3}", "aaaa"), Some(3));
    assert_eq!(match_length("(ab){1,2}", "ababab"), Some(4));
    assert_eq!(match_length("a{0,2}", "b"), Some(0));
}

#[test]
fn alternation_test() {
    assert_eq!(match_length("ab|cd", "cdx"), Some(2));
    assert_eq!(match_length("a(b|c)d", "acd"), Some(3));
    assert_eq!(match_length("(a|b)*", "abba!"), Some(4));
    assert_eq!(match_length("keyword|key", "keyword"), Some(7));
}

#[test]
fn escape_test() {
    assert_eq!(match_length("\\d+", "42x"), Some(2));
    assert_eq!(match_length("\\w+", "ab_9-"), Some(4));
    assert_eq!(match_length("\\s", " "), Some(1));
    assert_eq!(match_length("\\s", "x"), None);
    assert_eq!(match_length("\\S+", "ab cd"), Some(2));
    assert_eq!(match_length("\\.", "."), Some(1));
    assert_eq!(match_length("\\.", "a"), None);
    assert_eq!(match_length("\\t", "\t"), Some(1));
    assert_eq!(match_length("\\x41+", "AAB"), Some(2));
    assert_eq!(match_length("\\u0041", "A"), Some(1));
}

#[test]
fn octal_escape_test() {
    // \0101 is 'A'.
    assert_eq!(match_length("\\0101", "A"), Some(1));
    // Octal scanning stops at the first non octal digit, so \018 is \01 then a literal 8.
    assert_eq!(match_length("\\018", "\u{1}8"), Some(2));
    assert_eq!(match_length("\\07", "\u{7}"), Some(1));
}

#[test]
fn wildcard_test() {
    assert_eq!(match_length(".", "a"), Some(1));
    assert_eq!(match_length(".", "\n"), None);
    assert_eq!(match_length(".", "\r"), None);
    assert_eq!(match_length(".", "\u{2028}"), None);
    assert_eq!(match_length(".+", "ab\ncd"), Some(2));
}

#[test]
fn empty_loop_test() {
    // A nullable loop body must not spin forever.
    assert_eq!(match_length("(a?)*b", "b"), Some(1));
    assert_eq!(match_length("(a?)*b", "aab"), Some(3));
    assert_eq!(match_length("(a*)*b", "aaab"), Some(4));
    assert_eq!(match_length("(a*)*c", "aaab"), None);
}

#[test]
fn case_insensitive_test() {
    let keyword = RegExp::new("keyword", true).unwrap();
    assert_eq!(keyword.match_from_position("kEyWOrd", 0), Some(7));

    let identifier = RegExp::new("[a-z]+", true).unwrap();
    assert_eq!(identifier.match_from_position("aBc!", 0), Some(3));

    let not_a_letter = RegExp::new("[^a-z]", true).unwrap();
    assert_eq!(not_a_letter.match_from_position("A", 0), None);
    assert_eq!(not_a_letter.match_from_position("9", 0), Some(1));
}

#[test]
fn long_input_test() {
    // Backtracking over a long homogeneous input has to terminate without
    // exhausting the call stack.
    let input = "a".repeat(4096);
    assert_eq!(match_length("a*", &input), Some(4096));
    assert_eq!(match_length("a*c", &input), None);
    let mut with_tail = input.clone();
    with_tail.push('b');
    assert_eq!(match_length("a*b", &with_tail), Some(4097));
}

#[test]
fn matcher_test() {
    let number = RegExp::new("[0-9]+(\\.[0-9]+)?", false).unwrap();
    let mut matcher = number.matcher("3.14 is pi");
    assert!(matcher.match_from_beginning());
    assert_eq!(matcher.to_string(), "3.14");
    assert_eq!(matcher.length(), Some(4));

    matcher.reset("pi is 3.14");
    assert!(!matcher.match_from_beginning());
    assert_eq!(matcher.to_string(), "");
}

#[test]
fn match_from_position_test() {
    let number = RegExp::new("[0-9]+", false).unwrap();
    assert_eq!(number.match_from_position("ab123", 2), Some(3));
    assert_eq!(number.match_from_position("ab123", 0), None);
    assert_eq!(number.match_from_position("ab123", 5), None);
}

#[test]
fn reference_engine_comparison_test() {
    // The regex crate shares leftmost first semantics on the common syntax
    // subset, which makes it a convenient oracle.
    let cases = [
        ("[A-Za-z_][A-Za-z0-9_]*", vec!["hello_9", "_x", "9abc", ""]),
        ("[0-9]+(\\.[0-9]+)?", vec!["42", "3.14", "3.", "x"]),
        ("a{2,4}", vec!["a", "aa", "aaaaa"]),
        ("(ab|a)*", vec!["ababa", "", "ba"]),
        ("a*b|c", vec!["aab", "c", "aac"]),
    ];
    for (pattern, inputs) in cases {
        let ours = RegExp::new(pattern, false).unwrap();
        let reference = regex::Regex::new(&format!("^(?:{})", pattern)).unwrap();
        for input in inputs {
            let expected = reference.find(input).map(|m| m.end());
            assert_eq!(
                ours.match_from_position(input, 0),
                expected,
                "pattern {:?} over {:?}",
                pattern,
                input
            );
        }
    }
}
