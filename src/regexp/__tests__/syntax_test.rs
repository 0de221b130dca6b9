use crate::regexp::{RegExp, RegExpError};

fn compile_error(pattern: &str) -> RegExpError {
    match RegExp::new(pattern, false) {
        Ok(_) => panic!("pattern {:?} should not compile", pattern),
        Err(err) => err,
    }
}

#[test]
fn empty_pattern_test() {
    let err = compile_error("");
    assert_eq!(err.position, 0);
    assert_eq!(err.message, "empty pattern");
    assert_eq!(compile_error("a|").message, "empty pattern");
    assert_eq!(compile_error("(|a)").message, "empty pattern");
}

#[test]
fn group_error_test() {
    assert_eq!(compile_error("(ab").message, "unbalanced group");
    assert_eq!(compile_error("ab)").message, "unbalanced group");
    let err = compile_error("ab(cd");
    assert_eq!(err.position, 2);
}

#[test]
fn quantifier_error_test() {
    assert_eq!(compile_error("*a").message, "unexpected '*'");
    assert_eq!(compile_error("a**").message, "unexpected '*'");
    assert_eq!(compile_error("a}").message, "unexpected '}'");
    assert_eq!(compile_error("a{x}").message, "unexpected '{'");
    assert_eq!(compile_error("a{2").message, "unterminated repetition");
    assert_eq!(compile_error("a{3,2}").message, "invalid repetition bounds");
    assert_eq!(compile_error("a{0}").message, "empty repetition");
    assert_eq!(compile_error("a{0,0}").message, "empty repetition");
}

#[test]
fn anchor_rejection_test() {
    assert_eq!(compile_error("^a").message, "unsupported anchor '^'");
    assert_eq!(compile_error("a$").message, "unsupported anchor '$'");
}

#[test]
fn escape_error_test() {
    let err = compile_error("\\Q");
    assert_eq!(err.message, "illegal escape '\\Q'");
    assert_eq!(err.position, 0);
    assert_eq!(compile_error("a\\").message, "unterminated escape");
    assert_eq!(
        compile_error("\\0z").message,
        "missing octal digits in escape"
    );
    assert_eq!(compile_error("\\0").message, "missing octal digits in escape");
    assert_eq!(compile_error("\\xZ1").message, "invalid hexadecimal escape");
    assert_eq!(compile_error("\\u12").message, "invalid unicode escape");
    assert_eq!(compile_error("\\uD800").message, "invalid unicode escape");
}

#[test]
fn character_set_error_test() {
    assert_eq!(compile_error("[]").message, "empty character set");
    assert_eq!(compile_error("[^]").message, "empty character set");
    assert_eq!(compile_error("[abc").message, "unterminated character set");
    assert_eq!(compile_error("[z-a]").message, "invalid character range");
    assert_eq!(compile_error("[a-\\d]").message, "invalid character range");
}

#[test]
fn valid_pattern_test() {
    // Accepted syntax corners that have tripped up earlier revisions.
    for pattern in [
        "a{2,}",
        "a{0,}",
        "a{2}?",
        "[a-]",
        "[-a]",
        "[[]",
        "\\(\\)\\{\\}\\[\\]",
        "\\@\\<\\>\\$\\%\\&",
        "a|b|c",
        "((a))",
    ] {
        if let Err(err) = RegExp::new(pattern, false) {
            panic!("pattern {:?} should compile: {}", pattern, err);
        }
    }
}
