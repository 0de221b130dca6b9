use crate::{Grammar, GrammarError, ProductionPattern, ProductionPatternAlternative, TokenPattern};

const NUM: usize = 1;
const PLUS: usize = 2;
const MINUS: usize = 3;

fn base_grammar() -> Grammar {
    let mut grammar = Grammar::new();
    grammar
        .add_token_pattern(TokenPattern::regexp(NUM, "NUM", "[0-9]+"))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::literal(PLUS, "PLUS", "+"))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::literal(MINUS, "MINUS", "-"))
        .unwrap();
    grammar
}

#[test]
fn left_recursion_test() {
    // expression : expression PLUS term | term ;
    let mut grammar = base_grammar();
    let mut expression = ProductionPattern::new(10, "expression");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_production(10, 1, Some(1));
    alternative.add_token(PLUS, 1, Some(1));
    alternative.add_production(11, 1, Some(1));
    expression.add_alternative(alternative).unwrap();
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_production(11, 1, Some(1));
    expression.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(expression).unwrap();

    let mut term = ProductionPattern::new(11, "term");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(NUM, 1, Some(1));
    term.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(term).unwrap();

    let errors = grammar.prepare().unwrap_err();
    assert!(errors.iter().any(|error| matches!(
        error,
        GrammarError::LeftRecursion { production } if production == "expression"
    )));
    assert!(grammar.production_pattern(10).unwrap().is_left_recursive());
    assert!(!grammar.production_pattern(11).unwrap().is_left_recursive());
}

#[test]
fn indirect_left_recursion_test() {
    // first : second PLUS ; second : first MINUS | NUM ;
    let mut grammar = base_grammar();
    let mut first = ProductionPattern::new(10, "first");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_production(11, 1, Some(1));
    alternative.add_token(PLUS, 1, Some(1));
    first.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(first).unwrap();

    let mut second = ProductionPattern::new(11, "second");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_production(10, 1, Some(1));
    alternative.add_token(MINUS, 1, Some(1));
    second.add_alternative(alternative).unwrap();
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(NUM, 1, Some(1));
    second.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(second).unwrap();

    let errors = grammar.prepare().unwrap_err();
    assert!(errors
        .iter()
        .any(|error| matches!(error, GrammarError::LeftRecursion { .. })));
    assert!(grammar.production_pattern(10).unwrap().is_left_recursive());
    assert!(grammar.production_pattern(11).unwrap().is_left_recursive());
}

#[test]
fn duplicate_alternative_test() {
    let mut production = ProductionPattern::new(10, "value");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(NUM, 1, Some(1));
    production.add_alternative(alternative).unwrap();
    let mut duplicate = ProductionPatternAlternative::new();
    duplicate.add_token(NUM, 1, Some(1));
    match production.add_alternative(duplicate) {
        Ok(_) => panic!("the duplicate alternative should be rejected"),
        Err(err) => println!("{}", err),
    }
}

#[test]
fn ambiguous_alternatives_test() {
    // value : NUM+ | NUM NUM ; shares the prefix at every depth.
    let mut grammar = base_grammar();
    let mut value = ProductionPattern::new(10, "value");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(NUM, 1, None);
    value.add_alternative(alternative).unwrap();
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(NUM, 1, Some(1));
    alternative.add_token(NUM, 1, Some(1));
    value.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(value).unwrap();

    let errors = grammar.prepare().unwrap_err();
    let conflict = errors
        .iter()
        .find_map(|error| match error {
            GrammarError::AmbiguousAlternatives {
                production,
                first,
                second,
                prefix,
            } => Some((production.clone(), *first, *second, prefix.clone())),
            _ => None,
        })
        .expect("the overlap should be reported");
    assert_eq!(conflict.0, "value");
    assert_eq!((conflict.1, conflict.2), (0, 1));
    assert!(!conflict.3.is_empty());
}

#[test]
fn two_empty_alternatives_test() {
    // value : NUM? | MINUS? ; both can match empty, so the decision is ambiguous.
    let mut grammar = base_grammar();
    let mut value = ProductionPattern::new(10, "value");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(NUM, 0, Some(1));
    value.add_alternative(alternative).unwrap();
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(MINUS, 0, Some(1));
    value.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(value).unwrap();

    let errors = grammar.prepare().unwrap_err();
    assert!(errors
        .iter()
        .any(|error| matches!(error, GrammarError::AmbiguousAlternatives { .. })));
}

#[test]
fn ambiguous_repetition_test() {
    // value : NUM* NUM ; repeating and leaving look the same.
    let mut grammar = base_grammar();
    let mut value = ProductionPattern::new(10, "value");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(NUM, 0, None);
    alternative.add_token(NUM, 1, Some(1));
    value.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(value).unwrap();

    let errors = grammar.prepare().unwrap_err();
    assert!(errors
        .iter()
        .any(|error| matches!(error, GrammarError::AmbiguousRepetition { .. })));
}

#[test]
fn invalid_repetition_test() {
    let mut grammar = base_grammar();
    let mut value = ProductionPattern::new(10, "value");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(NUM, 2, Some(1));
    value.add_alternative(alternative).unwrap();
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(MINUS, 0, Some(0));
    value.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(value).unwrap();

    let errors = grammar.prepare().unwrap_err();
    let bounds: Vec<(usize, usize)> = errors
        .iter()
        .filter_map(|error| match error {
            GrammarError::InvalidRepetition { min, max, .. } => Some((*min, *max)),
            _ => None,
        })
        .collect();
    assert_eq!(bounds, vec![(2, 1), (0, 0)]);
}

#[test]
fn unknown_reference_test() {
    let mut grammar = base_grammar();
    let mut value = ProductionPattern::new(10, "value");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(99, 1, Some(1));
    alternative.add_production(98, 1, Some(1));
    value.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(value).unwrap();

    let errors = grammar.prepare().unwrap_err();
    assert!(errors.iter().any(|error| matches!(
        error,
        GrammarError::UnknownTokenReference { token_id: 99, .. }
    )));
    assert!(errors.iter().any(|error| matches!(
        error,
        GrammarError::UnknownProductionReference { production_id: 98, .. }
    )));
}

#[test]
fn invalid_token_pattern_test() {
    let mut grammar = Grammar::new();
    grammar
        .add_token_pattern(TokenPattern::regexp(1, "BROKEN", "(abc"))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::regexp(2, "NULLABLE", "a*"))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::literal(3, "EMPTY", ""))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::literal(0, "RESERVED", "x"))
        .unwrap();
    let errors = grammar.prepare().unwrap_err();
    let invalid: Vec<&str> = errors
        .iter()
        .filter_map(|error| match error {
            GrammarError::InvalidTokenPattern { pattern, .. } => Some(pattern.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(invalid, vec!["BROKEN", "NULLABLE", "EMPTY", "RESERVED"]);
}

#[test]
fn empty_production_test() {
    let mut grammar = base_grammar();
    grammar
        .add_production_pattern(ProductionPattern::new(10, "value"))
        .unwrap();
    let errors = grammar.prepare().unwrap_err();
    assert!(errors.iter().any(|error| matches!(
        error,
        GrammarError::EmptyProduction { production } if production == "value"
    )));
}

#[test]
fn recursion_flag_test() {
    // list : NUM list | NUM ; is right recursive and never empty,
    // while tail : PLUS? ; matches the empty sequence.
    let mut grammar = base_grammar();
    let mut list = ProductionPattern::new(10, "list");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(NUM, 1, Some(1));
    alternative.add_production(10, 1, Some(1));
    list.add_alternative(alternative).unwrap();
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(NUM, 1, Some(1));
    list.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(list).unwrap();

    let mut tail = ProductionPattern::new(11, "tail");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(PLUS, 0, Some(1));
    tail.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(tail).unwrap();

    // Reference the tail so it takes part in the analysis.
    let mut wrapper = ProductionPattern::new(12, "wrapper");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_production(11, 1, Some(1));
    alternative.add_token(MINUS, 1, Some(1));
    wrapper.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(wrapper).unwrap();

    grammar.prepare().unwrap();
    let list = grammar.production_pattern(10).unwrap();
    assert!(list.is_right_recursive());
    assert!(!list.is_left_recursive());
    assert!(!list.is_matching_empty());
    let tail = grammar.production_pattern(11).unwrap();
    assert!(tail.is_matching_empty());
}

#[test]
fn lookahead_depth_test() {
    // single : NUM PLUS | NUM MINUS ; needs two tokens of lookahead.
    let mut grammar = base_grammar();
    let mut single = ProductionPattern::new(10, "single");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(NUM, 1, Some(1));
    alternative.add_token(PLUS, 1, Some(1));
    single.add_alternative(alternative).unwrap();
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(NUM, 1, Some(1));
    alternative.add_token(MINUS, 1, Some(1));
    single.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(single).unwrap();

    grammar.prepare().unwrap();
    assert_eq!(grammar.lookahead_depth(), Some(2));
}

#[test]
fn deep_lookahead_test() {
    // deep : NUM PLUS NUM | NUM PLUS MINUS ; is distinguishable at depth three.
    let mut grammar = base_grammar();
    let mut deep = ProductionPattern::new(10, "deep");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(NUM, 1, Some(1));
    alternative.add_token(PLUS, 1, Some(1));
    alternative.add_token(NUM, 1, Some(1));
    deep.add_alternative(alternative).unwrap();
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(NUM, 1, Some(1));
    alternative.add_token(PLUS, 1, Some(1));
    alternative.add_token(MINUS, 1, Some(1));
    deep.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(deep).unwrap();

    grammar.prepare().unwrap();
    assert_eq!(grammar.lookahead_depth(), Some(3));
}

#[test]
fn shared_grammar_test() {
    fn assert_shareable<T: Send + Sync>(_: &T) {}
    let mut grammar = base_grammar();
    let mut value = ProductionPattern::new(10, "value");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(NUM, 1, Some(1));
    value.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(value).unwrap();
    grammar.prepare().unwrap();
    // A prepared grammar can back parsers on several threads.
    assert_shareable(&grammar);
}

#[test]
fn prepare_twice_test() {
    let mut grammar = base_grammar();
    let mut value = ProductionPattern::new(10, "value");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(NUM, 1, Some(1));
    value.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(value).unwrap();

    grammar.prepare().unwrap();
    grammar.prepare().unwrap();
    assert!(grammar.is_prepared());
    match grammar.add_token_pattern(TokenPattern::literal(7, "LATE", "!")) {
        Ok(_) => panic!("a prepared grammar should reject new patterns"),
        Err(err) => println!("{}", err),
    }
}
