//! An infix arithmetic expression grammar with the usual precedence levels.
//!
//! ```text
//! expression      : term expression_tail* ;
//! expression_tail : PLUS term | MINUS term ;
//! term            : factor term_tail* ;
//! term_tail       : STAR factor | SLASH factor ;
//! factor          : NUMBER | OPEN expression CLOSE ;
//! ```

use crate::{Grammar, ProductionPattern, ProductionPatternAlternative, TokenPattern};

pub const NUMBER: usize = 1;
pub const PLUS: usize = 2;
pub const MINUS: usize = 3;
pub const STAR: usize = 4;
pub const SLASH: usize = 5;
pub const OPEN: usize = 6;
pub const CLOSE: usize = 7;
pub const WHITESPACE: usize = 8;

pub const EXPRESSION: usize = 20;
pub const EXPRESSION_TAIL: usize = 21;
pub const TERM: usize = 22;
pub const TERM_TAIL: usize = 23;
pub const FACTOR: usize = 24;

/// Build the arithmetic grammar.
/// The returned grammar is not prepared yet, so callers can still tweak it.
pub fn arithmetic_grammar() -> Grammar {
    let mut grammar = Grammar::new();
    grammar
        .add_token_pattern(TokenPattern::regexp(NUMBER, "NUMBER", "[0-9]+"))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::literal(PLUS, "PLUS", "+"))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::literal(MINUS, "MINUS", "-"))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::literal(STAR, "STAR", "*"))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::literal(SLASH, "SLASH", "/"))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::literal(OPEN, "OPEN", "("))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::literal(CLOSE, "CLOSE", ")"))
        .unwrap();
    let mut whitespace = TokenPattern::regexp(WHITESPACE, "WHITESPACE", r"[ \t\n\r]+");
    whitespace.set_ignore();
    grammar.add_token_pattern(whitespace).unwrap();

    let mut expression = ProductionPattern::new(EXPRESSION, "expression");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_production(TERM, 1, Some(1));
    alternative.add_production(EXPRESSION_TAIL, 0, None);
    expression.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(expression).unwrap();

    let mut expression_tail = ProductionPattern::new(EXPRESSION_TAIL, "expression_tail");
    for operator in [PLUS, MINUS] {
        let mut alternative = ProductionPatternAlternative::new();
        alternative.add_token(operator, 1, Some(1));
        alternative.add_production(TERM, 1, Some(1));
        expression_tail.add_alternative(alternative).unwrap();
    }
    grammar.add_production_pattern(expression_tail).unwrap();

    let mut term = ProductionPattern::new(TERM, "term");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_production(FACTOR, 1, Some(1));
    alternative.add_production(TERM_TAIL, 0, None);
    term.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(term).unwrap();

    let mut term_tail = ProductionPattern::new(TERM_TAIL, "term_tail");
    for operator in [STAR, SLASH] {
        let mut alternative = ProductionPatternAlternative::new();
        alternative.add_token(operator, 1, Some(1));
        alternative.add_production(FACTOR, 1, Some(1));
        term_tail.add_alternative(alternative).unwrap();
    }
    grammar.add_production_pattern(term_tail).unwrap();

    let mut factor = ProductionPattern::new(FACTOR, "factor");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(NUMBER, 1, Some(1));
    factor.add_alternative(alternative).unwrap();
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(OPEN, 1, Some(1));
    alternative.add_production(EXPRESSION, 1, Some(1));
    alternative.add_token(CLOSE, 1, Some(1));
    factor.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(factor).unwrap();

    grammar
}
