//! A JSON grammar following the shape of the familiar railroad diagrams.
//!
//! ```text
//! json        : value ;
//! value       : STRING | NUMBER | CONSTANT | object | array ;
//! object      : OPEN_BRACE members? CLOSE_BRACE ;
//! members     : member member_tail* ;
//! member_tail : COMMA member ;
//! member      : STRING COLON value ;
//! array       : OPEN_BRACKET items? CLOSE_BRACKET ;
//! items       : value item_tail* ;
//! item_tail   : COMMA value ;
//! ```

use crate::{Grammar, ProductionPattern, ProductionPatternAlternative, TokenPattern};

pub const STRING: usize = 1;
pub const NUMBER: usize = 2;
pub const CONSTANT: usize = 3;
pub const OPEN_BRACE: usize = 4;
pub const CLOSE_BRACE: usize = 5;
pub const OPEN_BRACKET: usize = 6;
pub const CLOSE_BRACKET: usize = 7;
pub const COMMA: usize = 8;
pub const COLON: usize = 9;
pub const WHITESPACE: usize = 10;

pub const JSON: usize = 20;
pub const VALUE: usize = 21;
pub const OBJECT: usize = 22;
pub const MEMBERS: usize = 23;
pub const MEMBER_TAIL: usize = 24;
pub const MEMBER: usize = 25;
pub const ARRAY: usize = 26;
pub const ITEMS: usize = 27;
pub const ITEM_TAIL: usize = 28;

/// Build the JSON grammar.
pub fn json_grammar() -> Grammar {
    let mut grammar = Grammar::new();
    grammar
        .add_token_pattern(TokenPattern::regexp(
            STRING,
            "STRING",
            r#""(\\.|[^"\\])*""#,
        ))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::regexp(
            NUMBER,
            "NUMBER",
            r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?",
        ))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::regexp(CONSTANT, "CONSTANT", "true|false|null"))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::literal(OPEN_BRACE, "OPEN_BRACE", "{"))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::literal(CLOSE_BRACE, "CLOSE_BRACE", "}"))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::literal(OPEN_BRACKET, "OPEN_BRACKET", "["))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::literal(CLOSE_BRACKET, "CLOSE_BRACKET", "]"))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::literal(COMMA, "COMMA", ","))
        .unwrap();
    grammar
        .add_token_pattern(TokenPattern::literal(COLON, "COLON", ":"))
        .unwrap();
    let mut whitespace = TokenPattern::regexp(WHITESPACE, "WHITESPACE", r"[ \t\n\r]+");
    whitespace.set_ignore();
    grammar.add_token_pattern(whitespace).unwrap();

    let mut json = ProductionPattern::new(JSON, "json");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_production(VALUE, 1, Some(1));
    json.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(json).unwrap();

    let mut value = ProductionPattern::new(VALUE, "value");
    for token in [STRING, NUMBER, CONSTANT] {
        let mut alternative = ProductionPatternAlternative::new();
        alternative.add_token(token, 1, Some(1));
        value.add_alternative(alternative).unwrap();
    }
    for production in [OBJECT, ARRAY] {
        let mut alternative = ProductionPatternAlternative::new();
        alternative.add_production(production, 1, Some(1));
        value.add_alternative(alternative).unwrap();
    }
    grammar.add_production_pattern(value).unwrap();

    let mut object = ProductionPattern::new(OBJECT, "object");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(OPEN_BRACE, 1, Some(1));
    alternative.add_production(MEMBERS, 0, Some(1));
    alternative.add_token(CLOSE_BRACE, 1, Some(1));
    object.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(object).unwrap();

    let mut members = ProductionPattern::new(MEMBERS, "members");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_production(MEMBER, 1, Some(1));
    alternative.add_production(MEMBER_TAIL, 0, None);
    members.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(members).unwrap();

    let mut member_tail = ProductionPattern::new(MEMBER_TAIL, "member_tail");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(COMMA, 1, Some(1));
    alternative.add_production(MEMBER, 1, Some(1));
    member_tail.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(member_tail).unwrap();

    let mut member = ProductionPattern::new(MEMBER, "member");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(STRING, 1, Some(1));
    alternative.add_token(COLON, 1, Some(1));
    alternative.add_production(VALUE, 1, Some(1));
    member.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(member).unwrap();

    let mut array = ProductionPattern::new(ARRAY, "array");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(OPEN_BRACKET, 1, Some(1));
    alternative.add_production(ITEMS, 0, Some(1));
    alternative.add_token(CLOSE_BRACKET, 1, Some(1));
    array.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(array).unwrap();

    let mut items = ProductionPattern::new(ITEMS, "items");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_production(VALUE, 1, Some(1));
    alternative.add_production(ITEM_TAIL, 0, None);
    items.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(items).unwrap();

    let mut item_tail = ProductionPattern::new(ITEM_TAIL, "item_tail");
    let mut alternative = ProductionPatternAlternative::new();
    alternative.add_token(COMMA, 1, Some(1));
    alternative.add_production(VALUE, 1, Some(1));
    item_tail.add_alternative(alternative).unwrap();
    grammar.add_production_pattern(item_tail).unwrap();

    grammar
}
