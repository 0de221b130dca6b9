use crate::util::fold_char;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A predefined character class usable on its own (`\d`) or inside a set (`[\d-]`).
pub(super) enum CharClass {
    Digit,
    NonDigit,
    Word,
    NonWord,
    Whitespace,
    NonWhitespace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SetItem {
    Char(char),
    Range(char, char),
    Class(CharClass),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A character set with explicit characters, ranges and class shorthands,
/// optionally negated.
pub(super) struct CharSet {
    negated: bool,
    items: Vec<SetItem>,
}

impl CharClass {
    pub fn contains(&self, c: char) -> bool {
        match self {
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::NonDigit => !c.is_ascii_digit(),
            CharClass::Word => c.is_ascii_alphanumeric() || c == '_',
            CharClass::NonWord => !(c.is_ascii_alphanumeric() || c == '_'),
            CharClass::Whitespace => matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C' | '\x0B'),
            CharClass::NonWhitespace => {
                !matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C' | '\x0B')
            }
        }
    }
}

impl CharSet {
    pub fn new(negated: bool, items: Vec<SetItem>) -> Self {
        Self { negated, items }
    }

    pub fn from_class(class: CharClass) -> Self {
        Self {
            negated: false,
            items: vec![SetItem::Class(class)],
        }
    }

    /// Whether the set accepts `c`.
    /// In case insensitive mode the folded and upper case variants are tried as well,
    /// before the negation flag is applied.
    pub fn contains(&self, c: char, case_insensitive: bool) -> bool {
        let mut hit = self.matches(c);
        if !hit && case_insensitive {
            hit = self.matches(fold_char(c)) || self.matches(upper_char(c));
        }
        hit != self.negated
    }

    fn matches(&self, c: char) -> bool {
        self.items.iter().any(|item| match item {
            SetItem::Char(member) => *member == c,
            SetItem::Range(low, high) => *low <= c && c <= *high,
            SetItem::Class(class) => class.contains(c),
        })
    }
}

fn upper_char(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}
