use super::char_set::{CharClass, CharSet, SetItem};
use super::RegExpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum RepeatMode {
    Greedy,
    Reluctant,
    Possessive,
}

#[derive(Debug, Clone, PartialEq)]
/// The expression tree of a parsed pattern.
pub(super) enum Expr {
    Char(char),
    Any,
    Set(CharSet),
    Concat(Vec<Expr>),
    Alternate(Vec<Expr>),
    Repeat(Box<Expr>, usize, Option<usize>, RepeatMode),
}

/// The result of one `\` escape, which is either a plain character or a class shorthand.
enum EscapeItem {
    Char(char),
    Class(CharClass),
}

const ESCAPED_PUNCTUATION: &[char] = &[
    '\\', '"', '\'', '.', '*', '+', '?', '(', ')', '{', '}', '[', ']', '@', '<', '>', '$', '%',
    '&',
];

impl Expr {
    /// Whether the expression is satisfied by the empty string.
    pub fn matches_empty(&self) -> bool {
        match self {
            Expr::Char(_) | Expr::Any | Expr::Set(_) => false,
            Expr::Concat(parts) => parts.iter().all(|part| part.matches_empty()),
            Expr::Alternate(branches) => branches.iter().any(|branch| branch.matches_empty()),
            Expr::Repeat(body, min, _, _) => *min == 0 || body.matches_empty(),
        }
    }
}

/// A recursive descent parser over the pattern characters.
pub(super) struct PatternParser {
    chars: Vec<char>,
    position: usize,
}

impl PatternParser {
    pub fn new(pattern: &str) -> Self {
        Self {
            chars: pattern.chars().collect(),
            position: 0,
        }
    }

    pub fn parse(mut self) -> Result<Expr, RegExpError> {
        if self.chars.is_empty() {
            return Err(RegExpError {
                position: 0,
                message: "empty pattern".into(),
            });
        }
        let expr = self.parse_alternation()?;
        match self.peek() {
            None => Ok(expr),
            Some(')') => self.fail(self.position, "unbalanced group"),
            Some(c) => self.fail(self.position, format!("unexpected '{}'", c)),
        }
    }

    fn parse_alternation(&mut self) -> Result<Expr, RegExpError> {
        let mut branches = vec![self.parse_concat()?];
        while self.peek() == Some('|') {
            self.position += 1;
            branches.push(self.parse_concat()?);
        }
        if branches.len() == 1 {
            Ok(branches.pop().unwrap())
        } else {
            Ok(Expr::Alternate(branches))
        }
    }

    fn parse_concat(&mut self) -> Result<Expr, RegExpError> {
        let mut parts = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            parts.push(self.parse_quantified()?);
        }
        if parts.is_empty() {
            return self.fail(self.position, "empty pattern");
        }
        if parts.len() == 1 {
            Ok(parts.pop().unwrap())
        } else {
            Ok(Expr::Concat(parts))
        }
    }

    fn parse_quantified(&mut self) -> Result<Expr, RegExpError> {
        let atom = self.parse_atom()?;
        let bounds_position = self.position;
        let (min, max) = match self.peek() {
            Some('?') => {
                self.position += 1;
                (0, Some(1))
            }
            Some('*') => {
                self.position += 1;
                (0, None)
            }
            Some('+') => {
                self.position += 1;
                (1, None)
            }
            Some('{') => {
                self.position += 1;
                self.parse_bounds(bounds_position)?
            }
            _ => return Ok(atom),
        };
        let mode = match self.peek() {
            Some('?') => {
                self.position += 1;
                RepeatMode::Reluctant
            }
            Some('+') => {
                self.position += 1;
                RepeatMode::Possessive
            }
            _ => RepeatMode::Greedy,
        };
        if let Some(c) = self.peek() {
            if matches!(c, '?' | '*' | '+' | '{') {
                return self.fail(self.position, format!("unexpected '{}'", c));
            }
        }
        Ok(Expr::Repeat(Box::new(atom), min, max, mode))
    }

    /// Parse the `n`, `n,` or `n,m` part of a `{...}` repetition.
    /// The opening brace has already been consumed.
    fn parse_bounds(&mut self, start: usize) -> Result<(usize, Option<usize>), RegExpError> {
        let min = match self.parse_number() {
            Some(min) => min,
            None => return self.fail(start, "unexpected '{'"),
        };
        let max = if self.peek() == Some(',') {
            self.position += 1;
            match self.parse_number() {
                Some(max) => Some(max),
                None => None,
            }
        } else {
            Some(min)
        };
        if self.peek() != Some('}') {
            return self.fail(start, "unterminated repetition");
        }
        self.position += 1;
        if let Some(max) = max {
            if max < min {
                return self.fail(start, "invalid repetition bounds");
            }
            if max == 0 {
                return self.fail(start, "empty repetition");
            }
        }
        Ok((min, max))
    }

    fn parse_number(&mut self) -> Option<usize> {
        let mut digits = 0usize;
        let mut value = 0usize;
        while let Some(c) = self.peek() {
            match c.to_digit(10) {
                Some(digit) => {
                    value = value.saturating_mul(10).saturating_add(digit as usize);
                    digits += 1;
                    self.position += 1;
                }
                None => break,
            }
        }
        if digits == 0 {
            None
        } else {
            Some(value)
        }
    }

    fn parse_atom(&mut self) -> Result<Expr, RegExpError> {
        let start = self.position;
        let c = match self.peek() {
            Some(c) => c,
            None => return self.fail(start, "empty pattern"),
        };
        match c {
            '(' => {
                self.position += 1;
                let inner = self.parse_alternation()?;
                if self.peek() != Some(')') {
                    return self.fail(start, "unbalanced group");
                }
                self.position += 1;
                Ok(inner)
            }
            '[' => self.parse_set(),
            '.' => {
                self.position += 1;
                Ok(Expr::Any)
            }
            '^' | '$' => self.fail(start, format!("unsupported anchor '{}'", c)),
            '*' | '+' | '?' => self.fail(start, format!("unexpected '{}'", c)),
            '{' | '}' => self.fail(start, format!("unexpected '{}'", c)),
            '\\' => match self.parse_escape()? {
                EscapeItem::Char(c) => Ok(Expr::Char(c)),
                EscapeItem::Class(class) => Ok(Expr::Set(CharSet::from_class(class))),
            },
            c => {
                self.position += 1;
                Ok(Expr::Char(c))
            }
        }
    }

    /// Parse one `\` escape, with the cursor on the backslash.
    fn parse_escape(&mut self) -> Result<EscapeItem, RegExpError> {
        let start = self.position;
        self.position += 1;
        let c = match self.peek() {
            Some(c) => c,
            None => return self.fail(start, "unterminated escape"),
        };
        self.position += 1;
        match c {
            'd' => Ok(EscapeItem::Class(CharClass::Digit)),
            'D' => Ok(EscapeItem::Class(CharClass::NonDigit)),
            's' => Ok(EscapeItem::Class(CharClass::Whitespace)),
            'S' => Ok(EscapeItem::Class(CharClass::NonWhitespace)),
            'w' => Ok(EscapeItem::Class(CharClass::Word)),
            'W' => Ok(EscapeItem::Class(CharClass::NonWord)),
            't' => Ok(EscapeItem::Char('\t')),
            'n' => Ok(EscapeItem::Char('\n')),
            'r' => Ok(EscapeItem::Char('\r')),
            'f' => Ok(EscapeItem::Char('\x0C')),
            'a' => Ok(EscapeItem::Char('\x07')),
            'e' => Ok(EscapeItem::Char('\x1B')),
            '0' => self.parse_octal(start),
            'x' => self.parse_code_point(start, 2, "invalid hexadecimal escape"),
            'u' => self.parse_code_point(start, 4, "invalid unicode escape"),
            c if ESCAPED_PUNCTUATION.contains(&c) => Ok(EscapeItem::Char(c)),
            c => self.fail(start, format!("illegal escape '\\{}'", c)),
        }
    }

    /// Octal escapes take one to three octal digits after the leading `0`;
    /// scanning stops at the first non octal character, so `\018` is the octal
    /// character 1 followed by a literal 8.
    fn parse_octal(&mut self, start: usize) -> Result<EscapeItem, RegExpError> {
        let mut value = 0u32;
        let mut digits = 0usize;
        while digits < 3 {
            match self.peek().and_then(|c| c.to_digit(8)) {
                Some(digit) => {
                    value = value * 8 + digit;
                    digits += 1;
                    self.position += 1;
                }
                None => break,
            }
        }
        if digits == 0 {
            return self.fail(start, "missing octal digits in escape");
        }
        match char::from_u32(value) {
            Some(c) => Ok(EscapeItem::Char(c)),
            None => self.fail(start, "invalid octal escape"),
        }
    }

    fn parse_code_point(
        &mut self,
        start: usize,
        digits: usize,
        message: &str,
    ) -> Result<EscapeItem, RegExpError> {
        let mut value = 0u32;
        for _ in 0..digits {
            let digit = match self.peek().and_then(|c| c.to_digit(16)) {
                Some(digit) => digit,
                None => return self.fail(start, message),
            };
            value = value * 16 + digit;
            self.position += 1;
        }
        match char::from_u32(value) {
            Some(c) => Ok(EscapeItem::Char(c)),
            None => self.fail(start, message),
        }
    }

    /// Parse a `[...]` character set, with the cursor on the opening bracket.
    fn parse_set(&mut self) -> Result<Expr, RegExpError> {
        let start = self.position;
        self.position += 1;
        let negated = if self.peek() == Some('^') {
            self.position += 1;
            true
        } else {
            false
        };
        let mut items = Vec::new();
        loop {
            let c = match self.peek() {
                Some(c) => c,
                None => return self.fail(start, "unterminated character set"),
            };
            if c == ']' {
                self.position += 1;
                break;
            }
            let item_position = self.position;
            let low = match c {
                '\\' => self.parse_escape()?,
                c => {
                    self.position += 1;
                    EscapeItem::Char(c)
                }
            };
            match low {
                EscapeItem::Class(class) => items.push(SetItem::Class(class)),
                EscapeItem::Char(low) => {
                    // A '-' only forms a range when an endpoint follows on both sides.
                    if self.peek() == Some('-') && !matches!(self.peek_at(1), Some(']') | None) {
                        self.position += 1;
                        let high = match self.peek() {
                            Some('\\') => match self.parse_escape()? {
                                EscapeItem::Char(high) => high,
                                EscapeItem::Class(_) => {
                                    return self.fail(item_position, "invalid character range")
                                }
                            },
                            Some(high) => {
                                self.position += 1;
                                high
                            }
                            None => {
                                return self.fail(start, "unterminated character set");
                            }
                        };
                        if high < low {
                            return self.fail(item_position, "invalid character range");
                        }
                        items.push(SetItem::Range(low, high));
                    } else {
                        items.push(SetItem::Char(low));
                    }
                }
            }
        }
        if items.is_empty() {
            return self.fail(start, "empty character set");
        }
        Ok(Expr::Set(CharSet::new(negated, items)))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn fail<T, M: Into<String>>(&self, position: usize, message: M) -> Result<T, RegExpError> {
        Err(RegExpError {
            position,
            message: message.into(),
        })
    }
}
