use crate::{GrammarError, ParseError, ParseErrorKind, Position};
use std::fmt::{Display, Formatter};

impl Display for GrammarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarError::LeftRecursion { production } => {
                write!(f, "Production '{}' is left recursive.", production)
            }
            GrammarError::EmptyProduction { production } => {
                write!(f, "Production '{}' has no alternative.", production)
            }
            GrammarError::DuplicateAlternative {
                production,
                alternative,
            } => write!(
                f,
                "Alternative {} of production '{}' duplicates an earlier alternative.",
                alternative, production
            ),
            GrammarError::AmbiguousAlternatives {
                production,
                first,
                second,
                prefix,
            } => write!(
                f,
                "Alternatives {} and {} of production '{}' share the lookahead prefix [{}].",
                first,
                second,
                production,
                prefix.join(", ")
            ),
            GrammarError::AmbiguousRepetition {
                production,
                alternative,
                element,
                prefix,
            } => write!(
                f,
                "Element {} in alternative {} of production '{}' cannot tell repeating from continuing on [{}].",
                element,
                alternative,
                production,
                prefix.join(", ")
            ),
            GrammarError::InvalidRepetition {
                production,
                min,
                max,
            } => write!(
                f,
                "Production '{}' uses the invalid repetition bounds ({}, {}).",
                production, min, max
            ),
            GrammarError::UnknownTokenReference {
                production,
                token_id,
            } => write!(
                f,
                "Production '{}' refers to the unknown token id {}.",
                production, token_id
            ),
            GrammarError::UnknownProductionReference {
                production,
                production_id,
            } => write!(
                f,
                "Production '{}' refers to the unknown production id {}.",
                production, production_id
            ),
            GrammarError::InvalidTokenPattern { pattern, message } => {
                write!(f, "Token pattern '{}' is invalid: {}", pattern, message)
            }
            GrammarError::MissingStartProduction => {
                write!(f, "The grammar holds no production to start parsing from.")
            }
        }
    }
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, position: Position) -> Self {
        Self {
            kind,
            line: position.line,
            column: position.column,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SyntaxError: ")?;
        match &self.kind {
            ParseErrorKind::UnexpectedChar { character } => {
                write!(f, "unexpected character {:?}", character)?
            }
            ParseErrorKind::UnexpectedToken { found, expected } => write!(
                f,
                "unexpected token '{}', expected one of [{}]",
                found,
                expected.join(", ")
            )?,
            ParseErrorKind::UnexpectedEof { expected } => write!(
                f,
                "unexpected end of input, expected one of [{}]",
                expected.join(", ")
            )?,
            ParseErrorKind::InvalidToken { image, message } => {
                write!(f, "invalid token {:?}", image)?;
                if let Some(message) = message {
                    write!(f, ": {}", message)?;
                }
            }
            ParseErrorKind::TokenTooLarge { limit } => write!(
                f,
                "a token image exceeds the maximum length of {} characters",
                limit
            )?,
            ParseErrorKind::Analysis { message } => write!(f, "{}", message)?,
            ParseErrorKind::Io(err) => write!(f, "{}", err)?,
        }
        write!(f, " at {}", self.position())
    }
}
