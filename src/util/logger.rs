use super::{Log, Position};
use crate::{ParseError, Token};
use std::fmt::{Display, Formatter};

impl<T: Display> Display for Log<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Log::None => Ok(()),
            Log::Default(label) | Log::Success(label) | Log::Result(label) | Log::Verbose(label) => {
                write!(f, "{}", label)
            }
        }
    }
}

impl<T> Log<T> {
    /// The rank of the level; a label assigned at a higher rank also prints
    /// the events of all lower ranks.
    pub fn order(&self) -> u8 {
        match self {
            Log::None => 0,
            Log::Default(_) => 1,
            Log::Success(_) => 2,
            Log::Result(_) => 3,
            Log::Verbose(_) => 4,
        }
    }
}

/// The debug reports of the tokenizer and the parser.
///
/// Every message format lives here, so the call sites only decide which event
/// happened; nothing is printed unless the build carries debug assertions.
impl<T: Display> Log<T> {
    /// An emitted token, reported at the [Success](Log::Success) rank.
    pub(crate) fn token_emitted(&self, _token: &Token) {
        #[cfg(debug_assertions)]
        if self.order() >= Log::Success(()).order() {
            println!(
                "[{}; TokenizerSuccess]: token {} ({:?}) at {}",
                self,
                _token.id,
                _token.image,
                Position::new(_token.line, _token.column)
            );
        }
    }

    /// A position no pattern matches at, reported at the [Result](Log::Result) rank.
    pub(crate) fn tokenize_failed(&self, _position: Position) {
        #[cfg(debug_assertions)]
        if self.order() >= Log::Result(()).order() {
            println!("[{}; TokenizerError]: no pattern matches at {}", self, _position);
        }
    }

    /// The descent entering a production, reported at the [Verbose](Log::Verbose) rank.
    pub(crate) fn production_entered(&self, _production: &str) {
        #[cfg(debug_assertions)]
        if self.order() >= Log::Verbose(()).order() {
            println!("[{}; ParserEntry]: {}", self, _production);
        }
    }

    /// The alternative predicted by the lookahead, reported at the
    /// [Verbose](Log::Verbose) rank.
    pub(crate) fn alternative_chosen(&self, _production: &str, _alternative: usize) {
        #[cfg(debug_assertions)]
        if self.order() >= Log::Verbose(()).order() {
            println!(
                "[{}; ParserChoice]: {} -> alternative {}",
                self, _production, _alternative
            );
        }
    }

    /// A syntax error the driver recovers from, reported at the
    /// [Result](Log::Result) rank.
    pub(crate) fn error_recovered(&self, _error: &ParseError) {
        #[cfg(debug_assertions)]
        if self.order() >= Log::Result(()).order() {
            println!("[{}; ParserError]: {}", self, _error);
        }
    }
}
