use crate::{PatternKind, TokenPattern};
use std::fmt::{Display, Formatter};

impl TokenPattern {
    /// Declare a token matched by a literal string.
    /// ### Arguments
    /// * `id` - An unique non zero token id.
    /// * `name` - The token name used in grammar listings and error messages.
    /// * `source` - The literal image.
    pub fn literal<N: Into<String>, S: Into<String>>(id: usize, name: N, source: S) -> Self {
        Self {
            id,
            name: name.into(),
            kind: PatternKind::Literal,
            source: source.into(),
            ignore: false,
            error: false,
            error_message: None,
        }
    }

    /// Declare a token matched by a regular expression of the [regexp](crate::regexp) engine.
    pub fn regexp<N: Into<String>, S: Into<String>>(id: usize, name: N, source: S) -> Self {
        Self {
            id,
            name: name.into(),
            kind: PatternKind::Regexp,
            source: source.into(),
            ignore: false,
            error: false,
            error_message: None,
        }
    }

    /// Mark the pattern as ignored: matched images are discarded instead of emitted.
    pub fn set_ignore(&mut self) {
        self.ignore = true;
    }

    /// Mark the pattern as an error pattern: a match advances the stream and raises
    /// [InvalidToken](crate::ParseErrorKind::InvalidToken), optionally with the given message.
    pub fn set_error(&mut self, message: Option<String>) {
        self.error = true;
        self.error_message = message;
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_ignored(&self) -> bool {
        self.ignore
    }

    pub fn is_error(&self) -> bool {
        self.error
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

impl Display for TokenPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            PatternKind::Literal => write!(f, "{} : {:?}", self.name, self.source)?,
            PatternKind::Regexp => {
                write!(f, "{} : /{}/", self.name, self.source.replace('/', "\\/"))?
            }
        }
        if self.ignore {
            write!(f, " (ignored)")?;
        }
        if self.error {
            write!(f, " (error)")?;
        }
        Ok(())
    }
}
