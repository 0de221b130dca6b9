use crate::regexp::RegExp;
use crate::util::{fold_char, SourceBuffer};
use crate::{
    CompiledTokenPattern, FieldTree, Grammar, Log, ParseError, ParseErrorKind, PatternKind,
    PatternMatcher, Token, TokenList, TokenPattern, Tokenizer, EOF_TOKEN, MAX_TOKEN_LENGTH,
};
use once_cell::sync::OnceCell;
use std::io::Read;

#[cfg(test)]
mod __tests__;

impl<R: Read> Tokenizer<R> {
    /// Create a tokenizer with an empty pattern table.
    /// ### Arguments
    /// * `reader` - The input character stream.
    /// * `case_insensitive` - Whether pattern matching folds character case.
    pub fn new(reader: R, case_insensitive: bool) -> Self {
        Self {
            patterns: Vec::new(),
            literal_tree: FieldTree::new(),
            case_insensitive,
            source: SourceBuffer::new(reader),
            use_token_list: false,
            token_list: TokenList::default(),
            started: false,
            log: OnceCell::new(),
        }
    }

    pub(crate) fn from_grammar(grammar: &Grammar, reader: R) -> Self {
        let mut tokenizer = Self::new(reader, grammar.is_case_insensitive());
        for pattern in grammar.token_patterns() {
            tokenizer
                .add_pattern(pattern)
                .expect("token patterns were validated while the grammar was prepared");
        }
        tokenizer
    }

    /// Add a pattern to the table.
    ///
    /// Patterns added earlier win length ties against patterns added later.
    pub fn add_pattern(&mut self, pattern: &TokenPattern) -> Result<(), String> {
        if self.started {
            return Err("The pattern table is frozen once tokenization has started.".to_string());
        }
        if pattern.id() == EOF_TOKEN {
            return Err(format!(
                "Token id {} is reserved for the end of input.",
                EOF_TOKEN
            ));
        }
        let matcher = match pattern.kind() {
            PatternKind::Literal => {
                if pattern.source().is_empty() {
                    return Err(format!(
                        "A literal pattern must not be empty for '{}'.",
                        pattern.name()
                    ));
                }
                let image: Vec<char> = if self.case_insensitive {
                    pattern.source().chars().map(fold_char).collect()
                } else {
                    pattern.source().chars().collect()
                };
                if let Err(existing) = self.literal_tree.insert(&image, self.patterns.len()) {
                    return Err(format!(
                        "The image {:?} is already matched by '{}'.",
                        pattern.source(),
                        self.patterns[existing].name
                    ));
                }
                PatternMatcher::Literal(image)
            }
            PatternKind::Regexp => {
                let regexp =
                    RegExp::new(pattern.source(), self.case_insensitive).map_err(|err| {
                        format!(
                            "Pattern '{}' should be a valid regular expression. {}",
                            pattern.name(),
                            err
                        )
                    })?;
                if regexp.match_from_position("", 0).is_some() {
                    return Err(format!(
                        "Regular expression '{}' should not match an empty image.",
                        pattern.name()
                    ));
                }
                PatternMatcher::Regexp(regexp)
            }
        };
        self.patterns.push(CompiledTokenPattern {
            id: pattern.id(),
            name: pattern.name().to_string(),
            ignore: pattern.is_ignored(),
            error: pattern.is_error(),
            error_message: pattern.error_message().map(|message| message.to_string()),
            matcher,
        });
        Ok(())
    }

    /// Enable or disable the token list bookkeeping.
    /// The mode has to be chosen before the first [next](Tokenizer::next) call.
    pub fn set_use_token_list(&mut self, use_token_list: bool) -> Result<(), String> {
        if self.started {
            return Err("The token list mode cannot change once tokenization has started.".to_string());
        }
        self.use_token_list = use_token_list;
        Ok(())
    }

    /// The retained tokens, available in token list mode.
    pub fn token_list(&self) -> Option<&TokenList> {
        if self.use_token_list {
            Some(&self.token_list)
        } else {
            None
        }
    }

    /// Re-point the tokenizer at a new input stream.
    /// All scanning state is cleared while the compiled pattern table is kept.
    pub fn reset(&mut self, reader: R) {
        self.source = SourceBuffer::new(reader);
        self.token_list = TokenList::default();
        self.started = false;
    }

    /// Set a log label to debug the emitted tokens based on the level of [Log].
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.log
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    /// Produce the next token.
    ///
    /// Ignored images are skipped silently, error flagged images raise
    /// [InvalidToken](ParseErrorKind::InvalidToken) after the stream has moved past them,
    /// and the exhausted input keeps answering with the [EOF_TOKEN] sentinel.
    pub fn next(&mut self) -> Result<Token, ParseError> {
        self.started = true;
        loop {
            let position = self.source.position();
            if let Err(err) = self.source.fill(MAX_TOKEN_LENGTH + 1) {
                return Err(ParseError::new(ParseErrorKind::Io(err), position));
            }
            if self.source.at_end() {
                return Ok(self.emit_eof());
            }
            let case_insensitive = self.case_insensitive;
            let window = self.source.window();
            let mut best: Option<(usize, usize)> = None;
            if let Some((pattern, length)) = self.literal_tree.find_longest(window, |c| {
                if case_insensitive {
                    fold_char(c)
                } else {
                    c
                }
            }) {
                if length > 0 {
                    best = Some((length, pattern));
                }
            }
            for (index, pattern) in self.patterns.iter().enumerate() {
                if let PatternMatcher::Regexp(regexp) = &pattern.matcher {
                    if let Some(length) = regexp.match_prefix(window) {
                        let better = match best {
                            None => length > 0,
                            Some((best_length, best_index)) => {
                                length > best_length
                                    || (length == best_length && index < best_index)
                            }
                        };
                        if better {
                            best = Some((length, index));
                        }
                    }
                }
            }
            let (length, index) = match best {
                Some(found) => found,
                None => {
                    let character = window[0];
                    if let Some(log) = self.log.get() {
                        log.tokenize_failed(position);
                    }
                    return Err(ParseError::new(
                        ParseErrorKind::UnexpectedChar { character },
                        position,
                    ));
                }
            };
            if length > MAX_TOKEN_LENGTH {
                return Err(ParseError::new(
                    ParseErrorKind::TokenTooLarge {
                        limit: MAX_TOKEN_LENGTH,
                    },
                    position,
                ));
            }
            let image = self.source.consume(length);
            let pattern = &self.patterns[index];
            if pattern.error {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidToken {
                        image,
                        message: pattern.error_message.clone(),
                    },
                    position,
                ));
            }
            let token = Token::new(pattern.id, image, position.line, position.column);
            if pattern.ignore {
                if self.use_token_list {
                    self.token_list.link(token);
                }
                continue;
            }
            let token = if self.use_token_list {
                self.token_list.link(token)
            } else {
                token
            };
            if let Some(log) = self.log.get() {
                log.token_emitted(&token);
            }
            return Ok(token);
        }
    }

    fn emit_eof(&mut self) -> Token {
        let position = self.source.position();
        if self.use_token_list {
            if let Some(last) = self.token_list.last() {
                if last.id == EOF_TOKEN {
                    return last.clone();
                }
            }
            return self
                .token_list
                .link(Token::new(EOF_TOKEN, String::new(), position.line, position.column));
        }
        Token::new(EOF_TOKEN, String::new(), position.line, position.column)
    }
}
