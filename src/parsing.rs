use crate::{
    ElementKind, LookaheadSet, ParseError, ParseErrorKind, ParseNode, Parser, Position,
    ProductionNode, ProductionPattern, ProductionPatternElement, Token, EOF_TOKEN,
};
use std::collections::BTreeSet;
use std::io::Read;

/// A recoverable syntax failure inside one production.
/// Fatal conditions (reader failures, unexpected characters, oversized images)
/// are carried as plain [ParseError] results instead.
struct SyntaxInterrupt(ParseError);

impl<'grammar, R: Read> Parser<'grammar, R> {
    /// Parse the input into a tree rooted at the start production.
    ///
    /// Recoverable errors are accumulated on the parser and a partial tree is
    /// returned; only fatal conditions abort with an [Err].
    pub fn parse(&mut self) -> Result<ParseNode, ParseError> {
        self.errors.clear();
        let start = self
            .grammar
            .start_production()
            .expect("the start production was checked in Parser::new");
        let node = match self.parse_production(start)? {
            Some(node) => node,
            None => {
                let position = self.current_position()?;
                return Err(ParseError::new(
                    ParseErrorKind::Analysis {
                        message: "the root node was discarded by the analyzer".to_string(),
                    },
                    position,
                ));
            }
        };
        if self.peek(0)?.id != EOF_TOKEN {
            let error = self.syntax_error(vec!["<end of input>".to_string()])?;
            self.record(error);
            while self.peek(0)?.id != EOF_TOKEN {
                self.consume()?;
            }
        }
        Ok(node)
    }

    fn parse_production(
        &mut self,
        pattern: &ProductionPattern,
    ) -> Result<Option<ParseNode>, ParseError> {
        if let Some(log) = self.log.get() {
            log.production_entered(pattern.name());
        }
        let choice = self.choose_alternative(pattern)?;
        let mut node = ProductionNode::new(pattern.id(), pattern.name());
        self.analyzer_enter(&node)?;
        let alternative = match choice {
            Some(index) => &pattern.alternatives()[index],
            None => {
                let error = self.syntax_error(self.expected_of(pattern))?;
                self.record(error);
                self.recover(pattern)?;
                return self.finish_node(node);
            }
        };
        for element in alternative.elements() {
            match self.parse_element(element, &mut node) {
                Ok(()) => {}
                Err(SyntaxInterrupt(error)) => {
                    if error.is_fatal() {
                        return Err(error);
                    }
                    self.record(error);
                    self.recover(pattern)?;
                    break;
                }
            }
        }
        self.finish_node(node)
    }

    fn parse_element(
        &mut self,
        element: &ProductionPatternElement,
        parent: &mut ProductionNode,
    ) -> Result<(), SyntaxInterrupt> {
        let mut count = 0usize;
        loop {
            if let Some(max) = element.max() {
                if count >= max {
                    break;
                }
            }
            if count >= element.min() {
                match element.repeat_lookahead() {
                    Some(lookahead) => {
                        if !self.lookahead_matches(lookahead).map_err(SyntaxInterrupt)? {
                            break;
                        }
                    }
                    None => break,
                }
            }
            let before = self.consumed;
            match element.kind() {
                ElementKind::Token => {
                    if self.peek(0).map_err(SyntaxInterrupt)?.id != element.id() {
                        let expected = vec![self.grammar.token_description(element.id())];
                        let error = self.syntax_error(expected).map_err(SyntaxInterrupt)?;
                        return Err(SyntaxInterrupt(error));
                    }
                    let token = self.consume().map_err(SyntaxInterrupt)?;
                    self.attach_token(parent, token).map_err(SyntaxInterrupt)?;
                }
                ElementKind::Production => {
                    let target = self
                        .grammar
                        .production_pattern(element.id())
                        .expect("production references were validated");
                    match self.parse_production(target).map_err(SyntaxInterrupt)? {
                        Some(child) => self.attach_child(parent, child).map_err(SyntaxInterrupt)?,
                        None => {}
                    }
                }
            }
            count += 1;
            // A repetition which consumed nothing can never make progress.
            if self.consumed == before {
                break;
            }
        }
        Ok(())
    }

    /// Pick the unique alternative whose lookahead set predicts the upcoming
    /// tokens, falling back to the empty matching alternative if there is one.
    fn choose_alternative(
        &mut self,
        pattern: &ProductionPattern,
    ) -> Result<Option<usize>, ParseError> {
        let peek = self.peek_ids()?;
        for (index, alternative) in pattern.alternatives().iter().enumerate() {
            if let Some(lookahead) = alternative.lookahead() {
                if lookahead.is_next(&peek) {
                    if let Some(log) = self.log.get() {
                        log.alternative_chosen(pattern.name(), index);
                    }
                    return Ok(Some(index));
                }
            }
        }
        Ok(pattern.default_alternative())
    }

    fn lookahead_matches(&mut self, lookahead: &LookaheadSet) -> Result<bool, ParseError> {
        let peek = self.peek_ids()?;
        Ok(lookahead.is_next(&peek))
    }

    fn peek_ids(&mut self) -> Result<Vec<usize>, ParseError> {
        let depth = self.grammar.lookahead_depth().unwrap_or(1);
        let mut ids = Vec::with_capacity(depth);
        for offset in 0..depth {
            ids.push(self.peek(offset)?.id);
        }
        Ok(ids)
    }

    /// The buffered token at the given offset, pulling from the tokenizer as needed.
    /// Invalid token reports are recorded and scanning continues behind them.
    fn peek(&mut self, offset: usize) -> Result<&Token, ParseError> {
        while self.peek_buffer.len() <= offset {
            let token = loop {
                match self.tokenizer.next() {
                    Ok(token) => break token,
                    Err(error) => match error.kind {
                        ParseErrorKind::InvalidToken { .. } => self.errors.push(error),
                        _ => return Err(error),
                    },
                }
            };
            self.peek_buffer.push_back(token);
        }
        Ok(&self.peek_buffer[offset])
    }

    fn consume(&mut self) -> Result<Token, ParseError> {
        self.peek(0)?;
        let token = self
            .peek_buffer
            .pop_front()
            .expect("the peek buffer was filled");
        if token.id != EOF_TOKEN {
            self.consumed += 1;
        }
        Ok(token)
    }

    /// Skip tokens until one of the follow tokens of the production (or the end
    /// of input) comes up, so parsing can continue behind the reported error.
    fn recover(&mut self, pattern: &ProductionPattern) -> Result<(), ParseError> {
        let mut sync: BTreeSet<usize> = pattern
            .follow()
            .map(|follow| follow.first_tokens())
            .unwrap_or_default();
        sync.insert(EOF_TOKEN);
        while !sync.contains(&self.peek(0)?.id) {
            self.consume()?;
        }
        Ok(())
    }

    fn syntax_error(&mut self, expected: Vec<String>) -> Result<ParseError, ParseError> {
        let token = self.peek(0)?;
        let position = Position::new(token.line, token.column);
        let kind = if token.id == EOF_TOKEN {
            ParseErrorKind::UnexpectedEof { expected }
        } else {
            ParseErrorKind::UnexpectedToken {
                found: token.image.clone(),
                expected,
            }
        };
        Ok(ParseError::new(kind, position))
    }

    /// The token names any alternative of the production can start with.
    fn expected_of(&self, pattern: &ProductionPattern) -> Vec<String> {
        let mut names = BTreeSet::new();
        for alternative in pattern.alternatives() {
            if let Some(lookahead) = alternative.lookahead() {
                for id in lookahead.first_tokens() {
                    names.insert(self.grammar.token_description(id));
                }
            }
        }
        names.into_iter().collect()
    }

    fn record(&mut self, error: ParseError) {
        if let Some(log) = self.log.get() {
            log.error_recovered(&error);
        }
        self.errors.push(error);
    }

    fn record_analysis(&mut self, message: String, position: Position) {
        self.errors.push(ParseError::new(
            ParseErrorKind::Analysis { message },
            position,
        ));
    }

    fn current_position(&mut self) -> Result<Position, ParseError> {
        match self.peek_buffer.front() {
            Some(token) => Ok(Position::new(token.line, token.column)),
            None => {
                let token = self.peek(0)?;
                Ok(Position::new(token.line, token.column))
            }
        }
    }

    fn analyzer_enter(&mut self, node: &ProductionNode) -> Result<(), ParseError> {
        let mut analyzer = match self.analyzer.take() {
            Some(analyzer) => analyzer,
            None => return Ok(()),
        };
        let view = ParseNode::Production(node.clone());
        if let Err(message) = analyzer.enter(&view) {
            let position = self.current_position().unwrap_or(Position::new(0, 0));
            self.record_analysis(message, position);
        }
        self.analyzer = Some(analyzer);
        Ok(())
    }

    /// Finalize a production node through the analyzer exit hook.
    /// An exit failure is recorded and discards the node.
    fn finish_node(&mut self, node: ProductionNode) -> Result<Option<ParseNode>, ParseError> {
        let node = ParseNode::Production(node);
        let mut analyzer = match self.analyzer.take() {
            Some(analyzer) => analyzer,
            None => return Ok(Some(node)),
        };
        let position = node.start_position();
        let result = match analyzer.exit(node) {
            Ok(result) => result,
            Err(message) => {
                let position = match position {
                    Some(position) => position,
                    None => self.current_position().unwrap_or(Position::new(0, 0)),
                };
                self.record_analysis(message, position);
                None
            }
        };
        self.analyzer = Some(analyzer);
        Ok(result)
    }

    fn attach_token(&mut self, parent: &mut ProductionNode, token: Token) -> Result<(), ParseError> {
        let position = Position::new(token.line, token.column);
        let node = ParseNode::Token(token);
        let mut analyzer = match self.analyzer.take() {
            Some(analyzer) => analyzer,
            None => {
                parent.add_child(node);
                return Ok(());
            }
        };
        if let Err(message) = analyzer.enter(&node) {
            self.record_analysis(message, position);
        }
        match analyzer.exit(node) {
            Ok(Some(node)) => {
                if let Err(message) = analyzer.child(parent, node) {
                    self.record_analysis(message, position);
                }
            }
            Ok(None) => {}
            Err(message) => self.record_analysis(message, position),
        }
        self.analyzer = Some(analyzer);
        Ok(())
    }

    fn attach_child(
        &mut self,
        parent: &mut ProductionNode,
        child: ParseNode,
    ) -> Result<(), ParseError> {
        let mut analyzer = match self.analyzer.take() {
            Some(analyzer) => analyzer,
            None => {
                parent.add_child(child);
                return Ok(());
            }
        };
        if let Err(message) = analyzer.child(parent, child) {
            let position = self.current_position().unwrap_or(Position::new(0, 0));
            self.record_analysis(message, position);
        }
        self.analyzer = Some(analyzer);
        Ok(())
    }
}

impl ParseError {
    /// Whether the descent cannot recover from the error by skipping tokens.
    fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            ParseErrorKind::UnexpectedChar { .. }
                | ParseErrorKind::TokenTooLarge { .. }
                | ParseErrorKind::Io(_)
        )
    }
}
