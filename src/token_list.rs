use crate::{Token, TokenList};

impl Token {
    pub(crate) fn new(id: usize, image: String, line: usize, column: usize) -> Self {
        Self {
            id,
            image,
            line,
            column,
            index: None,
            previous: None,
            next: None,
        }
    }

    /// Position of the token inside the [TokenList], when token list mode was enabled.
    pub fn list_index(&self) -> Option<usize> {
        self.index
    }

    /// Index of the preceding token in the [TokenList].
    pub fn previous_index(&self) -> Option<usize> {
        self.previous
    }

    /// Index of the succeeding token in the [TokenList].
    pub fn next_index(&self) -> Option<usize> {
        self.next
    }
}

impl TokenList {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn first(&self) -> Option<&Token> {
        self.tokens.first()
    }

    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }

    /// The token preceding the given one in the list.
    pub fn previous(&self, token: &Token) -> Option<&Token> {
        let index = token.list_index()?;
        let previous = self.tokens.get(index)?.previous?;
        self.tokens.get(previous)
    }

    /// The token succeeding the given one in the list.
    ///
    /// The successor link of the retained copy is consulted, because it is
    /// assigned only once the next token has been scanned.
    pub fn next(&self, token: &Token) -> Option<&Token> {
        let index = token.list_index()?;
        let next = self.tokens.get(index)?.next?;
        self.tokens.get(next)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// Concatenation of every retained image, including ignored ones.
    /// With all patterns emitting, this reproduces the consumed input exactly.
    pub fn concat_images(&self) -> String {
        self.tokens.iter().map(|token| token.image.as_str()).collect()
    }

    /// Append a token to the list, wiring the doubly linked indices,
    /// and return the linked snapshot.
    pub(crate) fn link(&mut self, mut token: Token) -> Token {
        let index = self.tokens.len();
        token.index = Some(index);
        token.previous = index.checked_sub(1);
        if let Some(last) = self.tokens.last_mut() {
            last.next = Some(index);
        }
        self.tokens.push(token.clone());
        token
    }
}
