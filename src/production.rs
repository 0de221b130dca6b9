use crate::{
    ElementKind, LookaheadSet, ProductionPattern, ProductionPatternAlternative,
    ProductionPatternElement,
};
use once_cell::sync::OnceCell;
use std::fmt::{Display, Formatter};

impl ProductionPatternElement {
    fn new(kind: ElementKind, id: usize, min: usize, max: Option<usize>) -> Self {
        Self {
            kind,
            id,
            min,
            max,
            repeat_lookahead: OnceCell::new(),
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn min(&self) -> usize {
        self.min
    }

    /// Upper repetition bound; [None] denotes an unbounded repetition.
    pub fn max(&self) -> Option<usize> {
        self.max
    }

    /// Whether the element can occur a varying number of times, so that the
    /// driver needs a lookahead decision to stop repeating.
    pub(crate) fn is_variable_repeat(&self) -> bool {
        self.max != Some(self.min)
    }

    /// The possible occurrences of the element after one has been consumed:
    /// zero up to `max - 1` repetitions, or [None] for a single occurrence element.
    pub(crate) fn repeat_tail(&self) -> Option<Self> {
        match self.max {
            Some(1) => None,
            Some(max) => Some(Self::new(self.kind, self.id, 0, Some(max - 1))),
            None => Some(Self::new(self.kind, self.id, 0, None)),
        }
    }

    pub(crate) fn repeat_lookahead(&self) -> Option<&LookaheadSet> {
        self.repeat_lookahead.get()
    }

    pub(crate) fn assign_repeat_lookahead(&self, lookahead: LookaheadSet) {
        let _ = self.repeat_lookahead.set(lookahead);
    }
}

impl PartialEq for ProductionPatternElement {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.id == other.id
            && self.min == other.min
            && self.max == other.max
    }
}

impl ProductionPatternAlternative {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            lookahead: OnceCell::new(),
        }
    }

    /// Append a token reference with the given repetition bounds.
    pub fn add_token(&mut self, id: usize, min: usize, max: Option<usize>) {
        self.elements
            .push(ProductionPatternElement::new(ElementKind::Token, id, min, max));
    }

    /// Append a production reference with the given repetition bounds.
    pub fn add_production(&mut self, id: usize, min: usize, max: Option<usize>) {
        self.elements.push(ProductionPatternElement::new(
            ElementKind::Production,
            id,
            min,
            max,
        ));
    }

    pub fn elements(&self) -> &[ProductionPatternElement] {
        &self.elements
    }

    pub(crate) fn lookahead(&self) -> Option<&LookaheadSet> {
        self.lookahead.get()
    }

    pub(crate) fn assign_lookahead(&self, lookahead: LookaheadSet) {
        let _ = self.lookahead.set(lookahead);
    }
}

impl PartialEq for ProductionPatternAlternative {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl ProductionPattern {
    /// Create a new production pattern.
    /// ### Arguments
    /// * `id` - An unique production id, disjoint from every token id.
    /// * `name` - The production name used in grammar listings and error messages.
    pub fn new<N: Into<String>>(id: usize, name: N) -> Self {
        Self {
            id,
            name: name.into(),
            alternatives: Vec::new(),
            left_recursive: OnceCell::new(),
            right_recursive: OnceCell::new(),
            matching_empty: OnceCell::new(),
            default_alternative: OnceCell::new(),
            follow: OnceCell::new(),
        }
    }

    /// Append an alternative to the production.
    /// Two alternatives with identical element sequences are rejected.
    pub fn add_alternative(&mut self, alternative: ProductionPatternAlternative) -> Result<(), String> {
        if self.alternatives.contains(&alternative) {
            return Err(format!(
                "An identical alternative is already added to production '{}'.",
                self.name
            ));
        }
        self.alternatives.push(alternative);
        Ok(())
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alternatives(&self) -> &[ProductionPatternAlternative] {
        &self.alternatives
    }

    /// Whether the production can derive itself without consuming a token.
    /// The flag is computed while the grammar is prepared.
    pub fn is_left_recursive(&self) -> bool {
        *self.left_recursive.get().unwrap_or(&false)
    }

    /// Whether the production can derive itself as its own last symbol.
    /// The flag is computed while the grammar is prepared.
    pub fn is_right_recursive(&self) -> bool {
        *self.right_recursive.get().unwrap_or(&false)
    }

    /// Whether the production can match the empty token sequence.
    /// The flag is computed while the grammar is prepared.
    pub fn is_matching_empty(&self) -> bool {
        *self.matching_empty.get().unwrap_or(&false)
    }

    pub(crate) fn assign_flags(&self, left: bool, right: bool, empty: bool) {
        let _ = self.left_recursive.set(left);
        let _ = self.right_recursive.set(right);
        let _ = self.matching_empty.set(empty);
    }

    pub(crate) fn default_alternative(&self) -> Option<usize> {
        self.default_alternative.get().copied().flatten()
    }

    pub(crate) fn assign_default_alternative(&self, alternative: Option<usize>) {
        let _ = self.default_alternative.set(alternative);
    }

    pub(crate) fn follow(&self) -> Option<&LookaheadSet> {
        self.follow.get()
    }

    pub(crate) fn assign_follow(&self, follow: LookaheadSet) {
        let _ = self.follow.set(follow);
    }
}

impl Display for ProductionPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
