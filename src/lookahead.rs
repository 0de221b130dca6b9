use crate::LookaheadSet;
use std::collections::BTreeSet;

impl LookaheadSet {
    pub fn new() -> Self {
        Self {
            sequences: BTreeSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// The token id sequences of the set, in lexicographic order.
    pub fn sequences(&self) -> impl Iterator<Item = &[usize]> {
        self.sequences.iter().map(|sequence| sequence.as_slice())
    }

    pub(crate) fn add_sequence(&mut self, sequence: Vec<usize>) {
        self.sequences.insert(sequence);
    }

    pub(crate) fn add_all(&mut self, other: &LookaheadSet) {
        for sequence in &other.sequences {
            self.sequences.insert(sequence.clone());
        }
    }

    pub(crate) fn contains_empty_sequence(&self) -> bool {
        self.sequences.contains(&Vec::new())
    }

    /// The token ids any sequence of the set can start with.
    pub(crate) fn first_tokens(&self) -> BTreeSet<usize> {
        self.sequences
            .iter()
            .filter_map(|sequence| sequence.first().copied())
            .collect()
    }

    /// Whether the upcoming token ids are predicted by one of the sequences.
    /// The peek slice is expected to be at least as long as the longest sequence,
    /// padded with the EOF sentinel at the end of input.
    pub(crate) fn is_next(&self, peek: &[usize]) -> bool {
        self.sequences
            .iter()
            .any(|sequence| sequence.len() <= peek.len() && peek[..sequence.len()] == sequence[..])
    }

    /// Find a sequence shared between two decisions.
    /// Two sequences collide when one is a prefix of the other, because an input
    /// starting with the shorter one satisfies both sets.
    pub(crate) fn find_conflict(&self, other: &LookaheadSet) -> Option<Vec<usize>> {
        for left in &self.sequences {
            for right in &other.sequences {
                let prefix = left.len().min(right.len());
                if left[..prefix] == right[..prefix] {
                    return Some(left[..prefix].to_vec());
                }
            }
        }
        None
    }
}
