//! Grammar preparation: validation, recursion analysis and the computation of the
//! first, follow and lookahead tables driving the parsing decisions.

use crate::regexp::RegExp;
use crate::{
    ElementKind, Grammar, GrammarError, LookaheadSet, PatternKind, ProductionPatternElement,
    EOF_TOKEN,
};
use std::collections::{BTreeSet, HashMap, HashSet};

#[cfg(test)]
mod __tests__;

/// Ceiling for the lookahead depth search.
/// A grammar whose alternatives stay ambiguous at this depth is rejected.
pub(crate) const MAX_LOOKAHEAD: usize = 3;

/// Validate the grammar and compute its lookahead tables.
/// Returns the chosen lookahead depth on success.
pub(crate) fn prepare(grammar: &Grammar) -> Result<usize, Vec<GrammarError>> {
    let mut errors = validate_token_patterns(grammar);
    errors.extend(validate_productions(grammar));
    if !errors.is_empty() {
        return Err(errors);
    }

    let nullable = compute_nullable(grammar);
    let left_edges = recursion_edges(grammar, &nullable, true);
    let right_edges = recursion_edges(grammar, &nullable, false);
    let mut errors = Vec::new();
    for (index, production) in grammar.production_patterns.iter().enumerate() {
        let left = on_cycle(index, &left_edges);
        let right = on_cycle(index, &right_edges);
        production.assign_flags(left, right, nullable[index]);
        if left {
            errors.push(GrammarError::LeftRecursion {
                production: production.name().to_string(),
            });
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    for production in &grammar.production_patterns {
        let default = production.alternatives().iter().position(|alternative| {
            alternative
                .elements()
                .iter()
                .all(|element| element_nullable(grammar, element, &nullable))
        });
        production.assign_default_alternative(default);
    }

    let mut conflicts = Vec::new();
    for depth in 1..=MAX_LOOKAHEAD {
        let mut analyzer = Analyzer {
            grammar,
            budget: depth,
            first_cache: HashMap::new(),
        };
        match analyzer.compute_tables() {
            Ok(tables) => {
                install_tables(grammar, tables);
                return Ok(depth);
            }
            Err(found) => conflicts = found,
        }
    }
    Err(conflicts)
}

fn validate_token_patterns(grammar: &Grammar) -> Vec<GrammarError> {
    let mut errors = Vec::new();
    let mut literal_images: HashSet<String> = HashSet::new();
    for pattern in &grammar.token_patterns {
        if pattern.id() == EOF_TOKEN {
            errors.push(GrammarError::InvalidTokenPattern {
                pattern: pattern.name().to_string(),
                message: "token id 0 is reserved for the end of input".to_string(),
            });
        }
        match pattern.kind() {
            PatternKind::Literal => {
                if pattern.source().is_empty() {
                    errors.push(GrammarError::InvalidTokenPattern {
                        pattern: pattern.name().to_string(),
                        message: "a literal pattern must not be empty".to_string(),
                    });
                    continue;
                }
                let image = if grammar.case_insensitive {
                    pattern.source().chars().map(crate::util::fold_char).collect()
                } else {
                    pattern.source().to_string()
                };
                if !literal_images.insert(image) {
                    errors.push(GrammarError::InvalidTokenPattern {
                        pattern: pattern.name().to_string(),
                        message: "another literal pattern already matches the same image"
                            .to_string(),
                    });
                }
            }
            PatternKind::Regexp => {
                match RegExp::new(pattern.source(), grammar.case_insensitive) {
                    Err(err) => errors.push(GrammarError::InvalidTokenPattern {
                        pattern: pattern.name().to_string(),
                        message: err.to_string(),
                    }),
                    Ok(regexp) => {
                        if regexp.match_from_position("", 0).is_some() {
                            errors.push(GrammarError::InvalidTokenPattern {
                                pattern: pattern.name().to_string(),
                                message: "the pattern must not match the empty string"
                                    .to_string(),
                            });
                        }
                    }
                }
            }
        }
    }
    errors
}

fn validate_productions(grammar: &Grammar) -> Vec<GrammarError> {
    let mut errors = Vec::new();
    for production in &grammar.production_patterns {
        if production.alternatives().is_empty() {
            errors.push(GrammarError::EmptyProduction {
                production: production.name().to_string(),
            });
        }
        for alternative in production.alternatives() {
            for element in alternative.elements() {
                if let Some(max) = element.max() {
                    if max < element.min() || max == 0 {
                        errors.push(GrammarError::InvalidRepetition {
                            production: production.name().to_string(),
                            min: element.min(),
                            max,
                        });
                    }
                }
                match element.kind() {
                    ElementKind::Token => {
                        if !grammar.token_ids.contains_key(&element.id()) {
                            errors.push(GrammarError::UnknownTokenReference {
                                production: production.name().to_string(),
                                token_id: element.id(),
                            });
                        }
                    }
                    ElementKind::Production => {
                        if !grammar.production_ids.contains_key(&element.id()) {
                            errors.push(GrammarError::UnknownProductionReference {
                                production: production.name().to_string(),
                                production_id: element.id(),
                            });
                        }
                    }
                }
            }
        }
        for first in 0..production.alternatives().len() {
            for second in first + 1..production.alternatives().len() {
                if production.alternatives()[first] == production.alternatives()[second] {
                    errors.push(GrammarError::DuplicateAlternative {
                        production: production.name().to_string(),
                        alternative: second,
                    });
                }
            }
        }
    }
    errors
}

fn element_nullable(
    grammar: &Grammar,
    element: &ProductionPatternElement,
    nullable: &[bool],
) -> bool {
    element.min() == 0
        || (element.kind() == ElementKind::Production
            && nullable[grammar.production_ids[&element.id()]])
}

fn compute_nullable(grammar: &Grammar) -> Vec<bool> {
    let mut nullable = vec![false; grammar.production_patterns.len()];
    loop {
        let mut changed = false;
        for (index, production) in grammar.production_patterns.iter().enumerate() {
            if nullable[index] {
                continue;
            }
            let matching = production.alternatives().iter().any(|alternative| {
                alternative
                    .elements()
                    .iter()
                    .all(|element| element_nullable(grammar, element, &nullable))
            });
            if matching {
                nullable[index] = true;
                changed = true;
            }
        }
        if !changed {
            break nullable;
        }
    }
}

/// The production reachability edges at the leftmost (or rightmost) derivation
/// position, crossing elements as long as they are nullable.
/// A production sitting on a cycle of these edges is left (or right) recursive.
fn recursion_edges(grammar: &Grammar, nullable: &[bool], from_left: bool) -> Vec<Vec<usize>> {
    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); grammar.production_patterns.len()];
    for (index, production) in grammar.production_patterns.iter().enumerate() {
        for alternative in production.alternatives() {
            let elements: Vec<&ProductionPatternElement> = if from_left {
                alternative.elements().iter().collect()
            } else {
                alternative.elements().iter().rev().collect()
            };
            for element in elements {
                if element.kind() == ElementKind::Production {
                    edges[index].push(grammar.production_ids[&element.id()]);
                }
                if !element_nullable(grammar, element, nullable) {
                    break;
                }
            }
        }
    }
    edges
}

fn on_cycle(start: usize, edges: &[Vec<usize>]) -> bool {
    let mut visited = vec![false; edges.len()];
    let mut pending = edges[start].clone();
    while let Some(node) = pending.pop() {
        if node == start {
            return true;
        }
        if !visited[node] {
            visited[node] = true;
            pending.extend_from_slice(&edges[node]);
        }
    }
    false
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// A set of bounded token id sequences with an openness flag per sequence.
/// An open sequence marks a derivation which can end there, so whatever follows
/// the derivation extends it; a sequence which reached the depth budget is closed.
struct SequenceSet {
    items: BTreeSet<(Vec<usize>, bool)>,
}

impl SequenceSet {
    fn empty_derivation(budget: usize) -> Self {
        let mut set = Self::default();
        set.items.insert((Vec::new(), budget > 0));
        set
    }

    fn absorb(&mut self, other: SequenceSet) -> bool {
        let mut changed = false;
        for item in other.items {
            changed |= self.items.insert(item);
        }
        changed
    }
}

struct Tables {
    follow: Vec<LookaheadSet>,
    alternatives: Vec<Vec<LookaheadSet>>,
    repeats: Vec<Vec<Vec<Option<LookaheadSet>>>>,
}

struct Analyzer<'grammar> {
    grammar: &'grammar Grammar,
    budget: usize,
    first_cache: HashMap<(usize, usize), SequenceSet>,
}

impl Analyzer<'_> {
    /// Compute every lookahead table at the current depth budget, or report the
    /// conflicts which make the grammar ambiguous at this depth.
    fn compute_tables(&mut self) -> Result<Tables, Vec<GrammarError>> {
        let grammar = self.grammar;
        let follow = self.compute_follow();
        let mut conflicts = Vec::new();
        let mut alternatives = Vec::new();
        let mut repeats = Vec::new();
        for (index, production) in grammar.production_patterns.iter().enumerate() {
            let mut lookaheads = Vec::new();
            for alternative in production.alternatives() {
                let first = self.first_of_elements(
                    alternative.elements(),
                    self.budget,
                    &mut Vec::new(),
                );
                lookaheads.push(self.into_lookahead(&first, &follow[index]));
            }
            for first in 0..lookaheads.len() {
                for second in first + 1..lookaheads.len() {
                    if let Some(conflict) = lookaheads[first].find_conflict(&lookaheads[second]) {
                        conflicts.push(GrammarError::AmbiguousAlternatives {
                            production: production.name().to_string(),
                            first,
                            second,
                            prefix: self.describe_sequence(&conflict),
                        });
                    }
                }
            }

            let mut production_repeats = Vec::new();
            for (alt_index, alternative) in production.alternatives().iter().enumerate() {
                let mut element_lookaheads = Vec::new();
                for (el_index, element) in alternative.elements().iter().enumerate() {
                    if !element.is_variable_repeat() {
                        element_lookaheads.push(None);
                        continue;
                    }
                    let rest = &alternative.elements()[el_index + 1..];
                    let continuation = self.continuation_sequences(element, rest);
                    let exit = self.first_of_elements(rest, self.budget, &mut Vec::new());
                    let continuation = self.into_lookahead(&continuation, &follow[index]);
                    let exit = self.into_lookahead(&exit, &follow[index]);
                    if let Some(conflict) = continuation.find_conflict(&exit) {
                        conflicts.push(GrammarError::AmbiguousRepetition {
                            production: production.name().to_string(),
                            alternative: alt_index,
                            element: el_index,
                            prefix: self.describe_sequence(&conflict),
                        });
                    }
                    element_lookaheads.push(Some(continuation));
                }
                production_repeats.push(element_lookaheads);
            }
            alternatives.push(lookaheads);
            repeats.push(production_repeats);
        }
        if !conflicts.is_empty() {
            return Err(conflicts);
        }
        let follow = follow
            .into_iter()
            .map(|set| {
                let mut lookahead = LookaheadSet::new();
                for (sequence, _) in set.items {
                    lookahead.add_sequence(sequence);
                }
                lookahead
            })
            .collect();
        Ok(Tables {
            follow,
            alternatives,
            repeats,
        })
    }

    /// First sequences of a whole production at the given depth budget.
    ///
    /// The guard holds the (production, budget) pairs of the active recursion
    /// path; hitting one again means a derivation loop without consumption,
    /// which has already been reported as left recursion.
    fn first_of_production(
        &mut self,
        production: usize,
        budget: usize,
        guard: &mut Vec<(usize, usize)>,
    ) -> SequenceSet {
        if budget == 0 {
            let mut set = SequenceSet::default();
            set.items.insert((Vec::new(), false));
            return set;
        }
        if let Some(cached) = self.first_cache.get(&(production, budget)) {
            return cached.clone();
        }
        if guard.contains(&(production, budget)) {
            return SequenceSet::default();
        }
        guard.push((production, budget));
        let grammar = self.grammar;
        let pattern = &grammar.production_patterns[production];
        let mut set = SequenceSet::default();
        for alternative in pattern.alternatives() {
            let first = self.first_of_elements(alternative.elements(), budget, guard);
            set.absorb(first);
        }
        guard.pop();
        self.first_cache.insert((production, budget), set.clone());
        set
    }

    fn first_of_elements(
        &mut self,
        elements: &[ProductionPatternElement],
        budget: usize,
        guard: &mut Vec<(usize, usize)>,
    ) -> SequenceSet {
        let mut result = SequenceSet::empty_derivation(budget);
        for element in elements {
            result = self.append_element(result, element, budget, guard);
        }
        result
    }

    /// Extend every open sequence with the bounded repetition of one element.
    fn append_element(
        &mut self,
        current: SequenceSet,
        element: &ProductionPatternElement,
        budget: usize,
        guard: &mut Vec<(usize, usize)>,
    ) -> SequenceSet {
        let mut result = current;
        for _ in 0..element.min() {
            result = self.append_once(&result, element, budget, guard);
        }
        match element.max() {
            Some(max) => {
                for _ in 0..max.saturating_sub(element.min()) {
                    let appended = self.append_once(&result, element, budget, guard);
                    if !result.absorb(appended) {
                        break;
                    }
                }
            }
            None => loop {
                let appended = self.append_once(&result, element, budget, guard);
                if !result.absorb(appended) {
                    break;
                }
            },
        }
        result
    }

    /// Extend every open sequence with exactly one occurrence of the element.
    fn append_once(
        &mut self,
        current: &SequenceSet,
        element: &ProductionPatternElement,
        budget: usize,
        guard: &mut Vec<(usize, usize)>,
    ) -> SequenceSet {
        let mut result = SequenceSet::default();
        for (sequence, open) in &current.items {
            if !*open {
                result.items.insert((sequence.clone(), false));
                continue;
            }
            let remaining = budget - sequence.len();
            let piece = match element.kind() {
                ElementKind::Token => {
                    let mut piece = SequenceSet::default();
                    piece.items.insert((vec![element.id()], true));
                    piece
                }
                ElementKind::Production => {
                    let target = self.grammar.production_ids[&element.id()];
                    self.first_of_production(target, remaining, guard)
                }
            };
            for (tail, tail_open) in &piece.items {
                let mut combined = sequence.clone();
                combined.extend_from_slice(tail);
                combined.truncate(budget);
                let open = *tail_open && combined.len() < budget;
                result.items.insert((combined, open));
            }
        }
        result
    }

    /// Sequences predicting one more occurrence of a repeated element,
    /// followed by the remaining occurrences, the rest of the alternative and
    /// eventually the follow set of the owning production.
    fn continuation_sequences(
        &mut self,
        element: &ProductionPatternElement,
        rest: &[ProductionPatternElement],
    ) -> SequenceSet {
        let guard = &mut Vec::new();
        let mut result = SequenceSet::empty_derivation(self.budget);
        result = self.append_once(&result, element, self.budget, guard);
        if let Some(tail) = element.repeat_tail() {
            result = self.append_element(result, &tail, self.budget, guard);
        }
        for element in rest {
            result = self.append_element(result, element, self.budget, guard);
        }
        result
    }

    /// Fixpoint computation of the follow sequences of every production.
    /// The start production is followed by the end of input sentinel.
    fn compute_follow(&mut self) -> Vec<SequenceSet> {
        let grammar = self.grammar;
        let count = grammar.production_patterns.len();
        let mut follow: Vec<SequenceSet> = vec![SequenceSet::default(); count];
        if count > 0 {
            follow[0].items.insert((vec![EOF_TOKEN], false));
        }
        let follow = loop {
            let mut changed = false;
            for owner in 0..count {
                let pattern = &grammar.production_patterns[owner];
                for alternative in pattern.alternatives() {
                    for (position, element) in alternative.elements().iter().enumerate() {
                        if element.kind() != ElementKind::Production {
                            continue;
                        }
                        let target = self.grammar.production_ids[&element.id()];
                        let mut tail =
                            SequenceSet::empty_derivation(self.budget);
                        let guard = &mut Vec::new();
                        if let Some(more) = element.repeat_tail() {
                            tail = self.append_element(tail, &more, self.budget, guard);
                        }
                        for rest in &alternative.elements()[position + 1..] {
                            tail = self.append_element(tail, rest, self.budget, guard);
                        }
                        let mut contribution = Vec::new();
                        for (sequence, open) in &tail.items {
                            if *open && sequence.len() < self.budget {
                                for (extension, _) in &follow[owner].items {
                                    let mut combined = sequence.clone();
                                    combined.extend_from_slice(extension);
                                    combined.truncate(self.budget);
                                    contribution.push(combined);
                                }
                            } else {
                                contribution.push(sequence.clone());
                            }
                        }
                        for sequence in contribution {
                            changed |= follow[target].items.insert((sequence, false));
                        }
                    }
                }
            }
            if !changed {
                break follow;
            }
        };
        // A production nothing refers to behaves like a start production.
        let mut follow = follow;
        for set in &mut follow {
            if set.items.is_empty() {
                set.items.insert((vec![EOF_TOKEN], false));
            }
        }
        follow
    }

    /// Turn first sequences into a lookahead set, extending every derivation
    /// which can end before the depth budget with the follow sequences.
    fn into_lookahead(&self, set: &SequenceSet, follow: &SequenceSet) -> LookaheadSet {
        let mut lookahead = LookaheadSet::new();
        for (sequence, open) in &set.items {
            if *open && sequence.len() < self.budget && !follow.items.is_empty() {
                for (extension, _) in &follow.items {
                    let mut combined = sequence.clone();
                    combined.extend_from_slice(extension);
                    combined.truncate(self.budget);
                    lookahead.add_sequence(combined);
                }
            } else {
                lookahead.add_sequence(sequence.clone());
            }
        }
        lookahead
    }

    fn describe_sequence(&self, sequence: &[usize]) -> Vec<String> {
        sequence
            .iter()
            .map(|id| self.grammar.token_description(*id))
            .collect()
    }
}

fn install_tables(grammar: &Grammar, tables: Tables) {
    for (index, production) in grammar.production_patterns.iter().enumerate() {
        production.assign_follow(tables.follow[index].clone());
        for (alt_index, alternative) in production.alternatives().iter().enumerate() {
            alternative.assign_lookahead(tables.alternatives[index][alt_index].clone());
            for (el_index, element) in alternative.elements().iter().enumerate() {
                if let Some(lookahead) = &tables.repeats[index][alt_index][el_index] {
                    element.assign_repeat_lookahead(lookahead.clone());
                }
            }
        }
    }
}
