use super::compiler::{Inst, Program};
use super::{Matcher, RegExpError};
use crate::util::fold_char;
use std::fmt::{Display, Formatter};

/// Line terminators excluded by the `.` wildcard.
pub(super) fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{0085}' | '\u{2028}' | '\u{2029}')
}

fn chars_equal(a: char, b: char, case_insensitive: bool) -> bool {
    a == b || (case_insensitive && fold_char(a) == fold_char(b))
}

/// Simulate a program over `chars` starting at `start`.
///
/// Backtracking alternatives are kept on an explicit stack of (pc, position)
/// pairs; the call stack only grows with the nesting depth of possessive
/// repetitions, never with the input.
pub(super) fn run(
    program: &Program,
    subs: &[Program],
    chars: &[char],
    start: usize,
    case_insensitive: bool,
) -> Option<usize> {
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut marks = vec![usize::MAX; program.marks];
    let mut pc = 0usize;
    let mut position = start;
    loop {
        let mut failed = false;
        match &program.insts[pc] {
            Inst::Char(c) => {
                if position < chars.len() && chars_equal(chars[position], *c, case_insensitive) {
                    position += 1;
                    pc += 1;
                } else {
                    failed = true;
                }
            }
            Inst::Set(set) => {
                if position < chars.len() && set.contains(chars[position], case_insensitive) {
                    position += 1;
                    pc += 1;
                } else {
                    failed = true;
                }
            }
            Inst::Any => {
                if position < chars.len() && !is_line_terminator(chars[position]) {
                    position += 1;
                    pc += 1;
                } else {
                    failed = true;
                }
            }
            Inst::Split(preferred, alternate) => {
                stack.push((*alternate, position));
                pc = *preferred;
            }
            Inst::Jump(target) => pc = *target,
            Inst::Mark(slot) => {
                marks[*slot] = position;
                pc += 1;
            }
            Inst::Progress(slot) => {
                if position == marks[*slot] {
                    failed = true;
                } else {
                    pc += 1;
                }
            }
            Inst::Repeat { sub, min, max } => {
                let body = &subs[*sub];
                let mut count = 0usize;
                loop {
                    if let Some(max) = max {
                        if count >= *max {
                            break;
                        }
                    }
                    match run(body, subs, chars, position, case_insensitive) {
                        // An empty iteration satisfies any remaining minimum but
                        // repeating it cannot consume more input.
                        Some(0) => {
                            count = count.max(*min);
                            break;
                        }
                        Some(length) => {
                            position += length;
                            count += 1;
                        }
                        None => break,
                    }
                }
                if count < *min {
                    failed = true;
                } else {
                    pc += 1;
                }
            }
            Inst::Accept => return Some(position - start),
        }
        if failed {
            match stack.pop() {
                Some((next_pc, next_position)) => {
                    pc = next_pc;
                    position = next_position;
                }
                None => return None,
            }
        }
    }
}

impl<'regexp> Matcher<'regexp> {
    /// Match the expression against the beginning of the input.
    /// The matched image stays available until the next [reset](Matcher::reset).
    pub fn match_from_beginning(&mut self) -> bool {
        self.matched = self.regexp.match_prefix(&self.input);
        self.matched.is_some()
    }

    /// Character length of the last successful match.
    pub fn length(&self) -> Option<usize> {
        self.matched
    }

    /// Point the matcher at a new input, clearing the previous match state.
    pub fn reset(&mut self, input: &str) {
        self.input = input.chars().collect();
        self.matched = None;
    }
}

impl Display for Matcher<'_> {
    /// The image matched by the last [match_from_beginning](Matcher::match_from_beginning) call.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(length) = self.matched {
            for c in &self.input[..length] {
                std::fmt::Write::write_char(f, *c)?;
            }
        }
        Ok(())
    }
}

impl Display for RegExpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SyntaxError at {}: {}", self.position, self.message)
    }
}
