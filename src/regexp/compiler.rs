use super::char_set::CharSet;
use super::parser::{Expr, RepeatMode};

#[derive(Debug, Clone)]
pub(super) enum Inst {
    Char(char),
    Set(CharSet),
    Any,
    /// Try `0` first and fall back to `1` on failure.
    Split(usize, usize),
    Jump(usize),
    /// Remember the current input position in a mark slot.
    Mark(usize),
    /// Fail the current thread when no input was consumed since the mark was set.
    Progress(usize),
    /// Match a sub program possessively between `min` and `max` times,
    /// leaving no backtrack entries behind.
    Repeat {
        sub: usize,
        min: usize,
        max: Option<usize>,
    },
    Accept,
}

#[derive(Debug, Clone, Default)]
pub(super) struct Program {
    pub insts: Vec<Inst>,
    pub marks: usize,
}

/// Compile an expression tree into a root program plus the sub programs
/// referenced by possessive repetitions.
pub(super) fn compile(expr: &Expr) -> (Program, Vec<Program>) {
    let mut subs = Vec::new();
    let program = compile_program(expr, &mut subs);
    (program, subs)
}

fn compile_program(expr: &Expr, subs: &mut Vec<Program>) -> Program {
    let mut builder = Builder {
        program: Program::default(),
        subs,
    };
    builder.emit(expr);
    builder.program.insts.push(Inst::Accept);
    builder.program
}

struct Builder<'subs> {
    program: Program,
    subs: &'subs mut Vec<Program>,
}

impl Builder<'_> {
    fn emit(&mut self, expr: &Expr) {
        match expr {
            Expr::Char(c) => {
                self.push(Inst::Char(*c));
            }
            Expr::Any => {
                self.push(Inst::Any);
            }
            Expr::Set(set) => {
                self.push(Inst::Set(set.clone()));
            }
            Expr::Concat(parts) => {
                for part in parts {
                    self.emit(part);
                }
            }
            Expr::Alternate(branches) => self.emit_alternation(branches),
            Expr::Repeat(body, min, max, mode) => self.emit_repeat(body, *min, *max, *mode),
        }
    }

    fn emit_alternation(&mut self, branches: &[Expr]) {
        let mut jump_sites = Vec::new();
        for (index, branch) in branches.iter().enumerate() {
            if index + 1 < branches.len() {
                let split = self.push(Inst::Split(0, 0));
                let body = self.here();
                self.emit(branch);
                jump_sites.push(self.push(Inst::Jump(0)));
                let next = self.here();
                self.program.insts[split] = Inst::Split(body, next);
            } else {
                self.emit(branch);
            }
        }
        let end = self.here();
        for site in jump_sites {
            self.program.insts[site] = Inst::Jump(end);
        }
    }

    fn emit_repeat(&mut self, body: &Expr, min: usize, max: Option<usize>, mode: RepeatMode) {
        if mode == RepeatMode::Possessive {
            let sub = compile_program(body, self.subs);
            self.subs.push(sub);
            self.push(Inst::Repeat {
                sub: self.subs.len() - 1,
                min,
                max,
            });
            return;
        }
        for _ in 0..min {
            self.emit(body);
        }
        match max {
            None => self.emit_loop(body, mode),
            Some(max) => self.emit_optionals(body, max - min, mode),
        }
    }

    /// An unbounded tail: `start: Split body/end; body; Jump start`.
    /// A body which can match the empty string is fenced with a progress check,
    /// otherwise the loop would never terminate.
    fn emit_loop(&mut self, body: &Expr, mode: RepeatMode) {
        let guard = if body.matches_empty() {
            let mark = self.program.marks;
            self.program.marks += 1;
            Some(mark)
        } else {
            None
        };
        let start = self.here();
        let split = self.push(Inst::Split(0, 0));
        let body_start = self.here();
        if let Some(mark) = guard {
            self.push(Inst::Mark(mark));
        }
        self.emit(body);
        if let Some(mark) = guard {
            self.push(Inst::Progress(mark));
        }
        self.push(Inst::Jump(start));
        let end = self.here();
        self.program.insts[split] = match mode {
            RepeatMode::Greedy => Inst::Split(body_start, end),
            RepeatMode::Reluctant => Inst::Split(end, body_start),
            RepeatMode::Possessive => unreachable!("possessive repeats compile to Inst::Repeat"),
        };
    }

    /// A bounded tail of `count` nested optional occurrences, all exiting to the
    /// common end so a skipped occurrence skips the remaining ones as well.
    fn emit_optionals(&mut self, body: &Expr, count: usize, mode: RepeatMode) {
        let mut split_sites = Vec::new();
        for _ in 0..count {
            let split = self.push(Inst::Split(0, 0));
            let body_start = self.here();
            self.emit(body);
            split_sites.push((split, body_start));
        }
        let end = self.here();
        for (split, body_start) in split_sites {
            self.program.insts[split] = match mode {
                RepeatMode::Greedy => Inst::Split(body_start, end),
                RepeatMode::Reluctant => Inst::Split(end, body_start),
                RepeatMode::Possessive => {
                    unreachable!("possessive repeats compile to Inst::Repeat")
                }
            };
        }
    }

    fn push(&mut self, inst: Inst) -> usize {
        self.program.insts.push(inst);
        self.program.insts.len() - 1
    }

    fn here(&self) -> usize {
        self.program.insts.len()
    }
}
