//! VM executor: runs a compiled program against one line of input.
//!
//! Backtracking is driven by an explicit stack instead of native recursion,
//! so deeply nested or highly repetitive patterns never grow the call stack.
//! Every write to a capture slot or register pushes an undo frame; failing
//! pops frames until the most recent resume point, restoring state on the way.

use crate::compiler::{Inst, Program};
use crate::error::ResourceExceeded;

/// Result of a successful match attempt, in character positions of the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Start position in the line.
    pub start: usize,
    /// End position in the line (exclusive).
    pub end: usize,
    /// Capture spans indexed by group; slot 0 is the whole match.
    pub captures: Vec<Option<(usize, usize)>>,
}

enum Frame {
    /// Resume execution at `pc` with the cursor at `pos`.
    Resume { pc: usize, pos: usize },
    RestoreCapture {
        group: usize,
        old: Option<(usize, usize)>,
    },
    RestoreRegister { reg: usize, old: usize },
}

/// Reusable matcher state for one program. Buffers are kept between
/// attempts so scanning a line does not reallocate per position.
pub struct Machine<'a> {
    program: &'a Program,
    budget: u64,
    captures: Vec<Option<(usize, usize)>>,
    regs: Vec<usize>,
    stack: Vec<Frame>,
}

/// Attempt a match beginning exactly at `start`.
pub fn match_at(
    program: &Program,
    chars: &[char],
    start: usize,
    budget: u64,
) -> Result<Option<MatchResult>, ResourceExceeded> {
    Machine::new(program, budget).match_at(chars, start)
}

impl<'a> Machine<'a> {
    pub fn new(program: &'a Program, budget: u64) -> Self {
        Machine {
            program,
            budget,
            captures: vec![None; program.group_count + 1],
            regs: vec![0; program.registers],
            stack: Vec::new(),
        }
    }

    /// Attempt a match beginning exactly at `start`. The step budget applies
    /// to this attempt alone.
    pub fn match_at(
        &mut self,
        chars: &[char],
        start: usize,
    ) -> Result<Option<MatchResult>, ResourceExceeded> {
        if start > chars.len() {
            return Ok(None);
        }
        self.captures.fill(None);
        self.regs.fill(0);
        self.stack.clear();

        let Some(end) = self.exec(chars, start)? else {
            return Ok(None);
        };
        let mut captures = self.captures.clone();
        captures[0] = Some((start, end));
        Ok(Some(MatchResult {
            start,
            end,
            captures,
        }))
    }

    /// Run the program from `start`; returns the end position of the match.
    fn exec(&mut self, chars: &[char], start: usize) -> Result<Option<usize>, ResourceExceeded> {
        let program: &'a Program = self.program;
        let insts = &program.insts;
        let mut pc = 0;
        let mut pos = start;
        let mut steps: u64 = 0;

        loop {
            steps += 1;
            if steps > self.budget {
                return Err(ResourceExceeded {
                    steps: self.budget,
                    position: start,
                });
            }

            let matched = match &insts[pc] {
                Inst::Match => return Ok(Some(pos)),
                Inst::Char(expected) => {
                    let ok = chars.get(pos) == Some(expected);
                    if ok {
                        pos += 1;
                        pc += 1;
                    }
                    ok
                }
                Inst::AnyChar => {
                    let ok = chars.get(pos).is_some_and(|&ch| ch != '\n');
                    if ok {
                        pos += 1;
                        pc += 1;
                    }
                    ok
                }
                Inst::Class { set, negated } => {
                    let ok = chars.get(pos).is_some_and(|&ch| set.contains(ch) != *negated);
                    if ok {
                        pos += 1;
                        pc += 1;
                    }
                    ok
                }
                Inst::AssertLineStart => {
                    pc += 1;
                    pos == 0
                }
                Inst::AssertLineEnd => {
                    pc += 1;
                    pos == chars.len()
                }
                Inst::Jump(target) => {
                    pc = *target;
                    true
                }
                Inst::Split(first, second) => {
                    self.stack.push(Frame::Resume { pc: *second, pos });
                    pc = *first;
                    true
                }
                Inst::GroupStart { reg } => {
                    self.set_register(*reg, pos);
                    pc += 1;
                    true
                }
                Inst::GroupEnd { group, reg } => {
                    let span = Some((self.regs[*reg], pos));
                    self.set_capture(*group, span);
                    pc += 1;
                    true
                }
                Inst::Backref(group) => match self.captures[*group] {
                    Some((gs, ge)) => {
                        let len = ge - gs;
                        let ok = pos + len <= chars.len() && chars[gs..ge] == chars[pos..pos + len];
                        if ok {
                            pos += len;
                            pc += 1;
                        }
                        ok
                    }
                    // An unset group never matches.
                    None => false,
                },
                Inst::RepeatInit { counter } => {
                    self.set_register(*counter, 0);
                    pc += 1;
                    true
                }
                Inst::RepeatHead {
                    counter,
                    mark,
                    min,
                    max,
                    exit,
                } => {
                    let count = self.regs[*counter];
                    if count >= *min && *max == Some(count) {
                        pc = *exit;
                    } else {
                        if count >= *min {
                            // Greedy: prefer another iteration, fall back to leaving.
                            self.stack.push(Frame::Resume { pc: *exit, pos });
                        }
                        self.set_register(*mark, pos);
                        pc += 1;
                    }
                    true
                }
                Inst::RepeatTail {
                    counter,
                    mark,
                    min,
                    head,
                } => {
                    let count = self.regs[*counter];
                    // An empty iteration past the minimum ends the loop; the
                    // instruction after the tail is the loop exit.
                    if pos == self.regs[*mark] && count >= *min {
                        pc += 1;
                    } else {
                        self.set_register(*counter, count + 1);
                        pc = *head;
                    }
                    true
                }
            };

            if !matched {
                match self.backtrack() {
                    Some((resume_pc, resume_pos)) => {
                        pc = resume_pc;
                        pos = resume_pos;
                    }
                    None => return Ok(None),
                }
            }
        }
    }

    /// Unwind to the most recent resume point, undoing writes made since.
    fn backtrack(&mut self) -> Option<(usize, usize)> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Resume { pc, pos } => return Some((pc, pos)),
                Frame::RestoreCapture { group, old } => self.captures[group] = old,
                Frame::RestoreRegister { reg, old } => self.regs[reg] = old,
            }
        }
        None
    }

    fn set_register(&mut self, reg: usize, value: usize) {
        let old = std::mem::replace(&mut self.regs[reg], value);
        self.stack.push(Frame::RestoreRegister { reg, old });
    }

    fn set_capture(&mut self, group: usize, span: Option<(usize, usize)>) {
        let old = std::mem::replace(&mut self.captures[group], span);
        self.stack.push(Frame::RestoreCapture { group, old });
    }
}

#[cfg(test)]
#[path = "vm_tests.rs"]
mod tests;
