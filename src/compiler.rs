//! Compiler: lowers an AST into an instruction arena for the VM.
//!
//! Instructions address each other by index, so the VM can drive the whole
//! program from a flat loop and an explicit backtrack stack.

use crate::ast::*;

/// VM instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst {
    /// Match a specific character.
    Char(char),
    /// Match any character except newline.
    AnyChar,
    /// Match a character class.
    Class { set: ClassSet, negated: bool },
    /// Assert the cursor is at the start of the line.
    AssertLineStart,
    /// Assert the cursor is at the end of the line.
    AssertLineEnd,
    /// Try `first`; on failure resume at `second` from the same position.
    Split(usize, usize),
    /// Jump to target instruction.
    Jump(usize),
    /// Record the cursor in `reg` on entry to a capturing group.
    GroupStart { reg: usize },
    /// Write `(regs[reg], cursor)` as the span of `group`.
    GroupEnd { group: usize, reg: usize },
    /// Match the same text as capture group N.
    Backref(usize),
    /// Reset a repetition counter to zero.
    RepeatInit { counter: usize },
    /// Loop head: decide whether to run another iteration of the body
    /// (which starts at the next instruction) or leave for `exit`.
    RepeatHead {
        counter: usize,
        mark: usize,
        min: usize,
        max: Option<usize>,
        exit: usize,
    },
    /// Loop tail: count the iteration and jump back to `head`. An iteration
    /// that consumed nothing once `min` is reached falls through to the exit.
    RepeatTail {
        counter: usize,
        mark: usize,
        min: usize,
        head: usize,
    },
    /// Successful match.
    Match,
}

/// Compiled program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub insts: Vec<Inst>,
    pub group_count: usize,
    /// Scratch registers used by groups and repetitions.
    pub registers: usize,
    /// If the pattern must start with a specific literal character, store it here.
    /// Used by the finder to skip starting positions that can't possibly match.
    pub first_char: Option<char>,
    /// Whether the pattern is anchored at the start of the line (`^`).
    pub anchored_start: bool,
}

/// Compile an AST into a program.
pub fn compile(ast: &Ast) -> Program {
    let mut compiler = Compiler {
        insts: Vec::new(),
        registers: 0,
    };
    compiler.emit(&ast.root);
    compiler.insts.push(Inst::Match);
    let first_char = extract_first_char(&compiler.insts);
    let anchored_start = matches!(compiler.insts.first(), Some(Inst::AssertLineStart));
    Program {
        insts: compiler.insts,
        group_count: ast.group_count,
        registers: compiler.registers,
        first_char,
        anchored_start,
    }
}

/// Extract the first required literal character from the instruction stream, if any.
fn extract_first_char(insts: &[Inst]) -> Option<char> {
    match insts.first()? {
        Inst::Char(ch) => Some(*ch),
        // If the first instruction is AssertLineStart, check the next one
        Inst::AssertLineStart => match insts.get(1)? {
            Inst::Char(ch) => Some(*ch),
            _ => None,
        },
        _ => None,
    }
}

struct Compiler {
    insts: Vec<Inst>,
    registers: usize,
}

impl Compiler {
    fn register(&mut self) -> usize {
        self.registers += 1;
        self.registers - 1
    }

    fn emit(&mut self, node: &AstNode) {
        match node {
            AstNode::Literal(ch) => self.insts.push(Inst::Char(*ch)),
            AstNode::AnyChar => self.insts.push(Inst::AnyChar),
            AstNode::CharClass { set, negated } => self.insts.push(Inst::Class {
                set: set.clone(),
                negated: *negated,
            }),
            AstNode::Anchor(AnchorKind::StartOfLine) => self.insts.push(Inst::AssertLineStart),
            AstNode::Anchor(AnchorKind::EndOfLine) => self.insts.push(Inst::AssertLineEnd),
            AstNode::Concat(nodes) => {
                for n in nodes {
                    self.emit(n);
                }
            }
            AstNode::Alternation(branches) => self.emit_alternation(branches),
            AstNode::Group { index: Some(group), node: sub } => {
                let reg = self.register();
                self.insts.push(Inst::GroupStart { reg });
                self.emit(sub);
                self.insts.push(Inst::GroupEnd { group: *group, reg });
            }
            AstNode::Group { index: None, node: sub } => self.emit(sub),
            AstNode::Backreference(idx) => self.insts.push(Inst::Backref(*idx)),
            AstNode::Quantifier {
                node: sub,
                min,
                max,
                ..
            } => self.emit_quantifier(sub, *min, *max),
        }
    }

    fn emit_alternation(&mut self, branches: &[AstNode]) {
        // a|b|c compiles to:
        //   split L1, L2
        //   L1: <a> jump END
        //   L2: split L3, L4
        //   L3: <b> jump END
        //   L4: <c>
        //   END:
        let Some((last, init)) = branches.split_last() else {
            return;
        };
        let mut fixup_jumps = Vec::new();
        for branch in init {
            let split_pc = self.insts.len();
            self.insts.push(Inst::Split(0, 0)); // placeholder
            let branch_start = self.insts.len();
            self.emit(branch);
            fixup_jumps.push(self.insts.len());
            self.insts.push(Inst::Jump(0)); // placeholder for jump to end
            let next_branch = self.insts.len();
            self.insts[split_pc] = Inst::Split(branch_start, next_branch);
        }
        self.emit(last);
        let end = self.insts.len();
        for jpc in fixup_jumps {
            self.insts[jpc] = Inst::Jump(end);
        }
    }

    fn emit_quantifier(&mut self, sub: &AstNode, min: usize, max: Option<usize>) {
        match (min, max) {
            (0, Some(0)) => {}
            (1, Some(1)) => self.emit(sub),
            (0, Some(1)) => {
                //     split L1, L2
                // L1: <sub>
                // L2:
                let split_pc = self.insts.len();
                self.insts.push(Inst::Split(0, 0));
                let l1 = self.insts.len();
                self.emit(sub);
                let l2 = self.insts.len();
                self.insts[split_pc] = Inst::Split(l1, l2);
            }
            _ => {
                //       repeat_init c
                // HEAD: repeat_head c, m, min, max, EXIT
                //       <sub>
                //       repeat_tail c, m, min, HEAD
                // EXIT:
                let counter = self.register();
                let mark = self.register();
                self.insts.push(Inst::RepeatInit { counter });
                let head = self.insts.len();
                self.insts.push(Inst::RepeatHead {
                    counter,
                    mark,
                    min,
                    max,
                    exit: 0,
                });
                self.emit(sub);
                self.insts.push(Inst::RepeatTail {
                    counter,
                    mark,
                    min,
                    head,
                });
                let exit = self.insts.len();
                if let Inst::RepeatHead { exit: target, .. } = &mut self.insts[head] {
                    *target = exit;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "compiler_tests.rs"]
mod tests;
