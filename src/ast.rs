//! AST types for the regex engine.

use std::collections::BTreeMap;

/// A parsed pattern: the root node plus group metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast {
    pub root: AstNode,
    /// Number of capturing groups; indices run `1..=group_count`.
    pub group_count: usize,
    /// Named groups and the index each name refers to.
    pub group_names: BTreeMap<String, usize>,
}

/// A single node in the regex AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNode {
    /// Matches a single literal character.
    Literal(char),
    /// Character class like `[abc]`, `[a-z]`, `[^abc]`, `\d`.
    CharClass { set: ClassSet, negated: bool },
    /// Matches any character except newline.
    AnyChar,
    /// Anchor: `^`, `$`.
    Anchor(AnchorKind),
    /// Group `(...)`. `index` is `None` for `(?:...)`.
    Group {
        index: Option<usize>,
        node: Box<AstNode>,
    },
    /// Backreference `\1`, `\2`, etc.
    Backreference(usize),
    /// Concatenation of nodes (implicit in `ab`). May be empty.
    Concat(Vec<AstNode>),
    /// Alternation (`a|b`), tried left to right.
    Alternation(Vec<AstNode>),
    /// Repetition of a sub-expression. `max` of `None` is unbounded.
    Quantifier {
        node: Box<AstNode>,
        min: usize,
        max: Option<usize>,
        greedy: bool,
    },
}

/// Anchor kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    /// `^`: start of the current line.
    StartOfLine,
    /// `$`: end of the current line.
    EndOfLine,
}

/// A set of characters stored as sorted, non-overlapping, non-adjacent
/// inclusive ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSet {
    ranges: Vec<(char, char)>,
}

impl ClassSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ranges(ranges: impl IntoIterator<Item = (char, char)>) -> Self {
        let mut set = Self::new();
        for (lo, hi) in ranges {
            set.push(lo, hi);
        }
        set
    }

    pub fn ranges(&self) -> &[(char, char)] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Add the inclusive range `lo..=hi`; callers guarantee `lo <= hi`.
    pub fn push(&mut self, lo: char, hi: char) {
        self.ranges.push((lo, hi));
        self.canonicalize();
    }

    pub fn union(&mut self, other: &ClassSet) {
        self.ranges.extend_from_slice(&other.ranges);
        self.canonicalize();
    }

    /// Every scalar value not in `self`.
    pub fn complement(&self) -> ClassSet {
        let mut out = Vec::new();
        let mut next = 0u32;
        for &(lo, hi) in &self.ranges {
            if (lo as u32) > next {
                push_scalar_range(&mut out, next, lo as u32 - 1);
            }
            next = hi as u32 + 1;
        }
        if next <= char::MAX as u32 {
            push_scalar_range(&mut out, next, char::MAX as u32);
        }
        let mut set = ClassSet { ranges: out };
        set.canonicalize();
        set
    }

    pub fn contains(&self, ch: char) -> bool {
        self.ranges
            .binary_search_by(|&(lo, hi)| {
                if hi < ch {
                    std::cmp::Ordering::Less
                } else if lo > ch {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    fn canonicalize(&mut self) {
        self.ranges.sort_unstable();
        let mut merged: Vec<(char, char)> = Vec::with_capacity(self.ranges.len());
        for &(lo, hi) in &self.ranges {
            if let Some(last) = merged.last_mut() {
                if (lo as u32) <= (last.1 as u32).saturating_add(1) || adjacent_across_gap(last.1, lo) {
                    if hi > last.1 {
                        last.1 = hi;
                    }
                    continue;
                }
            }
            merged.push((lo, hi));
        }
        self.ranges = merged;
    }
}

/// Surrogate code points are not chars, so '\u{D7FF}' and '\u{E000}' touch.
fn adjacent_across_gap(a: char, b: char) -> bool {
    a == '\u{D7FF}' && b == '\u{E000}'
}

/// Push the scalar values in `lo..=hi`, skipping the surrogate block.
fn push_scalar_range(out: &mut Vec<(char, char)>, lo: u32, hi: u32) {
    const SURROGATE_LO: u32 = 0xD800;
    const SURROGATE_HI: u32 = 0xDFFF;
    let pieces = [
        (lo, hi.min(SURROGATE_LO - 1)),
        (lo.max(SURROGATE_HI + 1), hi),
    ];
    for (a, b) in pieces {
        if a > b {
            continue;
        }
        if let (Some(a), Some(b)) = (char::from_u32(a), char::from_u32(b)) {
            out.push((a, b));
        }
    }
}

/// Shorthand character class kind, expanded to ranges by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShorthandKind {
    /// `\d`: ASCII digits.
    Digit,
    /// `\w`: ASCII letters, digits and underscore.
    Word,
    /// `\s`: ASCII whitespace.
    Space,
}

impl ShorthandKind {
    pub fn set(self) -> ClassSet {
        match self {
            ShorthandKind::Digit => ClassSet::from_ranges([('0', '9')]),
            ShorthandKind::Word => {
                ClassSet::from_ranges([('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')])
            }
            ShorthandKind::Space => ClassSet::from_ranges([
                ('\t', '\r'), // \t \n \v \f \r
                (' ', ' '),
            ]),
        }
    }
}

impl AstNode {
    /// Whether this node can be the operand of a quantifier.
    pub fn is_repeatable(&self) -> bool {
        !matches!(self, AstNode::Anchor(_))
    }
}

#[cfg(test)]
#[path = "ast_tests.rs"]
mod tests;
