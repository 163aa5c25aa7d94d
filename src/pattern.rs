//! A compiled pattern: source text, AST and the program lowered from it.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::ast::Ast;
use crate::compiler::{self, Program};
use crate::config::OffsetMode;
use crate::error::{PatternSyntaxError, ResourceExceeded};
use crate::finder::{self, FindOptions, Match, Matches};
use crate::parser;

/// Immutable once built; shared between threads behind an `Arc` by the cache.
#[derive(Debug)]
pub struct CompiledPattern {
    pattern: String,
    ast: Ast,
    program: Program,
    names: Arc<BTreeMap<String, usize>>,
}

impl CompiledPattern {
    /// Parse and compile `pattern`.
    pub fn new(pattern: &str) -> Result<Self, PatternSyntaxError> {
        let ast = parser::parse(pattern)?;
        let program = compiler::compile(&ast);
        tracing::debug!(
            "compiled {:?}: {} groups, {} instructions",
            pattern,
            ast.group_count,
            program.insts.len()
        );
        let names = Arc::new(ast.group_names.clone());
        Ok(CompiledPattern {
            pattern: pattern.to_string(),
            ast,
            program,
            names,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn group_count(&self) -> usize {
        self.ast.group_count
    }

    /// Index of the named group `name`.
    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    pub(crate) fn names(&self) -> &Arc<BTreeMap<String, usize>> {
        &self.names
    }

    /// Match beginning exactly at byte offset `start` of a single line.
    /// Offsets in the result are relative to `line`.
    pub fn match_at(
        &self,
        line: &str,
        start: usize,
        step_budget: u64,
    ) -> Result<Option<Match>, ResourceExceeded> {
        let options = FindOptions {
            step_budget,
            offsets: OffsetMode::Line,
            ..FindOptions::default()
        };
        finder::match_line_at(self, line, start, options)
    }

    /// Lazily find the matches in `text`.
    pub fn find_iter<'p, 't>(&'p self, text: &'t str, options: FindOptions) -> Matches<'p, 't> {
        finder::find_iter(self, text, options)
    }

    /// Collect the matches in `text`.
    pub fn find_all(
        &self,
        text: &str,
        options: FindOptions,
    ) -> Result<Vec<Match>, ResourceExceeded> {
        finder::find_all(self, text, options)
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
