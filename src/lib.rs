//! Backtracking regular-expression engine for line-oriented search.
//!
//! A pattern is parsed into an [`ast::Ast`], lowered to an instruction
//! [`compiler::Program`] and run by the backtracking [`vm`]. Compiled
//! patterns are kept in a bounded LRU [`PatternCache`], and the
//! [`finder`] walks multi-line text producing non-overlapping [`Match`]es.
//!
//! ```
//! use deepgrep_core::Engine;
//!
//! let engine = Engine::default();
//! let found = engine.find_matches(r"(\w+)\s+\1", "hello hello").unwrap();
//! assert_eq!(found, vec!["hello hello"]);
//! ```
//!
//! Every match attempt runs under a step budget, so a pattern that
//! backtracks catastrophically fails with [`ResourceExceeded`] instead of
//! hanging.

pub mod ast;
pub mod cache;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod finder;
pub mod parser;
pub mod pattern;
pub mod vm;

pub use cache::{CacheStats, PatternCache};
pub use config::{BudgetPolicy, EngineConfig, OffsetMode};
pub use engine::Engine;
pub use error::{ConfigError, Error, PatternSyntaxError, ResourceExceeded, Result, SyntaxErrorKind};
pub use finder::{Capture, FindOptions, Match, Matches};
pub use parser::parse;
pub use pattern::CompiledPattern;
