//! Error types for pattern compilation, matching and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// What went wrong while parsing a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("unmatched '('")]
    UnmatchedOpenParen,

    #[error("unmatched ')'")]
    UnmatchedCloseParen,

    #[error("dangling '\\' at end of pattern")]
    DanglingEscape,

    #[error("unsupported escape '\\{0}'")]
    UnsupportedEscape(char),

    #[error("nothing to repeat")]
    NothingToRepeat,

    #[error("repeated quantifier")]
    RepeatedQuantifier,

    #[error("invalid repetition bounds {{{min},{max}}}: min exceeds max")]
    InvalidBounds { min: usize, max: usize },

    #[error("repetition bound exceeds {limit}")]
    BoundTooLarge { limit: usize },

    #[error("unterminated character class")]
    UnterminatedClass,

    #[error("empty character class")]
    EmptyClass,

    #[error("invalid class range '{start}-{end}'")]
    InvalidClassRange { start: char, end: char },

    #[error("shorthand class '\\{0}' cannot bound a range")]
    ShorthandInRange(char),

    #[error("backreference to undefined group {0}")]
    UndefinedGroup(usize),

    #[error("unsupported group syntax")]
    UnsupportedGroup,

    #[error("invalid group name")]
    InvalidGroupName,

    #[error("duplicate group name '{0}'")]
    DuplicateGroupName(String),
}

/// A malformed pattern, reported at compile time.
///
/// `position` is the index (in characters) of the offending character in
/// the pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at position {position}")]
pub struct PatternSyntaxError {
    pub position: usize,
    pub kind: SyntaxErrorKind,
}

impl PatternSyntaxError {
    pub fn new(position: usize, kind: SyntaxErrorKind) -> Self {
        Self { position, kind }
    }

    /// Human-readable description without the position suffix.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

/// A match attempt ran out of its step budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("step budget of {steps} exhausted for match attempt at offset {position}")]
pub struct ResourceExceeded {
    /// The budget that was exhausted.
    pub steps: u64,
    /// Offset of the abandoned attempt, in the same coordinates as match offsets.
    pub position: usize,
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Umbrella error for the engine facade.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] PatternSyntaxError),

    #[error(transparent)]
    ResourceExceeded(#[from] ResourceExceeded),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
