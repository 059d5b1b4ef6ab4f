//! Error types for the reduce crate.

use thiserror::Error;

/// Errors that can occur while reducing a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReduceError {
    /// The input contained a top-level item that is neither a rule nor an at-rule.
    #[error("invalid CSS at line {line}, column {column}: `{snippet}`")]
    Parse {
        line: u32,
        column: u32,
        snippet: String,
    },
}

/// Result type for reduce operations.
pub type Result<T> = std::result::Result<T, ReduceError>;
