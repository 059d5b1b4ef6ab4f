//! Error types for the theme pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while extracting a theme.
///
/// Inside [`ThemeGenerator::generate`](crate::ThemeGenerator::generate) every
/// one of these is caught at the boundary, logged, and turned into an empty
/// artifact. The lower-level functions return them directly.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// A stylesheet or variable file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The generated artifact could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An import chain or variable chain refers back to itself.
    #[error("cycle detected: {}", path.join(" -> "))]
    CycleDetected { path: Vec<String> },

    /// A caller-supplied color pattern is not a valid regular expression.
    #[error("invalid color pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An import directive could not be understood.
    #[error("malformed import in {}: `{line}`", path.display())]
    MalformedImport { path: PathBuf, line: String },

    /// The compiler failed on a source that the pipeline cannot do without.
    #[error("{stage} compilation failed: {source}")]
    Compile {
        stage: &'static str,
        #[source]
        source: swatch_compile::CompileError,
    },

    /// Compiled CSS could not be reduced.
    #[error("reduction failed: {0}")]
    Reduce(#[from] swatch_reduce::ReduceError),

    /// A configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ThemeError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ThemeError::Read {
            path: path.into(),
            source,
        }
    }
}

/// Result type for theme operations.
pub type Result<T> = std::result::Result<T, ThemeError>;
