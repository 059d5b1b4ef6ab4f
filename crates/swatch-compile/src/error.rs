//! Error types for the compile crate.

use thiserror::Error;

use crate::process::ProcessError;

/// Errors returned by a [`StyleCompiler`](crate::StyleCompiler).
#[derive(Debug, Error)]
pub enum CompileError {
    /// The external compiler process could not run or exited unsuccessfully.
    #[error("compiler process error: {0}")]
    Process(#[from] ProcessError),

    /// The compiler ran but rejected the source.
    #[error("compiler rejected source: {message}")]
    Rejected { message: String },

    /// The blocking compile task was cancelled or panicked.
    #[error("compile task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl CompileError {
    pub fn rejected(message: impl Into<String>) -> Self {
        CompileError::Rejected {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display() {
        let err = CompileError::rejected("variable @foo is undefined");
        assert!(err.to_string().contains("@foo is undefined"));
    }
}
