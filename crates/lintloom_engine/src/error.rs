//! Engine error types.

use thiserror::Error;

/// Errors reported by a lint engine implementation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Engine construction error.
    #[error("Construction error: {0}")]
    Construction(String),

    /// Lint execution error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Formatter loading or rendering error.
    #[error("Formatter error: {0}")]
    Formatter(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Creates a construction error.
    pub fn construction(message: impl Into<String>) -> Self {
        Self::Construction(message.into())
    }

    /// Creates an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Creates a formatter error.
    pub fn formatter(message: impl Into<String>) -> Self {
        Self::Formatter(message.into())
    }
}
