//! Plugin error types.

use lintloom_engine::EngineError;
use thiserror::Error;

/// Errors surfaced by the orchestration layer.
///
/// Configuration errors are fatal before any build activity. Engine
/// construction errors skip linting for the affected compilation. Lint
/// execution errors are recovered per dispatch. Report errors fail the
/// cycle they occur in.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Engine error.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Lint execution error.
    #[error("Lint error: {0}")]
    Lint(String),

    /// Report generation error.
    #[error("Report error: {0}")]
    Report(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PluginError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a lint execution error.
    pub fn lint(message: impl Into<String>) -> Self {
        Self::Lint(message.into())
    }

    /// Creates a report error.
    pub fn report(message: impl Into<String>) -> Self {
        Self::Report(message.into())
    }
}
