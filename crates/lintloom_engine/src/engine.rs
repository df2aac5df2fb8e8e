//! The engine contract consumed by the orchestrator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::findings::FileLintResult;
use crate::format::Formatter;

/// Options forwarded to engine construction.
///
/// This is the engine-level subset of the orchestrator options. Everything
/// the orchestrator consumes itself (file patterns, routing toggles, thread
/// counts) is stripped before construction; `fix` and `extensions` are
/// intentionally forwarded because engines consume them too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Whether the engine should use its own result cache.
    pub cache: bool,

    /// Location of the engine-owned cache. Opaque to the orchestrator.
    pub cache_location: PathBuf,

    /// Whether the engine should compute fixes.
    pub fix: bool,

    /// File extensions in scope, without leading dots.
    pub extensions: Vec<String>,

    /// Engine configuration overriding whatever the engine resolves itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_config: Option<serde_json::Value>,
}

/// A configured lint engine instance.
///
/// Implementations wrap a real linter behind a narrow surface: batch file
/// linting, ignore-status queries, formatter lookup and fix persistence.
/// One instance is constructed per handle plus one per worker thread;
/// instances are never re-configured.
pub trait LintEngine: Send + Sync {
    /// Lints the given files and returns one result per file.
    fn lint_files(&self, paths: &[PathBuf]) -> Result<Vec<FileLintResult>, EngineError>;

    /// Whether the engine's own ignore configuration excludes `path`.
    fn is_path_ignored(&self, path: &Path) -> Result<bool, EngineError>;

    /// Loads a formatter by name, or the engine's default when `name` is
    /// `None`.
    fn load_formatter(&self, name: Option<&str>) -> Result<Arc<dyn Formatter>, EngineError>;

    /// Persists fixed output back to disk.
    ///
    /// The default implementation writes each result's `output` to its path
    /// and skips results without one.
    fn output_fixes(&self, results: &[FileLintResult]) -> Result<(), EngineError> {
        for result in results {
            if let Some(output) = &result.output {
                std::fs::write(&result.path, output)?;
            }
        }
        Ok(())
    }
}

/// Builds engine instances from engine-level options.
pub trait EngineFactory: Send + Sync {
    /// Constructs a new engine configured with `options`.
    fn build(&self, options: &EngineOptions) -> Result<Arc<dyn LintEngine>, EngineError>;
}
