//! Cross-run result storage.
//!
//! One store exists per compiler attachment and survives watch rebuilds.
//! Between runs it holds the last known result for every file the
//! attachment has ever linted; each run deletes the entries it is about to
//! re-lint before dispatch and merges fresh results back in afterwards.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lintloom_engine::FileLintResult;
use parking_lot::Mutex;
use tracing::debug;

/// Per-attachment map of the last known result per file.
#[derive(Debug, Default)]
pub struct ResultStore {
    results: Mutex<HashMap<PathBuf, FileLintResult>>,
}

impl ResultStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes the stored result for `path`, if any.
    ///
    /// Called before every dispatch so a failed lint leaves no stale
    /// result behind.
    pub fn remove(&self, path: &Path) {
        if self.results.lock().remove(path).is_some() {
            debug!(path = %path.display(), "dropped stale lint result");
        }
    }

    /// Merges fresh results in, overwriting per path.
    pub fn merge(&self, results: Vec<FileLintResult>) {
        let mut stored = self.results.lock();
        for result in results {
            stored.insert(result.path.clone(), result);
        }
    }

    /// The merged totality, sorted by path for deterministic reports.
    pub fn snapshot(&self) -> Vec<FileLintResult> {
        let mut results: Vec<FileLintResult> = self.results.lock().values().cloned().collect();
        results.sort_by(|a, b| a.path.cmp(&b.path));
        results
    }

    /// Number of stored results.
    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    /// Whether the store holds no results.
    pub fn is_empty(&self) -> bool {
        self.results.lock().is_empty()
    }
}
