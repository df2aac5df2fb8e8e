//! Scripted engine doubles shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lintloom_engine::{
    CompactFormatter, EngineError, EngineFactory, EngineOptions, FileLintResult, Formatter,
    JsonFormatter, LintEngine, LintFinding,
};
use parking_lot::Mutex;

/// Engine options used by tests that do not care about their content.
pub fn stub_engine_options() -> EngineOptions {
    EngineOptions {
        cache: false,
        cache_location: PathBuf::from(".cache/test"),
        fix: false,
        extensions: vec!["js".to_string()],
        override_config: None,
    }
}

type Script = HashMap<PathBuf, Vec<LintFinding>>;

/// A scripted engine: answers with the configured findings per path and
/// empty results for everything else.
pub struct StubEngine {
    script: Arc<Mutex<Script>>,
    ignored: Arc<Mutex<HashSet<PathBuf>>>,
    linted: Arc<Mutex<Vec<PathBuf>>>,
    lint_failure: Arc<Mutex<Option<String>>>,
    output_fixes_calls: Arc<AtomicUsize>,
}

impl LintEngine for StubEngine {
    fn lint_files(&self, paths: &[PathBuf]) -> Result<Vec<FileLintResult>, EngineError> {
        if let Some(message) = self.lint_failure.lock().clone() {
            return Err(EngineError::execution(message));
        }
        let script = self.script.lock();
        let mut linted = self.linted.lock();
        Ok(paths
            .iter()
            .map(|p| {
                linted.push(p.clone());
                FileLintResult::new(p.clone(), script.get(p).cloned().unwrap_or_default())
            })
            .collect())
    }

    fn is_path_ignored(&self, path: &Path) -> Result<bool, EngineError> {
        Ok(self.ignored.lock().contains(path))
    }

    fn load_formatter(&self, name: Option<&str>) -> Result<Arc<dyn Formatter>, EngineError> {
        match name {
            None | Some("compact") => Ok(Arc::new(CompactFormatter)),
            Some("json") => Ok(Arc::new(JsonFormatter)),
            Some(other) => Err(EngineError::formatter(format!(
                "unknown formatter {other:?}"
            ))),
        }
    }

    fn output_fixes(&self, _results: &[FileLintResult]) -> Result<(), EngineError> {
        self.output_fixes_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Factory handing out `StubEngine`s that share one script, or failing
/// every build.
pub struct StubEngineFactory {
    script: Arc<Mutex<Script>>,
    ignored: Arc<Mutex<HashSet<PathBuf>>>,
    linted: Arc<Mutex<Vec<PathBuf>>>,
    failure: Option<String>,
    lint_failure: Arc<Mutex<Option<String>>>,
    build_count: AtomicUsize,
    output_fixes_calls: Arc<AtomicUsize>,
}

impl StubEngineFactory {
    /// A factory whose engines report nothing.
    pub fn clean() -> Self {
        Self {
            script: Arc::new(Mutex::new(HashMap::new())),
            ignored: Arc::new(Mutex::new(HashSet::new())),
            linted: Arc::new(Mutex::new(Vec::new())),
            failure: None,
            lint_failure: Arc::new(Mutex::new(None)),
            build_count: AtomicUsize::new(0),
            output_fixes_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A factory whose every build fails with `message`.
    pub fn broken(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::clean()
        }
    }

    /// Scripts the findings returned for `path`.
    pub fn with_findings(self, path: &str, findings: Vec<LintFinding>) -> Self {
        self.script.lock().insert(PathBuf::from(path), findings);
        self
    }

    /// Marks `path` as ignored by the engine configuration.
    pub fn with_ignored_path(self, path: &str) -> Self {
        self.ignored.lock().insert(PathBuf::from(path));
        self
    }

    /// Makes every `lint_files` call fail with `message`. Construction
    /// still succeeds.
    pub fn with_lint_failure(self, message: impl Into<String>) -> Self {
        *self.lint_failure.lock() = Some(message.into());
        self
    }

    /// Re-scripts `path` mid-test, for watch-cycle scenarios.
    pub fn set_findings(&self, path: &str, findings: Vec<LintFinding>) {
        self.script.lock().insert(PathBuf::from(path), findings);
    }

    /// Number of successfully built engines.
    pub fn build_count(&self) -> usize {
        self.build_count.load(Ordering::SeqCst)
    }

    /// Paths linted so far, in dispatch order, across all engines.
    pub fn linted_paths(&self) -> Vec<PathBuf> {
        self.linted.lock().clone()
    }

    /// Number of `output_fixes` calls across all engines.
    pub fn output_fixes_count(&self) -> usize {
        self.output_fixes_calls.load(Ordering::SeqCst)
    }
}

impl EngineFactory for StubEngineFactory {
    fn build(&self, _options: &EngineOptions) -> Result<Arc<dyn LintEngine>, EngineError> {
        if let Some(message) = &self.failure {
            return Err(EngineError::construction(message.clone()));
        }
        self.build_count.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StubEngine {
            script: self.script.clone(),
            ignored: self.ignored.clone(),
            linted: self.linted.clone(),
            lint_failure: self.lint_failure.clone(),
            output_fixes_calls: self.output_fixes_calls.clone(),
        }))
    }
}
