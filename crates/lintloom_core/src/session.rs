//! Per-compilation lint session.
//!
//! One session exists per armed compilation. It collects settled module
//! resources into the lint scope, dispatches them through the engine
//! handle and renders the report during the asset stage. With workers
//! configured every file is dispatched as it settles; otherwise the
//! collected set goes out as one batch when module processing finishes.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::PluginError;
use crate::pipeline::{BuildDiagnostic, Compilation, CompilationTap, ModuleRecord};
use crate::provider::{EngineHandle, PendingLint};
use crate::reporter::{LINT_PREFIX, Reporter};
use crate::resolver::ResolvedConfig;
use crate::store::ResultStore;

#[derive(Default)]
struct SessionInner {
    /// Files accepted into the scope, in settlement order.
    files: Vec<PathBuf>,
    /// Dispatches awaiting resolution.
    batch: Vec<PendingLint>,
}

/// Lint tap for one compilation.
pub struct LintSession {
    key: String,
    config: Arc<ResolvedConfig>,
    handle: Arc<EngineHandle>,
    store: Arc<ResultStore>,
    /// Whether files stream out one dispatch per module. Sampled at
    /// construction so the mode never flips mid-cycle.
    streamed: bool,
    inner: Mutex<SessionInner>,
}

impl LintSession {
    pub(crate) fn new(
        key: impl Into<String>,
        config: Arc<ResolvedConfig>,
        handle: Arc<EngineHandle>,
        store: Arc<ResultStore>,
    ) -> Self {
        let streamed = handle.threads() > 1;
        Self {
            key: key.into(),
            config,
            handle,
            store,
            streamed,
            inner: Mutex::new(SessionInner::default()),
        }
    }

    /// Routes a settled resource into the scope: splits off the query,
    /// applies the path and query filters and deduplicates.
    fn consider(&self, resource: &str) {
        let (path, query) = match resource.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (resource, None),
        };
        if path.is_empty() {
            return;
        }
        if !self.config.is_wanted(path) {
            return;
        }
        if query.is_some_and(|q| self.config.is_query_excluded(q)) {
            debug!(key = %self.key, resource, "skipped by resource query");
            return;
        }

        let path = PathBuf::from(path);
        {
            let mut inner = self.inner.lock();
            if inner.files.contains(&path) {
                return;
            }
            inner.files.push(path.clone());
        }
        if self.streamed {
            self.dispatch(vec![path]);
        }
    }

    /// Deletes the stale stored results for `paths` and queues a lint.
    ///
    /// The deletion happens before dispatch so a failed lint leaves no
    /// stale result behind for the merge.
    fn dispatch(&self, paths: Vec<PathBuf>) {
        for path in &paths {
            self.store.remove(path);
        }
        debug!(key = %self.key, count = paths.len(), "dispatching lint batch");
        let pending = self.handle.lint_files(paths);
        self.inner.lock().batch.push(pending);
    }

    /// Resolves the cycle's dispatches, merges into the cross-run store
    /// and routes the rendered report onto the compilation channels.
    fn report(&self, compilation: &Compilation) -> Result<(), PluginError> {
        let pending = std::mem::take(&mut self.inner.lock().batch);

        let mut fresh = Vec::new();
        for lint in pending {
            match lint.resolve() {
                Ok(results) => fresh.extend(results),
                Err(e) => {
                    // A failed dispatch becomes a build error; the other
                    // dispatches still report.
                    warn!(key = %self.key, error = %e, "lint dispatch failed");
                    compilation.push_error(BuildDiagnostic::new(format!("{LINT_PREFIX}{e}")));
                }
            }
        }

        let reporter = Reporter::new(&self.config, &self.handle);
        let fresh = reporter.drop_ignored(fresh)?;
        self.handle.cleanup();
        self.store.merge(fresh);

        let results = self.store.snapshot();
        if results.is_empty() {
            return Ok(());
        }

        let outcome = reporter.render(&results)?;
        let options = &self.config.options;
        if let Some(warnings) = outcome.warnings {
            if options.fail_on_warning {
                compilation.push_error(BuildDiagnostic::new(warnings));
            } else {
                compilation.push_warning(BuildDiagnostic::new(warnings));
            }
        }
        if let Some(errors) = outcome.errors {
            if options.fail_on_error {
                compilation.push_error(BuildDiagnostic::new(errors));
            } else {
                compilation.push_warning(BuildDiagnostic::new(errors));
            }
        }
        reporter.write_report_asset(&compilation.output_path, &results)
    }
}

impl CompilationTap for LintSession {
    fn module_settled(&self, _compilation: &Compilation, module: &ModuleRecord) {
        if let Some(resource) = &module.resource {
            self.consider(resource);
        }
    }

    fn finish_modules(&self, _compilation: &Compilation) {
        if self.streamed {
            return;
        }
        let files = self.inner.lock().files.clone();
        if files.is_empty() {
            return;
        }
        self.dispatch(files);
    }

    fn finalize_assets(&self, compilation: &Compilation) -> Result<(), PluginError> {
        self.report(compilation)
    }
}
