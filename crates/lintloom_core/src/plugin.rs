//! The plugin root.
//!
//! `LintPlugin` validates options once and attaches to compilers. Each
//! attachment resolves the options against its compiler, owns that
//! compiler's cross-run result store and arms lint sessions according to
//! the run and watch lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use lintloom_engine::EngineFactory;
use tracing::{debug, info};

use crate::error::PluginError;
use crate::options::LintOptions;
use crate::pipeline::{BuildDiagnostic, Compilation, Compiler, CompilerPlugin};
use crate::provider::EngineRegistry;
use crate::reporter::LINT_PREFIX;
use crate::resolver::ResolvedConfig;
use crate::session::LintSession;
use crate::store::ResultStore;

/// Process-wide counter behind generated attachment keys.
static NEXT_COMPILER_ID: AtomicUsize = AtomicUsize::new(0);

/// Lint orchestration plugin.
///
/// One plugin can attach to any number of compilers. Attachments of one
/// plugin share an engine registry; a registry can also be passed in
/// explicitly to share engines across plugins.
pub struct LintPlugin {
    options: LintOptions,
    factory: Arc<dyn EngineFactory>,
    registry: Arc<EngineRegistry>,
}

impl LintPlugin {
    /// Creates a plugin, validating the options.
    pub fn new(options: LintOptions, factory: Arc<dyn EngineFactory>) -> Result<Self, PluginError> {
        Self::with_registry(options, factory, Arc::new(EngineRegistry::new()))
    }

    /// Creates a plugin whose attachments memoize engines in `registry`.
    pub fn with_registry(
        options: LintOptions,
        factory: Arc<dyn EngineFactory>,
        registry: Arc<EngineRegistry>,
    ) -> Result<Self, PluginError> {
        options.validate()?;
        Ok(Self {
            options,
            factory,
            registry,
        })
    }

    /// Attaches to a compiler.
    ///
    /// The attachment key is the compiler name; unnamed compilers draw a
    /// process-wide sequential key. Pattern resolution happens here, so
    /// an invalid glob aborts the attachment.
    pub fn apply(&self, compiler: &mut Compiler) -> Result<(), PluginError> {
        let key = match &compiler.name {
            Some(name) => name.clone(),
            None => format!(
                "lintloom_{}",
                NEXT_COMPILER_ID.fetch_add(1, Ordering::SeqCst) + 1
            ),
        };
        let config = Arc::new(ResolvedConfig::resolve(
            self.options.clone(),
            &compiler.context,
        )?);
        info!(key, "lint plugin attached");
        compiler.attach(Arc::new(Attachment {
            key,
            config,
            factory: self.factory.clone(),
            registry: self.registry.clone(),
            store: Arc::new(ResultStore::new()),
            armed: AtomicBool::new(false),
            skip_first_watch: AtomicBool::new(self.options.lint_dirty_modules_only),
        }));
        Ok(())
    }
}

/// Per-compiler state.
struct Attachment {
    key: String,
    config: Arc<ResolvedConfig>,
    factory: Arc<dyn EngineFactory>,
    registry: Arc<EngineRegistry>,
    store: Arc<ResultStore>,
    /// Once set, every new compilation gets a lint session.
    armed: AtomicBool,
    /// Consumed by the first watch cycle in dirty-modules-only mode.
    skip_first_watch: AtomicBool,
}

impl CompilerPlugin for Attachment {
    fn run_start(&self) {
        // Dirty-modules-only builds lint in watch mode exclusively.
        if !self.config.options.lint_dirty_modules_only {
            self.armed.store(true, Ordering::SeqCst);
        }
    }

    fn watch_run_start(&self) {
        if self.skip_first_watch.swap(false, Ordering::SeqCst) {
            debug!(key = %self.key, "skipping initial watch cycle");
            return;
        }
        self.armed.store(true, Ordering::SeqCst);
    }

    fn compilation_created(&self, compilation: &Compilation) {
        if !self.armed.load(Ordering::SeqCst) || compilation.has_tap(&self.key) {
            return;
        }
        let handle = match self
            .registry
            .acquire(&self.key, &self.config, self.factory.clone())
        {
            Ok(handle) => handle,
            Err(e) => {
                // The compilation proceeds without linting.
                compilation.push_error(BuildDiagnostic::new(format!("{LINT_PREFIX}{e}")));
                return;
            }
        };
        let session = LintSession::new(
            self.key.clone(),
            self.config.clone(),
            handle,
            self.store.clone(),
        );
        compilation.tap(self.key.clone(), Arc::new(session));
    }
}
