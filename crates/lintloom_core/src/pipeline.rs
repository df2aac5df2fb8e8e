//! Minimal build-pipeline contract.
//!
//! This module is the orchestrator's view of the host build tool: a
//! compiler that announces run/watch cycles and hands out compilations,
//! and a compilation that reports module settlement, carries error and
//! warning channels and finishes with an asset stage. A real bundler
//! embeds these types; the integration tests script them directly.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::PluginError;

/// A module settling inside a compilation.
#[derive(Debug, Clone)]
pub struct ModuleRecord {
    /// The module's resource, possibly carrying a `?query` suffix.
    pub resource: Option<String>,
}

impl ModuleRecord {
    /// Creates a record for a module backed by a resource.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: Some(resource.into()),
        }
    }

    /// Creates a record for a module without a resource.
    pub fn without_resource() -> Self {
        Self { resource: None }
    }
}

/// A diagnostic pushed onto a compilation channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDiagnostic {
    /// Human-readable message.
    pub message: String,
}

impl BuildDiagnostic {
    /// Creates a diagnostic.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for BuildDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Per-cycle hooks registered by plugins.
pub trait CompilationTap: Send + Sync {
    /// A module finished building, or an unchanged module was reused.
    fn module_settled(&self, compilation: &Compilation, module: &ModuleRecord);

    /// Module processing for the cycle is complete.
    fn finish_modules(&self, compilation: &Compilation);

    /// The asset stage. A failure fails the cycle.
    fn finalize_assets(&self, compilation: &Compilation) -> Result<(), PluginError>;
}

/// One build cycle.
pub struct Compilation {
    /// Directory assets are written to.
    pub output_path: PathBuf,
    errors: Mutex<Vec<BuildDiagnostic>>,
    warnings: Mutex<Vec<BuildDiagnostic>>,
    taps: Mutex<Vec<(String, Arc<dyn CompilationTap>)>>,
}

impl Compilation {
    /// Creates a compilation writing assets under `output_path`.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            errors: Mutex::new(Vec::new()),
            warnings: Mutex::new(Vec::new()),
            taps: Mutex::new(Vec::new()),
        }
    }

    /// Registers a tap under `key`.
    pub fn tap(&self, key: impl Into<String>, tap: Arc<dyn CompilationTap>) {
        self.taps.lock().push((key.into(), tap));
    }

    /// Whether a tap is registered under `key`.
    pub fn has_tap(&self, key: &str) -> bool {
        self.taps.lock().iter().any(|(k, _)| k == key)
    }

    /// Pushes onto the failure channel.
    pub fn push_error(&self, diagnostic: BuildDiagnostic) {
        self.errors.lock().push(diagnostic);
    }

    /// Pushes onto the non-failing channel.
    pub fn push_warning(&self, diagnostic: BuildDiagnostic) {
        self.warnings.lock().push(diagnostic);
    }

    /// The collected failure diagnostics.
    pub fn errors(&self) -> Vec<BuildDiagnostic> {
        self.errors.lock().clone()
    }

    /// The collected non-failing diagnostics.
    pub fn warnings(&self) -> Vec<BuildDiagnostic> {
        self.warnings.lock().clone()
    }

    /// Notifies taps that a module finished building.
    pub fn succeed_module(&self, module: &ModuleRecord) {
        for tap in self.current_taps() {
            tap.module_settled(self, module);
        }
    }

    /// Notifies taps that an unchanged module was reused.
    pub fn still_valid_module(&self, module: &ModuleRecord) {
        for tap in self.current_taps() {
            tap.module_settled(self, module);
        }
    }

    /// Runs the finish-modules stage.
    pub fn finish_modules(&self) {
        for tap in self.current_taps() {
            tap.finish_modules(self);
        }
    }

    /// Runs the asset stage. The first tap failure aborts and propagates.
    pub fn finalize_assets(&self) -> Result<(), PluginError> {
        for tap in self.current_taps() {
            tap.finalize_assets(self)?;
        }
        Ok(())
    }

    // Taps are cloned out so callbacks never run under the registry lock.
    fn current_taps(&self) -> Vec<Arc<dyn CompilationTap>> {
        self.taps.lock().iter().map(|(_, tap)| tap.clone()).collect()
    }
}

/// Lifecycle notifications delivered to attached plugins.
pub trait CompilerPlugin: Send + Sync {
    /// A one-shot build is starting.
    fn run_start(&self);

    /// A watch cycle is starting.
    fn watch_run_start(&self);

    /// A compilation was created for the coming cycle.
    fn compilation_created(&self, compilation: &Compilation);
}

/// Plugin-facing compiler surface.
pub struct Compiler {
    /// Compiler name, used to derive attachment keys.
    pub name: Option<String>,
    /// Base directory of the build.
    pub context: PathBuf,
    /// Directory assets are written to.
    pub output_path: PathBuf,
    attachments: Vec<Arc<dyn CompilerPlugin>>,
}

impl Compiler {
    /// Creates a compiler rooted at `context`.
    pub fn new(context: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            name: None,
            context: context.into(),
            output_path: output_path.into(),
            attachments: Vec::new(),
        }
    }

    /// Names the compiler.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Registers a plugin attachment.
    pub fn attach(&mut self, attachment: Arc<dyn CompilerPlugin>) {
        self.attachments.push(attachment);
    }

    /// Signals the start of a one-shot build.
    pub fn run(&self) {
        for attachment in &self.attachments {
            attachment.run_start();
        }
    }

    /// Signals the start of a watch cycle.
    pub fn watch_run(&self) {
        for attachment in &self.attachments {
            attachment.watch_run_start();
        }
    }

    /// Creates a compilation for the coming cycle and notifies
    /// attachments.
    pub fn new_compilation(&self) -> Compilation {
        let compilation = Compilation::new(self.output_path.clone());
        for attachment in &self.attachments {
            attachment.compilation_created(&compilation);
        }
        compilation
    }
}
