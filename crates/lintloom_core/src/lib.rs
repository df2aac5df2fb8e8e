//! # lintloom_core
//!
//! Incremental lint orchestration for build pipelines.
//!
//! This crate provides:
//! - The `LintPlugin` compiler attachment and its lifecycle arming
//! - Scope resolution for settled modules
//! - Engine provisioning with memoized handles and worker pools
//! - Cross-run result storage and report rendering
//!
//! ## Example
//!
//! ```rust,ignore
//! use lintloom_core::{LintOptions, LintPlugin};
//!
//! let plugin = LintPlugin::new(LintOptions::default(), engine_factory)?;
//! plugin.apply(&mut compiler)?;
//!
//! compiler.run();
//! let compilation = compiler.new_compilation();
//! // ... modules settle as the build progresses ...
//! compilation.finish_modules();
//! compilation.finalize_assets()?;
//! ```

mod error;
mod options;
pub mod pipeline;
mod plugin;
mod provider;
mod reporter;
mod resolver;
mod session;
mod store;

pub use error::PluginError;
pub use options::{FormatterChoice, FormatterFn, LintOptions, ReportTarget, Threads};
pub use pipeline::{
    BuildDiagnostic, Compilation, CompilationTap, Compiler, CompilerPlugin, ModuleRecord,
};
pub use plugin::LintPlugin;
pub use provider::{EngineHandle, EngineRegistry, PendingLint, WorkerPool};
pub use resolver::ResolvedConfig;
pub use session::LintSession;
pub use store::ResultStore;

#[cfg(test)]
pub mod test_utils;

pub use lintloom_engine::{
    EngineError, EngineFactory, EngineOptions, FileLintResult, Formatter, LintEngine, LintFinding,
    Severity,
};
