//! # lintloom_engine
//!
//! The lint-engine contract for lintloom.
//!
//! This crate defines the narrow surface the orchestration layer in
//! `lintloom_core` drives:
//!
//! - Finding and per-file result types
//! - The `LintEngine` / `EngineFactory` traits implemented by engine
//!   adapters
//! - The `Formatter` trait plus two stock formatters
//!
//! An engine adapter wraps a real linter (rule loading, parsing, rule
//! execution, its own ignore files and result cache). The orchestrator
//! never looks inside: it decides *which* files to lint and *when*, hands
//! them over in batches, and consumes the results.

mod engine;
mod error;
mod findings;
mod format;

pub use engine::{EngineFactory, EngineOptions, LintEngine};
pub use error::EngineError;
pub use findings::{FileLintResult, LintFinding, Severity};
pub use format::{CompactFormatter, Formatter, JsonFormatter};
