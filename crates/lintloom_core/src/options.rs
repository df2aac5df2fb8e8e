//! Orchestrator options.
//!
//! Options arrive as one typed record and are validated once, at plugin
//! construction. Everything downstream consumes the validated value; no
//! re-validation happens per compilation.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use lintloom_engine::{EngineOptions, FileLintResult};
use regex::Regex;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::PluginError;

fn default_true() -> bool {
    true
}

fn default_cache_location() -> PathBuf {
    PathBuf::from(".cache/lintloom")
}

fn default_extensions() -> Vec<String> {
    vec!["js".to_string()]
}

/// Accepts a single string or a list of strings.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

/// Worker-thread request.
///
/// A number asks for that many workers. `true` asks for one less than the
/// available cores, `false` for in-process linting. Anything that resolves
/// to one or less stays in-process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threads {
    /// Exact worker count.
    Count(usize),
    /// Core-derived count (`true`) or in-process (`false`).
    Flag(bool),
}

impl Default for Threads {
    fn default() -> Self {
        Self::Flag(false)
    }
}

impl Threads {
    /// Resolves to a concrete worker count.
    pub fn resolve(self) -> usize {
        match self {
            Self::Count(n) => n,
            Self::Flag(true) => std::thread::available_parallelism()
                .map(|n| n.get().saturating_sub(1))
                .unwrap_or(1),
            Self::Flag(false) => 1,
        }
    }
}

/// Caller-supplied formatter signature.
pub type FormatterFn = dyn Fn(&[FileLintResult]) -> String + Send + Sync;

/// How report text is produced.
///
/// `Func` carries an opaque formatting function. Its identity (not its
/// structure) participates in provider fingerprints: two plugins sharing
/// one function share an engine handle, structurally identical but
/// distinct functions do not.
#[derive(Clone, Default)]
pub enum FormatterChoice {
    /// The engine's default formatter.
    #[default]
    Default,
    /// A named formatter resolved through the engine.
    Name(String),
    /// A caller-supplied formatting function.
    Func(Arc<FormatterFn>),
}

impl FormatterChoice {
    /// Wraps a formatting function.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&[FileLintResult]) -> String + Send + Sync + 'static,
    {
        Self::Func(Arc::new(f))
    }

    fn func_token(func: &Arc<FormatterFn>) -> String {
        format!("fn@{:p}", Arc::as_ptr(func))
    }
}

impl fmt::Debug for FormatterChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Func(func) => write!(f, "Func({})", Self::func_token(func)),
        }
    }
}

impl PartialEq for FormatterChoice {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Default, Self::Default) => true,
            (Self::Name(a), Self::Name(b)) => a == b,
            (Self::Func(a), Self::Func(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Serialize for FormatterChoice {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Default => serializer.serialize_none(),
            Self::Name(name) => serializer.serialize_str(name),
            Self::Func(func) => serializer.serialize_str(&Self::func_token(func)),
        }
    }
}

impl<'de> Deserialize<'de> for FormatterChoice {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name: Option<String> = Option::deserialize(deserializer)?;
        Ok(match name {
            Some(name) => Self::Name(name),
            None => Self::Default,
        })
    }
}

/// Where and how the report artifact is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportTarget {
    /// Target path. Relative paths land under the build output directory.
    pub file_path: PathBuf,

    /// Formatter for the artifact. Falls back to the report formatter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter: Option<FormatterChoice>,
}

/// Orchestrator options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LintOptions {
    /// Base directory for resolving files and excludes. Defaults to the
    /// compiler context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<PathBuf>,

    /// Files and directories in scope. Directories expand to globs using
    /// `extensions`. Defaults to the base directory.
    #[serde(default, deserialize_with = "string_or_list")]
    pub files: Vec<String>,

    /// Files and directories excluded from scope. Defaults to
    /// `**/node_modules/**`.
    #[serde(default, deserialize_with = "string_or_list")]
    pub exclude: Vec<String>,

    /// File extensions in scope.
    #[serde(default = "default_extensions", deserialize_with = "string_or_list")]
    pub extensions: Vec<String>,

    /// Regular expressions excluding modules by their resource query.
    #[serde(default)]
    pub resource_query_exclude: Vec<String>,

    /// Worker-thread request.
    #[serde(default)]
    pub threads: Threads,

    /// Report errors only. Forces warnings off during resolution.
    #[serde(default)]
    pub quiet: bool,

    /// Ask the engine to compute and persist fixes.
    #[serde(default)]
    pub fix: bool,

    /// Report error findings.
    #[serde(default = "default_true")]
    pub emit_error: bool,

    /// Report warning findings.
    #[serde(default = "default_true")]
    pub emit_warning: bool,

    /// Whether error findings fail the build.
    #[serde(default = "default_true")]
    pub fail_on_error: bool,

    /// Whether warning findings fail the build.
    #[serde(default)]
    pub fail_on_warning: bool,

    /// Lint only changed modules in watch mode, skipping the initial run.
    #[serde(default)]
    pub lint_dirty_modules_only: bool,

    /// Report formatter.
    #[serde(default)]
    pub formatter: FormatterChoice,

    /// Optional report artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_report: Option<ReportTarget>,

    /// Whether the engine should use its own result cache.
    #[serde(default = "default_true")]
    pub cache: bool,

    /// Location of the engine-owned cache. Opaque to the orchestrator.
    #[serde(default = "default_cache_location")]
    pub cache_location: PathBuf,

    /// Engine configuration override, forwarded untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_config: Option<serde_json::Value>,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            context: None,
            files: Vec::new(),
            exclude: Vec::new(),
            extensions: default_extensions(),
            resource_query_exclude: Vec::new(),
            threads: Threads::default(),
            quiet: false,
            fix: false,
            emit_error: true,
            emit_warning: true,
            fail_on_error: true,
            fail_on_warning: false,
            lint_dirty_modules_only: false,
            formatter: FormatterChoice::Default,
            output_report: None,
            cache: true,
            cache_location: default_cache_location(),
            override_config: None,
        }
    }
}

impl LintOptions {
    /// Validates the options.
    ///
    /// Runs once at plugin construction; a violation aborts attachment
    /// before any build activity.
    pub fn validate(&self) -> Result<(), PluginError> {
        for pattern in &self.resource_query_exclude {
            Regex::new(pattern).map_err(|e| {
                PluginError::config(format!("Invalid resource query pattern {pattern:?}: {e}"))
            })?;
        }
        if self.extensions.iter().any(|ext| ext.is_empty()) {
            return Err(PluginError::config("Extensions must be non-empty"));
        }
        if let Some(config) = &self.override_config
            && !config.is_object()
        {
            return Err(PluginError::config("override_config must be a JSON object"));
        }
        if let Some(report) = &self.output_report
            && report.file_path.as_os_str().is_empty()
        {
            return Err(PluginError::config(
                "output_report.file_path must not be empty",
            ));
        }
        Ok(())
    }

    /// Applies quiet mode: errors stay on, warnings are dropped.
    pub(crate) fn apply_quiet(&mut self) {
        if self.quiet {
            self.emit_error = true;
            self.emit_warning = false;
        }
    }

    /// Projects the engine-level subset forwarded to engine construction.
    ///
    /// `fix` and `extensions` are forwarded on purpose; everything the
    /// orchestrator consumes itself is stripped.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            cache: self.cache,
            cache_location: self.cache_location.clone(),
            fix: self.fix,
            extensions: self.extensions.clone(),
            override_config: self.override_config.clone(),
        }
    }
}
