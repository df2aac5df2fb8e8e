//! Finding and per-file result types shared between engines and the
//! orchestrator.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Severity level for findings.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Warning - reported without failing the build by default.
    Warning,
    /// Error - fails the build unless configured otherwise.
    #[default]
    Error,
}

impl Severity {
    /// Converts from the classic numeric level (1 = warning, 2 = error).
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Warning),
            2 => Some(Self::Error),
            _ => None,
        }
    }

    /// The classic numeric level (1 = warning, 2 = error).
    pub fn level(self) -> u8 {
        match self {
            Self::Warning => 1,
            Self::Error => 2,
        }
    }

    /// Whether this is an error-level severity.
    pub fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }

    /// Whether this is a warning-level severity.
    pub fn is_warning(self) -> bool {
        matches!(self, Self::Warning)
    }
}

/// A single finding produced by a lint engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintFinding {
    /// The rule that produced this finding, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,

    /// The finding message.
    pub message: String,

    /// Severity level.
    #[serde(default)]
    pub severity: Severity,

    /// 1-based line, when the finding points at source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// 1-based column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,

    /// Whether this finding is fatal (for example a parse failure).
    #[serde(default)]
    pub fatal: bool,
}

impl LintFinding {
    /// Creates a new finding.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule_id: None,
            message: message.into(),
            severity,
            line: None,
            column: None,
            fatal: false,
        }
    }

    /// Creates an error-severity finding.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Creates a warning-severity finding.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Sets the rule id.
    pub fn with_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    /// Sets the source location.
    pub fn with_location(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Marks the finding as fatal.
    pub fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }
}

/// Lint results for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileLintResult {
    /// Path of the linted file.
    pub path: PathBuf,

    /// Findings for this file.
    pub findings: Vec<LintFinding>,

    /// Number of error-severity findings. Fatal findings count as errors.
    pub error_count: usize,

    /// Number of warning-severity findings.
    pub warning_count: usize,

    /// Fixed source text, present when the engine computed fixes in memory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl FileLintResult {
    /// Creates a result, deriving the severity counts from the findings.
    pub fn new(path: impl Into<PathBuf>, findings: Vec<LintFinding>) -> Self {
        let error_count = findings
            .iter()
            .filter(|f| f.fatal || f.severity.is_error())
            .count();
        let warning_count = findings
            .iter()
            .filter(|f| !f.fatal && f.severity.is_warning())
            .count();
        Self {
            path: path.into(),
            findings,
            error_count,
            warning_count,
            output: None,
        }
    }

    /// Attaches fixed source content.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Whether the file has at least one error-severity finding.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Whether the file has at least one warning-severity finding.
    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }
}
