//! Formatter contract and stock formatters.

use crate::error::EngineError;
use crate::findings::{FileLintResult, Severity};

/// Renders a set of file results into a report block.
pub trait Formatter: Send + Sync {
    /// Formats `results` into a single string.
    fn format(&self, results: &[FileLintResult]) -> Result<String, EngineError>;
}

/// Line-oriented formatter: one line per finding, grouped by file, plus a
/// problem summary. Produces an empty string when there is nothing to
/// report.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompactFormatter;

impl Formatter for CompactFormatter {
    fn format(&self, results: &[FileLintResult]) -> Result<String, EngineError> {
        let mut out = String::new();
        for result in results {
            if result.findings.is_empty() {
                continue;
            }

            out.push_str(&format!("{}\n", result.path.display()));
            for finding in &result.findings {
                let severity = match finding.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                };
                let line = finding.line.unwrap_or(0);
                let column = finding.column.unwrap_or(0);
                match &finding.rule_id {
                    Some(rule) => out.push_str(&format!(
                        "  {line}:{column}  {severity}  {}  {rule}\n",
                        finding.message
                    )),
                    None => out.push_str(&format!(
                        "  {line}:{column}  {severity}  {}\n",
                        finding.message
                    )),
                }
            }
        }

        let errors: usize = results.iter().map(|r| r.error_count).sum();
        let warnings: usize = results.iter().map(|r| r.warning_count).sum();
        if errors + warnings > 0 {
            out.push_str(&format!(
                "\n{} problems ({} errors, {} warnings)\n",
                errors + warnings,
                errors,
                warnings
            ));
        }

        Ok(out)
    }
}

/// Pretty-printed JSON rendering of the results.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, results: &[FileLintResult]) -> Result<String, EngineError> {
        serde_json::to_string_pretty(results).map_err(|e| EngineError::formatter(e.to_string()))
    }
}
