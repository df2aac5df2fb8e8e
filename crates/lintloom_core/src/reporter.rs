//! Report rendering: ignore filtering, severity routing and the optional
//! report artifact.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use lintloom_engine::{EngineError, FileLintResult, Formatter, LintFinding};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::PluginError;
use crate::options::{FormatterChoice, FormatterFn};
use crate::provider::EngineHandle;
use crate::resolver::ResolvedConfig;

/// Prefix on every diagnostic this crate pushes onto a compilation
/// channel.
pub(crate) const LINT_PREFIX: &str = "[lint] ";

/// Formatted report blocks, one per routing class. A class with nothing
/// to report stays `None`.
#[derive(Debug, Default)]
pub(crate) struct ReportOutcome {
    pub(crate) errors: Option<String>,
    pub(crate) warnings: Option<String>,
}

/// Adapts a caller-supplied formatting function to the formatter
/// contract.
struct FnFormatter {
    func: Arc<FormatterFn>,
}

impl Formatter for FnFormatter {
    fn format(&self, results: &[FileLintResult]) -> Result<String, EngineError> {
        Ok((self.func)(results))
    }
}

/// Renders one compilation's merged results into routed report blocks
/// and, when configured, the report artifact.
pub(crate) struct Reporter<'a> {
    config: &'a ResolvedConfig,
    handle: &'a EngineHandle,
}

impl<'a> Reporter<'a> {
    pub(crate) fn new(config: &'a ResolvedConfig, handle: &'a EngineHandle) -> Self {
        Self { config, handle }
    }

    /// Drops results that carry nothing reportable: clean files, and the
    /// single rule-less warning an engine answers with when it was handed
    /// a file its own configuration ignores.
    ///
    /// Order is preserved; the ignore queries run in parallel.
    pub(crate) fn drop_ignored(
        &self,
        results: Vec<FileLintResult>,
    ) -> Result<Vec<FileLintResult>, EngineError> {
        let kept: Vec<Option<FileLintResult>> = results
            .into_par_iter()
            .map(|result| {
                if result.findings.is_empty() {
                    return Ok(None);
                }
                if looks_like_ignore_notice(&result)
                    && self.handle.is_path_ignored(&result.path)?
                {
                    debug!(path = %result.path.display(), "dropped ignore notice");
                    return Ok(None);
                }
                Ok(Some(result))
            })
            .collect::<Result<_, EngineError>>()?;
        Ok(kept.into_iter().flatten().collect())
    }

    /// Formats the error and warning blocks for `results`.
    pub(crate) fn render(&self, results: &[FileLintResult]) -> Result<ReportOutcome, PluginError> {
        let formatter = self.load_formatter(&self.config.options.formatter)?;
        let (errors, warnings) = self.classify(results);
        debug!(
            errors = errors.len(),
            warnings = warnings.len(),
            "classified lint results"
        );
        Ok(ReportOutcome {
            warnings: self.format_block(formatter.as_ref(), &warnings)?,
            errors: self.format_block(formatter.as_ref(), &errors)?,
        })
    }

    /// Writes the report artifact, formatting the full merged `results`.
    ///
    /// Relative target paths land under `output_path`. Without a
    /// configured report target this is a no-op.
    pub(crate) fn write_report_asset(
        &self,
        output_path: &Path,
        results: &[FileLintResult],
    ) -> Result<(), PluginError> {
        let Some(report) = &self.config.options.output_report else {
            return Ok(());
        };
        let choice = report
            .formatter
            .as_ref()
            .unwrap_or(&self.config.options.formatter);
        let formatter = self.load_formatter(choice)?;
        let content = formatter.format(results)?;

        let target = if report.file_path.is_absolute() {
            report.file_path.clone()
        } else {
            output_path.join(&report.file_path)
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, content)?;
        info!(path = %target.display(), "wrote lint report");
        Ok(())
    }

    /// Resolves the configured formatter. An unknown formatter name falls
    /// back to the engine default instead of failing the cycle.
    fn load_formatter(&self, choice: &FormatterChoice) -> Result<Arc<dyn Formatter>, PluginError> {
        match choice {
            FormatterChoice::Func(func) => Ok(Arc::new(FnFormatter { func: func.clone() })),
            FormatterChoice::Name(name) => match self.handle.load_formatter(Some(name)) {
                Ok(formatter) => Ok(formatter),
                Err(e) => {
                    debug!(formatter = %name, error = %e, "formatter unavailable, using the default");
                    Ok(self.handle.load_formatter(None)?)
                }
            },
            FormatterChoice::Default => Ok(self.handle.load_formatter(None)?),
        }
    }

    /// Splits results into the error and warning report classes.
    ///
    /// A file lands in a class when it has findings of that severity and
    /// the class is emitted; the split result carries only the matching
    /// findings, with counts re-derived. A file with both severities
    /// appears in both classes.
    fn classify(&self, results: &[FileLintResult]) -> (Vec<FileLintResult>, Vec<FileLintResult>) {
        let options = &self.config.options;
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        for result in results {
            if options.emit_error && result.has_errors() {
                let findings: Vec<LintFinding> = result
                    .findings
                    .iter()
                    .filter(|f| f.fatal || f.severity.is_error())
                    .cloned()
                    .collect();
                errors.push(FileLintResult::new(result.path.clone(), findings));
            }
            if options.emit_warning && result.has_warnings() {
                let findings: Vec<LintFinding> = result
                    .findings
                    .iter()
                    .filter(|f| !f.fatal && f.severity.is_warning())
                    .cloned()
                    .collect();
                warnings.push(FileLintResult::new(result.path.clone(), findings));
            }
        }
        (errors, warnings)
    }

    fn format_block(
        &self,
        formatter: &dyn Formatter,
        results: &[FileLintResult],
    ) -> Result<Option<String>, PluginError> {
        if results.is_empty() {
            return Ok(None);
        }
        let text = formatter.format(results)?;
        Ok(Some(format!("{LINT_PREFIX}{text}")))
    }
}

/// The shape an engine answers with for a file its own configuration
/// ignores: exactly one warning with no rule, no location and no fatal
/// flag.
fn looks_like_ignore_notice(result: &FileLintResult) -> bool {
    if result.warning_count != 1 || result.error_count != 0 {
        return false;
    }
    match result.findings.first() {
        Some(first) => !first.fatal && first.rule_id.is_none() && first.line.is_none(),
        None => false,
    }
}
