//! End-to-end plugin pipeline tests.
//!
//! These drive the full compiler lifecycle against a small engine that
//! scans file contents from disk, so watch scenarios observe genuine
//! file edits.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lintloom_core::{
    Compilation, Compiler, LintOptions, LintPlugin, ModuleRecord, ReportTarget, Threads,
};
use lintloom_engine::{
    CompactFormatter, EngineError, EngineFactory, EngineOptions, FileLintResult, Formatter,
    JsonFormatter, LintEngine, LintFinding,
};

const IGNORE_NOTICE: &str = "File ignored because of a matching ignore pattern.";

/// Content-scanning engine: `var ` declarations are errors, `console.`
/// calls are warnings. Files under the configured ignored directory get
/// the standard ignore notice.
struct ScanEngine {
    ignored_dir: Option<String>,
}

impl ScanEngine {
    fn scan(text: &str) -> Vec<LintFinding> {
        let mut findings = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx as u32 + 1;
            if let Some(col) = line.find("var ") {
                findings.push(
                    LintFinding::error("Unexpected var, use let or const instead")
                        .with_rule("no-var")
                        .with_location(line_no, col as u32 + 1),
                );
            }
            if let Some(col) = line.find("console.") {
                findings.push(
                    LintFinding::warning("Unexpected console statement")
                        .with_rule("no-console")
                        .with_location(line_no, col as u32 + 1),
                );
            }
        }
        findings
    }
}

impl LintEngine for ScanEngine {
    fn lint_files(&self, paths: &[PathBuf]) -> Result<Vec<FileLintResult>, EngineError> {
        paths
            .iter()
            .map(|path| {
                if self.is_path_ignored(path)? {
                    return Ok(FileLintResult::new(
                        path.clone(),
                        vec![LintFinding::warning(IGNORE_NOTICE)],
                    ));
                }
                let text = fs::read_to_string(path)?;
                Ok(FileLintResult::new(path.clone(), Self::scan(&text)))
            })
            .collect()
    }

    fn is_path_ignored(&self, path: &Path) -> Result<bool, EngineError> {
        let Some(dir) = &self.ignored_dir else {
            return Ok(false);
        };
        Ok(path
            .components()
            .any(|c| c.as_os_str().to_str() == Some(dir.as_str())))
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
}

struct ScanEngineFactory {
    ignored_dir: Option<String>,
    builds: AtomicUsize,
}

impl ScanEngineFactory {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            ignored_dir: None,
            builds: AtomicUsize::new(0),
        })
    }

    fn with_ignored_dir(dir: &str) -> Arc<Self> {
        Arc::new(Self {
            ignored_dir: Some(dir.to_string()),
            builds: AtomicUsize::new(0),
        })
    }

    fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl EngineFactory for ScanEngineFactory {
    fn build(&self, _options: &EngineOptions) -> Result<Arc<dyn LintEngine>, EngineError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(ScanEngine {
            ignored_dir: self.ignored_dir.clone(),
        }))
    }
}

/// A project directory with real source files.
struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    fn new() -> Self {
        init_logging();
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn write(&self, rel: &str, content: &str) -> String {
        let path = self.dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    fn compiler(&self, name: &str) -> Compiler {
        Compiler::new(self.dir.path(), self.dir.path().join("dist")).with_name(name)
    }

    fn dist(&self, rel: &str) -> PathBuf {
        self.dir.path().join("dist").join(rel)
    }
}

/// Runs one build cycle: settles the given resources, finishes modules
/// and finalizes assets.
fn build(compiler: &Compiler, resources: &[String]) -> Compilation {
    let compilation = compiler.new_compilation();
    for resource in resources {
        compilation.succeed_module(&ModuleRecord::new(resource));
    }
    compilation.finish_modules();
    compilation.finalize_assets().unwrap();
    compilation
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

mod single_run {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reports_errors_and_warnings_on_their_channels() {
        let project = Project::new();
        let bad = project.write("src/bad.js", "var x = 1;\n");
        let noisy = project.write("src/noisy.js", "console.log('hi');\n");
        let clean = project.write("src/clean.js", "const ok = true;\n");

        let plugin = LintPlugin::new(LintOptions::default(), ScanEngineFactory::new()).unwrap();
        let mut compiler = project.compiler("web");
        plugin.apply(&mut compiler).unwrap();
        compiler.run();

        let compilation = build(&compiler, &[bad.clone(), noisy.clone(), clean]);

        let errors = compilation.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("[lint] "));
        assert!(errors[0].message.contains(&bad));
        assert!(errors[0].message.contains("no-var"));
        assert!(!errors[0].message.contains(&noisy));

        let warnings = compilation.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains(&noisy));
        assert!(warnings[0].message.contains("no-console"));
        assert!(!warnings[0].message.contains("clean.js"));
    }

    #[test]
    fn quiet_mode_reports_errors_only() {
        let project = Project::new();
        let bad = project.write("src/bad.js", "var x = 1;\n");
        let noisy = project.write("src/noisy.js", "console.log('hi');\n");

        let options = LintOptions {
            quiet: true,
            ..LintOptions::default()
        };
        let plugin = LintPlugin::new(options, ScanEngineFactory::new()).unwrap();
        let mut compiler = project.compiler("web");
        plugin.apply(&mut compiler).unwrap();
        compiler.run();

        let compilation = build(&compiler, &[bad, noisy]);

        assert_eq!(compilation.errors().len(), 1);
        assert!(compilation.warnings().is_empty());
    }

    #[test]
    fn build_without_run_signal_lints_nothing() {
        let project = Project::new();
        let bad = project.write("src/bad.js", "var x = 1;\n");

        let plugin = LintPlugin::new(LintOptions::default(), ScanEngineFactory::new()).unwrap();
        let mut compiler = project.compiler("web");
        plugin.apply(&mut compiler).unwrap();

        let compilation = build(&compiler, &[bad]);

        assert!(compilation.errors().is_empty());
        assert!(compilation.warnings().is_empty());
    }

    #[test]
    fn fail_on_warning_promotes_warnings_to_failures() {
        let project = Project::new();
        let noisy = project.write("src/noisy.js", "console.log('hi');\n");

        let options = LintOptions {
            fail_on_warning: true,
            ..LintOptions::default()
        };
        let plugin = LintPlugin::new(options, ScanEngineFactory::new()).unwrap();
        let mut compiler = project.compiler("web");
        plugin.apply(&mut compiler).unwrap();
        compiler.run();

        let compilation = build(&compiler, &[noisy]);

        let errors = compilation.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("no-console"));
        assert!(compilation.warnings().is_empty());
    }
}

mod watch_mode {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fixed_file_clears_stale_findings() {
        let project = Project::new();
        let bad = project.write("src/bad.js", "var x = 1;\n");
        let noisy = project.write("src/noisy.js", "console.log('hi');\n");

        let plugin = LintPlugin::new(LintOptions::default(), ScanEngineFactory::new()).unwrap();
        let mut compiler = project.compiler("web");
        plugin.apply(&mut compiler).unwrap();

        compiler.watch_run();
        let first = build(&compiler, &[bad.clone(), noisy.clone()]);
        assert_eq!(first.errors().len(), 1);
        assert_eq!(first.warnings().len(), 1);

        // The fix lands on disk; only the fixed file rebuilds.
        project.write("src/bad.js", "const x = 1;\n");
        compiler.watch_run();
        let second = build(&compiler, &[bad]);

        assert!(second.errors().is_empty());
        let warnings = second.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains(&noisy));
    }

    #[test]
    fn dirty_modules_only_skips_the_initial_build() {
        let project = Project::new();
        let bad = project.write("src/bad.js", "var x = 1;\n");

        let options = LintOptions {
            lint_dirty_modules_only: true,
            ..LintOptions::default()
        };
        let plugin = LintPlugin::new(options, ScanEngineFactory::new()).unwrap();
        let mut compiler = project.compiler("web");
        plugin.apply(&mut compiler).unwrap();

        compiler.watch_run();
        let first = build(&compiler, &[bad.clone()]);
        assert!(first.errors().is_empty());

        compiler.watch_run();
        let second = build(&compiler, &[bad]);
        assert_eq!(second.errors().len(), 1);
    }
}

mod worker_pools {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pooled_lint_merges_results_from_all_files() {
        let project = Project::new();
        let bad_a = project.write("src/a.js", "var a = 1;\n");
        let bad_b = project.write("src/b.js", "var b = 2;\n");
        let noisy = project.write("src/c.js", "console.log('hi');\n");

        let factory = ScanEngineFactory::new();
        let options = LintOptions {
            threads: Threads::Count(2),
            ..LintOptions::default()
        };
        let plugin = LintPlugin::new(options, factory.clone()).unwrap();
        let mut compiler = project.compiler("web");
        plugin.apply(&mut compiler).unwrap();
        compiler.run();

        let compilation = build(&compiler, &[bad_a.clone(), bad_b.clone(), noisy.clone()]);

        // One engine per worker plus the in-process probe.
        assert_eq!(factory.builds(), 3);
        let errors = compilation.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains(&bad_a));
        assert!(errors[0].message.contains(&bad_b));
        assert!(compilation.warnings()[0].message.contains(&noisy));
    }

    #[test]
    fn pool_tears_down_after_the_first_cycle() {
        let project = Project::new();
        let bad = project.write("src/bad.js", "var x = 1;\n");

        let factory = ScanEngineFactory::new();
        let options = LintOptions {
            threads: Threads::Count(2),
            ..LintOptions::default()
        };
        let plugin = LintPlugin::new(options, factory.clone()).unwrap();
        let mut compiler = project.compiler("web");
        plugin.apply(&mut compiler).unwrap();
        compiler.run();

        build(&compiler, &[bad.clone()]);
        assert_eq!(factory.builds(), 3);

        // Later cycles lint through the probe; no new engines appear.
        let second = build(&compiler, &[bad]);
        assert_eq!(factory.builds(), 3);
        assert_eq!(second.errors().len(), 1);
    }
}

mod report_assets {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_report_asset_lands_under_the_output_directory() {
        let project = Project::new();
        let bad = project.write("src/bad.js", "var x = 1;\n");

        let options = LintOptions {
            output_report: Some(ReportTarget {
                file_path: PathBuf::from("reports/lint.json"),
                formatter: Some(lintloom_core::FormatterChoice::Name("json".to_string())),
            }),
            ..LintOptions::default()
        };
        let plugin = LintPlugin::new(options, ScanEngineFactory::new()).unwrap();
        let mut compiler = project.compiler("web");
        plugin.apply(&mut compiler).unwrap();
        compiler.run();

        build(&compiler, &[bad]);

        let written = fs::read_to_string(project.dist("reports/lint.json")).unwrap();
        let parsed: Vec<FileLintResult> = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].path.ends_with("bad.js"));
        assert_eq!(parsed[0].error_count, 1);
    }

    #[test]
    fn engine_ignored_files_stay_silent() {
        let project = Project::new();
        let vendored = project.write("legacy/old.js", "var ancient = true;\n");
        let bad = project.write("src/bad.js", "var x = 1;\n");

        let plugin =
            LintPlugin::new(LintOptions::default(), ScanEngineFactory::with_ignored_dir("legacy"))
                .unwrap();
        let mut compiler = project.compiler("web");
        plugin.apply(&mut compiler).unwrap();
        compiler.run();

        let compilation = build(&compiler, &[vendored.clone(), bad.clone()]);

        let errors = compilation.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains(&bad));
        assert!(!errors[0].message.contains(&vendored));
        assert!(compilation.warnings().is_empty());
    }
}
