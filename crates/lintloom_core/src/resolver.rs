//! Resolution of options against a compiler context.
//!
//! All derived state is computed once per attachment: absolute patterns,
//! glob sets and query regexes. Module events only run matches against the
//! precompiled sets.

use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use tracing::debug;

use crate::error::PluginError;
use crate::options::LintOptions;

/// Exclude applied when the options carry none.
const DEFAULT_EXCLUDE: &str = "**/node_modules/**";

/// Options resolved against a compiler context.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Effective options, quiet override applied.
    pub options: LintOptions,
    /// Base directory used for pattern resolution.
    pub base_dir: PathBuf,
    /// Absolute include patterns, directories expanded to globs.
    pub include_patterns: Vec<String>,
    /// Absolute exclude patterns.
    pub exclude_patterns: Vec<String>,
    include_set: GlobSet,
    exclude_set: GlobSet,
    query_excludes: Vec<Regex>,
}

impl ResolvedConfig {
    /// Resolves `options` against the compiler context directory.
    pub fn resolve(
        mut options: LintOptions,
        compiler_context: &Path,
    ) -> Result<Self, PluginError> {
        options.apply_quiet();

        let base_dir = match &options.context {
            Some(context) if context.is_absolute() => normalize_path(context),
            Some(context) => normalize_path(&compiler_context.join(context)),
            None => normalize_path(compiler_context),
        };

        // An empty file list scopes the whole base directory.
        let files = if options.files.is_empty() {
            vec![path_to_pattern(&base_dir)]
        } else {
            options
                .files
                .iter()
                .map(|f| resolve_pattern(&base_dir, f))
                .collect()
        };
        let excluded = if options.exclude.is_empty() {
            vec![resolve_pattern(&base_dir, DEFAULT_EXCLUDE)]
        } else {
            options
                .exclude
                .iter()
                .map(|f| resolve_pattern(&base_dir, f))
                .collect()
        };

        let include_patterns = folders_to_globs(&files, &options.extensions);
        let exclude_patterns = folders_to_globs(&excluded, &[]);
        debug!(
            include = ?include_patterns,
            exclude = ?exclude_patterns,
            "resolved lint scope"
        );

        let include_set = build_glob_set(&include_patterns)?;
        let exclude_set = build_glob_set(&exclude_patterns)?;

        let query_excludes = options
            .resource_query_exclude
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    PluginError::config(format!("Invalid resource query pattern {p:?}: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            options,
            base_dir,
            include_patterns,
            exclude_patterns,
            include_set,
            exclude_set,
            query_excludes,
        })
    }

    /// Whether `path` falls inside the configured scope.
    ///
    /// Exclusion wins over inclusion.
    pub fn is_wanted(&self, path: &str) -> bool {
        !self.exclude_set.is_match(path) && self.include_set.is_match(path)
    }

    /// Whether a module's resource query hits any exclude pattern.
    pub fn is_query_excluded(&self, query: &str) -> bool {
        self.query_excludes.iter().any(|re| re.is_match(query))
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, PluginError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| PluginError::config(format!("Invalid glob pattern {pattern:?}: {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| PluginError::config(format!("Failed to build glob set: {e}")))
}

/// Resolves a pattern against the base directory, keeping glob syntax
/// intact. Absolute patterns pass through normalization only.
fn resolve_pattern(base_dir: &Path, pattern: &str) -> String {
    let path = Path::new(pattern);
    if path.is_absolute() {
        path_to_pattern(&normalize_path(path))
    } else {
        path_to_pattern(&normalize_path(&base_dir.join(path)))
    }
}

/// Lexical normalization: folds `.` and `..`, never touches the
/// filesystem.
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn path_to_pattern(path: &Path) -> String {
    path.display().to_string()
}

/// Expands patterns naming existing directories into recursive globs.
///
/// With extensions the expansion is `dir/**/*.{a,b}`, without it is
/// `dir/**`. Patterns that do not name an existing directory pass through
/// verbatim, so plain globs and yet-to-exist paths keep working.
fn folders_to_globs(patterns: &[String], extensions: &[String]) -> Vec<String> {
    patterns
        .iter()
        .map(|pattern| {
            let trimmed = pattern.trim_end_matches(['/', '\\']);
            match std::fs::metadata(trimmed) {
                Ok(stats) if stats.is_dir() => {
                    if extensions.is_empty() {
                        format!("{trimmed}/**")
                    } else {
                        let exts = extensions
                            .iter()
                            .map(|e| e.trim_start_matches('.'))
                            .collect::<Vec<_>>()
                            .join(",");
                        format!("{trimmed}/**/*.{{{exts}}}")
                    }
                }
                _ => pattern.clone(),
            }
        })
        .collect()
}
