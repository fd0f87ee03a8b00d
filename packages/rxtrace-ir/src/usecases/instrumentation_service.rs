//! Instrumentation Service - Usecase Layer for single files and batches
//!
//! ```text
//!   source text ──▶ TreeSitterParser ──▶ transform_file ──▶ synthesize_imports ──▶ render
//! ```
//!
//! Every file is processed independently: a fresh resolver and dependency
//! tracker per file, no state shared between files. Batches run on the rayon
//! pool when the `parallel` feature is enabled.
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use rxtrace_ir::config::ValidatedConfig;
//! use rxtrace_ir::usecases::InstrumentationService;
//! use std::path::{Path, PathBuf};
//!
//! let service = InstrumentationService::new(ValidatedConfig::default());
//!
//! let file = service.instrument_source("const a$ = of(1);", Path::new("src/a.ts"))?;
//! println!("{}", file.output);
//!
//! let report = service.instrument_paths(&[PathBuf::from("src")], Some(Path::new("out")));
//! println!("{} instrumented, {} failed", report.instrumented_count(), report.failed_count());
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::config::ValidatedConfig;
use crate::features::imports::synthesize_imports;
use crate::features::instrumentation::{
    transform_file, Dependency, Diagnostic, InstrumentedConstruct,
};
use crate::features::parsing::{ParsedTree, Parser, TreeSitterParser};
use crate::shared::models::{Result, TransformError};

/// Result of instrumenting one source file
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentedFile {
    pub path: PathBuf,

    /// Rewritten source; the input text unchanged when nothing matched
    pub output: String,

    /// Wrapper imports the output needs
    pub dependencies: Vec<Dependency>,

    pub diagnostics: Vec<Diagnostic>,

    pub constructs: Vec<InstrumentedConstruct>,

    pub transformed: bool,
}

impl InstrumentedFile {
    fn unchanged(path: &Path, source: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            output: source.to_string(),
            dependencies: Vec::new(),
            diagnostics: Vec::new(),
            constructs: Vec::new(),
            transformed: false,
        }
    }
}

/// Outcome for one file of a batch
#[derive(Debug, Clone)]
pub enum FileReport {
    Instrumented {
        path: PathBuf,
        /// Where the output was written (`None` on dry runs or unchanged in-place files)
        written_to: Option<PathBuf>,
        constructs: usize,
        diagnostics: Vec<Diagnostic>,
        transformed: bool,
    },
    Skipped {
        path: PathBuf,
        reason: String,
    },
    Failed {
        path: PathBuf,
        error: String,
    },
}

impl FileReport {
    pub fn path(&self) -> &Path {
        match self {
            FileReport::Instrumented { path, .. }
            | FileReport::Skipped { path, .. }
            | FileReport::Failed { path, .. } => path,
        }
    }
}

/// Batch summary
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub duration: Duration,
}

impl BatchReport {
    pub fn instrumented_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f, FileReport::Instrumented { transformed: true, .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f, FileReport::Skipped { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f, FileReport::Failed { .. }))
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }
}

/// File queued for a batch, with the root its output path is relative to
#[derive(Debug, Clone)]
struct BatchEntry {
    path: PathBuf,
    relative: PathBuf,
}

pub struct InstrumentationService {
    config: ValidatedConfig,
    dry_run: bool,
}

impl InstrumentationService {
    pub fn new(config: ValidatedConfig) -> Self {
        Self {
            config,
            dry_run: false,
        }
    }

    /// Compute outputs without writing anything
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// Instrument one file's source text
    ///
    /// Files with syntax errors are returned unchanged when the configuration
    /// says to skip them.
    pub fn instrument_source(&self, source: &str, path: &Path) -> Result<InstrumentedFile> {
        let tree = parse(source, path)?;
        if tree.has_errors && self.config.skip_files_with_parse_errors {
            warn!(
                "{}: {} syntax error(s), left uninstrumented",
                path.display(),
                tree.errors.len()
            );
            return Ok(InstrumentedFile::unchanged(path, source));
        }
        self.instrument_tree(&tree, path)
    }

    fn instrument_tree(&self, tree: &ParsedTree, path: &Path) -> Result<InstrumentedFile> {
        let transform = transform_file(tree, &self.config)?;
        if !transform.transformed {
            let mut file = InstrumentedFile::unchanged(path, &tree.source);
            file.diagnostics = transform.diagnostics;
            return Ok(file);
        }

        let (root, _) = synthesize_imports(transform.root, &transform.dependencies);
        Ok(InstrumentedFile {
            path: path.to_path_buf(),
            output: root.render(),
            dependencies: transform.dependencies,
            diagnostics: transform.diagnostics,
            constructs: transform.constructs,
            transformed: true,
        })
    }

    /// Instrument every accepted file under `paths`
    ///
    /// Outputs mirror the input layout under `output_dir`; without one,
    /// changed files are rewritten in place. A failing file never stops the
    /// batch.
    pub fn instrument_paths(&self, paths: &[PathBuf], output_dir: Option<&Path>) -> BatchReport {
        let started = Instant::now();
        let (entries, mut files) = self.collect(paths);
        info!("Instrumenting {} file(s)", entries.len());

        #[cfg(feature = "parallel")]
        let reports: Vec<FileReport> = entries
            .par_iter()
            .map(|entry| self.process(entry, output_dir))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let reports: Vec<FileReport> = entries
            .iter()
            .map(|entry| self.process(entry, output_dir))
            .collect();

        files.extend(reports);
        let report = BatchReport {
            files,
            duration: started.elapsed(),
        };
        info!(
            "Batch done in {:?}: {} instrumented, {} skipped, {} failed",
            report.duration,
            report.instrumented_count(),
            report.skipped_count(),
            report.failed_count()
        );
        report
    }

    /// Accepted files, plus failure reports for unreadable directory entries
    fn collect(&self, paths: &[PathBuf]) -> (Vec<BatchEntry>, Vec<FileReport>) {
        let mut entries = Vec::new();
        let mut failures = Vec::new();

        for root in paths {
            if root.is_file() {
                if self.accepts(root) {
                    let relative = root.file_name().map(PathBuf::from).unwrap_or_default();
                    entries.push(BatchEntry {
                        path: root.clone(),
                        relative,
                    });
                }
                continue;
            }

            for entry in WalkDir::new(root).sort_by_file_name() {
                match entry {
                    Ok(entry) if entry.file_type().is_file() && self.accepts(entry.path()) => {
                        let relative = entry
                            .path()
                            .strip_prefix(root)
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|_| entry.path().to_path_buf());
                        entries.push(BatchEntry {
                            path: entry.into_path(),
                            relative,
                        });
                    }
                    Ok(_) => {}
                    Err(err) => failures.push(FileReport::Failed {
                        path: err.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone()),
                        error: err.to_string(),
                    }),
                }
            }
        }

        (entries, failures)
    }

    fn accepts(&self, path: &Path) -> bool {
        self.config.accepts_extension(path) && !self.config.is_excluded(path)
    }

    fn process(&self, entry: &BatchEntry, output_dir: Option<&Path>) -> FileReport {
        match self.process_file(entry, output_dir) {
            Ok(report) => report,
            Err(err) => {
                error!("{}: {}", entry.path.display(), err);
                FileReport::Failed {
                    path: entry.path.clone(),
                    error: err.to_string(),
                }
            }
        }
    }

    fn process_file(&self, entry: &BatchEntry, output_dir: Option<&Path>) -> Result<FileReport> {
        let source = fs::read_to_string(&entry.path)?;
        let tree = parse(&source, &entry.path)?;
        if tree.has_errors && self.config.skip_files_with_parse_errors {
            warn!("{}: syntax errors, skipped", entry.path.display());
            return Ok(FileReport::Skipped {
                path: entry.path.clone(),
                reason: format!("{} syntax error(s)", tree.errors.len()),
            });
        }

        let file = self.instrument_tree(&tree, &entry.path)?;
        let target = match output_dir {
            Some(dir) => Some(dir.join(&entry.relative)),
            None if file.transformed => Some(entry.path.clone()),
            None => None,
        };
        let written_to = match target {
            Some(target) if !self.dry_run => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&target, &file.output)?;
                Some(target)
            }
            _ => None,
        };

        info!(
            "{}: {} construct(s), {} diagnostic(s)",
            entry.path.display(),
            file.constructs.len(),
            file.diagnostics.len()
        );
        Ok(FileReport::Instrumented {
            path: entry.path.clone(),
            written_to,
            constructs: file.constructs.len(),
            diagnostics: file.diagnostics,
            transformed: file.transformed,
        })
    }
}

fn parse(source: &str, path: &Path) -> Result<ParsedTree> {
    let parser = TreeSitterParser::for_path(path)
        .ok_or_else(|| TransformError::parse(format!("no grammar for {}", path.display())))?;
    parser.parse(source, &path.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn service() -> InstrumentationService {
        InstrumentationService::new(ValidatedConfig::default())
    }

    #[test]
    fn test_untouched_source_is_byte_identical() {
        let source = "export const answer = 42;\n";
        let file = service().instrument_source(source, Path::new("a.ts")).unwrap();
        assert!(!file.transformed);
        assert_eq!(file.output, source);
    }

    #[test]
    fn test_imports_are_prepended() {
        let file = service()
            .instrument_source("const a$ = of(1);\n", Path::new("a.ts"))
            .unwrap();
        assert!(file.transformed);
        assert!(file
            .output
            .starts_with("import { sendToBackpage } from 'rxjs-transformer/dist/rxjs_wrapper';\nimport { wrapCreationOperator } from 'rxjs-transformer/dist/rxjs_wrapper';\n"));
        assert!(file.output.ends_with(")(of)(1);\n"));
    }

    #[test]
    fn test_parse_errors_skip_file() {
        let source = "const a$ = of(1;\n";
        let file = service().instrument_source(source, Path::new("a.ts")).unwrap();
        assert!(!file.transformed);
        assert_eq!(file.output, source);
    }

    #[test]
    fn test_unknown_extension_is_an_error() {
        assert!(service().instrument_source("x", Path::new("a.py")).is_err());
    }
}
