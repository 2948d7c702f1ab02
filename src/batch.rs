//! Batch runner: validate many files one at a time.
//!
//! Each file goes through a [`FileCheck`], by default a fresh `luaugate`
//! subprocess, so a failure or a rewrite in one file cannot leak into the
//! next. Results are aggregated into a [`BatchReport`] in input order.

use crate::config::Timeouts;
use crate::error::BatchError;
use crate::models::{BatchReport, FileValidationResult};
use crate::pipeline::Pipeline;
use crate::tool::{CommandTool, RunOptions, ToolOutput, ToolRunner};
use async_trait::async_trait;
use regex::Regex;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Seam between the batch runner and the single-file validator.
#[async_trait]
pub trait FileCheck: Send + Sync {
    async fn check(&self, file: &Path) -> anyhow::Result<FileValidationResult>;
}

#[async_trait]
impl FileCheck for Pipeline {
    async fn check(&self, file: &Path) -> anyhow::Result<FileValidationResult> {
        Ok(self.validate(file).await)
    }
}

/// Runs the `luaugate` binary once per file and reads its JSON result.
pub struct ValidatorProcess {
    tool: CommandTool,
    budget: Duration,
    project_root: Option<PathBuf>,
    error_line: Regex,
}

impl ValidatorProcess {
    pub fn new(exe: impl Into<String>, budget: Duration) -> Self {
        Self {
            tool: CommandTool::new(exe, Duration::from_secs(5)),
            budget,
            project_root: None,
            // Lines a human report uses to flag errors.
            error_line: Regex::new(r"ERROR|❌|(?i)\berror\b").expect("static regex"),
        }
    }

    /// Pin every child run to `root`, so it resolves the same configuration
    /// as the batch itself.
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Command line for one child run.
    pub fn child_args(&self, file: &Path) -> Vec<String> {
        let mut args = Vec::with_capacity(5);
        if let Some(root) = &self.project_root {
            args.push("--project-root".to_string());
            args.push(root.to_string_lossy().to_string());
        }
        args.push("--output".to_string());
        args.push("json".to_string());
        args.push(file.to_string_lossy().to_string());
        args
    }

    /// Locate the validator next to the running executable.
    pub fn sibling(budget: Duration) -> Result<Self, BatchError> {
        let name = format!("luaugate{}", std::env::consts::EXE_SUFFIX);
        let path = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join(&name)))
            .unwrap_or_else(|| PathBuf::from(&name));
        Self::at(path, budget)
    }

    pub fn at(path: PathBuf, budget: Duration) -> Result<Self, BatchError> {
        if !path.is_file() {
            return Err(BatchError::ValidatorMissing { path });
        }
        Ok(Self::new(path.to_string_lossy().to_string(), budget))
    }

    /// Lines of `text` that look like error reports.
    pub fn error_lines(&self, text: &str) -> Vec<String> {
        text.lines()
            .filter(|l| self.error_line.is_match(l))
            .map(|l| l.trim().to_string())
            .collect()
    }

    /// Turn a finished child run into a result.
    ///
    /// Prefers the JSON document on stdout; otherwise falls back to the exit
    /// code and the error-looking lines of the child's output.
    pub fn interpret(&self, path: String, out: &ToolOutput) -> FileValidationResult {
        match serde_json::from_str::<FileValidationResult>(out.stdout.trim()) {
            Ok(mut res) => {
                // The exit code is the contract; the JSON carries the detail.
                res.success = res.success && out.success();
                res
            }
            Err(e) => {
                debug!(file = %path, error = %e, "validator output is not JSON, using exit code");
                let mut lines = self.error_lines(&out.stdout);
                lines.extend(self.error_lines(&out.stderr));
                let mut res = FileValidationResult::from_steps(path, None, Vec::new());
                res.success = out.success();
                if !lines.is_empty() {
                    res.error = Some(lines.join("\n"));
                } else if !out.success() {
                    res.error = Some(out.error_text().to_string());
                }
                res
            }
        }
    }
}

/// Upper bound for one child validation: every probe and step at its limit.
pub fn child_budget(t: &Timeouts) -> Duration {
    t.probe * 4 + t.syntax + t.lint + t.format * 2 + t.build + Duration::from_secs(10)
}

#[async_trait]
impl FileCheck for ValidatorProcess {
    async fn check(&self, file: &Path) -> anyhow::Result<FileValidationResult> {
        let path = file.to_string_lossy().to_string();
        let out = self
            .tool
            .run(&self.child_args(file), &RunOptions::with_timeout(self.budget))
            .await?;

        Ok(self.interpret(path, &out))
    }
}

/// Progress notifications emitted while the batch runs.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    Started {
        index: usize,
        total: usize,
        file: &'a Path,
    },
    Finished {
        index: usize,
        total: usize,
        result: &'a FileValidationResult,
    },
    /// The run was interrupted while this file was in flight.
    Cancelled {
        index: usize,
        total: usize,
        file: &'a Path,
    },
}

/// Validate `files` sequentially in input order.
///
/// Once `shutdown` resolves the file in flight is abandoned without a
/// result, a `Cancelled` event is emitted for it, and the report is marked
/// as cancelled.
pub async fn run_batch<C, S, F>(
    files: &[PathBuf],
    checker: &C,
    shutdown: S,
    mut on_event: F,
) -> BatchReport
where
    C: FileCheck + ?Sized,
    S: Future<Output = ()>,
    F: FnMut(BatchEvent<'_>),
{
    let total = files.len();
    let mut report = BatchReport::default();
    let mut shutdown = std::pin::pin!(shutdown);

    for (i, file) in files.iter().enumerate() {
        let index = i + 1;
        on_event(BatchEvent::Started { index, total, file });
        let checked = tokio::select! {
            biased;
            _ = &mut shutdown => {
                warn!(processed = i, total, "batch interrupted");
                on_event(BatchEvent::Cancelled { index, total, file });
                report.cancelled = true;
                break;
            }
            r = checker.check(file) => r,
        };
        let result = checked.unwrap_or_else(|e| {
            warn!(file = %file.display(), error = %e, "validator could not run");
            FileValidationResult::input_failure(
                file.to_string_lossy().to_string(),
                format!("validator could not run: {:#}", e),
            )
        });
        on_event(BatchEvent::Finished {
            index,
            total,
            result: &result,
        });
        report.push(result);
    }
    report
}
