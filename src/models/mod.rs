//! Shared data models for single-file results and batch reports.

pub mod report;

use serde::{Deserialize, Serialize};

pub use report::BatchReport;

/// Number of stages in the validation pipeline.
pub const TOTAL_STEPS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// One stage of the validation pipeline, in execution order.
pub enum StepKind {
    Syntax,
    Lint,
    Format,
    Build,
}

impl StepKind {
    pub const ALL: [StepKind; TOTAL_STEPS] = [
        StepKind::Syntax,
        StepKind::Lint,
        StepKind::Format,
        StepKind::Build,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StepKind::Syntax => "syntax",
            StepKind::Lint => "lint",
            StepKind::Format => "format",
            StepKind::Build => "build",
        }
    }

    /// 1-based position in the pipeline.
    pub fn number(&self) -> usize {
        match self {
            StepKind::Syntax => 1,
            StepKind::Lint => 2,
            StepKind::Format => 3,
            StepKind::Build => 4,
        }
    }

    /// Critical steps abort the pipeline when they fail.
    pub fn is_critical(&self) -> bool {
        matches!(self, StepKind::Syntax | StepKind::Build)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Why a step did not run.
pub enum SkipReason {
    /// The external tool is not installed.
    ToolMissing,
    /// The step does not apply to this file (build on non-server scripts).
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
/// Result of a single step.
pub enum StepOutcome {
    Passed,
    PassedWithWarnings,
    Skipped(SkipReason),
    Failed,
}

impl StepOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Outcome of one attempted step plus the text surfaced to the user.
pub struct StepReport {
    pub step: StepKind,
    pub outcome: StepOutcome,
    /// Human-facing lines: lint warnings, skip reasons, install hints, fix notices.
    #[serde(default)]
    pub notes: Vec<String>,
    /// Captured tool output explaining a failure.
    #[serde(default)]
    pub diagnostic: Option<String>,
    /// Corrective action suggested after a failure.
    #[serde(default)]
    pub hint: Option<String>,
}

impl StepReport {
    pub fn new(step: StepKind, outcome: StepOutcome) -> Self {
        Self {
            step,
            outcome,
            notes: Vec::new(),
            diagnostic: None,
            hint: None,
        }
    }

    pub fn note(mut self, line: impl Into<String>) -> Self {
        self.notes.push(line.into());
        self
    }

    pub fn diagnostic(mut self, text: impl Into<String>) -> Self {
        self.diagnostic = Some(text.into());
        self
    }

    pub fn hint(mut self, text: impl Into<String>) -> Self {
        self.hint = Some(text.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Line statistics printed before the pipeline runs.
pub struct FileInfo {
    pub total_lines: usize,
    pub code_lines: usize,
}

impl FileInfo {
    /// Count all lines and the non-blank, non-comment ones.
    pub fn from_source(src: &str) -> Self {
        let mut total_lines = 0;
        let mut code_lines = 0;
        for line in src.lines() {
            total_lines += 1;
            let t = line.trim();
            if !t.is_empty() && !t.starts_with("--") {
                code_lines += 1;
            }
        }
        Self {
            total_lines,
            code_lines,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Everything known about one validated file.
pub struct FileValidationResult {
    pub path: String,
    #[serde(default)]
    pub info: Option<FileInfo>,
    /// One entry per attempted step, in pipeline order.
    #[serde(default)]
    pub steps: Vec<StepReport>,
    pub success: bool,
    /// Input failure or captured output when no step-level detail exists.
    #[serde(default)]
    pub error: Option<String>,
}

impl FileValidationResult {
    /// Result for a pipeline that ran (possibly aborted early).
    ///
    /// Success holds iff no critical step failed.
    pub fn from_steps(path: impl Into<String>, info: Option<FileInfo>, steps: Vec<StepReport>) -> Self {
        let success = !steps
            .iter()
            .any(|s| s.step.is_critical() && s.outcome.is_failed());
        Self {
            path: path.into(),
            info,
            steps,
            success,
            error: None,
        }
    }

    /// Result for a file that was never validated.
    pub fn input_failure(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            info: None,
            steps: Vec::new(),
            success: false,
            error: Some(message.into()),
        }
    }

    /// Attempted steps that did not fail.
    pub fn steps_completed(&self) -> usize {
        self.steps.iter().filter(|s| !s.outcome.is_failed()).count()
    }

    pub fn failed_step(&self) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.outcome.is_failed())
    }

    pub fn outcome_of(&self, step: StepKind) -> Option<StepOutcome> {
        self.steps.iter().find(|s| s.step == step).map(|s| s.outcome)
    }

    /// Diagnostic text blocks attached to this result.
    pub fn diagnostics(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .steps
            .iter()
            .filter_map(|s| s.diagnostic.as_deref())
            .collect();
        if let Some(e) = self.error.as_deref() {
            out.push(e);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order_and_criticality() {
        let numbers: Vec<usize> = StepKind::ALL.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        let critical: Vec<&str> = StepKind::ALL
            .iter()
            .filter(|s| s.is_critical())
            .map(|s| s.name())
            .collect();
        assert_eq!(critical, vec!["syntax", "build"]);
    }

    #[test]
    fn test_file_info_skips_blank_and_comment_lines() {
        let src = "-- header\nlocal x = 1\n\n  -- indented comment\nreturn x\n";
        let info = FileInfo::from_source(src);
        assert_eq!(info.total_lines, 5);
        assert_eq!(info.code_lines, 2);
    }

    #[test]
    fn test_advisory_warnings_do_not_flip_success() {
        let steps = vec![
            StepReport::new(StepKind::Syntax, StepOutcome::Passed),
            StepReport::new(StepKind::Lint, StepOutcome::PassedWithWarnings),
            StepReport::new(StepKind::Format, StepOutcome::PassedWithWarnings),
            StepReport::new(StepKind::Build, StepOutcome::Skipped(SkipReason::NotApplicable)),
        ];
        let res = FileValidationResult::from_steps("a.lua", None, steps);
        assert!(res.success);
        assert_eq!(res.steps_completed(), 4);
        assert!(res.failed_step().is_none());
    }

    #[test]
    fn test_critical_failure_reports_progress() {
        let steps = vec![
            StepReport::new(StepKind::Syntax, StepOutcome::Passed),
            StepReport::new(StepKind::Lint, StepOutcome::Passed),
            StepReport::new(StepKind::Format, StepOutcome::Passed),
            StepReport::new(StepKind::Build, StepOutcome::Failed).diagnostic("boom"),
        ];
        let res = FileValidationResult::from_steps("b.server.lua", None, steps);
        assert!(!res.success);
        assert_eq!(res.steps_completed(), 3);
        assert_eq!(res.failed_step().map(|s| s.step), Some(StepKind::Build));
        assert_eq!(res.diagnostics(), vec!["boom"]);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let v = serde_json::to_value(StepOutcome::Skipped(SkipReason::ToolMissing)).unwrap();
        assert_eq!(v["status"], "skipped");
        assert_eq!(v["reason"], "tool_missing");
        let back: StepOutcome = serde_json::from_value(v).unwrap();
        assert_eq!(back, StepOutcome::Skipped(SkipReason::ToolMissing));
    }
}
