//! Step adapters: one per external tool.
//!
//! Each adapter probes its tool, runs it, and folds exit code plus output
//! into a [`StepReport`]. Nothing here returns an error; a broken tool
//! becomes a skip, a warning, or a failure depending on the step.

use crate::error::ToolError;
use crate::models::{SkipReason, StepKind, StepOutcome, StepReport};
use crate::tool::{RunOptions, ToolRunner};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const SYNTAX_INSTALL_HINT: &str = "Install from: https://github.com/luau-lang/luau/releases";
pub const LINT_INSTALL_HINT: &str = "Install with: cargo install selene";
pub const FORMAT_INSTALL_HINT: &str = "Install with: cargo install stylua";
pub const BUILD_INSTALL_HINT: &str = "Install from: https://rojo.space/";

pub const SYNTAX_FIX_HINT: &str =
    "Read references/syntax-debugging.md for help, fix the syntax errors and validate again";
pub const BUILD_FIX_HINT: &str = "Check the Rojo configuration or the file structure";

fn tool_missing(step: StepKind, program: &str, what: &str, install_hint: &str) -> StepReport {
    info!(program, step = step.name(), "tool not found, skipping");
    StepReport::new(step, StepOutcome::Skipped(SkipReason::ToolMissing))
        .note(format!("{} not found - skipping {}", program, what))
        .note(install_hint)
}

/// Diagnostic for a tool that exists but could not be executed.
fn tool_error_text(err: &ToolError) -> String {
    format!("tool error (not a problem in the file): {}", err)
}

fn file_arg(file: &Path) -> String {
    file.to_string_lossy().to_string()
}

/// Step 1: syntax analysis. Critical.
pub async fn syntax(tool: &dyn ToolRunner, file: &Path, timeout: Duration) -> StepReport {
    let step = StepKind::Syntax;
    if !tool.is_available().await {
        return tool_missing(step, tool.program(), "syntax validation", SYNTAX_INSTALL_HINT);
    }
    match tool.run(&[file_arg(file)], &RunOptions::with_timeout(timeout)).await {
        Ok(out) if out.success() => {
            StepReport::new(step, StepOutcome::Passed).note("Syntax valid - no errors")
        }
        Ok(out) => StepReport::new(step, StepOutcome::Failed)
            .note("Syntax error detected")
            .diagnostic(out.error_text())
            .hint(SYNTAX_FIX_HINT),
        Err(ToolError::NotFound { .. }) => {
            tool_missing(step, tool.program(), "syntax validation", SYNTAX_INSTALL_HINT)
        }
        Err(e @ ToolError::TimedOut { .. }) => StepReport::new(step, StepOutcome::Failed)
            .diagnostic(e.to_string())
            .hint(SYNTAX_FIX_HINT),
        Err(e) => StepReport::new(step, StepOutcome::Failed)
            .diagnostic(tool_error_text(&e))
            .hint(format!("Check the {} installation", tool.program())),
    }
}

/// Step 2: lint. Advisory; any output is surfaced as warnings.
pub async fn lint(tool: &dyn ToolRunner, file: &Path, timeout: Duration) -> StepReport {
    let step = StepKind::Lint;
    if !tool.is_available().await {
        return tool_missing(step, tool.program(), "linting", LINT_INSTALL_HINT);
    }
    match tool.run(&[file_arg(file)], &RunOptions::with_timeout(timeout)).await {
        Ok(out) => {
            let text = out.stdout.trim();
            if text.is_empty() {
                return StepReport::new(step, StepOutcome::Passed).note("Lint clean - no warnings");
            }
            let mut report =
                StepReport::new(step, StepOutcome::PassedWithWarnings).note("Linter warnings:");
            for line in text.lines() {
                report = report.note(format!("  {}", line));
            }
            report.note("Warnings do not block, but should be reviewed")
        }
        Err(ToolError::NotFound { .. }) => {
            tool_missing(step, tool.program(), "linting", LINT_INSTALL_HINT)
        }
        Err(e) => {
            warn!(error = %e, "linter did not complete");
            StepReport::new(step, StepOutcome::PassedWithWarnings)
                .note(format!("Linter did not complete: {}", e))
        }
    }
}

/// Step 3: format check with in-place auto-fix. Advisory, never fails.
///
/// The rewrite happens only after a check reported the file as unformatted.
pub async fn format(tool: &dyn ToolRunner, file: &Path, timeout: Duration) -> StepReport {
    let step = StepKind::Format;
    if !tool.is_available().await {
        return tool_missing(step, tool.program(), "format verification", FORMAT_INSTALL_HINT);
    }
    let opts = RunOptions::with_timeout(timeout);
    let check = tool.run(&["--check".to_string(), file_arg(file)], &opts).await;
    match check {
        Ok(out) if out.success() => {
            StepReport::new(step, StepOutcome::Passed).note("Formatting correct")
        }
        Ok(_) => {
            info!(file = %file.display(), "inconsistent formatting, rewriting file in place");
            match tool.run(&[file_arg(file)], &opts).await {
                Ok(out) if out.success() => StepReport::new(step, StepOutcome::PassedWithWarnings)
                    .note("Inconsistent formatting - auto-corrected"),
                Ok(out) => StepReport::new(step, StepOutcome::PassedWithWarnings)
                    .note("Inconsistent formatting - auto-fix failed")
                    .note(out.error_text().to_string()),
                Err(e) => StepReport::new(step, StepOutcome::PassedWithWarnings)
                    .note(format!("Inconsistent formatting - auto-fix failed: {}", e)),
            }
        }
        Err(ToolError::NotFound { .. }) => {
            tool_missing(step, tool.program(), "format verification", FORMAT_INSTALL_HINT)
        }
        Err(e) => {
            warn!(error = %e, "format check did not complete");
            StepReport::new(step, StepOutcome::PassedWithWarnings)
                .note(format!("Format check did not complete: {}", e))
        }
    }
}

/// Whether `file` is a server-side entry script by suffix convention.
pub fn is_server_script(file: &Path, suffixes: &[String]) -> bool {
    let name = file.to_string_lossy();
    suffixes.iter().any(|s| name.ends_with(s.as_str()))
}

/// Inputs for the build step.
#[derive(Debug, Clone)]
pub struct BuildTarget<'a> {
    pub project_root: &'a Path,
    /// Output file, relative to the project root unless absolute.
    pub output: &'a Path,
    pub server_suffixes: &'a [String],
}

/// Step 4: full project build. Critical, server scripts only.
pub async fn build(
    tool: &dyn ToolRunner,
    file: &Path,
    target: &BuildTarget<'_>,
    timeout: Duration,
) -> StepReport {
    let step = StepKind::Build;
    if !is_server_script(file, target.server_suffixes) {
        debug!(file = %file.display(), "not a server script, build skipped");
        return StepReport::new(step, StepOutcome::Skipped(SkipReason::NotApplicable)).note(
            format!(
                "Only {} scripts get a full build",
                target.server_suffixes.join(" / ")
            ),
        );
    }
    if !tool.is_available().await {
        return tool_missing(step, tool.program(), "build", BUILD_INSTALL_HINT);
    }

    let output = target.project_root.join(target.output);
    if let Some(dir) = output.parent() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            return StepReport::new(step, StepOutcome::Failed)
                .diagnostic(format!("cannot create build directory {}: {}", dir.display(), e))
                .hint(BUILD_FIX_HINT);
        }
    }
    let args = vec![
        "build".to_string(),
        "--output".to_string(),
        output.to_string_lossy().to_string(),
    ];
    let opts = RunOptions::with_timeout(timeout).in_dir(target.project_root);
    match tool.run(&args, &opts).await {
        Ok(out) if out.success() => {
            StepReport::new(step, StepOutcome::Passed).note("Rojo build succeeded")
        }
        Ok(out) => StepReport::new(step, StepOutcome::Failed)
            .note("Rojo build failed")
            .diagnostic(out.error_text())
            .hint(BUILD_FIX_HINT),
        Err(ToolError::NotFound { .. }) => {
            tool_missing(step, tool.program(), "build", BUILD_INSTALL_HINT)
        }
        Err(e @ ToolError::TimedOut { .. }) => StepReport::new(step, StepOutcome::Failed)
            .diagnostic(e.to_string())
            .hint(BUILD_FIX_HINT),
        Err(e) => StepReport::new(step, StepOutcome::Failed)
            .diagnostic(tool_error_text(&e))
            .hint(format!("Check the {} installation", tool.program())),
    }
}
