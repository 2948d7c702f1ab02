//! Output rendering for single-file and batch runs.
//!
//! Supports `human` (default) and `json` outputs. Human renderers are pure
//! functions returning strings so the layout can be tested; the `print_*`
//! wrappers only decide where the text goes.

use crate::batch::BatchEvent;
use crate::config::OutputMode;
use crate::discovery::display_path;
use crate::models::{
    BatchReport, FileValidationResult, SkipReason, StepKind, StepOutcome, StepReport, TOTAL_STEPS,
};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::path::Path;

const WIDTH: usize = 70;

pub fn use_colors(output: OutputMode) -> bool {
    output != OutputMode::Json && std::env::var_os("NO_COLOR").is_none()
}

/// `error:` tag for stderr messages.
pub fn error_prefix() -> String {
    if std::env::var_os("NO_COLOR").is_some() {
        "✖ error:".to_string()
    } else {
        "✖ error:".red().bold().to_string()
    }
}

/// `warn:` tag for stderr messages.
pub fn warn_prefix() -> String {
    if std::env::var_os("NO_COLOR").is_some() {
        "⚠ warn:".to_string()
    } else {
        "⚠ warn:".yellow().bold().to_string()
    }
}

#[derive(Clone, Copy)]
enum Tone {
    Ok,
    Warn,
    Err,
    Info,
    Title,
}

fn paint(text: &str, tone: Tone, bold: bool, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    let s = match tone {
        Tone::Ok => text.green().to_string(),
        Tone::Warn => text.yellow().to_string(),
        Tone::Err => text.red().to_string(),
        Tone::Info => text.cyan().to_string(),
        Tone::Title => text.blue().to_string(),
    };
    if bold {
        s.bold().to_string()
    } else {
        s
    }
}

fn rule(ch: char) -> String {
    ch.to_string().repeat(WIDTH)
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

fn banner(text: &str, tone: Tone, color: bool) -> Vec<String> {
    vec![
        paint(&rule('='), tone, true, color),
        paint(&format!("{:^width$}", text, width = WIDTH), tone, true, color),
        paint(&rule('='), tone, true, color),
    ]
}

fn step_title(step: StepKind) -> &'static str {
    match step {
        StepKind::Syntax => "Validating Luau syntax",
        StepKind::Lint => "Running linter",
        StepKind::Format => "Checking format",
        StepKind::Build => "Rojo build",
    }
}

fn failure_title(step: StepKind) -> &'static str {
    match step {
        StepKind::Syntax => "SYNTAX ERROR",
        StepKind::Lint => "LINT ERROR",
        StepKind::Format => "FORMAT ERROR",
        StepKind::Build => "ROJO BUILD ERROR",
    }
}

fn outcome_mark(outcome: StepOutcome) -> (&'static str, Tone) {
    match outcome {
        StepOutcome::Passed => ("✓", Tone::Ok),
        StepOutcome::PassedWithWarnings => ("⚠", Tone::Warn),
        StepOutcome::Skipped(SkipReason::ToolMissing) => ("⚠", Tone::Warn),
        StepOutcome::Skipped(SkipReason::NotApplicable) => ("ℹ", Tone::Info),
        StepOutcome::Failed => ("✖", Tone::Err),
    }
}

fn render_step(step: &StepReport, name: &str, color: bool) -> Vec<String> {
    let mut lines = vec![paint(
        &format!(
            "[{}/{}] {}: {}",
            step.step.number(),
            TOTAL_STEPS,
            step_title(step.step),
            name
        ),
        Tone::Info,
        false,
        color,
    )];
    let (mark, tone) = outcome_mark(step.outcome);
    for (i, note) in step.notes.iter().enumerate() {
        let text = if i == 0 {
            format!("   {} {}", mark, note)
        } else {
            format!("     {}", note)
        };
        lines.push(paint(&text, tone, false, color));
    }
    if let Some(diag) = step.diagnostic.as_deref() {
        lines.push(paint(&rule('─'), Tone::Err, false, color));
        lines.extend(diag.lines().map(|l| l.to_string()));
        lines.push(paint(&rule('─'), Tone::Err, false, color));
    }
    if let Some(hint) = step.hint.as_deref() {
        lines.push(paint(&format!("💡 Suggestion: {}", hint), Tone::Warn, false, color));
    }
    lines
}

/// Full human report for one file.
pub fn render_file_result(res: &FileValidationResult, color: bool) -> String {
    let name = file_name(&res.path);
    let mut lines = banner(&format!("🔍 HEADLESS VALIDATION: {}", name), Tone::Title, color);
    lines.push(String::new());

    if res.steps.is_empty() && !res.success {
        let msg = res.error.as_deref().unwrap_or("validation did not run");
        lines.push(paint(&format!("❌ {}", msg), Tone::Err, false, color));
        return lines.join("\n");
    }

    lines.push(paint(&format!("📄 File: {}", res.path), Tone::Info, false, color));
    if let Some(info) = res.info {
        lines.push(paint(
            &format!(
                "📊 Lines: {} total, {} code",
                info.total_lines, info.code_lines
            ),
            Tone::Info,
            false,
            color,
        ));
    }
    lines.push(String::new());

    for step in &res.steps {
        lines.extend(render_step(step, &name, color));
    }
    lines.push(String::new());

    let done = res.steps_completed();
    if res.success {
        lines.extend(banner(
            "✅ VALIDATION PASSED - FILE APPROVED",
            Tone::Ok,
            color,
        ));
        lines.push(paint(
            &format!("All steps completed: {}/{}", done, TOTAL_STEPS),
            Tone::Ok,
            false,
            color,
        ));
        lines.push(paint(
            "The file is ready to sync with Roblox",
            Tone::Ok,
            false,
            color,
        ));
    } else {
        let failed = res.failed_step();
        let title = failed
            .map(|s| failure_title(s.step))
            .unwrap_or("UNKNOWN ERROR");
        lines.extend(banner(
            &format!("❌ VALIDATION FAILED - {}", title),
            Tone::Err,
            color,
        ));
        lines.push(paint(
            &format!("Steps completed: {}/{}", done, TOTAL_STEPS),
            Tone::Warn,
            false,
            color,
        ));
        if let Some(hint) = failed.and_then(|s| s.hint.as_deref()) {
            lines.push(paint(
                &format!("Action required: {}", hint),
                Tone::Warn,
                false,
                color,
            ));
        }
        if let Some(e) = res.error.as_deref() {
            lines.push(paint(e, Tone::Err, false, color));
        }
    }
    lines.join("\n")
}

/// Print a single-file result in the requested format.
pub fn print_file_result(res: &FileValidationResult, output: OutputMode) {
    match output {
        OutputMode::Json => println!("{}", compose_file_json(res)),
        OutputMode::Human => println!("\n{}\n", render_file_result(res, use_colors(output))),
    }
}

pub fn render_batch_header(total: usize, color: bool) -> String {
    banner(
        &format!("BATCH VALIDATION - {} files", total),
        Tone::Title,
        color,
    )
    .join("\n")
}

/// One progress entry; `base` shortens displayed paths.
pub fn render_batch_event(ev: &BatchEvent<'_>, base: &Path, color: bool) -> String {
    match ev {
        BatchEvent::Started { index, total, file } => paint(
            &format!(
                "[{}/{}] Validating: {}",
                index,
                total,
                display_path(file, base)
            ),
            Tone::Info,
            false,
            color,
        ),
        BatchEvent::Finished { result, .. } => {
            if result.success {
                return paint("✓ Passed", Tone::Ok, false, color) + "\n";
            }
            let mut lines = vec![paint("✗ Failed", Tone::Err, false, color)];
            for block in failure_excerpt(result) {
                lines.push(paint(&format!("  {}", block), Tone::Err, false, color));
            }
            lines.push(String::new());
            lines.join("\n")
        }
        BatchEvent::Cancelled { .. } => {
            paint("⚠ Cancelled - not validated", Tone::Warn, false, color) + "\n"
        }
    }
}

/// The few lines worth showing under a failing file in batch mode.
fn failure_excerpt(res: &FileValidationResult) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(step) = res.failed_step() {
        out.push(format!(
            "ERROR in {} step ({}/{} steps completed)",
            step.step.name(),
            res.steps_completed(),
            TOTAL_STEPS
        ));
    }
    for diag in res.diagnostics() {
        out.extend(diag.lines().map(|l| l.to_string()));
    }
    out
}

pub fn render_batch_summary(report: &BatchReport, base: &Path, color: bool) -> String {
    let mut lines = vec![String::new()];
    lines.extend(banner("VALIDATION SUMMARY", Tone::Title, color));
    lines.push(String::new());
    if report.cancelled {
        lines.push(paint(
            "⚠ Batch cancelled by the user; remaining files were not validated",
            Tone::Warn,
            true,
            color,
        ));
    }
    lines.push(format!("Total files: {}", report.total()));
    lines.push(paint(
        &format!(
            "Passed: {} ({:.1}%)",
            report.passed(),
            report.percent(report.passed())
        ),
        Tone::Ok,
        false,
        color,
    ));
    lines.push(paint(
        &format!(
            "Failed: {} ({:.1}%)",
            report.failed(),
            report.percent(report.failed())
        ),
        Tone::Err,
        false,
        color,
    ));
    lines.push(String::new());

    let failing = report.failing_paths();
    if !failing.is_empty() {
        lines.push(paint("Files with errors:", Tone::Err, false, color));
        for p in failing {
            lines.push(paint(
                &format!("  • {}", display_path(Path::new(p), base)),
                Tone::Err,
                false,
                color,
            ));
        }
    } else if report.success() {
        lines.push(paint(
            "✅ All files validated successfully!",
            Tone::Ok,
            true,
            color,
        ));
    }
    lines.join("\n")
}

/// Compose the JSON document for one file (also the validator's wire format).
pub fn compose_file_json(res: &FileValidationResult) -> JsonVal {
    serde_json::to_value(res).unwrap_or(JsonVal::Null)
}

/// Compose batch JSON: per-file results plus a summary.
pub fn compose_batch_json(report: &BatchReport) -> JsonVal {
    let results: Vec<JsonVal> = report.results.iter().map(compose_file_json).collect();
    json!({
        "results": results,
        "summary": {
            "total": report.total(),
            "passed": report.passed(),
            "failed": report.failed(),
            "failing": report.failing_paths(),
            "cancelled": report.cancelled,
            "success": report.success(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_build() -> FileValidationResult {
        FileValidationResult::from_steps(
            "src/Main.server.lua",
            None,
            vec![
                StepReport::new(StepKind::Syntax, StepOutcome::Passed).note("Syntax valid"),
                StepReport::new(StepKind::Lint, StepOutcome::PassedWithWarnings)
                    .note("Linter warnings:")
                    .note("  unused x"),
                StepReport::new(StepKind::Format, StepOutcome::Passed),
                StepReport::new(StepKind::Build, StepOutcome::Failed)
                    .diagnostic("Rojo project not found")
                    .hint("Check the Rojo configuration or the file structure"),
            ],
        )
    }

    #[test]
    fn test_render_failure_shows_step_and_progress() {
        let text = render_file_result(&failing_build(), false);
        assert!(text.contains("HEADLESS VALIDATION: Main.server.lua"));
        assert!(text.contains("[4/4] Rojo build"));
        assert!(text.contains("VALIDATION FAILED - ROJO BUILD ERROR"));
        assert!(text.contains("Steps completed: 3/4"));
        assert!(text.contains("Rojo project not found"));
        assert!(text.contains("Action required: Check the Rojo configuration"));
    }

    #[test]
    fn test_render_missing_file() {
        let res = FileValidationResult::input_failure("x.lua", "File does not exist: x.lua");
        let text = render_file_result(&res, false);
        assert!(text.contains("❌ File does not exist: x.lua"));
        assert!(!text.contains("Steps completed"));
    }

    #[test]
    fn test_batch_summary_lists_failures() {
        let mut report = BatchReport::default();
        report.push(FileValidationResult::from_steps("/p/src/a.lua", None, Vec::new()));
        report.push(failing_build());
        let text = render_batch_summary(&report, Path::new("/p"), false);
        assert!(text.contains("Total files: 2"));
        assert!(text.contains("Passed: 1 (50.0%)"));
        assert!(text.contains("Failed: 1 (50.0%)"));
        assert!(text.contains("  • src/Main.server.lua"));
        assert!(!text.contains("All files validated"));
    }

    #[test]
    fn test_batch_event_failure_excerpt() {
        let res = failing_build();
        let ev = BatchEvent::Finished {
            index: 1,
            total: 1,
            result: &res,
        };
        let text = render_batch_event(&ev, Path::new("."), false);
        assert!(text.starts_with("✗ Failed"));
        assert!(text.contains("ERROR in build step (3/4 steps completed)"));
        assert!(text.contains("Rojo project not found"));
    }

    #[test]
    fn test_batch_event_cancelled_closes_progress_line() {
        let ev = BatchEvent::Cancelled {
            index: 2,
            total: 3,
            file: Path::new("src/b.lua"),
        };
        let text = render_batch_event(&ev, Path::new("."), false);
        assert!(text.starts_with("⚠ Cancelled"));
    }

    #[test]
    fn test_compose_batch_json_shape() {
        let mut report = BatchReport::default();
        report.push(failing_build());
        let out = compose_batch_json(&report);
        assert_eq!(out["summary"]["failed"], 1);
        assert_eq!(out["summary"]["success"], false);
        assert_eq!(out["results"][0]["steps"][3]["outcome"]["status"], "failed");
        assert_eq!(out["summary"]["failing"][0], "src/Main.server.lua");
    }
}
