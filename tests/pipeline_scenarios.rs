//! End-to-end pipeline and batch scenarios with scripted tools.

use luaugate::batch::run_batch;
use luaugate::config::{default_patterns, Timeouts};
use luaugate::discovery::discover;
use luaugate::error::BatchError;
use luaugate::fakes::{FakeFormatter, ScriptedTool};
use luaugate::models::{SkipReason, StepKind, StepOutcome};
use luaugate::pipeline::{Pipeline, PipelineSettings, Toolset};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

struct Rig {
    syntax: Arc<ScriptedTool>,
    lint: Arc<ScriptedTool>,
    format: Arc<FakeFormatter>,
    build: Arc<ScriptedTool>,
}

impl Rig {
    fn new(syntax: ScriptedTool, lint: ScriptedTool, build: ScriptedTool) -> Self {
        Self {
            syntax: Arc::new(syntax),
            lint: Arc::new(lint),
            format: Arc::new(FakeFormatter::new()),
            build: Arc::new(build),
        }
    }

    fn pipeline(&self, root: &Path) -> Pipeline {
        let tools = Toolset {
            syntax: self.syntax.clone(),
            lint: self.lint.clone(),
            format: self.format.clone(),
            build: self.build.clone(),
        };
        let settings = PipelineSettings {
            project_root: root.to_path_buf(),
            build_output: PathBuf::from("build/validation.rbxl"),
            server_suffixes: vec![".server.lua".to_string(), ".server.luau".to_string()],
            timeouts: Timeouts::default(),
        };
        Pipeline::new(tools, settings)
    }
}

fn write(root: &Path, rel: &str, body: &str) -> PathBuf {
    let p = root.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(&p, body).unwrap();
    p
}

/// Test: a missing syntax analyzer is skipped and never blocks later steps
#[tokio::test]
async fn test_missing_syntax_tool_does_not_block() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "src/a.lua", "return 1\n");
    let rig = Rig::new(
        ScriptedTool::missing("luau-analyze"),
        ScriptedTool::new("selene"),
        ScriptedTool::new("rojo"),
    );

    let res = rig.pipeline(dir.path()).validate(&file).await;

    assert!(res.success);
    assert_eq!(
        res.outcome_of(StepKind::Syntax),
        Some(StepOutcome::Skipped(SkipReason::ToolMissing))
    );
    assert_eq!(res.steps.len(), 4);
    assert_eq!(rig.lint.call_count(), 1);
}

/// Test: a syntax error aborts after exactly one step
#[tokio::test]
async fn test_syntax_error_aborts_pipeline() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "src/a.lua", "local function f(\n");
    let rig = Rig::new(
        ScriptedTool::new("luau-analyze").respond(1, "", "a.lua(2,0): SyntaxError: Expected ')'"),
        ScriptedTool::new("selene"),
        ScriptedTool::new("rojo"),
    );

    let res = rig.pipeline(dir.path()).validate(&file).await;

    assert!(!res.success);
    assert_eq!(res.steps.len(), 1);
    assert_eq!(res.steps_completed(), 0);
    assert!(res.diagnostics()[0].contains("SyntaxError"));
    assert_eq!(rig.lint.call_count(), 0);
    assert!(rig.format.calls().is_empty());
    assert_eq!(rig.build.call_count(), 0);
    // Format never ran, so the file is untouched.
    assert_eq!(fs::read_to_string(&file).unwrap(), "local function f(\n");
}

/// Test: non-server files skip the build no matter what the builder would say
#[tokio::test]
async fn test_non_server_file_skips_build() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "src/shared/Util.lua", "return {}\n");
    let rig = Rig::new(
        ScriptedTool::new("luau-analyze"),
        ScriptedTool::new("selene").respond(0, "warning[unused_variable]: x", ""),
        ScriptedTool::new("rojo").always(1, "", "broken project"),
    );

    let res = rig.pipeline(dir.path()).validate(&file).await;

    assert!(res.success);
    assert_eq!(
        res.outcome_of(StepKind::Build),
        Some(StepOutcome::Skipped(SkipReason::NotApplicable))
    );
    assert_eq!(
        res.outcome_of(StepKind::Lint),
        Some(StepOutcome::PassedWithWarnings)
    );
    assert_eq!(rig.build.call_count(), 0);
}

/// Test: server script with a failing build fails after four steps
#[tokio::test]
async fn test_server_build_failure() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "src/b.server.lua", "print('x')   \n");
    let rig = Rig::new(
        ScriptedTool::new("luau-analyze"),
        ScriptedTool::new("selene"),
        ScriptedTool::new("rojo").respond(1, "", "[ERROR] Couldn't find default.project.json"),
    );

    let res = rig.pipeline(dir.path()).validate(&file).await;

    assert!(!res.success);
    assert_eq!(res.steps.len(), 4);
    assert_eq!(res.steps_completed(), 3);
    assert_eq!(res.failed_step().map(|s| s.step), Some(StepKind::Build));
    // The auto-fix already happened even though the file failed overall.
    assert_eq!(fs::read_to_string(&file).unwrap(), "print('x')\n");
    assert!(dir.path().join("build").is_dir());
}

/// Test: a hung build is a failure, not a hang
#[tokio::test]
async fn test_build_timeout_fails() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "src/Main.server.luau", "return nil\n");
    let rig = Rig::new(
        ScriptedTool::new("luau-analyze"),
        ScriptedTool::new("selene"),
        ScriptedTool::new("rojo").timing_out(),
    );

    let res = rig.pipeline(dir.path()).validate(&file).await;

    assert!(!res.success);
    let build = res.failed_step().unwrap();
    assert!(build.diagnostic.as_deref().unwrap().contains("timed out"));
}

/// Test: running the pipeline twice leaves a formatted file alone the second time
#[tokio::test]
async fn test_format_autofix_idempotent_across_runs() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "src/c.lua", "local a = 1  \nreturn a");
    let rig = Rig::new(
        ScriptedTool::new("luau-analyze"),
        ScriptedTool::new("selene"),
        ScriptedTool::new("rojo"),
    );
    let pipeline = rig.pipeline(dir.path());

    let first = pipeline.validate(&file).await;
    let after_first = fs::read_to_string(&file).unwrap();
    let second = pipeline.validate(&file).await;

    assert_eq!(
        first.outcome_of(StepKind::Format),
        Some(StepOutcome::PassedWithWarnings)
    );
    assert_eq!(second.outcome_of(StepKind::Format), Some(StepOutcome::Passed));
    assert_eq!(fs::read_to_string(&file).unwrap(), after_first);
}

/// Test: batch of three with one missing file
#[tokio::test]
async fn test_batch_with_missing_file() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "src/a.lua", "return 1\n");
    let c = write(dir.path(), "src/c.lua", "return 3\n");
    let missing = dir.path().join("src/missing.lua");
    let rig = Rig::new(
        ScriptedTool::new("luau-analyze"),
        ScriptedTool::new("selene"),
        ScriptedTool::new("rojo"),
    );
    let pipeline = rig.pipeline(dir.path());
    let files = vec![a, missing.clone(), c];

    let report = run_batch(&files, &pipeline, std::future::pending(), |_| {}).await;

    assert_eq!(report.total(), 3);
    assert_eq!(report.passed(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(
        report.failing_paths(),
        vec![missing.to_string_lossy().as_ref()]
    );
    assert!(!report.success());
}

/// Test: discovery over an empty source tree reports no files
#[test]
fn test_discover_empty_tree() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    let err = discover(dir.path(), Path::new("src"), &default_patterns()).unwrap_err();
    assert!(matches!(err, BatchError::NoFilesFound { .. }));
    assert!(err.to_string().contains("no Luau files found"));
}
