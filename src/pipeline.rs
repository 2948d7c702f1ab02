//! Single-file validation pipeline.
//!
//! Fixed order: syntax (critical), lint (advisory), format (advisory,
//! auto-fix), build (critical, server scripts only). A failed critical step
//! ends the pipeline; the format rewrite is unconditional once reached.

use crate::config::{Effective, Timeouts};
use crate::models::{FileInfo, FileValidationResult, StepReport};
use crate::steps::{self, BuildTarget};
use crate::tool::{CommandTool, ToolRunner};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// The four collaborators, one per step.
#[derive(Clone)]
pub struct Toolset {
    pub syntax: Arc<dyn ToolRunner>,
    pub lint: Arc<dyn ToolRunner>,
    pub format: Arc<dyn ToolRunner>,
    pub build: Arc<dyn ToolRunner>,
}

impl Toolset {
    /// Process-backed tools named by the configuration.
    pub fn from_config(eff: &Effective) -> Self {
        let probe = eff.timeouts.probe;
        Self {
            syntax: Arc::new(CommandTool::new(&eff.syntax_tool, probe)),
            lint: Arc::new(CommandTool::new(&eff.lint_tool, probe)),
            format: Arc::new(CommandTool::new(&eff.format_tool, probe)),
            build: Arc::new(CommandTool::new(&eff.build_tool, probe)),
        }
    }
}

/// Non-tool inputs of the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub project_root: PathBuf,
    pub build_output: PathBuf,
    pub server_suffixes: Vec<String>,
    pub timeouts: Timeouts,
}

impl PipelineSettings {
    pub fn from_config(eff: &Effective) -> Self {
        Self {
            project_root: eff.project_root.clone(),
            build_output: eff.build_output.clone(),
            server_suffixes: eff.server_suffixes.clone(),
            timeouts: eff.timeouts.clone(),
        }
    }
}

pub struct Pipeline {
    tools: Toolset,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(tools: Toolset, settings: PipelineSettings) -> Self {
        Self { tools, settings }
    }

    pub fn from_config(eff: &Effective) -> Self {
        Self::new(Toolset::from_config(eff), PipelineSettings::from_config(eff))
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Validate one file. Never errors: every problem lands in the result.
    pub async fn validate(&self, file: &Path) -> FileValidationResult {
        let shown = file.to_string_lossy().to_string();
        if !file.is_file() {
            info!(file = %shown, "file does not exist");
            return FileValidationResult::input_failure(
                shown.clone(),
                format!("File does not exist: {}", shown),
            );
        }
        let info = match fs::read_to_string(file) {
            Ok(src) => Some(FileInfo::from_source(&src)),
            Err(e) => {
                debug!(file = %shown, error = %e, "cannot read file for line counts");
                None
            }
        };

        let t = &self.settings.timeouts;
        let mut steps: Vec<StepReport> = Vec::with_capacity(crate::models::TOTAL_STEPS);

        let syntax = steps::syntax(self.tools.syntax.as_ref(), file, t.syntax).await;
        let abort = syntax.outcome.is_failed();
        steps.push(syntax);
        if abort {
            info!(file = %shown, "syntax check failed, pipeline aborted");
            return FileValidationResult::from_steps(shown, info, steps);
        }

        steps.push(steps::lint(self.tools.lint.as_ref(), file, t.lint).await);
        steps.push(steps::format(self.tools.format.as_ref(), file, t.format).await);

        let target = BuildTarget {
            project_root: &self.settings.project_root,
            output: &self.settings.build_output,
            server_suffixes: &self.settings.server_suffixes,
        };
        steps.push(steps::build(self.tools.build.as_ref(), file, &target, t.build).await);

        let result = FileValidationResult::from_steps(shown, info, steps);
        info!(file = %result.path, success = result.success, "validation finished");
        result
    }
}
