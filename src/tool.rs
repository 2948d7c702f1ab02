//! External tool collaborators.
//!
//! Every tool is driven through [`ToolRunner`]: a presence probe and a
//! bounded invocation returning exit code plus captured output. The
//! process-backed implementation is [`CommandTool`].

use crate::error::ToolError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// Captured result of one tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stderr if present, otherwise stdout; what a failure should show.
    pub fn error_text(&self) -> &str {
        if self.stderr.trim().is_empty() {
            self.stdout.trim_end()
        } else {
            self.stderr.trim_end()
        }
    }
}

/// Per-invocation options.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub cwd: Option<PathBuf>,
    pub timeout: Duration,
}

impl RunOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { cwd: None, timeout }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

/// Typed collaborator interface for an external tool.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Program name used in messages.
    fn program(&self) -> &str;

    /// Capability check, decoupled from the validating invocation.
    async fn is_available(&self) -> bool;

    /// Run the tool with `args`, bounded by `opts.timeout`.
    async fn run(&self, args: &[String], opts: &RunOptions) -> Result<ToolOutput, ToolError>;
}

/// A tool backed by a real executable on `PATH` (or an explicit path).
#[derive(Debug, Clone)]
pub struct CommandTool {
    program: String,
    probe_timeout: Duration,
}

impl CommandTool {
    pub fn new(program: impl Into<String>, probe_timeout: Duration) -> Self {
        Self {
            program: program.into(),
            probe_timeout,
        }
    }
}

#[async_trait]
impl ToolRunner for CommandTool {
    fn program(&self) -> &str {
        &self.program
    }

    async fn is_available(&self) -> bool {
        let probe = RunOptions::with_timeout(self.probe_timeout);
        match self.run(&["--version".to_string()], &probe).await {
            Ok(_) => true,
            Err(ToolError::NotFound { .. }) | Err(ToolError::TimedOut { .. }) => {
                debug!(program = %self.program, "tool probe failed; treating as not installed");
                false
            }
            // Present but not runnable: let the real invocation report it.
            Err(ToolError::Launch { .. }) => true,
        }
    }

    async fn run(&self, args: &[String], opts: &RunOptions) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = opts.cwd.as_ref() {
            cmd.current_dir(dir);
        }
        debug!(program = %self.program, ?args, cwd = ?opts.cwd, "spawning tool");

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ToolError::NotFound {
                    program: self.program.clone(),
                }
            } else {
                ToolError::Launch {
                    program: self.program.clone(),
                    source: e,
                }
            }
        })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(opts.timeout, child.wait_with_output())
            .await
            .map_err(|_| ToolError::TimedOut {
                program: self.program.clone(),
                secs: opts.timeout.as_secs(),
            })?
            .map_err(|e| ToolError::Launch {
                program: self.program.clone(),
                source: e,
            })?;

        let out = ToolOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        debug!(
            program = %self.program,
            exit_code = out.exit_code,
            duration_ms = start.elapsed().as_millis() as u64,
            "tool finished"
        );
        Ok(out)
    }
}
