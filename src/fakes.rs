//! In-memory tool fakes (testing only)
//!
//! `ScriptedTool` answers invocations from a queue of canned results and
//! records every argument list. `FakeFormatter` behaves like a formatter with
//! a check mode and an in-place apply mode.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ToolError;
use crate::tool::{RunOptions, ToolOutput, ToolRunner};

#[derive(Debug, Clone)]
enum Scripted {
    Output(ToolOutput),
    TimeOut,
    LaunchError,
}

/// A tool whose answers are scripted up front.
#[derive(Debug)]
pub struct ScriptedTool {
    program: String,
    installed: bool,
    queue: Mutex<VecDeque<Scripted>>,
    fallback: Scripted,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedTool {
    /// Installed tool that exits 0 with no output unless scripted otherwise.
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            installed: true,
            queue: Mutex::new(VecDeque::new()),
            fallback: Scripted::Output(ToolOutput::default()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Tool that is not installed.
    pub fn missing(program: &str) -> Self {
        Self {
            installed: false,
            ..Self::new(program)
        }
    }

    /// Queue one result for the next invocation.
    pub fn respond(self, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        self.queue.lock().unwrap().push_back(Scripted::Output(ToolOutput {
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }));
        self
    }

    /// Every invocation answers with this result once the queue is drained.
    pub fn always(mut self, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        self.fallback = Scripted::Output(ToolOutput {
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        });
        self
    }

    /// Every invocation exceeds its time budget.
    pub fn timing_out(mut self) -> Self {
        self.fallback = Scripted::TimeOut;
        self
    }

    /// Every invocation fails to launch (e.g. permission denied).
    pub fn unlaunchable(mut self) -> Self {
        self.fallback = Scripted::LaunchError;
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ToolRunner for ScriptedTool {
    fn program(&self) -> &str {
        &self.program
    }

    async fn is_available(&self) -> bool {
        self.installed
    }

    async fn run(&self, args: &[String], opts: &RunOptions) -> Result<ToolOutput, ToolError> {
        if !self.installed {
            return Err(ToolError::NotFound {
                program: self.program.clone(),
            });
        }
        self.calls.lock().unwrap().push(args.to_vec());
        let next = self
            .queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match next {
            Scripted::Output(out) => Ok(out),
            Scripted::TimeOut => Err(ToolError::TimedOut {
                program: self.program.clone(),
                secs: opts.timeout.as_secs(),
            }),
            Scripted::LaunchError => Err(ToolError::Launch {
                program: self.program.clone(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            }),
        }
    }
}

/// Formatter stand-in: a file is formatted when no line has trailing
/// whitespace and it ends with a newline. `--check <file>` reports, a bare
/// `<file>` rewrites in place.
#[derive(Debug, Default)]
pub struct FakeFormatter {
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn format_source(src: &str) -> String {
        let mut out: String = src
            .lines()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n");
        out.push('\n');
        out
    }
}

#[async_trait]
impl ToolRunner for FakeFormatter {
    fn program(&self) -> &str {
        "stylua"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn run(&self, args: &[String], _opts: &RunOptions) -> Result<ToolOutput, ToolError> {
        self.calls.lock().unwrap().push(args.to_vec());
        let check = args.iter().any(|a| a == "--check");
        let file = match args.last() {
            Some(f) => Path::new(f),
            None => {
                return Ok(ToolOutput {
                    exit_code: 2,
                    stderr: "no input".into(),
                    ..ToolOutput::default()
                })
            }
        };
        let src = std::fs::read_to_string(file).map_err(|e| ToolError::Launch {
            program: "stylua".into(),
            source: e,
        })?;
        let formatted = Self::format_source(&src);
        if check {
            let exit_code = if formatted == src { 0 } else { 1 };
            return Ok(ToolOutput {
                exit_code,
                ..ToolOutput::default()
            });
        }
        std::fs::write(file, formatted).map_err(|e| ToolError::Launch {
            program: "stylua".into(),
            source: e,
        })?;
        Ok(ToolOutput::default())
    }
}
