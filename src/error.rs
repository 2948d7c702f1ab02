//! Error types shared by the library modules.
//!
//! Step-level problems never show up here: they are folded into
//! `StepOutcome`s by the pipeline. These errors cover tool invocation,
//! configuration and batch input handling.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain a result from an external tool.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{program} is not installed or not on PATH")]
    NotFound { program: String },

    #[error("{program} timed out after {secs} seconds")]
    TimedOut { program: String, secs: u64 },

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration discovery/parse problems.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown output mode '{0}' (expected human|json)")]
    OutputMode(String),
}

/// Batch input problems.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("no Luau files found under {}", root.display())]
    NoFilesFound { root: PathBuf },

    #[error("invalid discovery pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("validator binary not found at {}", path.display())]
    ValidatorMissing { path: PathBuf },
}
