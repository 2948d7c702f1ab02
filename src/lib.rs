//! luaugate core library.
//!
//! Validates Roblox/Rojo Luau sources by driving external tools: a syntax
//! analyzer, a linter, a formatter, and the Rojo project builder. The two
//! binaries (`luaugate`, `luaugate-batch`) are thin shells over this crate.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing for both binaries.
//! - `config`: Discovery and effective configuration resolution.
//! - `tool`: Typed collaborator interface over external executables.
//! - `steps`: One adapter per tool, mapping exit codes to step outcomes.
//! - `pipeline`: The fixed four-step single-file pipeline.
//! - `batch`: Sequential multi-file runs and aggregation.
//! - `discovery`: Glob-based candidate file discovery.
//! - `models`: Step, file and batch result types.
//! - `output`: Human/JSON printers.
//! - `fakes`: Scripted tools for tests.
pub mod batch;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
#[doc(hidden)]
pub mod fakes;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod shutdown;
pub mod steps;
pub mod telemetry;
pub mod tool;
