//! luaugate single-file validator entry point.
//! Runs the pipeline on one file and prints the result.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use luaugate::cli::{exit_on_parse_error, ValidateCli};
use luaugate::pipeline::Pipeline;
use luaugate::{config, output, shutdown, telemetry};
use std::process::ExitCode;
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match ValidateCli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return exit_on_parse_error(e),
    };
    if cli.wants_help() {
        let _ = ValidateCli::command().print_long_help();
        println!();
        return ExitCode::SUCCESS;
    }
    telemetry::init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\n{} Unexpected error: {:#}", output::error_prefix(), e);
            eprintln!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: ValidateCli) -> Result<ExitCode> {
    let file = cli.file.context("no file given")?;
    let eff = config::resolve_effective(cli.project_root.as_deref(), cli.output.as_deref())
        .context("loading configuration")?;
    debug!(root = %eff.project_root.display(), config = ?eff.config_path, "configuration resolved");

    let pipeline = Pipeline::from_config(&eff);
    let mut task = tokio::spawn(async move { pipeline.validate(&file).await });

    tokio::select! {
        joined = &mut task => {
            let res = joined.context("validation task panicked")?;
            output::print_file_result(&res, eff.output);
            Ok(if res.success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        _ = shutdown::interrupted() => {
            task.abort();
            eprintln!("\n\n{} Validation cancelled by the user", output::warn_prefix());
            Ok(ExitCode::FAILURE)
        }
    }
}
