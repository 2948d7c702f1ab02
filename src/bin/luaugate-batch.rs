//! luaugate batch runner entry point.
//! Validates an explicit list of files, or every discovered file with `--all`.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use luaugate::batch::{self, FileCheck, ValidatorProcess};
use luaugate::cli::{exit_on_parse_error, BatchCli};
use luaugate::config::{self, OutputMode};
use luaugate::error::BatchError;
use luaugate::pipeline::Pipeline;
use luaugate::{discovery, output, shutdown, telemetry};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match BatchCli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return exit_on_parse_error(e),
    };
    if cli.wants_help() {
        let _ = BatchCli::command().print_long_help();
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

async fn run(cli: BatchCli) -> Result<ExitCode> {
    let eff = config::resolve_effective(cli.project_root.as_deref(), cli.output.as_deref())
        .context("loading configuration")?;

    let files: Vec<PathBuf> = if cli.all {
        match discovery::discover(&eff.project_root, &eff.discover_root, &eff.discover_patterns) {
            Ok(found) => found,
            Err(e @ BatchError::NoFilesFound { .. }) => {
                eprintln!("{} {}", output::error_prefix(), e);
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        cli.files.clone()
    };
    info!(count = files.len(), all = cli.all, "batch input resolved");

    let checker: Box<dyn FileCheck> = if cli.in_process {
        Box::new(Pipeline::from_config(&eff))
    } else {
        let budget = batch::child_budget(&eff.timeouts);
        let vp = match cli.validator {
            Some(path) => ValidatorProcess::at(path, budget)?,
            None => ValidatorProcess::sibling(budget)?,
        };
        Box::new(vp.with_project_root(&eff.project_root))
    };

    let human = eff.output == OutputMode::Human;
    let color = output::use_colors(eff.output);
    if human {
        println!("\n{}\n", output::render_batch_header(files.len(), color));
    }

    let base = eff.project_root.clone();
    let task = tokio::spawn(async move {
        batch::run_batch(&files, checker.as_ref(), shutdown::interrupted(), move |ev| {
            if human {
                println!("{}", output::render_batch_event(&ev, &base, color));
            }
        })
        .await
    });
    let report = task.await.context("batch task panicked")?;

    match eff.output {
        OutputMode::Json => println!("{}", output::compose_batch_json(&report)),
        OutputMode::Human => {
            println!(
                "{}\n",
                output::render_batch_summary(&report, &eff.project_root, color)
            );
        }
    }
    Ok(if report.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
