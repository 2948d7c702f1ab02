//! CLI argument parsing via `clap`.

use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

const VALIDATE_AFTER_HELP: &str = "\
Required tools:
  • luau-analyze (CRITICAL) - https://github.com/luau-lang/luau/releases
  • selene (optional)      - cargo install selene
  • stylua (optional)      - cargo install stylua
  • rojo (recommended)     - https://rojo.space/

Validation pipeline:
  1. Luau syntax (luau-analyze) ★ CRITICAL
  2. Linting (selene) - warnings never block
  3. Format (stylua) - auto-corrects in place
  4. Rojo build - .server.lua only ★ CRITICAL

Exit codes:
  0 - Validation passed
  1 - Syntax/build error, missing file, internal error, or cancelled

Example:
  luaugate src/ServerScriptService/GameManager.server.lua";

const BATCH_AFTER_HELP: &str = "\
Examples:
  luaugate-batch --all
  luaugate-batch src/ServerScriptService/GameManager.server.lua src/shared/Modules/EventManager.lua
  luaugate-batch src/**/*.server.lua

Exit codes:
  0 - Every file passed
  1 - At least one file failed, no files found, or cancelled";

#[derive(Parser, Debug)]
#[command(
    name = "luaugate",
    version,
    about = "Headless validator for Roblox/Rojo Luau files",
    long_about = "Validate one Luau file: syntax, lint, format (auto-fix) and, for server scripts, a full Rojo build.\n\nConfiguration precedence: CLI > luaugate.toml > defaults.",
    after_help = VALIDATE_AFTER_HELP
)]
/// Single-file validator options.
pub struct ValidateCli {
    #[arg(help = "File to validate (`help` prints this message)")]
    pub file: Option<PathBuf>,
    #[arg(long, help = "Project root (default: detected from the current dir)")]
    pub project_root: Option<PathBuf>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(short, long, action = clap::ArgAction::SetTrue, help = "Enable debug logging on stderr")]
    pub verbose: bool,
}

impl ValidateCli {
    /// No file, or the literal `help`, means print usage and exit 0.
    pub fn wants_help(&self) -> bool {
        match self.file.as_deref() {
            None => true,
            Some(p) => p.as_os_str() == "help",
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "luaugate-batch",
    version,
    about = "Batch validator for Roblox/Rojo Luau files",
    long_about = "Validate many Luau files, one isolated validator run per file, and print a pass/fail summary.",
    after_help = BATCH_AFTER_HELP
)]
/// Batch runner options.
pub struct BatchCli {
    #[arg(help = "Files to validate")]
    pub files: Vec<PathBuf>,
    #[arg(long, action = clap::ArgAction::SetTrue, conflicts_with = "files", help = "Discover and validate every Luau file under the source root")]
    pub all: bool,
    #[arg(long, help = "Project root (default: detected from the current dir)")]
    pub project_root: Option<PathBuf>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, help = "Path to the luaugate validator binary (default: next to this executable)")]
    pub validator: Option<PathBuf>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Validate inside this process instead of spawning the validator")]
    pub in_process: bool,
    #[arg(short, long, action = clap::ArgAction::SetTrue, help = "Enable debug logging on stderr")]
    pub verbose: bool,
}

impl BatchCli {
    pub fn wants_help(&self) -> bool {
        !self.all && self.files.is_empty()
    }
}

/// Help and version output are requests, not failures.
pub fn is_informational(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

/// Print a parse error and map it onto the 0/1 exit contract.
pub fn exit_on_parse_error(err: clap::Error) -> ExitCode {
    let _ = err.print();
    if is_informational(&err) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_help_word() {
        let cli = ValidateCli::parse_from(["luaugate", "help"]);
        assert!(cli.wants_help());
        let cli = ValidateCli::parse_from(["luaugate"]);
        assert!(cli.wants_help());
        let cli = ValidateCli::parse_from(["luaugate", "--output", "json", "a.lua"]);
        assert!(!cli.wants_help());
        assert_eq!(cli.output.as_deref(), Some("json"));
    }

    #[test]
    fn test_batch_args() {
        let cli = BatchCli::parse_from(["luaugate-batch"]);
        assert!(cli.wants_help());
        let cli = BatchCli::parse_from(["luaugate-batch", "--all"]);
        assert!(cli.all && !cli.wants_help());
        let cli = BatchCli::parse_from(["luaugate-batch", "a.lua", "b.server.lua"]);
        assert_eq!(cli.files.len(), 2);
        assert!(BatchCli::try_parse_from(["luaugate-batch", "--all", "a.lua"]).is_err());
    }

    #[test]
    fn test_usage_errors_are_not_informational() {
        let err = ValidateCli::try_parse_from(["luaugate", "a.lua", "b.lua"]).unwrap_err();
        assert!(!is_informational(&err));
        let err = BatchCli::try_parse_from(["luaugate-batch", "--bogus"]).unwrap_err();
        assert!(!is_informational(&err));
        let err = ValidateCli::try_parse_from(["luaugate", "--help"]).unwrap_err();
        assert!(is_informational(&err));
        let err = BatchCli::try_parse_from(["luaugate-batch", "--version"]).unwrap_err();
        assert!(is_informational(&err));
    }
}
