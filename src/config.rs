//! Configuration discovery and effective settings resolution.
//!
//! luaugate reads `luaugate.toml|yaml|yml` from the project root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `output`: `human`
//! - `tools`: `luau-analyze`, `selene`, `stylua`, `rojo`
//! - `timeouts`: probe 5s, syntax/lint/format 60s, build 30s
//! - `build.output`: `build/validation.rbxl`
//! - `build.server_suffixes`: `.server.lua`, `.server.luau`
//! - `discover.root`: `src`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_NAMES: [&str; 3] = ["luaugate.toml", "luaugate.yaml", "luaugate.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Tool binary overrides under `[tools]`.
pub struct ToolsCfg {
    pub syntax: Option<String>,
    pub lint: Option<String>,
    pub format: Option<String>,
    pub build: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Time budgets in seconds under `[timeouts]`.
pub struct TimeoutsCfg {
    pub probe: Option<u64>,
    pub syntax: Option<u64>,
    pub lint: Option<u64>,
    pub format: Option<u64>,
    pub build: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct BuildCfg {
    pub output: Option<String>,
    pub server_suffixes: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct DiscoverCfg {
    pub root: Option<String>,
    pub patterns: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `luaugate.toml|yaml`.
pub struct GateConfig {
    pub output: Option<String>,
    #[serde(default)]
    pub tools: Option<ToolsCfg>,
    #[serde(default)]
    pub timeouts: Option<TimeoutsCfg>,
    #[serde(default)]
    pub build: Option<BuildCfg>,
    #[serde(default)]
    pub discover: Option<DiscoverCfg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Console rendering mode.
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "human" => Ok(OutputMode::Human),
            "json" => Ok(OutputMode::Json),
            other => Err(ConfigError::OutputMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeouts {
    pub probe: Duration,
    pub syntax: Duration,
    pub lint: Duration,
    pub format: Duration,
    pub build: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            probe: Duration::from_secs(5),
            syntax: Duration::from_secs(60),
            lint: Duration::from_secs(60),
            format: Duration::from_secs(60),
            build: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by both binaries after applying precedence.
pub struct Effective {
    pub project_root: PathBuf,
    /// Config file that was loaded, if any.
    pub config_path: Option<PathBuf>,
    pub output: OutputMode,
    pub syntax_tool: String,
    pub lint_tool: String,
    pub format_tool: String,
    pub build_tool: String,
    pub timeouts: Timeouts,
    pub build_output: PathBuf,
    pub server_suffixes: Vec<String>,
    pub discover_root: PathBuf,
    pub discover_patterns: Vec<String>,
}

pub fn default_patterns() -> Vec<String> {
    ["**/*.lua", "**/*.luau", "**/*.server.lua", "**/*.client.lua"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Walk upward from `start` to detect the project root.
///
/// Stops at a luaugate config, a Rojo `default.project.json`, or `.git`.
pub fn detect_project_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists())
            || cur.join("default.project.json").exists()
            || cur.join(".git").exists()
        {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `GateConfig` from the first config file present under `root`.
///
/// Absent file is `Ok(None)`; an unreadable or malformed one is an error.
pub fn load_config(root: &Path) -> Result<Option<(PathBuf, GateConfig)>, ConfigError> {
    for name in CONFIG_NAMES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let s = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let cfg = if name.ends_with(".toml") {
            toml::from_str(&s).map_err(|source| ConfigError::Toml {
                path: path.clone(),
                source,
            })?
        } else {
            serde_yaml::from_str(&s).map_err(|source| ConfigError::Yaml {
                path: path.clone(),
                source,
            })?
        };
        return Ok(Some((path, cfg)));
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_project_root: Option<&Path>,
    cli_output: Option<&str>,
) -> Result<Effective, ConfigError> {
    let start = match cli_project_root {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    let project_root = detect_project_root(&start);
    let (config_path, cfg) = match load_config(&project_root)? {
        Some((p, c)) => (Some(p), c),
        None => (None, GateConfig::default()),
    };

    let output = OutputMode::parse(cli_output.or(cfg.output.as_deref()).unwrap_or("human"))?;

    let tools = cfg.tools.unwrap_or_default();
    let t = cfg.timeouts.unwrap_or_default();
    let d = Timeouts::default();
    let secs = |v: Option<u64>, dflt: Duration| v.map(Duration::from_secs).unwrap_or(dflt);
    let timeouts = Timeouts {
        probe: secs(t.probe, d.probe),
        syntax: secs(t.syntax, d.syntax),
        lint: secs(t.lint, d.lint),
        format: secs(t.format, d.format),
        build: secs(t.build, d.build),
    };

    let build = cfg.build.unwrap_or_default();
    let discover = cfg.discover.unwrap_or_default();

    Ok(Effective {
        project_root,
        config_path,
        output,
        syntax_tool: tools.syntax.unwrap_or_else(|| "luau-analyze".to_string()),
        lint_tool: tools.lint.unwrap_or_else(|| "selene".to_string()),
        format_tool: tools.format.unwrap_or_else(|| "stylua".to_string()),
        build_tool: tools.build.unwrap_or_else(|| "rojo".to_string()),
        timeouts,
        build_output: PathBuf::from(
            build
                .output
                .unwrap_or_else(|| "build/validation.rbxl".to_string()),
        ),
        server_suffixes: build
            .server_suffixes
            .unwrap_or_else(|| vec![".server.lua".to_string(), ".server.luau".to_string()]),
        discover_root: PathBuf::from(discover.root.unwrap_or_else(|| "src".to_string())),
        discover_patterns: discover.patterns.unwrap_or_else(default_patterns),
    })
}
