//! Configuration loading and precedence.
//!
//! Values come from three layers, highest priority first:
//! command-line flags (or their environment variables), the TOML config
//! file, then built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use ownguard_types::{ConfigFile, NotOwnedConfig, Severity};

/// Name of the config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ownguard.toml";

/// Values set on the command line. `None` (or empty) means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub repository_path: Option<PathBuf>,
    pub check_failure_level: Option<Severity>,
    pub checks: Vec<String>,
    pub experimental_checks: Vec<String>,
    pub skip_patterns: Vec<String>,
    pub subdirectories: Vec<String>,
    pub trust_workspace: Option<bool>,
    pub ignore_case: Option<bool>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub repository_path: PathBuf,
    pub failure_level: Severity,
    pub checks: Vec<String>,
    pub experimental_checks: Vec<String>,
    pub not_owned: NotOwnedConfig,
}

/// Load the explicit config, or `./ownguard.toml` when present.
pub fn load_config(path: Option<PathBuf>) -> Result<ConfigFile> {
    let user_path = path.or_else(|| {
        let p = PathBuf::from(DEFAULT_CONFIG_FILE);
        if p.exists() { Some(p) } else { None }
    });

    let Some(path) = user_path else {
        debug!("no config file found, using defaults");
        return Ok(ConfigFile::default());
    };

    info!("loading config from: {}", path.display());
    parse_config_file(&path)
}

pub fn parse_config_file(path: &Path) -> Result<ConfigFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    let expanded = crate::env_expand::expand_env_vars(&text)
        .with_context(|| format!("expand environment in '{}'", path.display()))?;
    toml::from_str(&expanded).with_context(|| format!("parse config '{}'", path.display()))
}

/// Merge flags over the file over defaults.
pub fn resolve(flags: Overrides, file: ConfigFile) -> Settings {
    let repository_path = flags
        .repository_path
        .or_else(|| file.repository_path.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let file_not_owned = file.not_owned;
    let not_owned = NotOwnedConfig {
        skip_patterns: prefer(flags.skip_patterns, file_not_owned.skip_patterns),
        subdirectories: prefer(flags.subdirectories, file_not_owned.subdirectories),
        trust_workspace: flags
            .trust_workspace
            .unwrap_or(file_not_owned.trust_workspace),
        ignore_case: flags.ignore_case.unwrap_or(file_not_owned.ignore_case),
    };

    Settings {
        repository_path,
        failure_level: flags
            .check_failure_level
            .or(file.check_failure_level)
            .unwrap_or(Severity::Warning),
        checks: prefer(flags.checks, file.checks),
        experimental_checks: prefer(flags.experimental_checks, file.experimental_checks),
        not_owned,
    }
}

fn prefer(flag: Vec<String>, file: Vec<String>) -> Vec<String> {
    if flag.is_empty() { file } else { flag }
}
