use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use schemars::schema_for;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Repo automation tasks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run the "CI local" suite: fmt, clippy, test.
    Ci,

    /// Generate JSON Schemas for the config file and the report into `schemas/`.
    Schema {
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,

        /// Fail instead of writing when a schema on disk is out of date.
        #[arg(long)]
        check: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Ci => ci(),
        Cmd::Schema { out_dir, check } => schema(&out_dir, check),
    }
}

fn ci() -> Result<()> {
    run("cargo", &["fmt", "--check"])?;
    run(
        "cargo",
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
    )?;
    run("cargo", &["test", "--workspace"])?;
    Ok(())
}

fn schema(out_dir: &Path, check: bool) -> Result<()> {
    let schemas = [
        (
            "ownguard.config.schema.json",
            pretty_json(&schema_for!(ownguard_types::ConfigFile))?,
        ),
        (
            "ownguard.report.v1.schema.json",
            pretty_json(&schema_for!(ownguard_types::Report))?,
        ),
    ];

    if check {
        let mut stale = Vec::new();
        for (name, expected) in &schemas {
            let path = out_dir.join(name);
            let current = std::fs::read_to_string(&path).unwrap_or_default();
            if &current != expected {
                stale.push(path.display().to_string());
            }
        }
        if !stale.is_empty() {
            bail!(
                "schemas out of date (run `cargo xtask schema`): {}",
                stale.join(", ")
            );
        }
        return Ok(());
    }

    std::fs::create_dir_all(out_dir).context("create schema output dir")?;
    for (name, text) in &schemas {
        let path = out_dir.join(name);
        std::fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn pretty_json(value: &impl serde::Serialize) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value).context("serialize json")?;
    text.push('\n');
    Ok(text)
}

fn run(bin: &str, args: &[&str]) -> Result<()> {
    let status = Command::new(bin)
        .args(args)
        .status()
        .with_context(|| format!("run {bin} {args:?}"))?;
    if !status.success() {
        bail!("command failed: {bin} {args:?}");
    }
    Ok(())
}
