mod codeowners;
mod config_loader;
mod env_expand;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use tracing::{debug, info, warn};

use ownguard_core::{
    CancellationToken, CheckRunner, RunOutcome, build_report, load_checks, render_markdown,
    render_text,
};
use ownguard_types::{CheckInput, Report, Severity};

use config_loader::{Overrides, load_config, resolve};

#[derive(Parser, Debug)]
#[command(name = "ownguard")]
#[command(about = "Validate CODEOWNERS coverage of a git repository", long_about = None)]
#[command(version)]
struct Cli {
    /// Repository to check (defaults to config, else the current directory).
    #[arg(long, env = "OWNGUARD_REPOSITORY_PATH", value_name = "PATH")]
    repository_path: Option<PathBuf>,

    /// Minimum severity that fails the run (defaults to warning).
    #[arg(long, env = "OWNGUARD_CHECK_FAILURE_LEVEL", value_enum)]
    check_failure_level: Option<SeverityArg>,

    /// Stable checks to run, comma-separated. Empty runs all stable checks.
    #[arg(long, env = "OWNGUARD_CHECKS", value_delimiter = ',')]
    checks: Vec<String>,

    /// Experimental checks to run, comma-separated.
    #[arg(long, env = "OWNGUARD_EXPERIMENTAL_CHECKS", value_delimiter = ',')]
    experimental_checks: Vec<String>,

    /// Patterns the not-owned check does not count as coverage.
    #[arg(long, env = "OWNGUARD_NOT_OWNED_SKIP_PATTERNS", value_delimiter = ',')]
    not_owned_skip_patterns: Vec<String>,

    /// Restrict the not-owned check to these directories.
    #[arg(long, env = "OWNGUARD_NOT_OWNED_SUBDIRECTORIES", value_delimiter = ',')]
    not_owned_subdirectories: Vec<String>,

    /// Register the repository as a git safe.directory before checking.
    #[arg(
        long,
        env = "OWNGUARD_NOT_OWNED_TRUST_WORKSPACE",
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    not_owned_trust_workspace: Option<bool>,

    /// Match ignore rules case-insensitively when pruning the index.
    #[arg(
        long,
        env = "OWNGUARD_NOT_OWNED_IGNORE_CASE",
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    not_owned_ignore_case: Option<bool>,

    /// Path to a config file. If omitted, uses ./ownguard.toml if present.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the JSON report here.
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Write a Markdown summary here.
    #[arg(long, value_name = "PATH")]
    md: Option<PathBuf>,

    /// Enable verbose (info-level) logging to stderr.
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Enable debug-level logging to stderr.
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            repository_path: self.repository_path.clone(),
            check_failure_level: self.check_failure_level.map(Severity::from),
            checks: self.checks.clone(),
            experimental_checks: self.experimental_checks.clone(),
            skip_patterns: self.not_owned_skip_patterns.clone(),
            subdirectories: self.not_owned_subdirectories.clone(),
            trust_workspace: self.not_owned_trust_workspace,
            ignore_case: self.not_owned_ignore_case,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SeverityArg {
    Info,
    #[value(alias = "warn")]
    Warning,
    Error,
}

impl From<SeverityArg> for Severity {
    fn from(v: SeverityArg) -> Self {
        match v {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Error => Severity::Error,
        }
    }
}

#[cfg(not(test))]
fn main() -> std::process::ExitCode {
    match run_with_args(std::env::args_os()) {
        Ok(code) => std::process::ExitCode::from(code as u8),
        Err(err) => {
            eprintln!("{err:?}");
            std::process::ExitCode::from(1)
        }
    }
}

fn run_with_args<I, T>(args: I) -> Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_logging(cli.verbose, cli.debug);

    let file = load_config(cli.config.clone())?;
    let settings = resolve(cli.overrides(), file);
    let repo = settings
        .repository_path
        .canonicalize()
        .with_context(|| {
            format!(
                "resolve repository path '{}'",
                settings.repository_path.display()
            )
        })?;

    let owners = codeowners::load(&repo)?;
    info!(
        "loaded {} ownership entries from {}",
        owners.entries.len(),
        owners.path.display()
    );

    let checks = load_checks(
        &settings.checks,
        &settings.experimental_checks,
        &settings.not_owned,
    )
    .context("select checks")?;

    let cancel = CancellationToken::new();
    spawn_signal_listener(cancel.clone())?;

    let runner = CheckRunner::new(checks, settings.failure_level);
    let input = CheckInput {
        repo_dir: repo.clone(),
        entries: owners.entries,
    };
    let run = runner.run(&input, &cancel);

    let report = build_report(&run, &repo.display().to_string());
    print!("{}", render_text(&report));
    write_outputs(&report, cli.out.as_deref(), cli.md.as_deref())?;

    if let RunOutcome::Aborted { check, error } = &run.outcome {
        bail!("check '{check}' aborted the run: {error}");
    }
    if run.is_canceled() {
        warn!("run interrupted");
    }
    Ok(run.exit_code())
}

fn write_outputs(report: &Report, out: Option<&Path>, md: Option<&Path>) -> Result<()> {
    if let Some(path) = out {
        let json = serde_json::to_string_pretty(report).context("serialize report")?;
        write_text(path, &format!("{json}\n"))?;
        debug!("wrote report to {}", path.display());
    }
    if let Some(path) = md {
        write_text(path, &render_markdown(report))?;
        debug!("wrote markdown summary to {}", path.display());
    }
    Ok(())
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory '{}'", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("write '{}'", path.display()))
}

/// Cancel `token` on SIGINT or SIGTERM (Ctrl-C elsewhere).
fn spawn_signal_listener(token: CancellationToken) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build signal runtime")?;

    std::thread::Builder::new()
        .name("ownguard-signals".to_string())
        .spawn(move || {
            runtime.block_on(async {
                match wait_for_shutdown_signal().await {
                    Ok(()) => {
                        warn!("shutdown signal received; canceling checks");
                        token.cancel();
                    }
                    Err(err) => warn!("signal handling unavailable: {err}"),
                }
            });
        })
        .context("spawn signal listener")?;
    Ok(())
}

async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
        Ok(())
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// Initialize tracing/logging based on CLI flags.
fn init_logging(verbose: bool, debug: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    debug!("Logging initialized at level: {}", level);
}
