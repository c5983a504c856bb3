//! Orchestrates the configured checks over a shared input.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use ownguard_types::{CheckInput, CheckOutput, Severity};
use tracing::{error, info, warn};

use crate::cancel::CancellationToken;
use crate::check::WorkspaceAccess;
use crate::error::CheckError;
use crate::registry::RegisteredCheck;

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every selected check ran.
    Completed,
    /// Cancellation stopped the run.
    Canceled,
    /// A check failed operationally; later checks did not run.
    Aborted { check: String, error: CheckError },
}

/// Output of a single check that ran to completion.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub id: String,
    pub name: String,
    pub severity: Severity,
    pub experimental: bool,
    pub output: CheckOutput,
    pub duration: Duration,
}

impl CheckResult {
    /// Severity of each issue, falling back to the check's own.
    pub fn effective_severities(&self) -> impl Iterator<Item = Severity> + '_ {
        self.output
            .issues
            .iter()
            .map(|issue| issue.severity.unwrap_or(self.severity))
    }

    pub fn max_severity(&self) -> Option<Severity> {
        self.effective_severities().max()
    }
}

#[derive(Debug)]
pub struct RunReport {
    /// Completed checks, in configuration order.
    pub results: Vec<CheckResult>,
    pub outcome: RunOutcome,
    pub failure_level: Severity,
}

impl RunReport {
    /// True when any executed check reported an issue at or above the threshold.
    pub fn should_fail(&self) -> bool {
        self.results
            .iter()
            .filter_map(CheckResult::max_severity)
            .any(|severity| severity >= self.failure_level)
    }

    /// Process exit code: 2 canceled, 1 aborted, 3 failed, 0 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            RunOutcome::Canceled => 2,
            RunOutcome::Aborted { .. } => 1,
            RunOutcome::Completed if self.should_fail() => 3,
            RunOutcome::Completed => 0,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self.outcome, RunOutcome::Canceled)
    }

    /// The terminal error of an aborted run.
    pub fn error(&self) -> Option<&CheckError> {
        match &self.outcome {
            RunOutcome::Aborted { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Output of the check with the given registry key or name.
    pub fn output_for(&self, id_or_name: &str) -> Option<&CheckOutput> {
        self.results
            .iter()
            .find(|r| r.id == id_or_name || r.name == id_or_name)
            .map(|r| &r.output)
    }
}

/// Runs checks one at a time in configuration order.
///
/// A check starts only after every earlier check has returned without an
/// error. The runner is `Sync`; when several runs share it, read-only checks
/// may overlap while an exclusive check holds the workspace lock for its
/// whole lifetime.
pub struct CheckRunner {
    checks: Vec<RegisteredCheck>,
    failure_level: Severity,
    workspace: RwLock<()>,
}

// Held only for its guard's drop.
#[allow(dead_code)]
enum WorkspaceLock<'a> {
    Shared(RwLockReadGuard<'a, ()>),
    Exclusive(RwLockWriteGuard<'a, ()>),
}

impl CheckRunner {
    pub fn new(checks: Vec<RegisteredCheck>, failure_level: Severity) -> Self {
        Self {
            checks,
            failure_level,
            workspace: RwLock::new(()),
        }
    }

    pub fn checks(&self) -> &[RegisteredCheck] {
        &self.checks
    }

    pub fn run(&self, input: &CheckInput, cancel: &CancellationToken) -> RunReport {
        let mut results = Vec::with_capacity(self.checks.len());
        let mut outcome = RunOutcome::Completed;

        for registered in &self.checks {
            if cancel.is_cancelled() {
                warn!("run canceled; remaining checks skipped");
                outcome = RunOutcome::Canceled;
                break;
            }

            match self.execute(registered, input, cancel) {
                Ok(result) => results.push(result),
                Err(err) if err.is_canceled() => {
                    warn!(check = registered.id, "check canceled");
                    outcome = RunOutcome::Canceled;
                    break;
                }
                Err(err) => {
                    error!(check = registered.id, error = %err, "check failed; aborting run");
                    outcome = RunOutcome::Aborted {
                        check: registered.id.to_string(),
                        error: err,
                    };
                    break;
                }
            }
        }

        // A signal during the last check still interrupts the run, even when
        // that check finished its uncancelable restoration and returned.
        if matches!(outcome, RunOutcome::Completed) && cancel.is_cancelled() {
            warn!("run canceled after the last check started");
            outcome = RunOutcome::Canceled;
        }

        RunReport {
            results,
            outcome,
            failure_level: self.failure_level,
        }
    }

    fn execute(
        &self,
        registered: &RegisteredCheck,
        input: &CheckInput,
        cancel: &CancellationToken,
    ) -> Result<CheckResult, CheckError> {
        cancel.check()?;

        let _lock = match registered.check.access() {
            WorkspaceAccess::ReadOnly => WorkspaceLock::Shared(
                self.workspace
                    .read()
                    .unwrap_or_else(PoisonError::into_inner),
            ),
            WorkspaceAccess::Exclusive => WorkspaceLock::Exclusive(
                self.workspace
                    .write()
                    .unwrap_or_else(PoisonError::into_inner),
            ),
        };

        let name = registered.check.name();
        info!(check = registered.id, name, "running check");
        let started = Instant::now();
        let output = registered.check.check(input, cancel)?;
        let duration = started.elapsed();
        info!(
            check = registered.id,
            issues = output.issues.len(),
            duration_ms = duration.as_millis() as u64,
            "check finished"
        );

        Ok(CheckResult {
            id: registered.id.to_string(),
            name: name.to_string(),
            severity: registered.severity,
            experimental: registered.experimental,
            output,
            duration,
        })
    }
}
