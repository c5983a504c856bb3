//! Check runner behaviour with scripted checks.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use proptest::prelude::*;

use ownguard_core::{
    CancellationToken, Check, CheckError, CheckRunner, RegisteredCheck, RunOutcome, RunReport,
    WorkspaceAccess, build_report,
};
use ownguard_testkit::arb_severity;
use ownguard_types::{CheckInput, CheckOutput, OutputBuilder, Severity, VerdictStatus};

enum Behaviour {
    Issues(Vec<Option<Severity>>),
    Fail,
    Cancel(CancellationToken),
    CancelAfter(CancellationToken),
}

struct Scripted {
    name: &'static str,
    access: WorkspaceAccess,
    behaviour: Behaviour,
    calls: Arc<AtomicUsize>,
}

impl Check for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    fn access(&self) -> WorkspaceAccess {
        self.access
    }

    fn check(&self, _: &CheckInput, cancel: &CancellationToken) -> Result<CheckOutput, CheckError> {
        cancel.check()?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            Behaviour::Issues(severities) => {
                let mut out = OutputBuilder::default();
                for (i, severity) in severities.iter().enumerate() {
                    match severity {
                        Some(s) => out.report_issue_with(format!("issue {i}"), *s),
                        None => out.report_issue(format!("issue {i}")),
                    };
                }
                Ok(out.output())
            }
            Behaviour::Fail => Err(CheckError::Git {
                command: "git ls-files".to_string(),
                status: "exit status: 128".to_string(),
                stderr: "fatal: not a git repository".to_string(),
            }),
            Behaviour::Cancel(token) => {
                token.cancel();
                Err(CheckError::Canceled)
            }
            Behaviour::CancelAfter(token) => {
                token.cancel();
                Ok(CheckOutput::default())
            }
        }
    }
}

fn scripted(
    id: &'static str,
    access: WorkspaceAccess,
    severity: Severity,
    behaviour: Behaviour,
) -> (RegisteredCheck, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let check = Scripted {
        name: id,
        access,
        behaviour,
        calls: Arc::clone(&calls),
    };
    (RegisteredCheck::new(id, Box::new(check), severity), calls)
}

fn input() -> CheckInput {
    CheckInput {
        repo_dir: ".".into(),
        entries: vec![],
    }
}

fn run(checks: Vec<RegisteredCheck>, level: Severity, token: &CancellationToken) -> RunReport {
    CheckRunner::new(checks, level).run(&input(), token)
}

/// Given [A, B] where A errors, B never runs and A's error is terminal.
#[test]
fn fatal_error_aborts_before_later_checks() {
    let (a, a_calls) = scripted("a", WorkspaceAccess::Exclusive, Severity::Error, Behaviour::Fail);
    let (b, b_calls) = scripted(
        "b",
        WorkspaceAccess::ReadOnly,
        Severity::Error,
        Behaviour::Issues(vec![]),
    );

    let report = run(vec![a, b], Severity::Warning, &CancellationToken::new());

    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    let RunOutcome::Aborted { check, error } = &report.outcome else {
        panic!("expected abort, got {:?}", report.outcome);
    };
    assert_eq!(check, "a");
    assert!(error.to_string().contains("git ls-files"));
    assert_eq!(report.exit_code(), 1);
    assert!(report.results.is_empty());
}

/// Given two read-only checks where the first errors, the second never starts.
#[test]
fn fatal_error_stops_read_only_successors() {
    let (a, a_calls) = scripted("a", WorkspaceAccess::ReadOnly, Severity::Error, Behaviour::Fail);
    let (b, b_calls) = scripted(
        "b",
        WorkspaceAccess::ReadOnly,
        Severity::Error,
        Behaviour::Issues(vec![None]),
    );

    let report = run(vec![a, b], Severity::Warning, &CancellationToken::new());

    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    assert!(report.results.is_empty());
    assert!(matches!(&report.outcome, RunOutcome::Aborted { check, .. } if check == "a"));
    assert_eq!(report.exit_code(), 1);
}

/// Given a check that succeeds after the token flips, the run is still interrupted.
#[test]
fn cancellation_during_last_check_exits_two() {
    let token = CancellationToken::new();
    let (a, _) = scripted(
        "a",
        WorkspaceAccess::ReadOnly,
        Severity::Error,
        Behaviour::Issues(vec![None]),
    );
    let (b, b_calls) = scripted(
        "b",
        WorkspaceAccess::Exclusive,
        Severity::Error,
        Behaviour::CancelAfter(token.clone()),
    );

    let report = run(vec![a, b], Severity::Warning, &token);

    assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    assert_eq!(report.results.len(), 2);
    assert!(report.is_canceled());
    assert_eq!(report.exit_code(), 2);
}

/// Given issues in one check, later checks still run.
#[test]
fn issues_do_not_stop_the_run() {
    let (a, _) = scripted(
        "a",
        WorkspaceAccess::ReadOnly,
        Severity::Error,
        Behaviour::Issues(vec![None]),
    );
    let (b, b_calls) = scripted(
        "b",
        WorkspaceAccess::Exclusive,
        Severity::Warning,
        Behaviour::Issues(vec![]),
    );

    let report = run(vec![a, b], Severity::Warning, &CancellationToken::new());

    assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    assert!(matches!(report.outcome, RunOutcome::Completed));
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[0].id, "a");
    assert_eq!(report.output_for("a").map(|o| o.issues.len()), Some(1));
    assert_eq!(report.exit_code(), 3);
}

/// Given a token canceled before the run, nothing executes and exit code is 2.
#[test]
fn cancellation_before_run_executes_nothing() {
    let token = CancellationToken::new();
    token.cancel();
    let (a, a_calls) = scripted(
        "a",
        WorkspaceAccess::ReadOnly,
        Severity::Error,
        Behaviour::Issues(vec![None]),
    );

    let report = run(vec![a], Severity::Warning, &token);

    assert_eq!(a_calls.load(Ordering::SeqCst), 0);
    assert!(report.is_canceled());
    assert_eq!(report.exit_code(), 2);
    assert_eq!(build_report(&report, ".").verdict.status, VerdictStatus::Interrupted);
}

/// Given a failing check followed by a cancellation, the exit code is 2, not 3.
#[test]
fn cancellation_beats_failure() {
    let token = CancellationToken::new();
    let (a, _) = scripted(
        "a",
        WorkspaceAccess::Exclusive,
        Severity::Error,
        Behaviour::Issues(vec![None]),
    );
    let (b, _) = scripted(
        "b",
        WorkspaceAccess::Exclusive,
        Severity::Error,
        Behaviour::Cancel(token.clone()),
    );
    let (c, c_calls) = scripted(
        "c",
        WorkspaceAccess::Exclusive,
        Severity::Error,
        Behaviour::Issues(vec![]),
    );

    let report = run(vec![a, b, c], Severity::Warning, &token);

    assert!(report.should_fail());
    assert_eq!(report.exit_code(), 2);
    assert_eq!(c_calls.load(Ordering::SeqCst), 0);
    assert_eq!(report.results.len(), 1);
}

/// Given several passing checks, all of them run once in configuration order.
#[test]
fn results_follow_configuration_order() {
    let mut checks = Vec::new();
    let mut counters = Vec::new();
    for id in ["one", "two", "three", "four"] {
        let (check, calls) = scripted(
            id,
            WorkspaceAccess::ReadOnly,
            Severity::Error,
            Behaviour::Issues(vec![]),
        );
        checks.push(check);
        counters.push(calls);
    }

    let report = run(checks, Severity::Warning, &CancellationToken::new());

    let ids: Vec<&str> = report.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["one", "two", "three", "four"]);
    assert!(counters.iter().all(|c| c.load(Ordering::SeqCst) == 1));
    assert_eq!(report.exit_code(), 0);
}

proptest! {
    /// should_fail is true exactly when some effective severity reaches the level.
    #[test]
    fn threshold_aggregation(
        check_severity in arb_severity(),
        level in arb_severity(),
        overrides in prop::collection::vec(prop::option::of(arb_severity()), 0..6),
    ) {
        let expected = overrides
            .iter()
            .map(|o| o.unwrap_or(check_severity))
            .any(|s| s >= level);
        let (a, _) = scripted(
            "a",
            WorkspaceAccess::ReadOnly,
            check_severity,
            Behaviour::Issues(overrides),
        );

        let report = run(vec![a], level, &CancellationToken::new());

        prop_assert_eq!(report.should_fail(), expected);
        prop_assert_eq!(report.exit_code(), if expected { 3 } else { 0 });
    }
}
