use ownguard_types::{
    CheckReport, IssueCounts, REPORT_SCHEMA_V1, Report, ReportedIssue, ToolMeta, Verdict,
    VerdictStatus,
};

use crate::runner::{RunOutcome, RunReport};

/// Snapshot a finished run as the serializable report.
pub fn build_report(run: &RunReport, repository: &str) -> Report {
    let mut counts = IssueCounts::default();
    let checks = run
        .results
        .iter()
        .map(|result| {
            let issues: Vec<ReportedIssue> = result
                .output
                .issues
                .iter()
                .zip(result.effective_severities())
                .map(|(issue, severity)| {
                    counts.record(severity);
                    ReportedIssue {
                        message: issue.message.clone(),
                        severity,
                    }
                })
                .collect();
            CheckReport {
                id: result.id.clone(),
                name: result.name.clone(),
                severity: result.severity,
                experimental: result.experimental,
                duration_ms: u64::try_from(result.duration.as_millis()).unwrap_or(u64::MAX),
                issues,
            }
        })
        .collect();

    let (status, error) = match &run.outcome {
        RunOutcome::Canceled => (VerdictStatus::Interrupted, None),
        RunOutcome::Aborted { check, error } => {
            (VerdictStatus::Aborted, Some(format!("{check}: {error}")))
        }
        RunOutcome::Completed if run.should_fail() => (VerdictStatus::Fail, None),
        RunOutcome::Completed => (VerdictStatus::Pass, None),
    };

    Report {
        schema: REPORT_SCHEMA_V1.to_string(),
        tool: ToolMeta {
            name: "ownguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: chrono::Utc::now().to_rfc3339(),
        repository: repository.to_string(),
        failure_level: run.failure_level,
        checks,
        verdict: Verdict {
            status,
            counts,
            error,
        },
    }
}

/// Console rendering: one section per executed check, then a summary line.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    for check in &report.checks {
        out.push_str(&format!(
            "==> Executing {} ({}ms)\n",
            check.name, check.duration_ms
        ));
        if check.issues.is_empty() {
            out.push_str("    Check OK\n");
            continue;
        }
        for issue in &check.issues {
            let message = issue.message.replace('\n', "\n        ");
            out.push_str(&format!("    [{}] {}\n", issue.severity.as_str(), message));
        }
    }

    out.push('\n');
    let counts = &report.verdict.counts;
    out.push_str(&format!(
        "{} check(s) executed, {} issue(s) ({} error, {} warning, {} info): {}\n",
        report.checks.len(),
        counts.total(),
        counts.error,
        counts.warning,
        counts.info,
        report.verdict.status.as_str().to_uppercase()
    ));
    if let Some(err) = &report.verdict.error {
        out.push_str(&format!("error: {err}\n"));
    }
    out
}

pub fn render_markdown(report: &Report) -> String {
    let status = report.verdict.status.as_str().to_uppercase();

    let mut out = String::new();
    out.push_str(&format!("## ownguard: {status}\n\n"));
    out.push_str(&format!(
        "Repository `{}`, failure level `{}`\n\n",
        escape_md(&report.repository),
        report.failure_level.as_str()
    ));

    if let Some(err) = &report.verdict.error {
        out.push_str(&format!("**Error:** {}\n\n", escape_md(err)));
    }

    if report.checks.is_empty() {
        out.push_str("No checks executed.\n");
        return out;
    }

    out.push_str("| Check | Severity | Issues |\n");
    out.push_str("|---|---|---|\n");
    for check in &report.checks {
        out.push_str(&render_check_row(check));
    }

    let with_issues: Vec<&CheckReport> =
        report.checks.iter().filter(|c| !c.issues.is_empty()).collect();
    for check in with_issues {
        out.push_str(&format!("\n### {}\n\n", escape_md(&check.name)));
        for issue in &check.issues {
            out.push_str(&format!("- **{}**\n\n", issue.severity.as_str()));
            out.push_str("```text\n");
            out.push_str(&issue.message);
            out.push_str("\n```\n\n");
        }
    }
    out
}

fn render_check_row(check: &CheckReport) -> String {
    let name = if check.experimental {
        format!("{} _(experimental)_", escape_md(&check.name))
    } else {
        escape_md(&check.name)
    };
    format!(
        "| {name} | {sev} | {issues} |\n",
        sev = check.severity.as_str(),
        issues = check.issues.len()
    )
}

fn escape_md(s: &str) -> String {
    s.replace('|', "\\|").replace('`', "\\`")
}
