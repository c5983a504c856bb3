//! Data types (entries, config, reports) for ownguard.
//!
//! This crate is intentionally "dumb": pure DTOs with serde + schemars.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ── Schema Identifiers ─────────────────────────────────────────
pub const REPORT_SCHEMA_V1: &str = "ownguard.report.v1";

// ── Frozen Vocabulary ──────────────────────────────────────────
// Check registry keys
pub const CHECK_DUPLICATED_PATTERNS: &str = "duppatterns";
pub const CHECK_FILE_EXISTS: &str = "files";
pub const CHECK_NOT_OWNED: &str = "notowned";

/// Conventional locations of the ownership file, in lookup order.
pub const CODEOWNERS_LOCATIONS: &[&str] = &["CODEOWNERS", "docs/CODEOWNERS", ".github/CODEOWNERS"];

/// Name of the ignore-rules file the not-owned check mutates.
pub const IGNORE_RULES_FILE: &str = ".gitignore";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSeverity(pub String);

impl fmt::Display for UnknownSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown severity '{}' (expected one of: info, warning, error)",
            self.0
        )
    }
}

impl std::error::Error for UnknownSeverity {}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            _ => Err(UnknownSeverity(s.to_string())),
        }
    }
}

/// A single ownership rule: a path pattern and the parties responsible for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OwnershipEntry {
    /// 1-based line in the ownership file; 0 when unknown.
    #[serde(default)]
    pub line: u32,
    pub pattern: String,
    #[serde(default)]
    pub owners: Vec<String>,
}

impl OwnershipEntry {
    pub fn new(pattern: impl Into<String>, owners: &[&str]) -> Self {
        Self {
            line: 0,
            pattern: pattern.into(),
            owners: owners.iter().map(|o| o.to_string()).collect(),
        }
    }
}

/// Input shared by every check in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInput {
    pub repo_dir: PathBuf,
    pub entries: Vec<OwnershipEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Issue {
    pub message: String,
    /// Overrides the reporting check's severity when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct CheckOutput {
    pub issues: Vec<Issue>,
}

impl CheckOutput {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Accumulates issues for a single check invocation.
#[derive(Debug, Default)]
pub struct OutputBuilder {
    issues: Vec<Issue>,
}

impl OutputBuilder {
    pub fn report_issue(&mut self, message: impl Into<String>) -> &mut Self {
        self.issues.push(Issue {
            message: message.into(),
            severity: None,
        });
        self
    }

    pub fn report_issue_with(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
    ) -> &mut Self {
        self.issues.push(Issue {
            message: message.into(),
            severity: Some(severity),
        });
        self
    }

    pub fn output(self) -> CheckOutput {
        CheckOutput {
            issues: self.issues,
        }
    }
}

// ── Configuration ──────────────────────────────────────────────

/// The on-disk configuration file (`ownguard.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_path: Option<String>,

    /// Minimum severity that fails the run. Defaults to `warning`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_failure_level: Option<Severity>,

    /// Stable checks to run. Empty means all stable checks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<String>,

    /// Experimental checks to run. These are opt-in only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub experimental_checks: Vec<String>,

    #[serde(default)]
    pub not_owned: NotOwnedConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NotOwnedConfig {
    /// Patterns that are not treated as ownership coverage.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_patterns: Vec<String>,

    /// Restrict the listing to these repo-relative directories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subdirectories: Vec<String>,

    /// Register the repository as a git `safe.directory` before running.
    #[serde(default)]
    pub trust_workspace: bool,

    /// Force case-insensitive ignore matching when pruning the index.
    #[serde(default)]
    pub ignore_case: bool,
}

// ── Report ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Pass,
    Fail,
    /// The run was canceled before every check finished.
    Interrupted,
    /// A check hit an operational error and the run stopped.
    Aborted,
}

impl VerdictStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VerdictStatus::Pass => "pass",
            VerdictStatus::Fail => "fail",
            VerdictStatus::Interrupted => "interrupted",
            VerdictStatus::Aborted => "aborted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct IssueCounts {
    pub info: u32,
    pub warning: u32,
    pub error: u32,
}

impl IssueCounts {
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Info => self.info = self.info.saturating_add(1),
            Severity::Warning => self.warning = self.warning.saturating_add(1),
            Severity::Error => self.error = self.error.saturating_add(1),
        }
    }

    pub fn total(&self) -> u32 {
        self.info
            .saturating_add(self.warning)
            .saturating_add(self.error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub counts: IssueCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportedIssue {
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CheckReport {
    /// Registry key, e.g. `notowned`.
    pub id: String,
    /// Human-readable check name.
    pub name: String,
    pub severity: Severity,
    pub experimental: bool,
    pub duration_ms: u64,
    pub issues: Vec<ReportedIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Report {
    pub schema: String,
    pub tool: ToolMeta,
    pub generated_at: String,
    pub repository: String,
    pub failure_level: Severity,
    pub checks: Vec<CheckReport>,
    pub verdict: Verdict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_order_is_total() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert_eq!(Severity::Error.max(Severity::Info), Severity::Error);
    }

    #[test]
    fn severity_parses_aliases_case_insensitively() {
        assert_eq!("WARN".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!(" error ".parse::<Severity>(), Ok(Severity::Error));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn output_builder_keeps_order_and_overrides() {
        let mut b = OutputBuilder::default();
        b.report_issue("first")
            .report_issue_with("second", Severity::Info);
        let out = b.output();
        assert_eq!(out.issues.len(), 2);
        assert_eq!(out.issues[0].severity, None);
        assert_eq!(out.issues[1].severity, Some(Severity::Info));
        assert!(!out.is_clean());
    }

    #[test]
    fn issue_counts_total() {
        let mut c = IssueCounts::default();
        c.record(Severity::Info);
        c.record(Severity::Error);
        c.record(Severity::Error);
        assert_eq!(c.total(), 3);
        assert_eq!(c.error, 2);
    }
}
