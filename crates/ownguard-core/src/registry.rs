//! Check selection by registry key.

use ownguard_types::{
    CHECK_DUPLICATED_PATTERNS, CHECK_FILE_EXISTS, CHECK_NOT_OWNED, NotOwnedConfig, Severity,
};

use crate::check::Check;
use crate::checks::{DuplicatedPatterns, FileExists, NotOwnedFile};

/// Stable checks, in default execution order.
pub const STABLE_CHECKS: &[&str] = &[CHECK_DUPLICATED_PATTERNS, CHECK_FILE_EXISTS];

/// Opt-in checks.
pub const EXPERIMENTAL_CHECKS: &[&str] = &[CHECK_NOT_OWNED];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown check '{0}' (expected one of: {stable})", stable = STABLE_CHECKS.join(", "))]
    UnknownCheck(String),

    #[error(
        "unknown experimental check '{0}' (expected one of: {experimental})",
        experimental = EXPERIMENTAL_CHECKS.join(", ")
    )]
    UnknownExperimentalCheck(String),

    #[error("check '{0}' is experimental; enable it through experimental_checks")]
    ExperimentalAsStable(String),
}

/// A check plus the metadata the runner reports with it.
pub struct RegisteredCheck {
    /// Registry key.
    pub id: &'static str,
    pub check: Box<dyn Check>,
    /// Applied to issues that carry no severity of their own.
    pub severity: Severity,
    pub experimental: bool,
}

impl RegisteredCheck {
    pub fn new(id: &'static str, check: Box<dyn Check>, severity: Severity) -> Self {
        Self {
            id,
            check,
            severity,
            experimental: false,
        }
    }

    pub fn experimental(mut self) -> Self {
        self.experimental = true;
        self
    }
}

impl std::fmt::Debug for RegisteredCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredCheck")
            .field("id", &self.id)
            .field("name", &self.check.name())
            .field("severity", &self.severity)
            .field("experimental", &self.experimental)
            .finish()
    }
}

/// Build the check list for a run.
///
/// An empty `checks` selects every stable check. Names are matched
/// case-insensitively and duplicates are ignored. Experimental checks run
/// after the stable ones.
pub fn load_checks(
    checks: &[String],
    experimental: &[String],
    not_owned: &NotOwnedConfig,
) -> Result<Vec<RegisteredCheck>, RegistryError> {
    let mut stable = normalize(checks);
    if stable.is_empty() {
        stable = STABLE_CHECKS.iter().map(|s| s.to_string()).collect();
    }

    let mut loaded = Vec::new();
    for name in &stable {
        let check = match name.as_str() {
            CHECK_DUPLICATED_PATTERNS => RegisteredCheck::new(
                CHECK_DUPLICATED_PATTERNS,
                Box::new(DuplicatedPatterns),
                Severity::Error,
            ),
            CHECK_FILE_EXISTS => {
                RegisteredCheck::new(CHECK_FILE_EXISTS, Box::new(FileExists), Severity::Error)
            }
            other if EXPERIMENTAL_CHECKS.contains(&other) => {
                return Err(RegistryError::ExperimentalAsStable(other.to_string()));
            }
            other => return Err(RegistryError::UnknownCheck(other.to_string())),
        };
        loaded.push(check);
    }

    for name in normalize(experimental) {
        let check = match name.as_str() {
            CHECK_NOT_OWNED => RegisteredCheck::new(
                CHECK_NOT_OWNED,
                Box::new(NotOwnedFile::new(not_owned)),
                Severity::Warning,
            )
            .experimental(),
            _ => return Err(RegistryError::UnknownExperimentalCheck(name)),
        };
        loaded.push(check);
    }

    Ok(loaded)
}

fn normalize(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let name = name.trim().to_ascii_lowercase();
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}
