use ownguard_types::{CheckInput, CheckOutput};

use crate::cancel::CancellationToken;
use crate::error::CheckError;

/// How a check touches the repository working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceAccess {
    /// Reads only; may run alongside other read-only checks.
    ReadOnly,
    /// Mutates the working tree; must run alone.
    Exclusive,
}

/// A validator run against the shared input.
pub trait Check: Send + Sync {
    /// Human-readable name used in reports.
    fn name(&self) -> &str;

    fn access(&self) -> WorkspaceAccess {
        WorkspaceAccess::ReadOnly
    }

    /// Return the findings, or an error when the check could not run.
    ///
    /// Implementations observe `cancel` at entry and before each subprocess.
    fn check(
        &self,
        input: &CheckInput,
        cancel: &CancellationToken,
    ) -> Result<CheckOutput, CheckError>;
}
