//! Core engine: check orchestration, repository mutation and reporting.

mod cancel;
mod check;
pub mod checks;
mod error;
mod git;
mod registry;
mod render;
mod repository;
mod runner;

pub use cancel::CancellationToken;
pub use check::{Check, WorkspaceAccess};
pub use error::{CheckError, MultiError};
pub use git::Git;
pub use registry::{
    EXPERIMENTAL_CHECKS, RegisteredCheck, RegistryError, STABLE_CHECKS, load_checks,
};
pub use render::{build_report, render_markdown, render_text};
pub use repository::{GitRepository, IgnoreRulesSnapshot, RepositoryMutator, WorkspaceGuard};
pub use runner::{CheckResult, CheckRunner, RunOutcome, RunReport};
