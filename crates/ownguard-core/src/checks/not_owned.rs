use std::ffi::OsString;

use ownguard_domain::{SkipSet, compute_excluded_patterns, not_owned_message};
use ownguard_types::{CheckInput, CheckOutput, NotOwnedConfig, OutputBuilder, OwnershipEntry};
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::check::{Check, WorkspaceAccess};
use crate::error::CheckError;
use crate::repository::{GitRepository, RepositoryMutator, WorkspaceGuard};

pub const EMPTY_OWNERSHIP_MESSAGE: &str =
    "The CODEOWNERS file is empty. The files in the repository don't have any owner.";

pub const DIRTY_TREE_MESSAGE: &str =
    "git state is dirty: commit all changes before executing this check";

/// Reports tracked files that no ownership pattern covers.
///
/// Every pattern that is not skipped is appended to `.gitignore`, tracked
/// files the rules now match are dropped from the index, and whatever git
/// still lists is not owned. The working tree is reset afterwards.
#[derive(Debug, Clone, Default)]
pub struct NotOwnedFile {
    skip: SkipSet,
    subdirectories: Vec<String>,
    trust_workspace: bool,
    ignore_case: bool,
    git_env: Vec<(OsString, OsString)>,
}

impl NotOwnedFile {
    pub fn new(config: &NotOwnedConfig) -> Self {
        Self {
            skip: config.skip_patterns.iter().cloned().collect(),
            subdirectories: config.subdirectories.clone(),
            trust_workspace: config.trust_workspace,
            ignore_case: config.ignore_case,
            git_env: Vec::new(),
        }
    }

    /// Extra environment for the git subprocesses this check spawns.
    pub fn with_git_env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.git_env.push((key.into(), value.into()));
        self
    }

    /// Run against any repository implementation.
    pub fn run<R: RepositoryMutator + ?Sized>(
        &self,
        repo: &R,
        entries: &[OwnershipEntry],
        cancel: &CancellationToken,
    ) -> Result<CheckOutput, CheckError> {
        cancel.check()?;

        let mut out = OutputBuilder::default();
        if entries.is_empty() {
            out.report_issue(EMPTY_OWNERSHIP_MESSAGE);
            return Ok(out.output());
        }

        if self.trust_workspace {
            repo.trust(cancel)?;
        }

        if !repo.status(cancel)?.trim().is_empty() {
            out.report_issue(DIRTY_TREE_MESSAGE);
            return Ok(out.output());
        }

        let patterns = compute_excluded_patterns(entries, &self.skip);
        let guard = WorkspaceGuard::acquire(repo)?;
        let listed = self.unowned_files(repo, &patterns, cancel);
        let files = match (listed, guard.restore()) {
            (Ok(files), Ok(())) => files,
            (Err(err), Ok(())) | (Ok(_), Err(err)) => return Err(err),
            (Err(err), Err(restore_err)) => return Err(err.combine(restore_err)),
        };

        if !files.is_empty() {
            out.report_issue(not_owned_message(&files, &self.skip));
        }
        Ok(out.output())
    }

    fn unowned_files<R: RepositoryMutator + ?Sized>(
        &self,
        repo: &R,
        patterns: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, CheckError> {
        cancel.check()?;
        repo.append_ignore_rules(patterns)?;
        let pruned = repo.untrack_ignored(cancel)?;
        debug!(pruned, "dropped owned files from the index");
        repo.list_files(&self.subdirectories, cancel)
    }
}

impl Check for NotOwnedFile {
    fn name(&self) -> &str {
        "[Experimental] Not Owned File Checker"
    }

    fn access(&self) -> WorkspaceAccess {
        WorkspaceAccess::Exclusive
    }

    fn check(
        &self,
        input: &CheckInput,
        cancel: &CancellationToken,
    ) -> Result<CheckOutput, CheckError> {
        let mut repo = GitRepository::new(&input.repo_dir).ignore_case(self.ignore_case);
        for (key, value) in &self.git_env {
            repo = repo.git_env(key, value);
        }
        self.run(&repo, &input.entries, cancel)
    }
}
