//! Repository mutation primitives and the guard that undoes them.

use std::ffi::{OsStr, OsString};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use ownguard_types::IGNORE_RULES_FILE;
use tracing::{debug, error};

use crate::cancel::CancellationToken;
use crate::error::{CheckError, MultiError};
use crate::git::{Git, path_arg, split_nul};

/// Paths passed to a single `git rm` invocation.
const RM_CHUNK: usize = 256;

/// Content of the ignore-rules file at acquisition time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRulesSnapshot {
    content: Option<Vec<u8>>,
}

impl IgnoreRulesSnapshot {
    pub fn new(content: Option<Vec<u8>>) -> Self {
        Self { content }
    }

    /// `None` when the file did not exist.
    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }
}

/// Primitive operations the not-owned check performs on a repository.
pub trait RepositoryMutator {
    /// Register the repository as a git `safe.directory`.
    fn trust(&self, cancel: &CancellationToken) -> Result<(), CheckError>;

    /// Porcelain status; empty when the tree is clean.
    fn status(&self, cancel: &CancellationToken) -> Result<String, CheckError>;

    fn snapshot_ignore_rules(&self) -> Result<IgnoreRulesSnapshot, CheckError>;

    /// Append a blank line and then one pattern per line.
    fn append_ignore_rules(&self, patterns: &[String]) -> Result<(), CheckError>;

    /// Drop tracked files that the ignore rules now match from the index.
    /// Returns how many paths were removed.
    fn untrack_ignored(&self, cancel: &CancellationToken) -> Result<usize, CheckError>;

    /// Tracked files, limited to `subdirectories` when any are given.
    fn list_files(
        &self,
        subdirectories: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, CheckError>;

    /// Reset the working tree and index, then put the ignore-rules file back.
    /// Never cancelable.
    fn restore(&self, snapshot: &IgnoreRulesSnapshot) -> Result<(), CheckError>;
}

/// [`RepositoryMutator`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitRepository {
    git: Git,
    root: PathBuf,
    ignore_case: bool,
}

impl GitRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            git: Git::new(&root),
            root,
            ignore_case: false,
        }
    }

    /// Force case-insensitive ignore matching while pruning the index.
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Set an environment variable for every git invocation.
    pub fn git_env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.git = self.git.env(key, value);
        self
    }

    fn ignore_file(&self) -> PathBuf {
        self.root.join(IGNORE_RULES_FILE)
    }

    fn config_prefix(&self) -> Vec<OsString> {
        if self.ignore_case {
            vec!["-c".into(), "core.ignoreCase=true".into()]
        } else {
            Vec::new()
        }
    }

    fn put_back(&self, snapshot: &IgnoreRulesSnapshot) -> Result<(), CheckError> {
        let path = self.ignore_file();
        match snapshot.content() {
            Some(original) => {
                let current = fs::read(&path).ok();
                if current.as_deref() == Some(original) {
                    return Ok(());
                }
                fs::write(&path, original)
                    .map_err(|e| CheckError::io(format!("restore {}", path.display()), e))
            }
            None => match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(CheckError::io(format!("remove {}", path.display()), e)),
            },
        }
    }
}

impl RepositoryMutator for GitRepository {
    fn trust(&self, cancel: &CancellationToken) -> Result<(), CheckError> {
        let args = [
            OsStr::new("config"),
            OsStr::new("--global"),
            OsStr::new("--add"),
            OsStr::new("safe.directory"),
            self.root.as_os_str(),
        ];
        self.git.run(&args, cancel)?;
        Ok(())
    }

    fn status(&self, cancel: &CancellationToken) -> Result<String, CheckError> {
        let out = self.git.run(&["status", "--porcelain"], cancel)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn snapshot_ignore_rules(&self) -> Result<IgnoreRulesSnapshot, CheckError> {
        let path = self.ignore_file();
        match fs::read(&path) {
            Ok(bytes) => Ok(IgnoreRulesSnapshot::new(Some(bytes))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(IgnoreRulesSnapshot::new(None)),
            Err(e) => Err(CheckError::io(format!("read {}", path.display()), e)),
        }
    }

    fn append_ignore_rules(&self, patterns: &[String]) -> Result<(), CheckError> {
        let path = self.ignore_file();
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }

        let mut content = String::from("\n");
        for pattern in patterns {
            content.push_str(pattern);
            content.push('\n');
        }

        let mut file = options
            .open(&path)
            .map_err(|e| CheckError::io(format!("open {}", path.display()), e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| CheckError::io(format!("append to {}", path.display()), e))?;
        debug!(count = patterns.len(), "appended ignore rules");
        Ok(())
    }

    fn untrack_ignored(&self, cancel: &CancellationToken) -> Result<usize, CheckError> {
        let mut ls = self.config_prefix();
        ls.extend(
            ["ls-files", "-z", "--cached", "--ignored", "--exclude-standard"]
                .into_iter()
                .map(OsString::from),
        );
        let out = self.git.run(&ls, cancel)?;
        let paths: Vec<OsString> = split_nul(&out).map(path_arg).collect();

        for chunk in paths.chunks(RM_CHUNK) {
            let mut rm: Vec<OsString> = ["--literal-pathspecs", "rm", "--cached", "-q", "--"]
                .into_iter()
                .map(OsString::from)
                .collect();
            rm.extend(chunk.iter().cloned());
            self.git.run(&rm, cancel)?;
        }

        debug!(count = paths.len(), "untracked ignored files");
        Ok(paths.len())
    }

    fn list_files(
        &self,
        subdirectories: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, CheckError> {
        let mut args: Vec<&str> = vec!["ls-files", "-z", "--"];
        args.extend(subdirectories.iter().map(String::as_str));
        let out = self.git.run(&args, cancel)?;
        Ok(split_nul(&out)
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
            .collect())
    }

    fn restore(&self, snapshot: &IgnoreRulesSnapshot) -> Result<(), CheckError> {
        let mut errors = MultiError::default();
        if let Err(e) = self.git.run_uncancelable(&["reset", "--hard", "--quiet"]) {
            errors.push(e);
        }
        if let Err(e) = self.put_back(snapshot) {
            errors.push(e);
        }
        errors.into_result()
    }
}

/// Scoped ownership of the working directory.
///
/// Acquiring snapshots the ignore-rules file. Call [`WorkspaceGuard::restore`]
/// to undo every mutation and observe the result; if the guard is dropped
/// without that call, restoration still runs and failures are logged.
pub struct WorkspaceGuard<'a, R: RepositoryMutator + ?Sized> {
    repo: &'a R,
    snapshot: Option<IgnoreRulesSnapshot>,
}

impl<'a, R: RepositoryMutator + ?Sized> WorkspaceGuard<'a, R> {
    pub fn acquire(repo: &'a R) -> Result<Self, CheckError> {
        let snapshot = repo.snapshot_ignore_rules()?;
        Ok(Self {
            repo,
            snapshot: Some(snapshot),
        })
    }

    pub fn restore(mut self) -> Result<(), CheckError> {
        match self.snapshot.take() {
            Some(snapshot) => self.repo.restore(&snapshot),
            None => Ok(()),
        }
    }
}

impl<R: RepositoryMutator + ?Sized> Drop for WorkspaceGuard<'_, R> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take()
            && let Err(err) = self.repo.restore(&snapshot)
        {
            error!(error = %err, "failed to restore workspace");
        }
    }
}
