//! Thin wrapper over the `git` executable.

use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::cancel::CancellationToken;
use crate::error::CheckError;

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Runs git commands with the repository as working directory.
#[derive(Debug, Clone)]
pub struct Git {
    repo_dir: PathBuf,
    envs: Vec<(OsString, OsString)>,
}

impl Git {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            envs: Vec::new(),
        }
    }

    /// Set an environment variable for every invocation.
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Run to completion, killing the child if `cancel` fires first.
    ///
    /// Returns stdout on a zero exit status.
    pub fn run<S: AsRef<OsStr>>(
        &self,
        args: &[S],
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, CheckError> {
        cancel.check()?;
        let command = describe(args);
        debug!(%command, dir = %self.repo_dir.display(), "running git");

        let mut child = self.spawn(args, &command)?;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if cancel.is_cancelled() => {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!(%command, "killed git after cancellation");
                    return Err(CheckError::Canceled);
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    let _ = child.kill();
                    return Err(CheckError::io(format!("wait for `{command}`"), source));
                }
            }
        };

        let stdout = collect(stdout, &command)?;
        let stderr = collect(stderr, &command)?;
        finish(command, status, stdout, &stderr)
    }

    /// Run to completion regardless of cancellation.
    pub fn run_uncancelable<S: AsRef<OsStr>>(&self, args: &[S]) -> Result<Vec<u8>, CheckError> {
        let command = describe(args);
        debug!(%command, dir = %self.repo_dir.display(), "running git (uncancelable)");

        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CheckError::Spawn {
                command: command.clone(),
                source,
            })?;
        finish(command, output.status, output.stdout, &output.stderr)
    }

    fn command<S: AsRef<OsStr>>(&self, args: &[S]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.repo_dir);
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    fn spawn<S: AsRef<OsStr>>(&self, args: &[S], command: &str) -> Result<Child, CheckError> {
        self.command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CheckError::Spawn {
                command: command.to_string(),
                source,
            })
    }
}

/// Split NUL-terminated `-z` output into entries.
pub fn split_nul(output: &[u8]) -> impl Iterator<Item = &[u8]> {
    output.split(|b| *b == 0).filter(|entry| !entry.is_empty())
}

/// Convert a raw path from git output into an argument.
#[cfg(unix)]
pub fn path_arg(raw: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    OsStr::from_bytes(raw).to_os_string()
}

#[cfg(not(unix))]
pub fn path_arg(raw: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(raw).into_owned())
}

fn describe<S: AsRef<OsStr>>(args: &[S]) -> String {
    let mut out = String::from("git");
    for arg in args {
        out.push(' ');
        out.push_str(&arg.as_ref().to_string_lossy());
    }
    out
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<std::io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn collect(
    handle: JoinHandle<std::io::Result<Vec<u8>>>,
    command: &str,
) -> Result<Vec<u8>, CheckError> {
    match handle.join() {
        Ok(read) => read.map_err(|source| CheckError::io(format!("read `{command}` output"), source)),
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

fn finish(
    command: String,
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: &[u8],
) -> Result<Vec<u8>, CheckError> {
    if !status.success() {
        return Err(CheckError::Git {
            command,
            status: status.to_string(),
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        });
    }
    Ok(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ownguard_testkit::TestRepo;

    #[test]
    fn run_returns_stdout() {
        let repo = TestRepo::with_files(&[("a.txt", "a")]);
        let git = Git::new(repo.path());
        let out = git
            .run(&["ls-files"], &CancellationToken::new())
            .expect("ls-files");
        assert_eq!(String::from_utf8_lossy(&out).trim(), "a.txt");
    }

    #[test]
    fn failing_command_carries_stderr() {
        let repo = TestRepo::with_files(&[("a.txt", "a")]);
        let err = Git::new(repo.path())
            .run(&["rev-parse", "does-not-exist"], &CancellationToken::new())
            .unwrap_err();
        let CheckError::Git {
            command, stderr, ..
        } = &err
        else {
            panic!("expected git error, got {err:?}");
        };
        assert_eq!(command, "git rev-parse does-not-exist");
        assert!(!stderr.is_empty());
    }

    #[test]
    fn canceled_token_prevents_spawn() {
        let repo = TestRepo::with_files(&[("a.txt", "a")]);
        let token = CancellationToken::new();
        token.cancel();
        let err = Git::new(repo.path())
            .run(&["status"], &token)
            .unwrap_err();
        assert!(err.is_canceled());
    }

    #[test]
    fn uncancelable_ignores_nothing_but_exit_status() {
        let repo = TestRepo::with_files(&[("a.txt", "a")]);
        let git = Git::new(repo.path());
        assert!(git.run_uncancelable(&["status", "--porcelain"]).is_ok());
        assert!(git.run_uncancelable(&["no-such-subcommand"]).is_err());
    }

    #[test]
    fn split_nul_skips_empty_entries() {
        let entries: Vec<&[u8]> = split_nul(b"a.txt\0dir/b c.txt\0").collect();
        assert_eq!(entries, vec![&b"a.txt"[..], &b"dir/b c.txt"[..]]);
    }
}
