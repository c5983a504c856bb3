//! Temporary git repositories for integration tests.

use std::path::Path;

use tempfile::TempDir;

/// A committed git repository in a temporary directory.
///
/// Provides helpers for:
/// - Creating commits with specific file content
/// - Inspecting the ignore-rules file and the index
/// - Making the working tree dirty
pub struct TestRepo {
    /// The temporary directory containing the repo.
    pub dir: TempDir,
}

impl TestRepo {
    /// Create a repository whose first commit contains `files`.
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path();

        run_git(path, &["init", "--quiet"]);
        run_git(path, &["config", "user.email", "test@example.com"]);
        run_git(path, &["config", "user.name", "Test"]);
        run_git(path, &["config", "commit.gpgsign", "false"]);
        run_git(path, &["config", "core.autocrlf", "false"]);

        let repo = Self { dir };
        for (file_path, content) in files {
            repo.write_file(file_path, content);
        }
        repo.commit("initial baseline");
        repo
    }

    /// Get the path to the repository root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write content to a file in the repository.
    pub fn write_file(&self, relative_path: &str, content: &str) {
        let full_path = self.path().join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&full_path, content).expect("write file");
    }

    /// Stage everything and commit. Returns the new HEAD sha.
    pub fn commit(&self, message: &str) -> String {
        run_git(self.path(), &["add", "--all"]);
        run_git(
            self.path(),
            &["commit", "--quiet", "--allow-empty", "-m", message],
        );
        run_git(self.path(), &["rev-parse", "HEAD"])
    }

    /// Raw bytes of `.gitignore`, or `None` if it does not exist.
    pub fn gitignore(&self) -> Option<Vec<u8>> {
        std::fs::read(self.path().join(".gitignore")).ok()
    }

    /// Index contents with modes and blob ids (`git ls-files --stage`).
    pub fn index_snapshot(&self) -> String {
        run_git(self.path(), &["ls-files", "--stage"])
    }

    /// Tracked file paths, sorted as git lists them.
    pub fn tracked_files(&self) -> Vec<String> {
        run_git(self.path(), &["ls-files"])
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// `git status --porcelain` output.
    pub fn status(&self) -> String {
        run_git(self.path(), &["status", "--porcelain"])
    }

    pub fn is_clean(&self) -> bool {
        self.status().is_empty()
    }
}

/// Run a git command and return the trimmed stdout.
pub fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("git command should run");

    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
