use ownguard_domain::compile_pattern;
use ownguard_types::{CheckInput, CheckOutput, OutputBuilder};
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::check::Check;
use crate::error::CheckError;
use crate::git::{Git, split_nul};

/// Reports patterns that match no file in the repository.
///
/// Tracked files and untracked files that are not ignored both count.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileExists;

impl FileExists {
    fn repository_files(
        &self,
        input: &CheckInput,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, CheckError> {
        let out = Git::new(&input.repo_dir).run(
            &["ls-files", "-z", "--cached", "--others", "--exclude-standard"],
            cancel,
        )?;
        Ok(split_nul(&out)
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
            .collect())
    }
}

impl Check for FileExists {
    fn name(&self) -> &str {
        "File Exist Checker"
    }

    fn check(
        &self,
        input: &CheckInput,
        cancel: &CancellationToken,
    ) -> Result<CheckOutput, CheckError> {
        cancel.check()?;

        let mut out = OutputBuilder::default();
        if input.entries.is_empty() {
            return Ok(out.output());
        }

        let files = self.repository_files(input, cancel)?;
        debug!(files = files.len(), "listed repository files");

        for entry in &input.entries {
            let compiled = match compile_pattern(&entry.pattern) {
                Ok(compiled) => compiled,
                Err(err) => {
                    out.report_issue(format!("line {}: {err}", entry.line));
                    continue;
                }
            };
            if !files.iter().any(|f| compiled.is_match(f)) {
                out.report_issue(format!(
                    "line {}: {:?} does not match any files in repository",
                    entry.line, entry.pattern
                ));
            }
        }
        Ok(out.output())
    }
}
