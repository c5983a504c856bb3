use ownguard_domain::{duplicated_patterns_message, find_duplicated_patterns};
use ownguard_types::{CheckInput, CheckOutput, OutputBuilder};

use crate::cancel::CancellationToken;
use crate::check::Check;
use crate::error::CheckError;

/// Reports patterns declared on more than one line.
#[derive(Debug, Default, Clone, Copy)]
pub struct DuplicatedPatterns;

impl Check for DuplicatedPatterns {
    fn name(&self) -> &str {
        "Duplicated Pattern Checker"
    }

    fn check(
        &self,
        input: &CheckInput,
        cancel: &CancellationToken,
    ) -> Result<CheckOutput, CheckError> {
        cancel.check()?;

        let mut out = OutputBuilder::default();
        let dups = find_duplicated_patterns(&input.entries);
        if !dups.is_empty() {
            out.report_issue(duplicated_patterns_message(&dups));
        }
        Ok(out.output())
    }
}
