//! Common test fixtures for ownguard.

use ownguard_types::OwnershipEntry;

/// Entries for the given patterns, each owned by `@org/team`, numbered from line 1.
pub fn entries_for(patterns: &[&str]) -> Vec<OwnershipEntry> {
    patterns
        .iter()
        .enumerate()
        .map(|(i, p)| OwnershipEntry {
            line: i as u32 + 1,
            pattern: p.to_string(),
            owners: vec!["@org/team".to_string()],
        })
        .collect()
}

/// A realistic CODEOWNERS file with comments, blank lines and a duplicate.
pub fn sample_codeowners() -> &'static str {
    "\
# Default owners
*                   @org/core

# Documentation
/docs/              @org/docs docs@example.com
*.md                @org/docs   # trailing comment

# Build tooling
/build/ @org/infra
*.md                @org/writers
"
}
