use std::collections::BTreeSet;

use ownguard_types::OwnershipEntry;

/// Patterns exempt from exclusion. Ordered so rendering is deterministic.
pub type SkipSet = BTreeSet<String>;

/// Select the ownership patterns to write as exclusion rules.
///
/// Patterns keep entry order. A pattern is dropped only when it is present in
/// `skip` (exact string match). Duplicates are kept as given.
pub fn compute_excluded_patterns(entries: &[OwnershipEntry], skip: &SkipSet) -> Vec<String> {
    entries
        .iter()
        .filter(|e| !skip.contains(&e.pattern))
        .map(|e| e.pattern.clone())
        .collect()
}
