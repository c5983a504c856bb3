//! Proptest strategies for generating valid test inputs.
//!
//! Strategies are constructive: every generated pattern is a valid
//! CODEOWNERS pattern, so no filtering is needed.
//!
//! # Bounds
//!
//! - Max entries per list: 12
//! - Max path segments per pattern: 3
//! - Max owners per entry: 3

use ownguard_types::{OwnershipEntry, Severity};
use proptest::prelude::*;

/// Maximum number of entries in a generated list
pub const MAX_ENTRIES: usize = 12;

/// Maximum number of path segments in a generated pattern
pub const MAX_SEGMENTS: usize = 3;

/// Strategy for generating Severity values.
pub fn arb_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Info),
        Just(Severity::Warning),
        Just(Severity::Error),
    ]
}

fn arb_segment() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z][a-z0-9_]{0,8}",
        1 => "\\*\\.[a-z]{1,3}",
        1 => Just("*".to_string()),
        1 => Just("**".to_string()),
    ]
}

/// Strategy for generating valid ownership patterns.
///
/// Small segment alphabet on purpose, so generated lists contain duplicates.
pub fn arb_pattern() -> impl Strategy<Value = String> {
    (
        any::<bool>(),
        prop::collection::vec(arb_segment(), 1..=MAX_SEGMENTS),
        any::<bool>(),
    )
        .prop_map(|(rooted, segments, dir_only)| {
            let mut p = String::new();
            if rooted {
                p.push('/');
            }
            p.push_str(&segments.join("/"));
            if dir_only {
                p.push('/');
            }
            p
        })
}

/// Strategy for generating owner handles.
pub fn arb_owner() -> impl Strategy<Value = String> {
    prop_oneof![
        "@[a-z]{1,8}",
        "@[a-z]{1,6}/[a-z]{1,6}",
        "[a-z]{1,6}@example\\.com",
    ]
}

/// Strategy for generating a single entry with a line number.
pub fn arb_entry() -> impl Strategy<Value = OwnershipEntry> {
    (
        1u32..500,
        arb_pattern(),
        prop::collection::vec(arb_owner(), 1..=3),
    )
        .prop_map(|(line, pattern, owners)| OwnershipEntry {
            line,
            pattern,
            owners,
        })
}

/// Strategy for generating entry lists, possibly empty.
pub fn arb_entries() -> impl Strategy<Value = Vec<OwnershipEntry>> {
    prop::collection::vec(arb_entry(), 0..=MAX_ENTRIES)
}
