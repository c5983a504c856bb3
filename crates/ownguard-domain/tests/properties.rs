//! Property-based tests for ownguard-domain.
//!
//! These tests verify the exclusion engine and pattern compilation over
//! generated ownership entries.

use proptest::prelude::*;

use ownguard_domain::{SkipSet, compile_pattern, compute_excluded_patterns};
use ownguard_testkit::arb::{arb_entries, arb_pattern};

proptest! {
    /// With nothing skipped, every pattern is excluded, in order, duplicates included.
    #[test]
    fn empty_skip_set_is_identity(entries in arb_entries()) {
        let out = compute_excluded_patterns(&entries, &SkipSet::new());
        let expected: Vec<String> = entries.iter().map(|e| e.pattern.clone()).collect();
        prop_assert_eq!(out, expected);
    }

    /// No skipped pattern survives, and every surviving pattern keeps its relative order.
    #[test]
    fn skipped_patterns_never_survive(
        entries in arb_entries(),
        skip_mask in prop::collection::vec(any::<bool>(), 0..16),
    ) {
        let skip: SkipSet = entries
            .iter()
            .zip(skip_mask.iter().chain(std::iter::repeat(&false)))
            .filter(|(_, skip)| **skip)
            .map(|(e, _)| e.pattern.clone())
            .collect();

        let out = compute_excluded_patterns(&entries, &skip);

        prop_assert!(out.iter().all(|p| !skip.contains(p)));
        let expected: Vec<String> = entries
            .iter()
            .filter(|e| !skip.contains(&e.pattern))
            .map(|e| e.pattern.clone())
            .collect();
        prop_assert_eq!(out, expected);
    }

    /// Generated patterns always compile and never panic.
    #[test]
    fn generated_patterns_compile(pattern in arb_pattern()) {
        prop_assert!(compile_pattern(&pattern).is_ok(), "pattern {:?}", pattern);
    }

    /// Arbitrary input may be rejected but must not panic.
    #[test]
    fn arbitrary_patterns_never_panic(pattern in ".{0,40}") {
        let _ = compile_pattern(&pattern);
    }
}
