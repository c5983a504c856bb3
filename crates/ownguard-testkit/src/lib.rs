//! Shared test utilities for the ownguard workspace.
//!
//! This crate provides:
//! - **arb**: Proptest strategies for ownership entries and severities
//! - **repo**: Temporary git repositories for exercising the git-backed checks
//! - **fixtures**: Sample CODEOWNERS files and entry lists
//!
//! # Example
//!
//! ```rust,ignore
//! use ownguard_testkit::TestRepo;
//!
//! let repo = TestRepo::with_files(&[("a.txt", "a"), ("b.txt", "b")]);
//! assert_eq!(repo.tracked_files(), vec!["a.txt", "b.txt"]);
//! ```

pub mod arb;
pub mod fixtures;
pub mod repo;

pub use arb::{arb_entries, arb_entry, arb_pattern, arb_severity};
pub use fixtures::{entries_for, sample_codeowners};
pub use repo::{TestRepo, run_git};
