//! Domain logic: pattern exclusion, pattern matching, duplicate detection.
//!
//! This crate is designed to be I/O-free and highly testable.

pub mod duplicates;
pub mod exclusion;
pub mod format;
pub mod patterns;

pub use duplicates::{DuplicatedPattern, Occurrence, find_duplicated_patterns};
pub use exclusion::{SkipSet, compute_excluded_patterns};
pub use format::{bullet_list, duplicated_patterns_message, not_owned_message};
pub use patterns::{CompiledPattern, PatternError, compile_pattern, pattern_globs};
