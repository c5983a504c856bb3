//! Built-in checks.

mod duplicated_patterns;
mod file_exists;
mod not_owned;

pub use duplicated_patterns::DuplicatedPatterns;
pub use file_exists::FileExists;
pub use not_owned::{DIRTY_TREE_MESSAGE, EMPTY_OWNERSHIP_MESSAGE, NotOwnedFile};
