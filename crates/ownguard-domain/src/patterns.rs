//! CODEOWNERS pattern matching.
//!
//! Ownership patterns follow gitignore semantics, the same rules the
//! not-owned check relies on when it writes them into `.gitignore`:
//!
//! - a leading `/` anchors the pattern to the repository root;
//! - a `/` anywhere else except the end also anchors it;
//! - unanchored patterns match at any depth;
//! - a trailing `/` matches directories only (their contents);
//! - a pattern that matches a directory also covers everything below it.

use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,
    #[error("invalid ownership pattern '{pattern}' (glob '{glob}'): {source}")]
    InvalidGlob {
        pattern: String,
        glob: String,
        source: globset::Error,
    },
}

/// An ownership pattern compiled to a glob set over repo-relative paths.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: String,
    set: GlobSet,
}

impl CompiledPattern {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether a repo-relative path (forward slashes) is covered.
    pub fn is_match(&self, path: &str) -> bool {
        let normalized = path.strip_prefix("./").unwrap_or(path);
        self.set.is_match(Path::new(normalized))
    }
}

/// Translate an ownership pattern into the globs that implement it.
///
/// Returns an empty list for blank patterns.
pub fn pattern_globs(pattern: &str) -> Vec<String> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return vec![];
    }

    let dir_only = trimmed.ends_with('/') && trimmed != "/";
    let rooted = trimmed.starts_with('/');
    let body = trimmed.trim_start_matches('/').trim_end_matches('/');

    if body.is_empty() {
        // `/` alone owns the whole tree.
        return vec!["**".to_string()];
    }

    let anchored = rooted || body.contains('/');
    let base = if anchored || body.starts_with("**") {
        body.to_string()
    } else {
        format!("**/{body}")
    };

    if dir_only {
        vec![format!("{base}/**")]
    } else {
        vec![base.clone(), format!("{base}/**")]
    }
}

/// Compile a single ownership pattern.
pub fn compile_pattern(pattern: &str) -> Result<CompiledPattern, PatternError> {
    let globs = pattern_globs(pattern);
    if globs.is_empty() {
        return Err(PatternError::Empty);
    }

    let mut builder = GlobSetBuilder::new();
    for glob in &globs {
        let parsed = GlobBuilder::new(glob)
            .literal_separator(true)
            .build()
            .map_err(|source| PatternError::InvalidGlob {
                pattern: pattern.to_string(),
                glob: glob.clone(),
                source,
            })?;
        builder.add(parsed);
    }

    let set = builder.build().map_err(|source| PatternError::InvalidGlob {
        pattern: pattern.to_string(),
        glob: globs.join(", "),
        source,
    })?;

    Ok(CompiledPattern {
        pattern: pattern.to_string(),
        set,
    })
}
