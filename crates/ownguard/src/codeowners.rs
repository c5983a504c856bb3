//! CODEOWNERS discovery and parsing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use ownguard_types::{CODEOWNERS_LOCATIONS, OwnershipEntry};

/// A parsed ownership file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codeowners {
    pub path: PathBuf,
    pub entries: Vec<OwnershipEntry>,
}

/// First conventional ownership file that exists under `repo`.
pub fn locate(repo: &Path) -> Option<PathBuf> {
    CODEOWNERS_LOCATIONS
        .iter()
        .map(|rel| repo.join(rel))
        .find(|candidate| candidate.is_file())
}

pub fn load(repo: &Path) -> Result<Codeowners> {
    let Some(path) = locate(repo) else {
        bail!(
            "no CODEOWNERS file found in '{}' (looked in: {})",
            repo.display(),
            CODEOWNERS_LOCATIONS.join(", ")
        );
    };
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("read CODEOWNERS '{}'", path.display()))?;
    let entries = parse(&text);
    debug!(path = %path.display(), entries = entries.len(), "loaded CODEOWNERS");
    Ok(Codeowners { path, entries })
}

/// Parse ownership lines. Blank lines and comments are skipped.
pub fn parse(text: &str) -> Vec<OwnershipEntry> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let line = strip_comment(raw.trim());
            let mut tokens = line.split_whitespace();
            let pattern = tokens.next()?;
            Some(OwnershipEntry {
                line: u32::try_from(idx + 1).unwrap_or(u32::MAX),
                pattern: pattern.to_string(),
                owners: tokens.map(str::to_string).collect(),
            })
        })
        .collect()
}

/// Cut a full-line comment or a trailing ` #` comment.
fn strip_comment(line: &str) -> &str {
    if line.starts_with('#') {
        return "";
    }
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'#' && i > 0 && bytes[i - 1].is_ascii_whitespace() {
            return &line[..i];
        }
    }
    line
}
