//! Issue message formatting shared by the built-in checks.

use crate::duplicates::DuplicatedPattern;
use crate::exclusion::SkipSet;

/// Render items as an indented bullet list, one per line, no trailing newline.
pub fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("  * {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn not_owned_message(files: &[String], skip: &SkipSet) -> String {
    let skipped = if skip.is_empty() {
        "none".to_string()
    } else {
        skip.iter()
            .map(|p| format!("{p:?}"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "Found {} not owned files (skipped patterns: {}):\n{}",
        files.len(),
        skipped,
        bullet_list(files)
    )
}

pub fn duplicated_patterns_message(dups: &[DuplicatedPattern]) -> String {
    let mut out = String::from("Found duplicated patterns:\n");
    for dup in dups {
        out.push_str(&format!(
            "\nPattern {:?} is defined {} times in lines:\n",
            dup.pattern,
            dup.occurrences.len()
        ));
        let lines: Vec<String> = dup
            .occurrences
            .iter()
            .map(|o| format!("{}: with owners: [{}]", o.line, o.owners.join(" ")))
            .collect();
        out.push_str(&bullet_list(&lines));
        out.push('\n');
    }
    out.trim_end().to_string()
}
