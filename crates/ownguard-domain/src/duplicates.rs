use std::collections::HashMap;

use ownguard_types::OwnershipEntry;

/// One declaration of a pattern that appears more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub line: u32,
    pub owners: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatedPattern {
    pub pattern: String,
    pub occurrences: Vec<Occurrence>,
}

/// Find patterns declared more than once, in order of first declaration.
pub fn find_duplicated_patterns(entries: &[OwnershipEntry]) -> Vec<DuplicatedPattern> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut grouped: Vec<DuplicatedPattern> = Vec::new();

    for entry in entries {
        let occurrence = Occurrence {
            line: entry.line,
            owners: entry.owners.clone(),
        };
        match index.get(entry.pattern.as_str()) {
            Some(&i) => grouped[i].occurrences.push(occurrence),
            None => {
                index.insert(entry.pattern.as_str(), grouped.len());
                grouped.push(DuplicatedPattern {
                    pattern: entry.pattern.clone(),
                    occurrences: vec![occurrence],
                });
            }
        }
    }

    grouped.retain(|d| d.occurrences.len() > 1);
    grouped
}
