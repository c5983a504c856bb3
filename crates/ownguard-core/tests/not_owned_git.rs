//! Not-owned check against real git repositories.
//!
//! Every test verifies that the working tree, the index and `.gitignore`
//! are exactly as they were before the check ran.

use proptest::prelude::*;

use ownguard_core::checks::{DIRTY_TREE_MESSAGE, NotOwnedFile};
use ownguard_core::{CancellationToken, Check};
use ownguard_testkit::{TestRepo, arb_entry, entries_for};
use ownguard_types::{CheckInput, CheckOutput, NotOwnedConfig};

fn run(repo: &TestRepo, config: &NotOwnedConfig, patterns: &[&str]) -> CheckOutput {
    let input = CheckInput {
        repo_dir: repo.path().to_path_buf(),
        entries: entries_for(patterns),
    };
    NotOwnedFile::new(config)
        .check(&input, &CancellationToken::new())
        .expect("check should succeed")
}

fn skip(patterns: &[&str]) -> NotOwnedConfig {
    NotOwnedConfig {
        skip_patterns: patterns.iter().map(|p| p.to_string()).collect(),
        ..Default::default()
    }
}

/// Given tracked a.txt, b.txt, c.txt owned through a.txt and b.txt,
/// only c.txt is reported.
#[test]
fn reports_exactly_the_unowned_file() {
    let repo = TestRepo::with_files(&[("a.txt", "a"), ("b.txt", "b"), ("c.txt", "c")]);
    let out = run(&repo, &NotOwnedConfig::default(), &["a.txt", "b.txt"]);

    assert_eq!(out.issues.len(), 1);
    assert_eq!(
        out.issues[0].message,
        "Found 1 not owned files (skipped patterns: none):\n  * c.txt"
    );
}

/// Given a skipped pattern, the files it would have owned are reported too.
#[test]
fn skipped_pattern_provides_no_ownership() {
    let repo = TestRepo::with_files(&[("a.txt", "a"), ("b.txt", "b"), ("c.txt", "c")]);
    let out = run(&repo, &skip(&["a.txt"]), &["a.txt", "b.txt"]);

    assert_eq!(out.issues.len(), 1);
    assert_eq!(
        out.issues[0].message,
        "Found 2 not owned files (skipped patterns: \"a.txt\"):\n  * a.txt\n  * c.txt"
    );
}

/// Given full coverage, no issue is reported.
#[test]
fn fully_owned_repository_is_clean() {
    let repo = TestRepo::with_files(&[("src/lib.rs", ""), ("docs/index.md", ""), ("README", "")]);
    let out = run(&repo, &NotOwnedConfig::default(), &["/src/", "*.md", "README"]);
    assert!(out.is_clean(), "{:?}", out.issues);
}

/// Given an existing `.gitignore`, its bytes and the index survive the run.
#[test]
fn restores_existing_ignore_file_and_index() {
    let repo = TestRepo::with_files(&[
        (".gitignore", "target/\n# keep"),
        ("a.txt", "a"),
        ("docs/b.md", "b"),
        ("c.txt", "c"),
    ]);
    let gitignore_before = repo.gitignore();
    let index_before = repo.index_snapshot();

    let out = run(&repo, &NotOwnedConfig::default(), &["*.md", "a.txt"]);
    assert_eq!(out.issues.len(), 1);
    assert!(out.issues[0].message.contains("  * c.txt"));
    assert!(out.issues[0].message.contains("  * .gitignore"));

    assert_eq!(repo.gitignore(), gitignore_before);
    assert_eq!(repo.index_snapshot(), index_before);
    assert!(repo.is_clean());
}

/// Given no `.gitignore` before the run, none exists afterwards.
#[test]
fn removes_ignore_file_it_created() {
    let repo = TestRepo::with_files(&[("a.txt", "a"), ("b.txt", "b")]);
    let index_before = repo.index_snapshot();

    run(&repo, &NotOwnedConfig::default(), &["a.txt"]);

    assert!(repo.gitignore().is_none());
    assert_eq!(repo.index_snapshot(), index_before);
    assert!(repo.is_clean());
}

/// Given an uncommitted change, one issue is reported and nothing is written.
#[test]
fn dirty_tree_is_reported_without_mutation() {
    let repo = TestRepo::with_files(&[("a.txt", "a")]);
    repo.write_file("scratch.txt", "wip");
    let status_before = repo.status();

    let out = run(&repo, &NotOwnedConfig::default(), &["*"]);

    assert_eq!(out.issues.len(), 1);
    assert_eq!(out.issues[0].message, DIRTY_TREE_MESSAGE);
    assert!(repo.gitignore().is_none());
    assert_eq!(repo.status(), status_before);
}

/// Given subdirectories, only files below them are considered.
#[test]
fn subdirectories_limit_the_listing() {
    let repo = TestRepo::with_files(&[("root.txt", ""), ("src/a.rs", ""), ("src/b.txt", "")]);
    let config = NotOwnedConfig {
        subdirectories: vec!["src".to_string()],
        ..Default::default()
    };
    let out = run(&repo, &config, &["*.rs"]);

    assert_eq!(out.issues.len(), 1);
    let msg = &out.issues[0].message;
    assert!(msg.starts_with("Found 1 not owned files"), "{msg}");
    assert!(msg.contains("  * src/b.txt"), "{msg}");
    assert!(!msg.contains("root.txt"), "{msg}");
}

/// Given trust enabled, the repository is recorded in the global config.
#[test]
fn trust_workspace_writes_global_safe_directory() {
    let repo = TestRepo::with_files(&[("a.txt", "a")]);
    let home = tempfile::TempDir::new().expect("temp home");
    let global = home.path().join("gitconfig");
    let config = NotOwnedConfig {
        trust_workspace: true,
        ..Default::default()
    };
    let input = CheckInput {
        repo_dir: repo.path().to_path_buf(),
        entries: entries_for(&["*"]),
    };

    let out = NotOwnedFile::new(&config)
        .with_git_env("GIT_CONFIG_GLOBAL", &global)
        .check(&input, &CancellationToken::new())
        .expect("check should succeed");

    assert!(out.is_clean(), "{:?}", out.issues);
    let written = std::fs::read_to_string(&global).expect("global config written");
    assert!(written.contains("safe"), "{written}");
    assert!(written.contains("directory"), "{written}");
}

/// Given a canceled token, the check fails with cancellation and leaves no trace.
#[test]
fn canceled_check_leaves_repository_untouched() {
    let repo = TestRepo::with_files(&[("a.txt", "a")]);
    let token = CancellationToken::new();
    token.cancel();
    let input = CheckInput {
        repo_dir: repo.path().to_path_buf(),
        entries: entries_for(&["*"]),
    };

    let err = NotOwnedFile::new(&NotOwnedConfig::default())
        .check(&input, &token)
        .unwrap_err();
    assert!(err.is_canceled());
    assert!(repo.gitignore().is_none());
    assert!(repo.is_clean());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// For any non-empty ownership list, the ignore file and the index are
    /// byte-identical before and after the check.
    #[test]
    fn restoration_is_exact_for_any_patterns(
        entries in prop::collection::vec(arb_entry(), 1..=6),
    ) {
        let repo = TestRepo::with_files(&[
            (".gitignore", "target/\n"),
            ("README.md", "readme"),
            ("src/main.rs", "fn main() {}"),
            ("src/util/mod.rs", ""),
            ("docs/a.txt", "a"),
        ]);
        let gitignore_before = repo.gitignore();
        let index_before = repo.index_snapshot();

        let input = CheckInput {
            repo_dir: repo.path().to_path_buf(),
            entries,
        };
        let result = NotOwnedFile::new(&NotOwnedConfig::default())
            .check(&input, &CancellationToken::new());

        prop_assert!(result.is_ok(), "{:?}", result.err());
        prop_assert_eq!(repo.gitignore(), gitignore_before);
        prop_assert_eq!(repo.index_snapshot(), index_before);
        prop_assert!(repo.is_clean());
    }
}
