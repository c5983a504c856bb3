//! Property-based tests for ownguard-types.

use ownguard_types::{ConfigFile, NotOwnedConfig, Severity};
use proptest::prelude::*;

fn arb_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Info),
        Just(Severity::Warning),
        Just(Severity::Error),
    ]
}

proptest! {
    /// `as_str` output parses back to the same severity.
    #[test]
    fn severity_display_parses_back(sev in arb_severity()) {
        prop_assert_eq!(sev.as_str().parse::<Severity>(), Ok(sev));
        prop_assert_eq!(sev.to_string(), sev.as_str());
    }

    /// The derived order matches the declared rank.
    #[test]
    fn severity_order_matches_rank(a in arb_severity(), b in arb_severity()) {
        let rank = |s: Severity| match s {
            Severity::Info => 0,
            Severity::Warning => 1,
            Severity::Error => 2,
        };
        prop_assert_eq!(a.cmp(&b), rank(a).cmp(&rank(b)));
    }
}

#[test]
fn config_file_parses_minimal_toml() {
    let cfg: ConfigFile = toml::from_str(
        r#"
check_failure_level = "error"
experimental_checks = ["notowned"]

[not_owned]
skip_patterns = ["*"]
subdirectories = ["src"]
"#,
    )
    .expect("parse config");

    assert_eq!(cfg.check_failure_level, Some(Severity::Error));
    assert!(cfg.checks.is_empty());
    assert_eq!(cfg.experimental_checks, vec!["notowned".to_string()]);
    assert_eq!(
        cfg.not_owned,
        NotOwnedConfig {
            skip_patterns: vec!["*".to_string()],
            subdirectories: vec!["src".to_string()],
            trust_workspace: false,
            ignore_case: false,
        }
    );
}

#[test]
fn config_file_rejects_unknown_keys() {
    let err = toml::from_str::<ConfigFile>("unknown_key = 1\n").unwrap_err();
    assert!(err.to_string().contains("unknown_key"));
}

#[test]
fn severity_serializes_snake_case() {
    let json = serde_json::to_string(&Severity::Warning).expect("serialize");
    assert_eq!(json, "\"warning\"");
}
