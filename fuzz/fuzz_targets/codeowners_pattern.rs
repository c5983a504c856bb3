//! Fuzz target for ownership pattern compilation and matching.
//!
//! Compilation must return an error for invalid input and never panic;
//! a compiled pattern must answer `is_match` for any path.

#![no_main]

use libfuzzer_sys::fuzz_target;

use ownguard_domain::{compile_pattern, pattern_globs};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 500 {
        return;
    }

    // First line is the pattern, the rest are candidate paths.
    let mut lines = text.lines();
    let Some(pattern) = lines.next() else {
        return;
    };

    let globs = pattern_globs(pattern);
    if let Ok(compiled) = compile_pattern(pattern) {
        assert!(!globs.is_empty());
        for path in lines {
            let _ = compiled.is_match(path);
        }
    }
});
