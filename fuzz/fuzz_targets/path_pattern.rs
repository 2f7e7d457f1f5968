//! Fuzz target for pattern compilation and matching.
//!
//! Run with: cargo +nightly fuzz run path_pattern
//!
//! The input is split at the first newline into a pattern and a path.
//! Compiling and matching must never panic, and `**` must match any path.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (pattern, path) = text.split_once('\n').unwrap_or((text, ""));

    if let Ok(pattern) = archpatch::PathPattern::new(pattern) {
        let _ = pattern.matches(path);
    }

    if let Some(entry) = archpatch::EntryPath::parse(path) {
        let any = archpatch::PathPattern::new("**").unwrap();
        assert!(any.matches_entry(&entry));
    }
});
