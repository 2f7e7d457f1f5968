//! Fuzz target for EntryPath::parse with arbitrary string input.
//!
//! Run with: cargo +nightly fuzz run entry_path
//!
//! Accepted names must stay inside the output directory: no `..` or `.`
//! segment, no leading separator, no drive segment, no NUL byte, no
//! backslash.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };
    let Some(path) = archpatch::EntryPath::parse(name) else {
        return;
    };

    let normalized = path.as_str();
    assert!(!normalized.is_empty());
    assert!(!normalized.starts_with('/'), "Absolute path accepted: {:?}", normalized);
    assert!(!normalized.contains('\\'), "Backslash kept: {:?}", normalized);
    assert!(!normalized.contains('\0'), "NUL byte kept: {:?}", normalized);
    for segment in normalized.split('/') {
        assert!(
            !segment.is_empty() && segment != "." && segment != "..",
            "Bad segment {:?} in {:?}",
            segment,
            normalized
        );
        let bytes = segment.as_bytes();
        assert!(
            !(bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'),
            "Drive segment {:?} in {:?}",
            segment,
            normalized
        );
    }

    // Parsing is idempotent.
    assert_eq!(archpatch::EntryPath::parse(normalized).as_ref(), Some(&path));
});
