//! Property-based tests using proptest.
//!
//! These tests check entry path normalization, pattern semantics and
//! layering against randomly generated inputs.

use std::collections::BTreeMap;

use archpatch::{EntryPath, LooseFile, PatchSpec, PathPattern, PatternSet, patch};
use proptest::prelude::*;

mod common;

use common::{Workspace, read_tree};

/// Strategy for one literal path segment.
fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9_.-]{0,7}"
}

/// Strategy for valid relative entry paths with 1-4 segments.
fn valid_path_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(segment_strategy(), 1..5).prop_map(|parts| parts.join("/"))
}

proptest! {
    /// Valid paths parse unchanged.
    #[test]
    fn valid_paths_parse_unchanged(path in valid_path_strategy()) {
        let parsed = EntryPath::parse(&path);
        prop_assert!(parsed.is_some(), "Valid path '{}' failed to parse", path);
        let parsed = parsed.unwrap();
        prop_assert_eq!(parsed.as_str(), path.as_str());
    }

    /// Backslash separators are equivalent to forward slashes.
    #[test]
    fn backslashes_normalize(parts in proptest::collection::vec(segment_strategy(), 1..5)) {
        let forward = EntryPath::parse(&parts.join("/"));
        let backward = EntryPath::parse(&parts.join("\\"));
        prop_assert_eq!(forward, backward);
    }

    /// Redundant separators and `.` segments are dropped.
    #[test]
    fn redundant_segments_dropped(parts in proptest::collection::vec(segment_strategy(), 1..5)) {
        let noisy = format!("./{}/", parts.join("//./"));
        let parsed = EntryPath::parse(&noisy).unwrap();
        prop_assert_eq!(parsed.as_str(), parts.join("/"));
    }

    /// Paths with a `..` segment never parse.
    #[test]
    fn traversal_paths_rejected(
        prefix in valid_path_strategy(),
        suffix in valid_path_strategy()
    ) {
        let path = format!("{}/../{}", prefix, suffix);
        prop_assert!(EntryPath::parse(&path).is_none(), "Traversal path '{}' should be rejected", path);
    }

    /// Absolute paths never parse.
    #[test]
    fn absolute_paths_rejected(path in valid_path_strategy()) {
        let absolute = format!("/{}", path);
        prop_assert!(EntryPath::parse(&absolute).is_none());
    }

    /// Paths containing NUL never parse.
    #[test]
    fn nul_bytes_rejected(prefix in "[a-z]{0,5}", suffix in "[a-z]{0,5}") {
        let path = format!("{}\0{}", prefix, suffix);
        prop_assert!(EntryPath::parse(&path).is_none());
    }

    /// A pattern without wildcards matches exactly its own path.
    #[test]
    fn literal_pattern_matches_itself_only(
        path in valid_path_strategy(),
        other in valid_path_strategy()
    ) {
        let pattern = PathPattern::new(&path).unwrap();
        prop_assert!(pattern.matches(&path));
        prop_assert_eq!(pattern.matches(&other), other == path);
    }

    /// `**` matches every path.
    #[test]
    fn double_star_matches_everything(path in valid_path_strategy()) {
        prop_assert!(PathPattern::new("**").unwrap().matches(&path));
    }

    /// `*` matches single-segment paths only.
    #[test]
    fn single_star_stays_in_segment(path in valid_path_strategy()) {
        let segments = path.split('/').count();
        prop_assert_eq!(PathPattern::new("*").unwrap().matches(&path), segments == 1);
    }

    /// `dir/**` matches everything below `dir`, `dir/*` only direct children.
    #[test]
    fn recursive_versus_direct_children(
        dir in segment_strategy(),
        rest in valid_path_strategy()
    ) {
        let path = format!("{}/{}", dir, rest);
        let depth = rest.split('/').count();

        let recursive = PathPattern::new(&format!("{}/**", dir)).unwrap();
        let direct = PathPattern::new(&format!("{}/*", dir)).unwrap();

        prop_assert!(recursive.matches(&path));
        prop_assert_eq!(direct.matches(&path), depth == 1);
    }

    /// Matching is case-sensitive.
    #[test]
    fn matching_is_case_sensitive(path in "[a-z]{1,8}(/[a-z]{1,8}){0,3}") {
        let upper = path.to_uppercase();
        let pattern = PathPattern::new(&path).unwrap();
        prop_assert!(!pattern.matches(&upper));
    }

    /// A pattern set matches when any of its patterns does.
    #[test]
    fn pattern_set_is_any_match(
        patterns in proptest::collection::vec(valid_path_strategy(), 0..4),
        path in valid_path_strategy()
    ) {
        let set = PatternSet::new(&patterns).unwrap();
        let expected = patterns.iter().any(|p| p == &path);
        prop_assert_eq!(set.matches(&path), expected);
    }
}

/// Strategy for a small set of files over a fixed name pool, so layers
/// overlap often.
fn layer_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    let names = prop::sample::select(vec!["a.txt", "b.txt", "d/c.txt", "d/e/f.txt"]);
    proptest::collection::btree_map(names.prop_map(String::from), "[a-z]{1,6}", 0..4)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// The output holds, for every path, the content of the last layer that
    /// wrote it.
    #[test]
    fn last_layer_wins(
        base in layer_strategy(),
        secondary in layer_strategy(),
        loose in layer_strategy()
    ) {
        let ws = Workspace::new();
        let base_refs: Vec<(&str, &str)> =
            base.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let secondary_refs: Vec<(&str, &str)> =
            secondary.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

        let base_zip = ws.zip("base.jar", &base_refs);
        let lib_zip = ws.zip("lib-1.jar", &secondary_refs);

        let mut spec = PatchSpec::new(&base_zip, ws.path("out"))
            .secondary_archive(&lib_zip)
            .include_from("lib-", ["**"]);
        for (i, (dest, content)) in loose.iter().enumerate() {
            let source = ws.file(&format!("loose/{}.bin", i), content);
            spec = spec.loose_file(LooseFile::file(source, dest.as_str()));
        }

        patch(&spec).unwrap();

        let mut expected: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        for layer in [&base, &secondary, &loose] {
            for (path, content) in layer {
                expected.insert(path.clone(), content.as_bytes().to_vec());
            }
        }
        prop_assert_eq!(read_tree(&ws.path("out")), expected);
    }
}
