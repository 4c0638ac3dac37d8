//! Property-based tests for mapping table loading
//!
//! Checks column parsing, direction handling and build resolution.

use annofetch::{ChromMap, Direction, MappingLoader};
use proptest::prelude::*;
use std::collections::HashMap;

/// Generate a source identifier
fn arb_source_id() -> impl Strategy<Value = String> {
    "[0-9A-Z]{1,3}(\\.[0-9])?"
}

/// Generate a table with unique sources and unique targets
fn arb_pairs() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::hash_set(arb_source_id(), 0..40).prop_map(|ids| {
        ids.into_iter()
            .map(|id| {
                let target = format!("chr{}", id.replace('.', "v"));
                (id, target)
            })
            .collect()
    })
}

/// Generate a column separator
fn arb_separator() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("\t".to_string()),
        Just(" ".to_string()),
        Just("  \t ".to_string()),
    ]
}

/// Render pairs as a mapping file with comments and blank lines mixed in
fn arb_table_text() -> impl Strategy<Value = (Vec<(String, String)>, String)> {
    (arb_pairs(), arb_separator(), any::<bool>()).prop_map(|(pairs, sep, header)| {
        let mut text = String::new();
        if header {
            text.push_str("# Ensembl\tUCSC\n");
        }
        for (i, (source, target)) in pairs.iter().enumerate() {
            text.push_str(&format!("{}{}{}\n", source, sep, target));
            if i % 7 == 3 {
                text.push('\n');
            }
        }
        (pairs, text)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: every line of a well-formed table becomes one entry
    #[test]
    fn prop_forward_lookup((pairs, text) in arb_table_text()) {
        let map = ChromMap::from_text(&text, Direction::Forward);

        prop_assert_eq!(map.len(), pairs.len());
        prop_assert_eq!(map.skipped_lines(), 0);
        for (source, target) in &pairs {
            prop_assert_eq!(map.get(source.as_bytes()), Some(target.as_bytes()));
        }
    }

    /// Property: reverse direction looks up by the second column
    #[test]
    fn prop_reverse_lookup((pairs, text) in arb_table_text()) {
        let map = ChromMap::from_text(&text, Direction::Reverse);

        for (source, target) in &pairs {
            prop_assert_eq!(map.get(target.as_bytes()), Some(source.as_bytes()));
        }
    }

    /// Property: reversing a loaded table equals loading it reversed
    #[test]
    fn prop_reversed_equals_reverse_direction((pairs, text) in arb_table_text()) {
        let reversed = ChromMap::from_text(&text, Direction::Forward).reversed();
        let direct = ChromMap::from_text(&text, Direction::Reverse);

        prop_assert_eq!(reversed.len(), direct.len());
        for (_, target) in &pairs {
            prop_assert_eq!(reversed.get(target.as_bytes()), direct.get(target.as_bytes()));
        }
    }

    /// Property: reader and text parsing agree
    #[test]
    fn prop_reader_matches_text((pairs, text) in arb_table_text()) {
        let from_reader = ChromMap::from_reader(text.as_bytes(), Direction::Forward).unwrap();
        let from_text = ChromMap::from_text(&text, Direction::Forward);

        prop_assert_eq!(from_reader.len(), from_text.len());
        for (source, _) in &pairs {
            prop_assert_eq!(from_reader.get(source.as_bytes()), from_text.get(source.as_bytes()));
        }
    }

    /// Property: lines without exactly two columns are skipped, never half-loaded
    #[test]
    fn prop_malformed_lines_skipped(
        (pairs, text) in arb_table_text(),
        junk in prop::collection::vec("[a-z]{1,5}( [a-z]{1,5} [a-z]{1,5})?", 1..5),
    ) {
        let mut noisy = text.clone();
        for line in &junk {
            noisy.push_str(line);
            noisy.push('\n');
        }

        let map = ChromMap::from_text(&noisy, Direction::Forward);
        prop_assert_eq!(map.len(), pairs.len());
        prop_assert_eq!(map.skipped_lines(), junk.len());
    }
}

#[test]
fn test_override_table_is_loaded_from_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut expected = HashMap::new();
    let mut text = String::from("# Ensembl\tUCSC\n");
    for n in 1..=5 {
        text.push_str(&format!("{}\tchr{}\n", n, n));
        expected.insert(n.to_string(), format!("chr{}", n));
    }
    std::fs::write(dir.path().join(MappingLoader::file_name("CanFam3.1")), text).unwrap();

    let map = MappingLoader::with_dir(dir.path())
        .load("CanFam3.1", Direction::Forward)
        .unwrap();
    assert_eq!(map.len(), expected.len());
    for (source, target) in &expected {
        assert_eq!(map.get(source.as_bytes()), Some(target.as_bytes()));
    }
}

#[test]
fn test_missing_build_in_dir_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let map = MappingLoader::with_dir(dir.path())
        .load("CanFam3.1", Direction::Forward)
        .unwrap();
    assert!(map.is_empty());
}

#[test]
fn test_bundled_builds() {
    let builds: Vec<&str> = MappingLoader::bundled_builds().collect();
    assert!(builds.contains(&"GRCh38"));
    assert!(builds.contains(&"GRCh37"));
}

#[test]
fn test_grch37_scaffolds() {
    let map = MappingLoader::bundled().load("GRCh37", Direction::Forward).unwrap();
    assert_eq!(map.get(b"GL000192.1"), Some(&b"chr1_gl000192_random"[..]));
    assert_eq!(map.get(b"GL000220.1"), Some(&b"chrUn_gl000220"[..]));
    assert_eq!(map.get(b"MT"), Some(&b"chrM"[..]));
}
