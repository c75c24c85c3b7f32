//! Property-based tests for converting between live `" > "` paths and the
//! `"/"` paths stored inside archived rating records.
//!
//! The conversion is lossless as long as no segment contains either separator.

use linkkeeper::services::rating_archive_codec::{to_storage_path, to_tree_path};
use proptest::prelude::*;
use rstest::rstest;

/// Segment names free of `/` and `>`; single spaces only between words.
fn arb_segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.-]{1,8}( [A-Za-z0-9_.-]{1,8}){0,2}"
}

fn arb_segments() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_segment(), 0..6)
}

#[rstest]
#[case("", "")]
#[case("Work", "Work")]
#[case("Work > Projects", "Work/Projects")]
#[case("Work > Projects > Repo", "Work/Projects/Repo")]
#[case("My Stuff > Deep Dive", "My Stuff/Deep Dive")]
fn test_known_conversions(#[case] tree_path: &str, #[case] storage_path: &str) {
    assert_eq!(to_storage_path(tree_path), storage_path);
    assert_eq!(to_tree_path(storage_path), tree_path);
}

/// A name containing `/` does not survive the trip; this is the documented limit.
#[test]
fn test_slash_in_name_is_lossy() {
    let tree_path = "Work > A/B";
    assert_ne!(to_tree_path(&to_storage_path(tree_path)), tree_path);
}

// **Property: tree → storage → tree is the identity for separator-free segments**
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn tree_path_round_trips(segments in arb_segments()) {
        let tree_path = segments.join(" > ");
        let storage_path = to_storage_path(&tree_path);
        prop_assert_eq!(storage_path.split('/').count(), segments.len().max(1));
        prop_assert_eq!(to_tree_path(&storage_path), tree_path);
    }

    #[test]
    fn storage_path_round_trips(segments in arb_segments()) {
        let storage_path = segments.join("/");
        prop_assert_eq!(to_storage_path(&to_tree_path(&storage_path)), storage_path);
    }
}
