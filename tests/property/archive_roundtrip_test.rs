//! Property-based tests for archive/restore round trips.
//!
//! Archiving any category of a nested chain and restoring it puts it back at
//! the same path with its whole subtree, and leaves the archive empty.

use linkkeeper::managers::category_store::JsonCategoryStore;
use linkkeeper::managers::item_tree::{ItemTree, ItemTreeTrait, NodeId};
use linkkeeper::services::archive_container::{ArchiveContainer, ArchiveContainerTrait};
use linkkeeper::services::archive_service::{ArchiveService, ArchiveServiceTrait};
use linkkeeper::types::item::{Category, Link, PATH_SEPARATOR};
use linkkeeper::types::settings::ArchiveSettings;
use proptest::prelude::*;
use tempfile::TempDir;

/// Distinct separator-free names for a chain of categories.
fn arb_chain() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[A-Za-z][A-Za-z0-9]{0,7}", 1..5).prop_map(|names| {
        names
            .into_iter()
            .enumerate()
            .map(|(i, n)| format!("{}{}", n, i))
            .collect()
    })
}

fn build(service: &mut ArchiveService, chain: &[String], links: usize) -> Vec<NodeId> {
    let tree = service.tree_mut();
    let mut ids = vec![tree.add_root_category(Category::new(&chain[0]))];
    for name in &chain[1..] {
        let parent = *ids.last().unwrap();
        ids.push(tree.add_category(parent, Category::new(name)).unwrap());
    }
    for (depth, id) in ids.clone().into_iter().enumerate() {
        for n in 0..links {
            tree.add_link(id, Link::new(&format!("link{}-{}", depth, n), "https://example.com"))
                .unwrap();
        }
    }
    ids
}

// **Property: archive then restore is the identity on paths**
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn archive_then_restore_returns_to_same_path(
        chain in arb_chain(),
        links in 0usize..3,
        pick in any::<prop::sample::Index>(),
    ) {
        let dir = TempDir::new().unwrap();
        let mut service = ArchiveService::new(
            ItemTree::new(),
            ArchiveContainer::new(dir.path().join("archive.json")),
            Box::new(JsonCategoryStore::new(dir.path().join("categories"))),
            ArchiveSettings::default(),
        );
        let ids = build(&mut service, &chain, links);
        let target = ids[pick.index(ids.len())];
        let path_before = service.tree().get_path(target);
        let size_before = service.tree().len();

        service.archive_category(target).unwrap();
        prop_assert!(service.tree().is_in_archive(target));
        prop_assert!(service.tree().find_node_by_path(&path_before, PATH_SEPARATOR).is_none());
        prop_assert_eq!(service.tree().archive_label(), "Archived (1)");

        // The archive file alone is enough to rebuild the archived subtree.
        let mut reloaded = ItemTree::new();
        prop_assert_eq!(
            ArchiveContainer::new(dir.path().join("archive.json")).load(&mut reloaded),
            1
        );
        let archived_categories = ids.len() - pick.index(ids.len());
        prop_assert_eq!(reloaded.len(), 1 + archived_categories * (1 + links));

        let outcome = service.restore(target).unwrap();
        prop_assert!(!outcome.degraded);
        prop_assert_eq!(service.tree().get_path(target), path_before.clone());
        prop_assert_eq!(service.tree().find_node_by_path(&path_before, PATH_SEPARATOR), Some(target));
        prop_assert_eq!(service.tree().len(), size_before);
        prop_assert_eq!(service.tree().archive_label(), "Archived (0)");
    }
}
