//! Unit tests for the ItemTree: structure, paths, lookups and the Archive root.

use linkkeeper::managers::item_tree::{ItemTree, ItemTreeTrait};
use linkkeeper::types::archive::{CategoryRecord, LinkRecord};
use linkkeeper::types::errors::TreeError;
use linkkeeper::types::item::{Category, Link, NodeContent, PATH_SEPARATOR};

/// Work > Projects > Repo (link) and Home > Recipes.
fn sample_tree() -> ItemTree {
    let mut tree = ItemTree::new();
    let work = tree.add_root_category(Category::new("Work"));
    let projects = tree.add_category(work, Category::new("Projects")).unwrap();
    tree.add_link(projects, Link::new("Repo", "https://example.com/repo"))
        .unwrap();
    let home = tree.add_root_category(Category::new("Home"));
    tree.add_category(home, Category::new("Recipes")).unwrap();
    tree
}

#[test]
fn test_new_tree_has_only_the_archive_root() {
    let tree = ItemTree::new();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.roots(), &[tree.archive_root()]);
    assert_eq!(tree.live_roots().count(), 0);
    assert_eq!(tree.archive_label(), "Archived (0)");
}

#[test]
fn test_custom_archive_label_prefix() {
    let tree = ItemTree::with_archive_label("Archiv");
    assert_eq!(tree.archive_label(), "Archiv (0)");
}

#[test]
fn test_get_path_includes_category_names_and_link_titles() {
    let tree = sample_tree();
    let repo = tree
        .find_node_by_path("Work > Projects > Repo", PATH_SEPARATOR)
        .unwrap();
    assert_eq!(tree.get_path(repo), "Work > Projects > Repo");

    let projects = tree.parent(repo).unwrap();
    assert_eq!(tree.get_path(projects), "Work > Projects");
}

#[test]
fn test_add_link_sets_category_path_to_parent() {
    let tree = sample_tree();
    let repo = tree.find_item_by_name("Repo").unwrap();
    let link = tree.content(repo).unwrap().as_link().unwrap();
    assert_eq!(link.category_path, "Work > Projects");
}

#[test]
fn test_find_node_by_path_with_custom_separator() {
    let tree = sample_tree();
    let by_slash = tree.find_node_by_path("Work/Projects", "/").unwrap();
    let by_arrow = tree.find_node_by_path("Work > Projects", PATH_SEPARATOR).unwrap();
    assert_eq!(by_slash, by_arrow);
}

#[test]
fn test_find_node_by_path_misses() {
    let tree = sample_tree();
    assert!(tree.find_node_by_path("", PATH_SEPARATOR).is_none());
    assert!(tree.find_node_by_path("Work > Nope", PATH_SEPARATOR).is_none());
    assert!(tree.find_node_by_path("work > projects", PATH_SEPARATOR).is_none());
    assert!(tree.find_node_by_path("Projects", PATH_SEPARATOR).is_none());
}

#[test]
fn test_find_item_by_name_prefers_roots_then_preorder() {
    let mut tree = sample_tree();
    let work = tree.find_node_by_path("Work", PATH_SEPARATOR).unwrap();
    // A nested "Home" under Work must lose to the root "Home".
    tree.add_category(work, Category::new("Home")).unwrap();
    let found = tree.find_item_by_name("Home").unwrap();
    assert!(tree.parent(found).is_none());

    let recipes = tree.find_item_by_name("Recipes").unwrap();
    assert_eq!(tree.get_path(recipes), "Home > Recipes");
}

#[test]
fn test_lookups_skip_archived_items() {
    let mut tree = sample_tree();
    let projects = tree.find_node_by_path("Work > Projects", PATH_SEPARATOR).unwrap();
    tree.detach(projects).unwrap();
    let archive = tree.archive_root();
    tree.attach_last(archive, projects).unwrap();

    assert!(tree.is_in_archive(projects));
    assert!(tree.find_item_by_name("Repo").is_none());
    assert!(tree.find_item_by_name("Projects").is_none());
    assert!(tree.find_node_by_path("Archive > Projects", PATH_SEPARATOR).is_none());
}

#[test]
fn test_attach_rules() {
    let mut tree = sample_tree();
    let repo = tree.find_item_by_name("Repo").unwrap();
    let recipes = tree.find_item_by_name("Recipes").unwrap();

    // Links can hold links but not categories.
    let sub = tree.add_link(repo, Link::new("Docs", "https://example.com/docs")).unwrap();
    assert_eq!(tree.get_path(sub), "Work > Projects > Repo > Docs");
    assert!(matches!(
        tree.add_category(repo, Category::new("Nope")),
        Err(TreeError::InvalidParent(_))
    ));

    // Attaching a node that is still attached fails.
    assert!(matches!(
        tree.attach_last(recipes, sub),
        Err(TreeError::AlreadyAttached(_))
    ));
}

#[test]
fn test_archive_root_cannot_be_detached() {
    let mut tree = ItemTree::new();
    let archive = tree.archive_root();
    assert!(matches!(tree.detach(archive), Err(TreeError::InvalidParent(_))));
    assert!(tree.remove_subtree(archive).is_err());
    assert!(tree.contains(archive));
}

#[test]
fn test_detach_is_idempotent() {
    let mut tree = sample_tree();
    let home = tree.find_item_by_name("Home").unwrap();
    tree.detach(home).unwrap();
    tree.detach(home).unwrap();
    assert!(!tree.node(home).unwrap().is_attached());
    assert_eq!(tree.live_roots().count(), 1);
    tree.insert_root(home).unwrap();
    assert_eq!(tree.live_roots().count(), 2);
}

#[test]
fn test_insert_root_rejects_links() {
    let mut tree = sample_tree();
    let repo = tree.find_item_by_name("Repo").unwrap();
    tree.detach(repo).unwrap();
    assert!(matches!(tree.insert_root(repo), Err(TreeError::InvalidParent(_))));
}

#[test]
fn test_remove_subtree_frees_all_descendants() {
    let mut tree = sample_tree();
    let before = tree.len();
    let work = tree.find_item_by_name("Work").unwrap();
    let repo = tree.find_item_by_name("Repo").unwrap();

    let removed = tree.remove_subtree(work).unwrap();
    assert_eq!(removed, 3);
    assert_eq!(tree.len(), before - 3);
    assert!(!tree.contains(work));
    assert!(!tree.contains(repo));
    assert!(matches!(tree.node(repo), Err(TreeError::NodeNotFound(_))));
}

#[test]
fn test_owning_root() {
    let tree = sample_tree();
    let repo = tree.find_item_by_name("Repo").unwrap();
    let work = tree.find_item_by_name("Work").unwrap();
    assert_eq!(tree.owning_root(repo), Some(work));
    assert_eq!(tree.owning_root(work), Some(work));
}

#[test]
fn test_export_then_import_keeps_structure() {
    let tree = sample_tree();
    let work = tree.find_item_by_name("Work").unwrap();
    let record = tree.export_category(work).unwrap();
    assert!(record.links.is_empty());
    assert_eq!(record.sub_categories.len(), 1);
    assert_eq!(record.sub_categories[0].links.len(), 1);

    let mut copy = ItemTree::new();
    let imported = copy.import_category(None, record).unwrap();
    assert_eq!(copy.get_path(imported), "Work");
    assert!(copy
        .find_node_by_path("Work > Projects > Repo", PATH_SEPARATOR)
        .is_some());
}

#[test]
fn test_import_link_keeps_stored_category_path() {
    let mut tree = ItemTree::new();
    let work = tree.add_root_category(Category::new("Work"));
    let mut link = Link::new("Old", "https://example.com/old");
    link.category_path = "Somewhere > Else".to_string();
    let record = CategoryRecord {
        category: Category::new("Holder"),
        links: vec![LinkRecord {
            link,
            sub_links: Vec::new(),
        }],
        sub_categories: Vec::new(),
    };
    let holder = tree.import_category(Some(work), record).unwrap();
    let old = tree.children(holder)[0];
    match tree.content(old).unwrap() {
        NodeContent::Link(l) => assert_eq!(l.category_path, "Somewhere > Else"),
        other => panic!("unexpected node {:?}", other),
    }
}

#[test]
fn test_unique_root_name() {
    let mut tree = sample_tree();
    assert_eq!(tree.unique_root_name("Garden"), "Garden");
    assert_eq!(tree.unique_root_name("Work"), "Work (2)");
    tree.add_root_category(Category::new("Work (2)"));
    assert_eq!(tree.unique_root_name("Work"), "Work (3)");
    // Nested and archived names do not count.
    assert_eq!(tree.unique_root_name("Projects"), "Projects");
    assert_eq!(tree.unique_root_name("Archive"), "Archive");
}
