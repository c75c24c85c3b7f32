//! Archive Service for linkkeeper.
//!
//! Implements `ArchiveServiceTrait`: soft deletion of categories, links and
//! rating values into the Archive root, restoration to their recorded
//! location, and permanent deletion.
//!
//! Every operation is a tree mutation followed by persistence. Persistence
//! failures after the mutation are logged and returned as warnings on the
//! outcome; the in-memory change is kept.

use chrono::Utc;

use crate::managers::category_store::CategoryStoreTrait;
use crate::managers::item_tree::{ItemTree, ItemTreeTrait, NodeId};
use crate::services::archive_container::{ArchiveContainer, ArchiveContainerTrait};
use crate::services::rating_archive_codec;
use crate::types::archive::{ArchiveEntryView, ArchivedKind, ArchivedRatingEntry};
use crate::types::errors::ArchiveError;
use crate::types::item::{NodeContent, RatingValue, PATH_SEPARATOR, ROOT_SENTINEL};
use crate::types::settings::ArchiveSettings;

/// Result of a successful archive, restore or delete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveOutcome {
    /// The node at its new location; `None` when it no longer exists.
    pub node: Option<NodeId>,
    /// Human-readable status for the caller to show.
    pub status: Option<String>,
    /// Set when a category was restored to the root because its original parent is gone.
    pub degraded: bool,
    /// Persistence failures that happened after the tree was already changed.
    pub warnings: Vec<String>,
}

impl ArchiveOutcome {
    fn at(node: NodeId) -> Self {
        Self {
            node: Some(node),
            ..Self::default()
        }
    }
}

/// Trait defining archive state transitions.
pub trait ArchiveServiceTrait {
    fn archive_category(&mut self, node: NodeId) -> Result<ArchiveOutcome, ArchiveError>;
    fn archive_link(&mut self, node: NodeId) -> Result<ArchiveOutcome, ArchiveError>;
    fn restore_category(&mut self, node: NodeId) -> Result<ArchiveOutcome, ArchiveError>;
    fn restore_link(&mut self, node: NodeId) -> Result<ArchiveOutcome, ArchiveError>;
    fn restore_rating(&mut self, node: NodeId) -> Result<ArchiveOutcome, ArchiveError>;
    /// Restores any archived item according to its kind.
    fn restore(&mut self, node: NodeId) -> Result<ArchiveOutcome, ArchiveError>;
    fn permanently_delete(&mut self, node: NodeId) -> Result<ArchiveOutcome, ArchiveError>;
    fn empty_archive(&mut self) -> Result<ArchiveOutcome, ArchiveError>;
    /// Archives the current value of a rating that is about to be overwritten or removed.
    fn archive_rating_change(
        &mut self,
        owner_name: &str,
        rating_name: &str,
        old_rating: &RatingValue,
    ) -> Result<ArchiveOutcome, ArchiveError>;
    /// Sets a rating on an item, archiving any value it replaces.
    fn set_rating(&mut self, owner_name: &str, rating: RatingValue) -> Result<ArchiveOutcome, ArchiveError>;
    /// Removes a rating from an item after archiving it.
    fn remove_rating(&mut self, owner_name: &str, rating_name: &str) -> Result<ArchiveOutcome, ArchiveError>;
    fn archived_entries(&self) -> Vec<ArchiveEntryView>;
}

/// Archive service owning the live tree.
pub struct ArchiveService {
    tree: ItemTree,
    container: ArchiveContainer,
    store: Box<dyn CategoryStoreTrait>,
    settings: ArchiveSettings,
}

impl ArchiveService {
    pub fn new(
        tree: ItemTree,
        container: ArchiveContainer,
        store: Box<dyn CategoryStoreTrait>,
        settings: ArchiveSettings,
    ) -> Self {
        Self {
            tree,
            container,
            store,
            settings,
        }
    }

    pub fn tree(&self) -> &ItemTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ItemTree {
        &mut self.tree
    }

    pub fn container(&self) -> &ArchiveContainer {
        &self.container
    }

    /// Loads the archive file into the Archive root.
    pub fn load_archive(&mut self) -> usize {
        self.container.load(&mut self.tree)
    }

    /// The `index`-th direct child of the Archive root.
    pub fn archived_child(&self, index: usize) -> Option<NodeId> {
        self.tree
            .children(self.tree.archive_root())
            .get(index)
            .copied()
    }

    /// Persists the root category owning `node`.
    pub fn save_root_of(&self, node: NodeId) -> Result<(), ArchiveError> {
        match self.live_root_of(node) {
            Some(root) => Ok(self.store.save_category(&self.tree, root)?),
            None => Ok(()),
        }
    }

    fn live_root_of(&self, node: NodeId) -> Option<NodeId> {
        self.tree
            .owning_root(node)
            .filter(|root| *root != self.tree.archive_root())
    }

    fn persist_archive(&self, warnings: &mut Vec<String>) {
        if let Err(err) = self.container.save(&self.tree) {
            tracing::warn!(error = %err, "archive save failed; tree change kept");
            warnings.push(err.to_string());
        }
    }

    fn persist_root(&self, node: NodeId, warnings: &mut Vec<String>) {
        if let Err(err) = self.save_root_of(node) {
            tracing::warn!(error = %err, "category save failed; tree change kept");
            warnings.push(err.to_string());
        }
    }

    fn delete_root_file(&self, name: &str, warnings: &mut Vec<String>) {
        if let Err(err) = self.store.delete_category(name) {
            tracing::warn!(category = %name, error = %err, "category file delete failed");
            warnings.push(err.to_string());
        }
    }

    /// Fails unless `node` sits directly under the Archive root.
    fn ensure_archived(&self, node: NodeId) -> Result<(), ArchiveError> {
        self.tree.node(node)?;
        if self.tree.parent(node) != Some(self.tree.archive_root()) {
            return Err(ArchiveError::InvalidState(format!(
                "'{}' is not in the archive",
                self.name_of(node)
            )));
        }
        Ok(())
    }

    /// Fails if `node` is the Archive root or already lives under it.
    fn ensure_live(&self, node: NodeId) -> Result<(), ArchiveError> {
        if node == self.tree.archive_root() {
            return Err(ArchiveError::InvalidState(
                "the archive root cannot be archived".to_string(),
            ));
        }
        if self.tree.is_in_archive(node) {
            return Err(ArchiveError::InvalidState(format!(
                "'{}' is already archived",
                self.name_of(node)
            )));
        }
        Ok(())
    }

    fn name_of(&self, node: NodeId) -> String {
        self.tree
            .get(node)
            .map(|n| n.content.name().to_string())
            .unwrap_or_else(|| node.to_string())
    }

    /// A rating wrapper is an archived category with no original parent whose
    /// only child is a carrier link.
    fn is_wrapper_node(&self, node: NodeId) -> bool {
        let unplaced = matches!(
            self.tree.get(node).map(|n| &n.content),
            Some(NodeContent::Category(c)) if c.original_parent_path.is_none()
        );
        if !unplaced {
            return false;
        }
        match self.tree.children(node) {
            [only] => matches!(
                self.tree.get(*only).map(|n| &n.content),
                Some(NodeContent::Link(link)) if link.is_rating_carrier()
            ),
            _ => false,
        }
    }

    fn resolve_owner(&self, owner_name: &str) -> Result<NodeId, ArchiveError> {
        self.tree
            .find_item_by_name(owner_name)
            .ok_or_else(|| ArchiveError::NotFound(format!("Item not found: {}", owner_name)))
    }

    /// Appends the archive entry for `old_rating` of `owner` to the Archive root.
    fn archive_rating_of(&mut self, owner: NodeId, old_rating: &RatingValue) -> Result<NodeId, ArchiveError> {
        let title = match self.tree.content(owner)? {
            NodeContent::Category(c) => c.name.clone(),
            NodeContent::Link(l) => l.title.clone(),
            NodeContent::ArchivedRating(_) => {
                return Err(ArchiveError::InvalidState(
                    "archived ratings carry no live ratings".to_string(),
                ))
            }
        };
        let parent_path = self
            .tree
            .parent(owner)
            .map(|p| self.tree.get_path(p))
            .unwrap_or_default();

        let entry = rating_archive_codec::new_entry(&parent_path, &title, old_rating, Utc::now());
        tracing::info!(
            owner = %title,
            rating = %entry.record.rating_name,
            score = entry.record.score,
            "rating value archived"
        );
        Ok(self.tree.add_archived_rating(entry)?)
    }

    fn resolve_rating_target(&self, entry: &ArchivedRatingEntry) -> Option<NodeId> {
        let record = &entry.record;
        let search_path = rating_archive_codec::to_tree_path(&record.category_path);
        if search_path.is_empty() {
            return self.tree.find_item_by_name(&record.title);
        }
        // Path segments match link titles as well as category names, so this
        // also covers a lookup of the full `"{path} > {title}"`.
        self.tree
            .find_node_by_path(&search_path, PATH_SEPARATOR)
            .and_then(|parent| self.tree.find_child_by_name(parent, &record.title))
    }
}

impl ArchiveServiceTrait for ArchiveService {
    fn archive_category(&mut self, node: NodeId) -> Result<ArchiveOutcome, ArchiveError> {
        self.ensure_live(node)?;
        let parent = self.tree.parent(node);
        let original_parent_path = match parent {
            Some(p) => self.tree.get_path(p),
            None => ROOT_SENTINEL.to_string(),
        };

        let category = self
            .tree
            .content_mut(node)?
            .as_category_mut()
            .ok_or_else(|| ArchiveError::InvalidState("only categories can be archived here".to_string()))?;
        category.original_parent_path = Some(original_parent_path.clone());
        category.archived_date = Some(Utc::now());
        let name = category.name.clone();

        self.tree.detach(node)?;
        let archive_root = self.tree.archive_root();
        self.tree.attach_last(archive_root, node)?;

        tracing::info!(category = %name, from = %original_parent_path, "category archived");

        let mut outcome = ArchiveOutcome::at(node);
        self.persist_archive(&mut outcome.warnings);
        match parent {
            None => self.delete_root_file(&name, &mut outcome.warnings),
            Some(p) => self.persist_root(p, &mut outcome.warnings),
        }
        Ok(outcome)
    }

    fn archive_link(&mut self, node: NodeId) -> Result<ArchiveOutcome, ArchiveError> {
        self.ensure_live(node)?;
        let parent = self.tree.parent(node).ok_or_else(|| {
            ArchiveError::InvalidState(format!("'{}' has no parent", self.name_of(node)))
        })?;
        let original_path = self.tree.get_path(parent);

        let link = self
            .tree
            .content_mut(node)?
            .as_link_mut()
            .ok_or_else(|| ArchiveError::InvalidState("only links can be archived here".to_string()))?;
        if link.is_catalog_entry {
            return Err(ArchiveError::InvalidState(format!(
                "catalog entry '{}' cannot be archived",
                link.title
            )));
        }
        link.category_path = original_path.clone();
        link.original_category_path = Some(original_path.clone());
        link.archived_date = Some(Utc::now());
        let title = link.title.clone();

        self.tree.detach(node)?;
        let archive_root = self.tree.archive_root();
        self.tree.attach_last(archive_root, node)?;

        tracing::info!(link = %title, from = %original_path, "link archived");

        let mut outcome = ArchiveOutcome::at(node);
        self.persist_archive(&mut outcome.warnings);
        self.persist_root(parent, &mut outcome.warnings);
        Ok(outcome)
    }

    fn restore_category(&mut self, node: NodeId) -> Result<ArchiveOutcome, ArchiveError> {
        self.ensure_archived(node)?;
        let category = self
            .tree
            .content(node)?
            .as_category()
            .ok_or_else(|| ArchiveError::InvalidState(format!("'{}' is not a category", self.name_of(node))))?;
        let name = category.name.clone();
        let original = category
            .original_parent_path
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                ArchiveError::NotFound(format!("No original parent recorded for '{}'", name))
            })?;

        self.tree.detach(node)?;
        if let Some(category) = self.tree.content_mut(node)?.as_category_mut() {
            category.archived_date = None;
            category.original_parent_path = None;
            category.modified_date = Utc::now();
        }

        let mut outcome = ArchiveOutcome::at(node);
        let target = if original == ROOT_SENTINEL {
            None
        } else {
            self.tree
                .find_node_by_path(&original, PATH_SEPARATOR)
                .filter(|t| matches!(self.tree.get(*t).map(|n| &n.content), Some(NodeContent::Category(_))))
        };

        match target {
            Some(parent) => {
                self.tree.attach_last(parent, node)?;
                tracing::info!(category = %name, to = %original, "category restored");
                self.persist_root(parent, &mut outcome.warnings);
            }
            None => {
                // Root categories share one file per name.
                let root_name = self.tree.unique_root_name(&name);
                if root_name != name {
                    if let Some(category) = self.tree.content_mut(node)?.as_category_mut() {
                        category.name = root_name.clone();
                    }
                    tracing::warn!(category = %name, renamed = %root_name, "root name taken, restored under a new name");
                }
                self.tree.insert_root(node)?;

                let mut notes = Vec::new();
                if original != ROOT_SENTINEL {
                    outcome.degraded = true;
                    notes.push(format!(
                        "Original parent '{}' not found; '{}' restored as a root category",
                        original, root_name
                    ));
                    tracing::warn!(category = %root_name, missing = %original, "original parent gone, restored at root");
                } else {
                    tracing::info!(category = %root_name, "root category restored");
                }
                if root_name != name {
                    notes.push(format!(
                        "A root category named '{}' already exists; restored as '{}'",
                        name, root_name
                    ));
                }
                if !notes.is_empty() {
                    outcome.status = Some(notes.join(". "));
                }
                self.persist_root(node, &mut outcome.warnings);
            }
        }

        self.persist_archive(&mut outcome.warnings);
        Ok(outcome)
    }

    fn restore_link(&mut self, node: NodeId) -> Result<ArchiveOutcome, ArchiveError> {
        self.ensure_archived(node)?;
        let link = self
            .tree
            .content(node)?
            .as_link()
            .ok_or_else(|| ArchiveError::InvalidState(format!("'{}' is not a link", self.name_of(node))))?;
        let title = link.title.clone();
        let original = link
            .original_category_path
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                ArchiveError::NotFound(format!("No original category recorded for '{}'", title))
            })?;

        let target = self
            .tree
            .find_node_by_path(&original, PATH_SEPARATOR)
            .ok_or_else(|| {
                ArchiveError::NotFound(format!(
                    "Original category '{}' not found for link '{}'",
                    original, title
                ))
            })?;

        self.tree.detach(node)?;
        self.tree.attach_last(target, node)?;
        if self.settings.expand_restored_link_parent {
            self.tree.node_mut(target)?.is_expanded = true;
        }
        let current_path = self.tree.get_path(target);
        if let Some(link) = self.tree.content_mut(node)?.as_link_mut() {
            link.archived_date = None;
            link.original_category_path = None;
            link.category_path = current_path;
            link.modified_date = Utc::now();
        }

        tracing::info!(link = %title, to = %original, "link restored");

        let mut outcome = ArchiveOutcome::at(node);
        self.persist_root(target, &mut outcome.warnings);
        self.persist_archive(&mut outcome.warnings);
        Ok(outcome)
    }

    fn restore_rating(&mut self, node: NodeId) -> Result<ArchiveOutcome, ArchiveError> {
        self.ensure_archived(node)?;
        let entry = match self.tree.content(node)? {
            NodeContent::ArchivedRating(entry) => entry.clone(),
            NodeContent::Category(_) => rating_archive_codec::from_wrapper_node(&self.tree, node)?,
            NodeContent::Link(l) => {
                return Err(ArchiveError::InvalidState(format!(
                    "'{}' is not an archived rating",
                    l.title
                )))
            }
        };

        let target = self.resolve_rating_target(&entry).ok_or_else(|| {
            ArchiveError::NotFound(format!(
                "Rated item '{}' not found at '{}'",
                entry.record.title, entry.record.category_path
            ))
        })?;

        let existing = self
            .tree
            .content(target)?
            .ratings()
            .iter()
            .find(|r| r.rating == entry.record.rating_name)
            .cloned();
        if let Some(current) = existing {
            self.archive_rating_of(target, &current)?;
        }

        let restored = RatingValue {
            rating: entry.record.rating_name.clone(),
            score: entry.record.score,
            reason: entry.record.reason.clone(),
            created_date: entry.archived_date,
            modified_date: Utc::now(),
        };
        let content = self.tree.content_mut(target)?;
        let ratings = content.ratings_mut().ok_or_else(|| {
            ArchiveError::InvalidState("restore target cannot hold ratings".to_string())
        })?;
        ratings.retain(|r| r.rating != restored.rating);
        ratings.push(restored);
        content.touch();

        tracing::info!(
            owner = %entry.record.title,
            rating = %entry.record.rating_name,
            score = entry.record.score,
            "rating value restored"
        );

        let mut outcome = ArchiveOutcome::at(target);
        self.persist_root(target, &mut outcome.warnings);
        self.tree.remove_subtree(node)?;
        self.persist_archive(&mut outcome.warnings);
        Ok(outcome)
    }

    fn restore(&mut self, node: NodeId) -> Result<ArchiveOutcome, ArchiveError> {
        match self.tree.content(node)? {
            NodeContent::ArchivedRating(_) => self.restore_rating(node),
            NodeContent::Link(_) => self.restore_link(node),
            NodeContent::Category(_) if self.is_wrapper_node(node) => self.restore_rating(node),
            NodeContent::Category(_) => self.restore_category(node),
        }
    }

    fn permanently_delete(&mut self, node: NodeId) -> Result<ArchiveOutcome, ArchiveError> {
        self.ensure_archived(node)?;
        let name = self.name_of(node);
        let removed = self.tree.remove_subtree(node)?;
        tracing::info!(item = %name, nodes = removed, "archived item permanently deleted");

        let mut outcome = ArchiveOutcome::default();
        self.persist_archive(&mut outcome.warnings);
        Ok(outcome)
    }

    fn empty_archive(&mut self) -> Result<ArchiveOutcome, ArchiveError> {
        let archived: Vec<NodeId> = self.tree.children(self.tree.archive_root()).to_vec();
        for node in &archived {
            self.tree.remove_subtree(*node)?;
        }
        tracing::info!(items = archived.len(), "archive emptied");

        let mut outcome = ArchiveOutcome {
            status: Some(format!("{} archived items deleted", archived.len())),
            ..ArchiveOutcome::default()
        };
        self.persist_archive(&mut outcome.warnings);
        Ok(outcome)
    }

    fn archive_rating_change(
        &mut self,
        owner_name: &str,
        rating_name: &str,
        old_rating: &RatingValue,
    ) -> Result<ArchiveOutcome, ArchiveError> {
        let owner = self.resolve_owner(owner_name)?;
        let mut old = old_rating.clone();
        if old.rating.is_empty() {
            old.rating = rating_name.to_string();
        }
        let archived = self.archive_rating_of(owner, &old)?;

        let mut outcome = ArchiveOutcome::at(archived);
        self.persist_archive(&mut outcome.warnings);
        Ok(outcome)
    }

    fn set_rating(&mut self, owner_name: &str, rating: RatingValue) -> Result<ArchiveOutcome, ArchiveError> {
        let owner = self.resolve_owner(owner_name)?;
        let existing = self
            .tree
            .content(owner)?
            .ratings()
            .iter()
            .find(|r| r.rating == rating.rating)
            .cloned();
        let archived = match &existing {
            Some(current) => Some(self.archive_rating_of(owner, current)?),
            None => None,
        };

        let content = self.tree.content_mut(owner)?;
        let ratings = content.ratings_mut().ok_or_else(|| {
            ArchiveError::InvalidState(format!("'{}' cannot hold ratings", owner_name))
        })?;
        match ratings.iter().position(|r| r.rating == rating.rating) {
            Some(i) => ratings[i] = rating,
            None => ratings.push(rating),
        }
        content.touch();

        let mut outcome = ArchiveOutcome::at(owner);
        self.persist_root(owner, &mut outcome.warnings);
        if archived.is_some() {
            self.persist_archive(&mut outcome.warnings);
        }
        Ok(outcome)
    }

    fn remove_rating(&mut self, owner_name: &str, rating_name: &str) -> Result<ArchiveOutcome, ArchiveError> {
        let owner = self.resolve_owner(owner_name)?;
        let current = self
            .tree
            .content(owner)?
            .ratings()
            .iter()
            .find(|r| r.rating == rating_name)
            .cloned()
            .ok_or_else(|| {
                ArchiveError::NotFound(format!("Rating '{}' not found on '{}'", rating_name, owner_name))
            })?;
        self.archive_rating_of(owner, &current)?;

        let content = self.tree.content_mut(owner)?;
        if let Some(ratings) = content.ratings_mut() {
            ratings.retain(|r| r.rating != rating_name);
        }
        content.touch();

        let mut outcome = ArchiveOutcome::at(owner);
        self.persist_root(owner, &mut outcome.warnings);
        self.persist_archive(&mut outcome.warnings);
        Ok(outcome)
    }

    fn archived_entries(&self) -> Vec<ArchiveEntryView> {
        self.tree
            .children(self.tree.archive_root())
            .iter()
            .enumerate()
            .filter_map(|(index, id)| {
                let node = self.tree.get(*id)?;
                let (kind, original_location, archived_date) = match &node.content {
                    NodeContent::Category(_) if self.is_wrapper_node(*id) => {
                        (ArchivedKind::Rating, None, None)
                    }
                    NodeContent::Category(c) => (
                        ArchivedKind::Category,
                        c.original_parent_path.clone(),
                        c.archived_date,
                    ),
                    NodeContent::Link(l) => (
                        ArchivedKind::Link,
                        l.original_category_path.clone(),
                        l.archived_date,
                    ),
                    NodeContent::ArchivedRating(r) => (
                        ArchivedKind::Rating,
                        Some(rating_archive_codec::to_tree_path(&r.record.category_path)),
                        Some(r.archived_date),
                    ),
                };
                Some(ArchiveEntryView {
                    index,
                    kind,
                    display_name: node.display_label(),
                    original_location,
                    archived_date,
                })
            })
            .collect()
    }
}
