//! Item Tree for linkkeeper.
//!
//! Implements `ItemTreeTrait`: path composition and path/name lookups over an
//! arena of category and link nodes. The tree also owns the single Archive
//! root, created once at construction and addressed through a held handle.

use std::fmt;

use crate::types::archive::{ArchivedRatingEntry, CategoryRecord, LinkRecord};
use crate::types::errors::TreeError;
use crate::types::item::{Category, Link, NodeContent, PATH_SEPARATOR};

/// Handle to a node in an [`ItemTree`].
///
/// A handle whose node has been removed stays invalid even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// A node: payload plus its position in the tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub content: NodeContent,
    pub is_expanded: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
    label: Option<String>,
}

impl TreeNode {
    fn new(content: NodeContent) -> Self {
        Self {
            content,
            is_expanded: false,
            parent: None,
            children: Vec::new(),
            attached: false,
            label: None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Text shown for this node in a tree view.
    pub fn display_label(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        match &self.content {
            NodeContent::Category(c) => c.name.clone(),
            NodeContent::Link(l) => l.title.clone(),
            NodeContent::ArchivedRating(r) => r.display_name(),
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<TreeNode>,
}

/// Trait defining the path and lookup primitives of the tree.
pub trait ItemTreeTrait {
    /// Path of `id` from the root down to and including `id`, joined with `" > "`.
    fn get_path(&self, id: NodeId) -> String;
    /// Resolves a path segment by segment from the roots. Exact matches only.
    fn find_node_by_path(&self, path: &str, separator: &str) -> Option<NodeId>;
    /// Finds the first item with the given name: root categories first, then a pre-order walk.
    fn find_item_by_name(&self, name: &str) -> Option<NodeId>;
}

/// Arena-backed tree of categories and links.
#[derive(Debug, Clone)]
pub struct ItemTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    roots: Vec<NodeId>,
    archive_root: NodeId,
    archive_label_prefix: String,
}

impl Default for ItemTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemTree {
    /// Creates an empty tree holding only the Archive root.
    pub fn new() -> Self {
        Self::with_archive_label("Archived")
    }

    /// Creates an empty tree whose Archive root is labelled `"{prefix} ({count})"`.
    pub fn with_archive_label(prefix: &str) -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            roots: Vec::new(),
            archive_root: NodeId {
                index: 0,
                generation: 0,
            },
            archive_label_prefix: prefix.to_string(),
        };
        let archive = tree.alloc(NodeContent::Category(Category::archive_root()));
        tree.archive_root = archive;
        tree.roots.push(archive);
        if let Some(node) = tree.get_mut(archive) {
            node.attached = true;
        }
        tree.refresh_archive_label();
        tree
    }

    // ─── Access ───

    pub fn archive_root(&self) -> NodeId {
        self.archive_root
    }

    /// Root-level nodes, including the Archive root.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Root-level categories the user works with (the Archive root excluded).
    pub fn live_roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roots
            .iter()
            .copied()
            .filter(move |id| *id != self.archive_root)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn node(&self, id: NodeId) -> Result<&TreeNode, TreeError> {
        self.get(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.to_string()))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut TreeNode, TreeError> {
        self.get_mut(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.to_string()))
    }

    pub fn content(&self, id: NodeId) -> Result<&NodeContent, TreeError> {
        self.node(id).map(|n| &n.content)
    }

    pub fn content_mut(&mut self, id: NodeId) -> Result<&mut NodeContent, TreeError> {
        self.node_mut(id).map(|n| &mut n.content)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Number of live nodes, the Archive root included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display label of the Archive root, e.g. `"Archived (3)"`.
    pub fn archive_label(&self) -> String {
        self.get(self.archive_root)
            .map(|n| n.display_label())
            .unwrap_or_default()
    }

    /// The root-level node that ultimately owns `id`.
    pub fn owning_root(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        self.get(current)?;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    pub fn is_in_archive(&self, id: NodeId) -> bool {
        id != self.archive_root && self.owning_root(id) == Some(self.archive_root)
    }

    /// The direct child of `parent` named `name`, if any.
    pub fn find_child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|child| self.name_matches(*child, name))
    }

    /// `name` if no live root category uses it, else `"{name} (n)"` with the smallest free `n >= 2`.
    pub fn unique_root_name(&self, name: &str) -> String {
        let taken = |candidate: &str| self.live_roots().any(|r| self.name_matches(r, candidate));
        if !taken(name) {
            return name.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{} ({})", name, n);
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    // ─── Structure ───

    fn alloc(&mut self, content: NodeContent) -> NodeId {
        let node = TreeNode::new(content);
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    /// Appends a new root category.
    pub fn add_root_category(&mut self, category: Category) -> NodeId {
        let id = self.alloc(NodeContent::Category(category));
        self.roots.push(id);
        if let Some(node) = self.get_mut(id) {
            node.attached = true;
        }
        id
    }

    /// Appends a new category as the last child of `parent`.
    pub fn add_category(&mut self, parent: NodeId, category: Category) -> Result<NodeId, TreeError> {
        self.check_parent(parent, &NodeContent::Category(category.clone()))?;
        let id = self.alloc(NodeContent::Category(category));
        self.attach_last(parent, id)?;
        Ok(id)
    }

    /// Appends a new link under `parent`; its `category_path` becomes the parent's path.
    pub fn add_link(&mut self, parent: NodeId, mut link: Link) -> Result<NodeId, TreeError> {
        link.category_path = self.get_path(parent);
        self.check_parent(parent, &NodeContent::Link(link.clone()))?;
        let id = self.alloc(NodeContent::Link(link));
        self.attach_last(parent, id)?;
        Ok(id)
    }

    /// Appends an archived rating as the last child of the Archive root.
    pub fn add_archived_rating(&mut self, entry: ArchivedRatingEntry) -> Result<NodeId, TreeError> {
        let id = self.alloc(NodeContent::ArchivedRating(entry));
        self.attach_last(self.archive_root, id)?;
        Ok(id)
    }

    /// Inserts a detached category at the end of the root list.
    pub fn insert_root(&mut self, id: NodeId) -> Result<(), TreeError> {
        let node = self.node(id)?;
        if node.attached {
            return Err(TreeError::AlreadyAttached(id.to_string()));
        }
        if node.content.as_category().is_none() {
            return Err(TreeError::InvalidParent(
                "only categories can be root items".to_string(),
            ));
        }
        self.roots.push(id);
        let node = self.node_mut(id)?;
        node.parent = None;
        node.attached = true;
        Ok(())
    }

    /// Attaches a detached node as the last child of `parent`.
    ///
    /// Never changes the parent's expansion state.
    pub fn attach_last(&mut self, parent: NodeId, id: NodeId) -> Result<(), TreeError> {
        if parent == id {
            return Err(TreeError::InvalidParent("a node cannot contain itself".to_string()));
        }
        let node = self.node(id)?;
        if node.attached {
            return Err(TreeError::AlreadyAttached(id.to_string()));
        }
        self.check_parent(parent, &node.content)?;
        if self.is_descendant_of(parent, id) {
            return Err(TreeError::InvalidParent(
                "a node cannot be moved below itself".to_string(),
            ));
        }

        self.node_mut(parent)?.children.push(id);
        let node = self.node_mut(id)?;
        node.parent = Some(parent);
        node.attached = true;
        if parent == self.archive_root {
            self.refresh_archive_label();
        }
        Ok(())
    }

    /// Removes `id` from its parent's children (or the root list). The subtree stays allocated.
    pub fn detach(&mut self, id: NodeId) -> Result<(), TreeError> {
        if id == self.archive_root {
            return Err(TreeError::InvalidParent(
                "the archive root cannot be detached".to_string(),
            ));
        }
        let node = self.node(id)?;
        let (attached, parent) = (node.attached, node.parent);
        if !attached {
            return Ok(());
        }
        match parent {
            Some(parent) => {
                let parent_node = self.node_mut(parent)?;
                parent_node.children.retain(|c| *c != id);
                if parent == self.archive_root {
                    self.refresh_archive_label();
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        let node = self.node_mut(id)?;
        node.parent = None;
        node.attached = false;
        Ok(())
    }

    /// Detaches `id` and frees it together with all of its descendants.
    ///
    /// Returns the number of nodes removed.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<usize, TreeError> {
        self.detach(id)?;
        let mut pending = vec![id];
        let mut removed = 0;
        while let Some(current) = pending.pop() {
            let slot = &mut self.slots[current.index as usize];
            if slot.generation != current.generation {
                continue;
            }
            if let Some(node) = slot.node.take() {
                pending.extend(node.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn check_parent(&self, parent: NodeId, child: &NodeContent) -> Result<(), TreeError> {
        let parent_content = self.content(parent)?;
        let allowed = match (parent_content, child) {
            (NodeContent::Category(_), NodeContent::Category(_)) => true,
            (NodeContent::Category(_), NodeContent::Link(_)) => true,
            (NodeContent::Link(_), NodeContent::Link(_)) => true,
            (NodeContent::Category(_), NodeContent::ArchivedRating(_)) => {
                parent == self.archive_root
            }
            _ => false,
        };
        if allowed {
            Ok(())
        } else {
            Err(TreeError::InvalidParent(format!(
                "'{}' cannot hold '{}'",
                parent_content.name(),
                child.name()
            )))
        }
    }

    fn is_descendant_of(&self, candidate: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(candidate);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn refresh_archive_label(&mut self) {
        let count = self.children(self.archive_root).len();
        let label = format!("{} ({})", self.archive_label_prefix, count);
        if let Some(node) = self.get_mut(self.archive_root) {
            node.label = Some(label);
        }
    }

    fn name_matches(&self, id: NodeId, name: &str) -> bool {
        match self.get(id).map(|n| &n.content) {
            Some(NodeContent::Category(c)) => c.name == name,
            Some(NodeContent::Link(l)) => l.title == name,
            _ => false,
        }
    }

    // ─── Records ───

    /// Rebuilds a category subtree from its record and attaches it under `parent`
    /// (or at the root level when `parent` is `None`).
    pub fn import_category(
        &mut self,
        parent: Option<NodeId>,
        record: CategoryRecord,
    ) -> Result<NodeId, TreeError> {
        let CategoryRecord {
            category,
            links,
            sub_categories,
        } = record;
        let id = self.alloc(NodeContent::Category(category));
        match parent {
            Some(p) => self.attach_last(p, id)?,
            None => self.insert_root(id)?,
        }
        for link in links {
            self.import_link(id, link)?;
        }
        for sub in sub_categories {
            self.import_category(Some(id), sub)?;
        }
        Ok(id)
    }

    /// Rebuilds a link and its sub-links under `parent`, keeping the stored `category_path`.
    pub fn import_link(&mut self, parent: NodeId, record: LinkRecord) -> Result<NodeId, TreeError> {
        let LinkRecord { link, sub_links } = record;
        let id = self.alloc(NodeContent::Link(link));
        self.attach_last(parent, id)?;
        for sub in sub_links {
            self.import_link(id, sub)?;
        }
        Ok(id)
    }

    /// Snapshot of a category subtree.
    pub fn export_category(&self, id: NodeId) -> Result<CategoryRecord, TreeError> {
        let node = self.node(id)?;
        let category = node
            .content
            .as_category()
            .ok_or_else(|| TreeError::InvalidParent(format!("{} is not a category", id)))?
            .clone();
        let mut links = Vec::new();
        let mut sub_categories = Vec::new();
        for child in &node.children {
            match &self.node(*child)?.content {
                NodeContent::Link(_) => links.push(self.export_link(*child)?),
                NodeContent::Category(_) => sub_categories.push(self.export_category(*child)?),
                NodeContent::ArchivedRating(_) => {}
            }
        }
        Ok(CategoryRecord {
            category,
            links,
            sub_categories,
        })
    }

    /// Snapshot of a link and its sub-links.
    pub fn export_link(&self, id: NodeId) -> Result<LinkRecord, TreeError> {
        let node = self.node(id)?;
        let link = node
            .content
            .as_link()
            .ok_or_else(|| TreeError::InvalidParent(format!("{} is not a link", id)))?
            .clone();
        let sub_links = node
            .children
            .iter()
            .map(|child| self.export_link(*child))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LinkRecord { link, sub_links })
    }

    fn find_in_subtree(&self, id: NodeId, name: &str) -> Option<NodeId> {
        if self.name_matches(id, name) {
            return Some(id);
        }
        self.children(id)
            .iter()
            .find_map(|child| self.find_in_subtree(*child, name))
    }
}

impl ItemTreeTrait for ItemTree {
    /// Category names and link titles from the root down to `id`.
    fn get_path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.get(node_id) else {
                break;
            };
            segments.push(node.content.name().to_string());
            current = node.parent;
        }
        segments.reverse();
        segments.join(PATH_SEPARATOR)
    }

    fn find_node_by_path(&self, path: &str, separator: &str) -> Option<NodeId> {
        if path.is_empty() {
            return None;
        }
        let mut segments = path.split(separator);
        let first = segments.next()?;
        let mut current = self.live_roots().find(|root| {
            matches!(self.get(*root).map(|n| &n.content), Some(NodeContent::Category(c)) if c.name == first)
        })?;
        for segment in segments {
            current = self.find_child_by_name(current, segment)?;
        }
        Some(current)
    }

    fn find_item_by_name(&self, name: &str) -> Option<NodeId> {
        let roots: Vec<NodeId> = self.live_roots().collect();
        if let Some(root) = roots.iter().copied().find(|r| self.name_matches(*r, name)) {
            return Some(root);
        }
        roots
            .iter()
            .find_map(|root| self.find_in_subtree(*root, name))
    }
}
