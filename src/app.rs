//! App Core for linkkeeper.
//!
//! Central struct holding the settings engine and the archive service (which
//! owns the live item tree), plus the tree-editing entry points the command
//! surface needs.

use std::path::Path;

use crate::managers::category_store::{CategoryStoreTrait, JsonCategoryStore};
use crate::managers::item_tree::{ItemTree, ItemTreeTrait, NodeId};
use crate::services::archive_container::ArchiveContainer;
use crate::services::archive_service::ArchiveService;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::errors::{AppError, ArchiveError};
use crate::types::item::{Category, Link, PATH_SEPARATOR};

/// Central application struct.
pub struct App {
    pub settings_engine: SettingsEngine,
    pub archive: ArchiveService,
}

impl App {
    /// Opens the data directory: settings, root category files and the archive file.
    ///
    /// An unreadable settings file falls back to defaults. `data_dir` always wins
    /// over the configured storage directory.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self, AppError> {
        let data_dir = data_dir.as_ref();
        let mut settings_engine = SettingsEngine::new(Some(
            data_dir.join("settings.json").to_string_lossy().to_string(),
        ));
        if let Err(err) = settings_engine.load() {
            tracing::warn!(error = %err, "settings unreadable, using defaults");
        }

        let mut settings = settings_engine.get_settings().clone();
        settings.storage.data_dir = data_dir.to_path_buf();

        let store = JsonCategoryStore::new(settings.storage.categories_path());
        let mut tree = ItemTree::with_archive_label(&settings.archive.label_prefix);
        for record in store.load_categories()? {
            if record.category.is_archive_node {
                continue;
            }
            let name = record.category.name.clone();
            if let Err(err) = tree.import_category(None, record) {
                tracing::warn!(category = %name, error = %err, "skipping category file");
            }
        }

        let container = ArchiveContainer::new(settings.storage.archive_path());
        let mut archive = ArchiveService::new(tree, container, Box::new(store), settings.archive);
        archive.load_archive();

        tracing::info!(
            data_dir = %data_dir.display(),
            roots = archive.tree().live_roots().count(),
            archived = archive.tree().children(archive.tree().archive_root()).len(),
            "linkkeeper opened"
        );

        Ok(Self {
            settings_engine,
            archive,
        })
    }

    /// Resolves a live `" > "` path to a node.
    pub fn resolve_path(&self, path: &str) -> Result<NodeId, ArchiveError> {
        self.archive
            .tree()
            .find_node_by_path(path, PATH_SEPARATOR)
            .ok_or_else(|| ArchiveError::NotFound(format!("Path not found: {}", path)))
    }

    /// Adds a category at the root (`parent_path` empty) or under `parent_path`, and saves it.
    pub fn add_category(&mut self, parent_path: &str, category: Category) -> Result<NodeId, ArchiveError> {
        let id = if parent_path.is_empty() {
            self.archive.tree_mut().add_root_category(category)
        } else {
            let parent = self.resolve_path(parent_path)?;
            self.archive.tree_mut().add_category(parent, category)?
        };
        self.archive.save_root_of(id)?;
        Ok(id)
    }

    /// Adds a link under `parent_path` and saves the owning root category.
    pub fn add_link(&mut self, parent_path: &str, link: Link) -> Result<NodeId, ArchiveError> {
        let parent = self.resolve_path(parent_path)?;
        let id = self.archive.tree_mut().add_link(parent, link)?;
        self.archive.save_root_of(id)?;
        Ok(id)
    }
}
