//! Category Store for linkkeeper.
//!
//! Implements `CategoryStoreTrait`: persistence of root categories, one
//! pretty-printed JSON file per root category inside a directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::managers::item_tree::{ItemTree, NodeId};
use crate::types::archive::CategoryRecord;
use crate::types::errors::StoreError;

/// Trait defining root-category persistence.
pub trait CategoryStoreTrait {
    /// Writes the whole subtree of the root category `root`.
    fn save_category(&self, tree: &ItemTree, root: NodeId) -> Result<(), StoreError>;
    /// Deletes the backing file of the root category `name`. Missing files are not an error.
    fn delete_category(&self, name: &str) -> Result<(), StoreError>;
    /// Reads every stored root category, oldest first. Unreadable files are skipped.
    fn load_categories(&self) -> Result<Vec<CategoryRecord>, StoreError>;
}

/// Category store writing JSON files into a single directory.
pub struct JsonCategoryStore {
    dir: PathBuf,
}

impl JsonCategoryStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing the root category `name`.
    pub fn file_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_file_stem(name)))
    }
}

/// Replaces characters that are not portable in file names.
fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = stem.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

impl CategoryStoreTrait for JsonCategoryStore {
    fn save_category(&self, tree: &ItemTree, root: NodeId) -> Result<(), StoreError> {
        let node = tree
            .node(root)
            .map_err(|e| StoreError::NotRootCategory(e.to_string()))?;
        if node.parent().is_some() || root == tree.archive_root() {
            return Err(StoreError::NotRootCategory(node.content.name().to_string()));
        }
        let record = tree
            .export_category(root)
            .map_err(|e| StoreError::NotRootCategory(e.to_string()))?;

        fs::create_dir_all(&self.dir).map_err(|e| {
            StoreError::Io(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;

        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| StoreError::Serialization(format!("Failed to serialize category: {}", e)))?;

        let path = self.file_for(&record.category.name);
        fs::write(&path, json)
            .map_err(|e| StoreError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

        tracing::debug!(category = %record.category.name, path = %path.display(), "saved category file");
        Ok(())
    }

    fn delete_category(&self, name: &str) -> Result<(), StoreError> {
        let path = self.file_for(name);
        if !path.exists() {
            return Ok(());
        }
        fs::remove_file(&path)
            .map_err(|e| StoreError::Io(format!("Failed to remove {}: {}", path.display(), e)))?;
        tracing::debug!(category = %name, "deleted category file");
        Ok(())
    }

    fn load_categories(&self) -> Result<Vec<CategoryRecord>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| StoreError::Io(format!("Failed to read {}: {}", self.dir.display(), e)))?;

        let mut records = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| StoreError::Io(e.to_string()))?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|raw| {
                    serde_json::from_str::<CategoryRecord>(&raw).map_err(|e| e.to_string())
                });
            match parsed {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable category file");
                }
            }
        }

        records.sort_by(|a, b| {
            a.category
                .created_date
                .cmp(&b.category.created_date)
                .then_with(|| a.category.name.cmp(&b.category.name))
        });
        Ok(records)
    }
}
