//! Archive Container for linkkeeper.
//!
//! Loads and saves the archive snapshot: every direct child of the Archive root,
//! written in full to a single pretty-printed JSON file on each change.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::managers::item_tree::ItemTree;
use crate::services::rating_archive_codec;
use crate::types::archive::ArchiveFile;
use crate::types::errors::ArchiveError;
use crate::types::item::NodeContent;

/// Trait defining archive snapshot persistence.
pub trait ArchiveContainerTrait {
    /// Rebuilds archived items under the tree's Archive root. Returns how many were attached.
    fn load(&self, tree: &mut ItemTree) -> usize;
    /// Rewrites the archive file from the Archive root's direct children.
    fn save(&self, tree: &ItemTree) -> Result<(), ArchiveError>;
    fn get_archive_path(&self) -> &Path;
}

/// Archive container persisting to a JSON file on disk.
pub struct ArchiveContainer {
    archive_path: PathBuf,
}

impl ArchiveContainer {
    pub fn new<P: AsRef<Path>>(archive_path: P) -> Self {
        Self {
            archive_path: archive_path.as_ref().to_path_buf(),
        }
    }

    /// Reads the archive document. A missing file is an empty archive.
    pub fn read_file(&self) -> Result<ArchiveFile, ArchiveError> {
        if !self.archive_path.exists() {
            return Ok(ArchiveFile::default());
        }
        let content = fs::read_to_string(&self.archive_path).map_err(|e| {
            ArchiveError::IoFailure(format!(
                "Failed to read {}: {}",
                self.archive_path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ArchiveError::ParseFailure(format!(
                "Failed to parse {}: {}",
                self.archive_path.display(),
                e
            ))
        })
    }

    /// The document that `save` would write for the current tree.
    pub fn snapshot(tree: &ItemTree) -> Result<ArchiveFile, ArchiveError> {
        let mut file = ArchiveFile {
            last_modified: Utc::now(),
            ..ArchiveFile::default()
        };
        for child in tree.children(tree.archive_root()) {
            match &tree.node(*child)?.content {
                NodeContent::Category(_) => {
                    file.archived_categories.push(tree.export_category(*child)?);
                }
                NodeContent::Link(_) => {
                    file.archived_links.push(tree.export_link(*child)?);
                }
                NodeContent::ArchivedRating(entry) => {
                    file.archived_categories
                        .push(rating_archive_codec::to_wrapper(entry)?);
                }
            }
        }
        Ok(file)
    }
}

impl ArchiveContainerTrait for ArchiveContainer {
    /// Read and parse failures are logged and treated as an empty archive.
    fn load(&self, tree: &mut ItemTree) -> usize {
        let file = match self.read_file() {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!(path = %self.archive_path.display(), error = %err, "archive unreadable, starting empty");
                return 0;
            }
        };

        let archive_root = tree.archive_root();
        let mut loaded = 0;

        for record in file.archived_categories {
            let attached = if rating_archive_codec::is_wrapper(&record) {
                match rating_archive_codec::from_wrapper(&record) {
                    Ok(entry) => tree.add_archived_rating(entry).map(|_| ()),
                    Err(err) => {
                        tracing::warn!(name = %record.category.name, error = %err, "rating archive kept as category");
                        tree.import_category(Some(archive_root), record).map(|_| ())
                    }
                }
            } else {
                tree.import_category(Some(archive_root), record).map(|_| ())
            };
            match attached {
                Ok(()) => loaded += 1,
                Err(err) => tracing::warn!(error = %err, "skipping archived category"),
            }
        }

        for record in file.archived_links {
            match tree.import_link(archive_root, record) {
                Ok(_) => loaded += 1,
                Err(err) => tracing::warn!(error = %err, "skipping archived link"),
            }
        }

        tracing::info!(items = loaded, path = %self.archive_path.display(), "archive loaded");
        loaded
    }

    fn save(&self, tree: &ItemTree) -> Result<(), ArchiveError> {
        let file = Self::snapshot(tree)?;

        if let Some(parent) = self.archive_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ArchiveError::IoFailure(format!("Failed to create archive directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&file).map_err(|e| {
            ArchiveError::ParseFailure(format!("Failed to serialize archive: {}", e))
        })?;

        fs::write(&self.archive_path, json).map_err(|e| {
            ArchiveError::IoFailure(format!(
                "Failed to write {}: {}",
                self.archive_path.display(),
                e
            ))
        })?;

        tracing::debug!(
            categories = file.archived_categories.len(),
            links = file.archived_links.len(),
            "archive saved"
        );
        Ok(())
    }

    fn get_archive_path(&self) -> &Path {
        &self.archive_path
    }
}
