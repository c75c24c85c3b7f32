use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory name used under the platform data directory.
pub const APP_DIR_NAME: &str = "linkkeeper";

/// Top-level settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppSettings {
    pub storage: StorageSettings,
    pub archive: ArchiveSettings,
    pub logging: LoggingSettings,
}

/// Where category files and the archive file live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
    /// Sub-directory of `data_dir` holding one file per root category.
    pub categories_dir: String,
    /// File name of the archive snapshot inside `data_dir`.
    pub archive_file: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            categories_dir: "categories".to_string(),
            archive_file: "archive.json".to_string(),
        }
    }
}

impl StorageSettings {
    pub fn categories_path(&self) -> PathBuf {
        self.data_dir.join(&self.categories_dir)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.data_dir.join(&self.archive_file)
    }
}

/// Behaviour of the archive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArchiveSettings {
    /// Prefix of the Archive root label, rendered as `"{prefix} ({count})"`.
    pub label_prefix: String,
    /// Expand the target category when a link is restored into it.
    pub expand_restored_link_parent: bool,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            label_prefix: "Archived".to_string(),
            expand_restored_link_parent: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `<platform data dir>/linkkeeper`, or `./linkkeeper-data` when the platform has none.
pub fn default_data_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join(APP_DIR_NAME),
        None => PathBuf::from(format!("{}-data", APP_DIR_NAME)),
    }
}
