use thiserror::Error;

// === TreeError ===

/// Errors raised by structural operations on the item tree.
#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    /// The node handle is stale or was never issued by this tree.
    #[error("Node not found: {0}")]
    NodeNotFound(String),
    /// The requested parent cannot hold children of this kind.
    #[error("Invalid parent: {0}")]
    InvalidParent(String),
    /// The node is still attached somewhere and must be detached first.
    #[error("Node already attached: {0}")]
    AlreadyAttached(String),
}

// === StoreError ===

/// Errors related to persisting root categories as files.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a category file failed.
    #[error("Category store I/O error: {0}")]
    Io(String),
    /// A category file could not be serialized or parsed.
    #[error("Category store serialization error: {0}")]
    Serialization(String),
    /// The node passed to the store is not a root category.
    #[error("Not a root category: {0}")]
    NotRootCategory(String),
}

// === ArchiveError ===

/// Errors returned by archive, restore and delete operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// An original path, parent or item could not be resolved.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Required archive metadata is missing or the node has the wrong shape.
    #[error("Invalid archive state: {0}")]
    InvalidState(String),
    /// Reading or writing a file failed.
    #[error("Archive I/O failure: {0}")]
    IoFailure(String),
    /// An embedded archive record could not be parsed.
    #[error("Archive parse failure: {0}")]
    ParseFailure(String),
}

impl From<TreeError> for ArchiveError {
    fn from(e: TreeError) -> Self {
        match e {
            TreeError::NodeNotFound(msg) => ArchiveError::NotFound(msg),
            other => ArchiveError::InvalidState(other.to_string()),
        }
    }
}

impl From<StoreError> for ArchiveError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Io(msg) => ArchiveError::IoFailure(msg),
            StoreError::Serialization(msg) => ArchiveError::ParseFailure(msg),
            StoreError::NotRootCategory(msg) => ArchiveError::InvalidState(msg),
        }
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    Io(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    Serialization(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === AppError ===

/// Errors raised while assembling the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}
