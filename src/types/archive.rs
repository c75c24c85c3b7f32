use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::{Category, Link, RatingValue};

/// The prior value of a rating, frozen at the moment it was overwritten or removed.
///
/// Serialized as a JSON string inside the `url` of a carrier link.
/// `category_path` uses `"/"` separators; empty means the owner was a root item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedRatingRecord {
    #[serde(default)]
    pub category_path: String,
    pub title: String,
    pub rating_name: String,
    pub score: i32,
    #[serde(default)]
    pub reason: String,
}

/// An archived rating as held in the live tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchivedRatingEntry {
    pub record: ArchivedRatingRecord,
    /// Copy of the archived value, kept so the entry can show a rating indicator.
    pub rating: RatingValue,
    /// When the value was archived. Becomes the restored rating's creation date.
    pub archived_date: DateTime<Utc>,
}

impl ArchivedRatingEntry {
    /// `"{title} - {rating_name} ({score})"`
    pub fn display_name(&self) -> String {
        format!(
            "{} - {} ({})",
            self.record.title, self.record.rating_name, self.record.score
        )
    }
}

/// Serialized form of a category together with its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    #[serde(flatten)]
    pub category: Category,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_categories: Vec<CategoryRecord>,
}

/// Serialized form of a link together with any sub-links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    #[serde(flatten)]
    pub link: Link,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_links: Vec<LinkRecord>,
}

/// On-disk document of the archive file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveFile {
    #[serde(default)]
    pub archived_categories: Vec<CategoryRecord>,
    #[serde(default)]
    pub archived_links: Vec<LinkRecord>,
    #[serde(default = "Utc::now")]
    pub last_modified: DateTime<Utc>,
}

impl Default for ArchiveFile {
    fn default() -> Self {
        Self {
            archived_categories: Vec::new(),
            archived_links: Vec::new(),
            last_modified: Utc::now(),
        }
    }
}

/// Kind of item sitting directly under the Archive root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchivedKind {
    Category,
    Link,
    Rating,
}

/// Read-only presentation of one archived item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveEntryView {
    pub index: usize,
    pub kind: ArchivedKind,
    pub display_name: String,
    pub original_location: Option<String>,
    pub archived_date: Option<DateTime<Utc>>,
}
