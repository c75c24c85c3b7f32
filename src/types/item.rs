use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::archive::ArchivedRatingEntry;

/// Separator used by live, in-tree paths (`"Work > Projects"`).
pub const PATH_SEPARATOR: &str = " > ";

/// Separator used by paths frozen inside archived rating records (`"Work/Projects"`).
pub const STORAGE_PATH_SEPARATOR: &str = "/";

/// `original_parent_path` value of a category that was archived from the root level.
pub const ROOT_SENTINEL: &str = "Root";

/// `category_path` value that marks a link as the carrier of an archived rating.
pub const RATING_CARRIER_SENTINEL: &str = "ArchivedRating";

/// Display name of the Archive root before its label is computed.
pub const ARCHIVE_ROOT_NAME: &str = "Archive";

/// A single rating attached to a category or link.
///
/// `rating` may be template-qualified, e.g. `"Programming.Complexity"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingValue {
    pub rating: String,
    pub score: i32,
    #[serde(default)]
    pub reason: String,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

impl RatingValue {
    pub fn new(rating: &str, score: i32, reason: &str) -> Self {
        let now = Utc::now();
        Self {
            rating: rating.to_string(),
            score,
            reason: reason.to_string(),
            created_date: now,
            modified_date: now,
        }
    }
}

/// A category: a named folder of links and sub-categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    /// Encryption metadata owned by the category-file layer; carried verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_protection: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ratings: Vec<RatingValue>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_archive_node: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_parent_path: Option<String>,
}

impl Category {
    pub fn new(name: &str) -> Self {
        let now = Utc::now();
        Self {
            name: name.to_string(),
            description: String::new(),
            icon: String::new(),
            created_date: now,
            modified_date: now,
            password_protection: None,
            ratings: Vec::new(),
            is_archive_node: false,
            archived_date: None,
            original_parent_path: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub(crate) fn archive_root() -> Self {
        let mut category = Self::new(ARCHIVE_ROOT_NAME);
        category.is_archive_node = true;
        category
    }
}

/// A link (bookmark, file or directory reference) inside a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_directory: bool,
    /// Current parent path in `" > "` form.
    #[serde(default)]
    pub category_path: String,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ratings: Vec<RatingValue>,
    /// Set for entries produced by directory cataloging. Never archivable.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_catalog_entry: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_category_path: Option<String>,
}

impl Link {
    pub fn new(title: &str, url: &str) -> Self {
        let now = Utc::now();
        Self {
            title: title.to_string(),
            url: url.to_string(),
            description: String::new(),
            is_directory: false,
            category_path: String::new(),
            created_date: now,
            modified_date: now,
            ratings: Vec::new(),
            is_catalog_entry: false,
            archived_date: None,
            original_category_path: None,
        }
    }

    pub fn catalog_entry(title: &str, url: &str, is_directory: bool) -> Self {
        let mut link = Self::new(title, url);
        link.is_directory = is_directory;
        link.is_catalog_entry = true;
        link
    }

    /// Whether this link carries an archived rating record in its `url`.
    pub fn is_rating_carrier(&self) -> bool {
        self.category_path == RATING_CARRIER_SENTINEL
    }
}

/// Payload of a tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Category(Category),
    Link(Link),
    ArchivedRating(ArchivedRatingEntry),
}

impl NodeContent {
    /// The name used for path segments and name lookups.
    pub fn name(&self) -> &str {
        match self {
            NodeContent::Category(c) => &c.name,
            NodeContent::Link(l) => &l.title,
            NodeContent::ArchivedRating(r) => &r.record.title,
        }
    }

    pub fn as_category(&self) -> Option<&Category> {
        match self {
            NodeContent::Category(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_category_mut(&mut self) -> Option<&mut Category> {
        match self {
            NodeContent::Category(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&Link> {
        match self {
            NodeContent::Link(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_link_mut(&mut self) -> Option<&mut Link> {
        match self {
            NodeContent::Link(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_archived_rating(&self) -> Option<&ArchivedRatingEntry> {
        match self {
            NodeContent::ArchivedRating(r) => Some(r),
            _ => None,
        }
    }

    /// Live rating values of a category or link; archived ratings carry none.
    pub fn ratings(&self) -> &[RatingValue] {
        match self {
            NodeContent::Category(c) => &c.ratings,
            NodeContent::Link(l) => &l.ratings,
            NodeContent::ArchivedRating(_) => &[],
        }
    }

    pub fn ratings_mut(&mut self) -> Option<&mut Vec<RatingValue>> {
        match self {
            NodeContent::Category(c) => Some(&mut c.ratings),
            NodeContent::Link(l) => Some(&mut l.ratings),
            NodeContent::ArchivedRating(_) => None,
        }
    }

    pub fn touch(&mut self) {
        let now = Utc::now();
        match self {
            NodeContent::Category(c) => c.modified_date = now,
            NodeContent::Link(l) => l.modified_date = now,
            NodeContent::ArchivedRating(_) => {}
        }
    }
}
