//! Rating Archive Codec for linkkeeper.
//!
//! Archived ratings are held in the tree as `NodeContent::ArchivedRating`
//! entries. On disk they keep the established shape: a wrapper category named
//! `"{title} - {rating} ({score})"` whose only link carries the JSON record in
//! its `url` and the sentinel `"ArchivedRating"` in its `categoryPath`.

use chrono::{DateTime, Utc};

use crate::managers::item_tree::{ItemTree, NodeId};
use crate::types::archive::{ArchivedRatingEntry, ArchivedRatingRecord, CategoryRecord, LinkRecord};
use crate::types::errors::ArchiveError;
use crate::types::item::{
    Category, Link, NodeContent, RatingValue, PATH_SEPARATOR, RATING_CARRIER_SENTINEL,
    STORAGE_PATH_SEPARATOR,
};

/// `"Work > Projects"` → `"Work/Projects"`
pub fn to_storage_path(tree_path: &str) -> String {
    tree_path.replace(PATH_SEPARATOR, STORAGE_PATH_SEPARATOR)
}

/// `"Work/Projects"` → `"Work > Projects"`
pub fn to_tree_path(storage_path: &str) -> String {
    storage_path.replace(STORAGE_PATH_SEPARATOR, PATH_SEPARATOR)
}

pub fn encode_record(record: &ArchivedRatingRecord) -> Result<String, ArchiveError> {
    serde_json::to_string(record)
        .map_err(|e| ArchiveError::ParseFailure(format!("Failed to encode rating record: {}", e)))
}

pub fn decode_record(payload: &str) -> Result<ArchivedRatingRecord, ArchiveError> {
    serde_json::from_str(payload)
        .map_err(|e| ArchiveError::ParseFailure(format!("Failed to parse rating record: {}", e)))
}

/// Builds the archive entry for a rating value that is about to be replaced or removed.
pub fn new_entry(
    owner_path: &str,
    owner_title: &str,
    old_rating: &RatingValue,
    archived_date: DateTime<Utc>,
) -> ArchivedRatingEntry {
    ArchivedRatingEntry {
        record: ArchivedRatingRecord {
            category_path: to_storage_path(owner_path),
            title: owner_title.to_string(),
            rating_name: old_rating.rating.clone(),
            score: old_rating.score,
            reason: old_rating.reason.clone(),
        },
        rating: old_rating.clone(),
        archived_date,
    }
}

/// The wrapper-category record written to the archive file for `entry`.
pub fn to_wrapper(entry: &ArchivedRatingEntry) -> Result<CategoryRecord, ArchiveError> {
    let mut wrapper = Category::new(&entry.display_name());
    wrapper.created_date = entry.archived_date;
    wrapper.modified_date = entry.archived_date;
    wrapper.archived_date = Some(entry.archived_date);
    wrapper.ratings = vec![entry.rating.clone()];

    let mut carrier = Link::new(&entry.record.title, &encode_record(&entry.record)?);
    carrier.category_path = RATING_CARRIER_SENTINEL.to_string();
    carrier.created_date = entry.archived_date;
    carrier.modified_date = entry.archived_date;
    carrier.archived_date = Some(entry.archived_date);

    Ok(CategoryRecord {
        category: wrapper,
        links: vec![LinkRecord {
            link: carrier,
            sub_links: Vec::new(),
        }],
        sub_categories: Vec::new(),
    })
}

/// Whether a stored category has the wrapper shape: no original parent and
/// exactly one link, flagged as a carrier.
pub fn is_wrapper(record: &CategoryRecord) -> bool {
    record.category.original_parent_path.is_none()
        && record.sub_categories.is_empty()
        && record.links.len() == 1
        && record.links[0].link.is_rating_carrier()
}

/// Decodes a wrapper-category record back into an archive entry.
pub fn from_wrapper(record: &CategoryRecord) -> Result<ArchivedRatingEntry, ArchiveError> {
    if !is_wrapper(record) {
        return Err(ArchiveError::InvalidState(format!(
            "'{}' is not an archived rating",
            record.category.name
        )));
    }
    let carrier = &record.links[0].link;
    let decoded = decode_record(&carrier.url)?;
    Ok(entry_from_parts(
        decoded,
        record.category.ratings.first(),
        carrier.created_date,
    ))
}

/// Decodes an archived rating that is still held in the tree in wrapper shape
/// (a category whose only child is a carrier link).
pub fn from_wrapper_node(tree: &ItemTree, id: NodeId) -> Result<ArchivedRatingEntry, ArchiveError> {
    let node = tree.node(id)?;
    let category = node.content.as_category().ok_or_else(|| {
        ArchiveError::InvalidState(format!("'{}' is not an archived rating", node.content.name()))
    })?;
    if category.original_parent_path.is_some() {
        return Err(ArchiveError::InvalidState(format!(
            "'{}' is an archived category, not an archived rating",
            category.name
        )));
    }
    let carrier = match node.children() {
        [only] => match &tree.node(*only)?.content {
            NodeContent::Link(link) if link.is_rating_carrier() => link,
            _ => {
                return Err(ArchiveError::InvalidState(format!(
                    "'{}' has no rating carrier",
                    category.name
                )))
            }
        },
        _ => {
            return Err(ArchiveError::InvalidState(format!(
                "'{}' must contain exactly one rating carrier",
                category.name
            )))
        }
    };
    let decoded = decode_record(&carrier.url)?;
    Ok(entry_from_parts(
        decoded,
        category.ratings.first(),
        carrier.created_date,
    ))
}

fn entry_from_parts(
    record: ArchivedRatingRecord,
    indicator: Option<&RatingValue>,
    carrier_created: DateTime<Utc>,
) -> ArchivedRatingEntry {
    let rating = indicator.cloned().unwrap_or_else(|| RatingValue {
        rating: record.rating_name.clone(),
        score: record.score,
        reason: record.reason.clone(),
        created_date: carrier_created,
        modified_date: carrier_created,
    });
    ArchivedRatingEntry {
        record,
        rating,
        archived_date: carrier_created,
    }
}
