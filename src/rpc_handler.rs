//! RPC method handler for the linkkeeper JSON-RPC protocol.
//!
//! Kept separate from `rpc_server.rs` so it can be unit-tested. `handle_method`
//! dispatches one call to the `App`. Live items are addressed by `" > "` path,
//! archived items by their index in `archive.list`.

use std::sync::Mutex;

use serde_json::{json, Value};

use crate::app::App;
use crate::managers::item_tree::{ItemTree, ItemTreeTrait, NodeId};
use crate::services::archive_service::{ArchiveOutcome, ArchiveServiceTrait};
use crate::types::item::{Category, Link, NodeContent, RatingValue};

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn node_json(tree: &ItemTree, id: NodeId) -> Value {
    let Some(node) = tree.get(id) else {
        return Value::Null;
    };
    let kind = match &node.content {
        NodeContent::Category(_) => "category",
        NodeContent::Link(_) => "link",
        NodeContent::ArchivedRating(_) => "rating",
    };
    let children: Vec<Value> = node.children().iter().map(|c| node_json(tree, *c)).collect();
    let mut out = json!({
        "label": node.display_label(),
        "kind": kind,
        "path": tree.get_path(id),
        "expanded": node.is_expanded,
        "ratings": node.content.ratings(),
        "children": children,
    });
    if let NodeContent::Link(link) = &node.content {
        out["url"] = json!(link.url);
    }
    out
}

fn outcome_json(app: &App, outcome: &ArchiveOutcome) -> Value {
    let tree = app.archive.tree();
    json!({
        "ok": true,
        "path": outcome.node.filter(|n| tree.contains(*n)).map(|n| tree.get_path(n)),
        "status": outcome.status,
        "degraded": outcome.degraded,
        "warnings": outcome.warnings,
        "archive_label": tree.archive_label(),
    })
}

fn archived_index(app: &App, params: &Value) -> Result<NodeId, String> {
    let index = params
        .get("index")
        .and_then(|v| v.as_u64())
        .ok_or("missing index")? as usize;
    app.archive
        .archived_child(index)
        .ok_or_else(|| format!("no archived item at index {}", index))
}

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Tree ───
        "tree.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let tree = a.archive.tree();
            let roots: Vec<Value> = tree.roots().iter().map(|r| node_json(tree, *r)).collect();
            Ok(json!({"items": roots, "archive_label": tree.archive_label()}))
        }
        "category.add" => {
            let name = str_param(params, "name")?;
            let parent = params.get("parent").and_then(|v| v.as_str()).unwrap_or("");
            let description = params.get("description").and_then(|v| v.as_str()).unwrap_or("");
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let id = a
                .add_category(parent, Category::new(name).with_description(description))
                .map_err(|e| e.to_string())?;
            Ok(json!({"path": a.archive.tree().get_path(id)}))
        }
        "link.add" => {
            let parent = str_param(params, "parent")?;
            let title = str_param(params, "title")?;
            let url = str_param(params, "url")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let id = a.add_link(parent, Link::new(title, url)).map_err(|e| e.to_string())?;
            Ok(json!({"path": a.archive.tree().get_path(id)}))
        }

        // ─── Ratings ───
        "rating.set" => {
            let owner = str_param(params, "owner")?;
            let rating = str_param(params, "rating")?;
            let score = params
                .get("score")
                .and_then(|v| v.as_i64())
                .ok_or("missing score")?;
            let score = i32::try_from(score).map_err(|_| "score out of range".to_string())?;
            let reason = params.get("reason").and_then(|v| v.as_str()).unwrap_or("");
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let outcome = a
                .archive
                .set_rating(owner, RatingValue::new(rating, score, reason))
                .map_err(|e| e.to_string())?;
            Ok(outcome_json(&a, &outcome))
        }
        "rating.remove" => {
            let owner = str_param(params, "owner")?;
            let rating = str_param(params, "rating")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let outcome = a.archive.remove_rating(owner, rating).map_err(|e| e.to_string())?;
            Ok(outcome_json(&a, &outcome))
        }

        // ─── Archive ───
        "archive.category" => {
            let path = str_param(params, "path")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let id = a.resolve_path(path).map_err(|e| e.to_string())?;
            let outcome = a.archive.archive_category(id).map_err(|e| e.to_string())?;
            Ok(outcome_json(&a, &outcome))
        }
        "archive.link" => {
            let path = str_param(params, "path")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let id = a.resolve_path(path).map_err(|e| e.to_string())?;
            let outcome = a.archive.archive_link(id).map_err(|e| e.to_string())?;
            Ok(outcome_json(&a, &outcome))
        }
        "archive.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let entries = a.archive.archived_entries();
            Ok(json!({"items": entries, "label": a.archive.tree().archive_label()}))
        }
        "archive.restore" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let id = archived_index(&a, params)?;
            let outcome = a.archive.restore(id).map_err(|e| e.to_string())?;
            Ok(outcome_json(&a, &outcome))
        }
        "archive.delete" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let id = archived_index(&a, params)?;
            let outcome = a.archive.permanently_delete(id).map_err(|e| e.to_string())?;
            Ok(outcome_json(&a, &outcome))
        }
        "archive.empty" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let outcome = a.archive.empty_archive().map_err(|e| e.to_string())?;
            Ok(outcome_json(&a, &outcome))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
