//! Unit tests for the RPC handler: every JSON-RPC method dispatched by `handle_method`.
//!
//! These tests exercise each method through the same code path used by the
//! `linkkeeper-rpc` binary, against a temporary data directory.

use std::sync::Mutex;

use serde_json::json;
use tempfile::TempDir;

use linkkeeper::app::App;
use linkkeeper::rpc_handler::handle_method;

/// Create a fresh App backed by a temp data directory.
fn setup() -> (Mutex<App>, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let app = App::new(tmp.path()).expect("Failed to init App");
    (Mutex::new(app), tmp)
}

/// Work > Projects with link Repo, plus root Home.
fn seed(app: &Mutex<App>) {
    handle_method(app, "category.add", &json!({"name": "Work"})).unwrap();
    handle_method(app, "category.add", &json!({"name": "Projects", "parent": "Work"})).unwrap();
    handle_method(
        app,
        "link.add",
        &json!({"parent": "Work > Projects", "title": "Repo", "url": "https://example.com"}),
    )
    .unwrap();
    handle_method(app, "category.add", &json!({"name": "Home"})).unwrap();
}

// ─── Ping ───

#[test]
fn test_ping() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "ping", &json!({})).unwrap();
    assert_eq!(res, json!({"pong": true}));
}

// ─── Unknown method ───

#[test]
fn test_unknown_method_returns_error() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "nonexistent.method", &json!({}));
    assert!(res.unwrap_err().contains("unknown method"));
}

// ─── Tree ───

#[test]
fn test_tree_list_shows_roots_and_archive() {
    let (app, _tmp) = setup();
    seed(&app);
    let res = handle_method(&app, "tree.list", &json!({})).unwrap();
    let items = res["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["label"], "Archived (0)");
    assert_eq!(items[1]["label"], "Work");
    assert_eq!(items[1]["children"][0]["path"], "Work > Projects");
    assert_eq!(items[1]["children"][0]["children"][0]["kind"], "link");
    assert_eq!(items[1]["children"][0]["children"][0]["url"], "https://example.com");
    assert_eq!(res["archive_label"], "Archived (0)");
}

#[test]
fn test_category_add_writes_root_file() {
    let (app, tmp) = setup();
    let res = handle_method(&app, "category.add", &json!({"name": "Work"})).unwrap();
    assert_eq!(res["path"], "Work");
    assert!(tmp.path().join("categories").join("Work.json").exists());
}

#[test]
fn test_missing_params_are_errors() {
    let (app, _tmp) = setup();
    assert!(handle_method(&app, "category.add", &json!({})).unwrap_err().contains("name"));
    assert!(handle_method(&app, "archive.category", &json!({})).unwrap_err().contains("path"));
    assert!(handle_method(&app, "archive.restore", &json!({})).unwrap_err().contains("index"));
    let err = handle_method(&app, "link.add", &json!({"parent": "Nope", "title": "x", "url": "y"}))
        .unwrap_err();
    assert!(err.contains("Nope"));
}

// ─── Ratings ───

#[test]
fn test_rating_set_and_remove() {
    let (app, _tmp) = setup();
    seed(&app);
    handle_method(&app, "rating.set", &json!({"owner": "Repo", "rating": "Quality", "score": 3})).unwrap();
    handle_method(&app, "rating.set", &json!({"owner": "Repo", "rating": "Quality", "score": 8})).unwrap();
    let res = handle_method(&app, "rating.remove", &json!({"owner": "Repo", "rating": "Quality"})).unwrap();
    assert_eq!(res["archive_label"], "Archived (2)");

    let list = handle_method(&app, "archive.list", &json!({})).unwrap();
    let items = list["items"].as_array().unwrap();
    assert_eq!(items[0]["display_name"], "Repo - Quality (3)");
    assert_eq!(items[1]["display_name"], "Repo - Quality (8)");
    assert_eq!(items[0]["kind"], "rating");
    assert_eq!(items[0]["original_location"], "Work > Projects");
}

#[test]
fn test_rating_set_rejects_out_of_range_score() {
    let (app, _tmp) = setup();
    seed(&app);
    let err = handle_method(
        &app,
        "rating.set",
        &json!({"owner": "Repo", "rating": "Quality", "score": 1_i64 << 40}),
    )
    .unwrap_err();
    assert!(err.contains("score"));
}

// ─── Archive ───

#[test]
fn test_archive_category_then_restore_by_index() {
    let (app, tmp) = setup();
    seed(&app);
    let res = handle_method(&app, "archive.category", &json!({"path": "Work > Projects"})).unwrap();
    assert_eq!(res["ok"], true);
    assert_eq!(res["archive_label"], "Archived (1)");
    assert_eq!(res["degraded"], false);
    assert!(tmp.path().join("archive.json").exists());

    let list = handle_method(&app, "archive.list", &json!({})).unwrap();
    assert_eq!(list["items"][0]["kind"], "category");
    assert_eq!(list["items"][0]["original_location"], "Work");

    let res = handle_method(&app, "archive.restore", &json!({"index": 0})).unwrap();
    assert_eq!(res["path"], "Work > Projects");
    assert_eq!(res["archive_label"], "Archived (0)");
}

#[test]
fn test_archive_link_and_delete() {
    let (app, _tmp) = setup();
    seed(&app);
    handle_method(&app, "archive.link", &json!({"path": "Work > Projects > Repo"})).unwrap();
    let res = handle_method(&app, "archive.delete", &json!({"index": 0})).unwrap();
    assert_eq!(res["path"], serde_json::Value::Null);
    assert_eq!(res["archive_label"], "Archived (0)");

    let err = handle_method(&app, "archive.delete", &json!({"index": 0})).unwrap_err();
    assert!(err.contains("index 0"));
}

#[test]
fn test_archive_empty() {
    let (app, _tmp) = setup();
    seed(&app);
    handle_method(&app, "archive.category", &json!({"path": "Home"})).unwrap();
    handle_method(&app, "archive.link", &json!({"path": "Work > Projects > Repo"})).unwrap();
    let res = handle_method(&app, "archive.empty", &json!({})).unwrap();
    assert_eq!(res["archive_label"], "Archived (0)");
    let list = handle_method(&app, "archive.list", &json!({})).unwrap();
    assert!(list["items"].as_array().unwrap().is_empty());
}

/// State written by one App is visible to the next one opened on the same directory.
#[test]
fn test_state_survives_reopen() {
    let (app, tmp) = setup();
    seed(&app);
    handle_method(&app, "rating.set", &json!({"owner": "Home", "rating": "Quality", "score": 2})).unwrap();
    handle_method(&app, "rating.set", &json!({"owner": "Home", "rating": "Quality", "score": 5})).unwrap();
    handle_method(&app, "archive.category", &json!({"path": "Work > Projects"})).unwrap();
    drop(app);

    let reopened = Mutex::new(App::new(tmp.path()).unwrap());
    let list = handle_method(&reopened, "archive.list", &json!({})).unwrap();
    let items = list["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["kind"], "rating");
    assert_eq!(items[1]["kind"], "category");

    let res = handle_method(&reopened, "archive.restore", &json!({"index": 1})).unwrap();
    assert_eq!(res["path"], "Work > Projects");
    let res = handle_method(&reopened, "archive.restore", &json!({"index": 0})).unwrap();
    assert_eq!(res["path"], "Home");

    let tree = handle_method(&reopened, "tree.list", &json!({})).unwrap();
    let home = tree["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["label"] == "Home")
        .unwrap()
        .clone();
    assert_eq!(home["ratings"][0]["score"], 2);
}
