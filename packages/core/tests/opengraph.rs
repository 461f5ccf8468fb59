//! End-to-end tests for building, exporting, saving, and re-importing graphs.
//!
//! These go through the public API only, the way a caller producing
//! OpenGraph files would.

use std::fs;

use opengraph::{
    Document, EdgeOptions, ExportOptions, MatchBy, OpenGraphBuilder, RawProperties,
    ValidationError,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn raw(value: Value) -> RawProperties {
    match value {
        Value::Object(map) => map,
        other => panic!("test fixture must be an object, got {other}"),
    }
}

fn company() -> OpenGraphBuilder {
    let mut g = OpenGraphBuilder::with_source_kind("IntegrationTest");
    g.create_node(
        "alice@company.com",
        ["User", "Person"],
        Some(raw(json!({
            "name": "Alice Johnson",
            "email": "alice@company.com",
            "active": true,
            "department": "IT"
        }))),
    )
    .unwrap();
    g.create_node(
        "bob@company.com",
        ["User", "Person"],
        Some(raw(json!({ "name": "Bob Smith", "active": false }))),
    )
    .unwrap();
    g.create_node(
        "web-server-01",
        ["Computer", "Server"],
        Some(raw(json!({ "hostname": "web-server-01.company.com", "ports": [80, 443, 22] }))),
    )
    .unwrap();
    g.create_edge(
        "alice@company.com",
        "web-server-01",
        "AdminTo",
        EdgeOptions::default()
            .properties(raw(json!({ "granted_date": "2025-01-01", "permissions": ["read", "write"] }))),
    )
    .unwrap();
    g.create_edge(
        "Bob Smith",
        "web-server-01",
        "CanRDP",
        EdgeOptions::default()
            .start_match_by(MatchBy::Name)
            .start_kind("User"),
    )
    .unwrap();
    g
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn alice_knows_bob() {
    let mut g = OpenGraphBuilder::new();
    g.create_node("alice", ["User"], None).unwrap();
    g.create_edge("alice", "bob", "knows", EdgeOptions::default())
        .unwrap();

    let doc: Value = serde_json::from_str(&g.to_json(Some(2)).unwrap()).unwrap();
    assert_eq!(doc["graph"]["nodes"][0]["id"], "alice");
    assert_eq!(doc["graph"]["nodes"][0]["kinds"], json!(["User"]));
    assert_eq!(doc["graph"]["edges"][0]["kind"], "knows");
    assert_eq!(doc["graph"]["edges"][0]["end"]["value"], "bob");
    assert!(doc.get("metadata").is_none());
}

#[test]
fn json_preserves_counts_order_and_values() {
    let g = company();
    let doc: Value = serde_json::from_str(&g.to_json(None).unwrap()).unwrap();

    let nodes = doc["graph"]["nodes"].as_array().unwrap();
    let edges = doc["graph"]["edges"].as_array().unwrap();
    assert_eq!(nodes.len(), 3);
    assert_eq!(edges.len(), 2);

    let ids: Vec<&str> = nodes.iter().map(|n| n["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["alice@company.com", "bob@company.com", "web-server-01"]);
    assert_eq!(nodes[2]["properties"]["ports"], json!([80, 443, 22]));
    assert_eq!(
        edges[1]["start"],
        json!({ "value": "Bob Smith", "match_by": "name", "kind": "User" })
    );
    assert_eq!(edges[0]["properties"]["permissions"], json!(["read", "write"]));
    assert_eq!(doc["metadata"]["source_kind"], "IntegrationTest");
}

#[test]
fn export_is_deterministic() {
    assert_eq!(company().to_json(Some(2)).unwrap(), company().to_json(Some(2)).unwrap());
}

#[test]
fn exported_document_reimports_identically() {
    let g = company();
    let doc = Document::from_json(&g.to_json(Some(2)).unwrap()).unwrap();
    let rebuilt = OpenGraphBuilder::from_document(doc).unwrap();
    assert_eq!(rebuilt.to_json(Some(2)).unwrap(), g.to_json(Some(2)).unwrap());
    assert_eq!(rebuilt.check_references(), Ok(()));
}

#[test]
fn builder_with_source_kind_accepts_kindless_node() {
    let mut with = OpenGraphBuilder::with_source_kind("MySystem");
    assert!(with.create_node("n1", Vec::<String>::new(), None).is_ok());

    let mut without = OpenGraphBuilder::new();
    assert_eq!(
        without.create_node("n1", Vec::<String>::new(), None).unwrap_err(),
        ValidationError::MissingKind("n1".into())
    );
}

// ---------------------------------------------------------------------------
// Saving
// ---------------------------------------------------------------------------

#[test]
fn save_writes_complete_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");
    let g = company();

    g.save_to_file(&path).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, g.to_json(Some(2)).unwrap());
    // nothing but the target is left in the directory
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn save_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");
    fs::write(&path, "stale contents that are longer than the new document ".repeat(100)).unwrap();

    let g = OpenGraphBuilder::new();
    g.save_to_file_with(&path, &ExportOptions::compact()).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        r#"{"graph":{"nodes":[],"edges":[]}}"#
    );
}

#[cfg(unix)]
#[test]
fn save_keeps_mode_of_replaced_file() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");
    fs::write(&path, "{}").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

    company().save_to_file(&path).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
}

#[cfg(unix)]
#[test]
fn save_creates_world_readable_file() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");

    company().save_to_file(&path).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
}

#[test]
fn failed_save_leaves_target_untouched() {
    let dir = tempfile::tempdir().unwrap();
    // a non-empty directory cannot be replaced by a file
    let target = dir.path().join("graph.json");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("keep.txt"), "keep").unwrap();

    let err = company().save_to_file(&target);
    assert!(matches!(err, Err(opengraph::ExportError::Io(_))));

    assert!(target.is_dir());
    assert_eq!(fs::read_to_string(target.join("keep.txt")).unwrap(), "keep");
    // the temporary file was cleaned up
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn save_into_missing_directory_fails_without_creating_it() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("missing").join("graph.json");

    assert!(company().save_to_file(&target).is_err());
    assert!(!target.exists());
    assert!(!dir.path().join("missing").exists());
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[test]
fn import_rejects_invalid_entities() {
    let too_many_kinds = r#"{"graph": {"nodes": [{"id": "a", "kinds": ["A", "B", "C", "D"]}], "edges": []}}"#;
    assert!(Document::from_json(too_many_kinds).is_err());

    let empty_edge_kind = r#"{"graph": {"nodes": [], "edges": [
        {"start": {"value": "a"}, "end": {"value": "b"}, "kind": ""}
    ]}}"#;
    assert!(Document::from_json(empty_edge_kind).is_err());
}

#[test]
fn import_applies_missing_kind_rule() {
    let doc = Document::from_json(r#"{"graph": {"nodes": [{"id": "a", "kinds": []}], "edges": []}}"#)
        .unwrap();
    assert_eq!(
        OpenGraphBuilder::from_document(doc).unwrap_err(),
        ValidationError::MissingKind("a".into())
    );
}
