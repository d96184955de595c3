use std::path::PathBuf;

use serde_json::{json, Value};
use tempfile::TempDir;
use wsgraph_core::graph::{add_member, create_data_source, create_facet, create_model};
use wsgraph_core::{
    Content, FileStore, ModelDefinition, NodeKind, StorageError, WorkspaceConfig, WorkspaceGraph,
    WorkspaceStore,
};

fn content(value: Value) -> Content {
    value.as_object().cloned().unwrap()
}

fn create_test_store() -> (FileStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::with_root(temp_dir.path());
    (store, temp_dir)
}

#[tokio::test]
async fn test_model_round_trip() {
    let (store, temp) = create_test_store();
    let mut graph = WorkspaceGraph::new(temp.path());
    create_model(
        &mut graph,
        "rest.User",
        ModelDefinition::new(content(json!({"name": "User", "idInjection": true}))),
    )
    .unwrap();
    add_member(
        &mut graph,
        "rest.User",
        NodeKind::ModelProperty,
        "email",
        content(json!({"type": "String", "required": true})),
    )
    .unwrap();
    add_member(&mut graph, "rest.User", NodeKind::ModelMethod, "greet", Content::new()).unwrap();

    store.write_model(&graph, "rest.User").await.unwrap();
    let read = store.read_model("rest", "User").await.unwrap();

    assert_eq!(read, graph.get_model("rest.User").unwrap().get_definition());
}

#[tokio::test]
async fn test_nested_facet_paths() {
    let (store, temp) = create_test_store();
    let mut graph = WorkspaceGraph::new(temp.path());
    create_facet(&mut graph, "apps.api", content(json!({"restApiRoot": "/api"}))).unwrap();
    create_data_source(&mut graph, "apps.api.dataSources.db", content(json!({"connector": "memory"}))).unwrap();

    store.write_facet(&graph, "apps.api").await.unwrap();
    store.write_data_sources(&graph, "apps.api").await.unwrap();

    assert!(temp.path().join("apps/api/config.json").exists());
    let sources = store.read_data_sources("apps.api").await.unwrap();
    assert_eq!(Value::Object(sources), json!({"db": {"connector": "memory"}}));
}

#[tokio::test]
async fn test_custom_layout() {
    let temp = TempDir::new().unwrap();
    let config = WorkspaceConfig {
        models_dir: "schemas".to_string(),
        ..WorkspaceConfig::with_root(temp.path())
    };
    let store = FileStore::new(config);
    let mut graph = WorkspaceGraph::new(temp.path());
    create_model(&mut graph, "common.Note", ModelDefinition::default()).unwrap();

    store.write_model(&graph, "common.Note").await.unwrap();

    assert!(temp.path().join("common/schemas/note.json").exists());
    assert_eq!(
        store.list_artifacts().await.unwrap(),
        vec![PathBuf::from("common/schemas/note.json")]
    );
}

#[tokio::test]
async fn test_read_non_object_is_invalid() {
    let (store, temp) = create_test_store();
    std::fs::create_dir_all(temp.path().join("server")).unwrap();
    std::fs::write(temp.path().join("server/datasources.json"), "[1, 2]").unwrap();

    let err = store.read_data_sources("server").await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidArtifact { .. }));
}

#[tokio::test]
async fn test_read_malformed_json() {
    let (store, temp) = create_test_store();
    std::fs::write(temp.path().join("package.json"), "{ not json").unwrap();

    let err = store.read_package_definition().await.unwrap_err();
    assert!(matches!(err, StorageError::Json(_)));
}
