use std::path::Path;

use serde_json::{json, Value};
use wsgraph_core::graph::{
    add_member, add_relation, create_data_source, create_facet, create_model, id,
    update_definition, ArtifactPath,
};
use wsgraph_core::{Content, GraphError, ModelDefinition, NodeKind, WorkspaceGraph};

fn content(value: Value) -> Content {
    value.as_object().cloned().unwrap()
}

fn rest_user_with_email() -> WorkspaceGraph {
    let mut graph = WorkspaceGraph::new("/ws");
    create_facet(&mut graph, "rest", Content::new()).unwrap();
    create_model(&mut graph, "rest.User", ModelDefinition::new(content(json!({"name": "User"})))).unwrap();
    add_member(
        &mut graph,
        "rest.User",
        NodeKind::ModelProperty,
        "email",
        content(json!({"type": "String"})),
    )
    .unwrap();
    graph
}

#[test]
fn test_facet_model_property_scenario() {
    let graph = rest_user_with_email();

    let facet = graph.get_facet("rest").unwrap();
    let user = facet.get_contained_node("User").unwrap();
    assert_eq!(user.id(), "rest.User");

    let model = graph.get_model("rest.User").unwrap();
    assert_eq!(model.get_property("email").unwrap().id(), "rest.User.email");
    assert_eq!(
        serde_json::to_value(model.get_definition()).unwrap(),
        json!({
            "name": "User",
            "properties": {"email": {"type": "String"}},
            "methods": {},
            "relations": {}
        })
    );
}

#[test]
fn test_update_definition_keeps_children() {
    let mut graph = rest_user_with_email();
    update_definition(
        &mut graph,
        "rest.User",
        content(json!({
            "name": "User",
            "base": "PersistedModel",
            "properties": {"other": {"type": "number"}},
            "acls": [{"permission": "DENY"}]
        })),
    )
    .unwrap();

    let definition = graph.get_model("rest.User").unwrap().get_definition();
    assert_eq!(
        Value::Object(definition.content),
        json!({"name": "User", "base": "PersistedModel"})
    );
    assert_eq!(definition.properties.keys().collect::<Vec<_>>(), vec!["email"]);
}

#[test]
fn test_lookups_absent_are_none() {
    let graph = rest_user_with_email();
    let model = graph.get_model("rest.User").unwrap();
    assert!(model.get_method("greet").is_none());
    assert!(model.get_contained_set(NodeKind::ModelRelation).is_none());
    assert!(graph.get_model("rest.Order").is_none());
    assert!(graph.get_facet("rest.User").is_none());
}

#[test]
fn test_add_relation_to_missing_target_creates_nothing() {
    let mut graph = rest_user_with_email();
    let before = graph.len();

    let err = add_relation(&mut graph, "rest.User", "orders", "rest.Order", Content::new()).unwrap_err();

    assert_eq!(err, GraphError::not_found(NodeKind::ModelDefinition, "rest.Order"));
    assert_eq!(graph.len(), before);
    assert!(graph.get_model("rest.User").unwrap().get_relation("orders").is_none());
}

#[test]
fn test_relation_is_a_reference_not_containment() {
    let mut graph = rest_user_with_email();
    create_model(&mut graph, "rest.Order", ModelDefinition::default()).unwrap();
    add_relation(&mut graph, "rest.User", "orders", "rest.Order", content(json!({"type": "hasMany"}))).unwrap();

    let order = graph.get_model("rest.Order").unwrap();
    assert!(order.get_contained_set(NodeKind::ModelRelation).is_none());

    graph.remove_node("rest.User");
    assert!(graph.get_model("rest.Order").is_some());
    assert!(!graph.contains("rest.User.orders"));
}

#[test]
fn test_model_ids_from_paths_are_deterministic() {
    for _ in 0..3 {
        let path = ArtifactPath::from_relative(Path::new("rest/models/user-account.json")).unwrap();
        assert_eq!(path.model_id("models").as_deref(), Some("rest.UserAccount"));
    }
    assert_eq!(id::model_file_name("UserAccount"), "user-account.json");
}

#[test]
fn test_data_sources_share_namespace_without_collision() {
    let mut graph = rest_user_with_email();
    create_data_source(&mut graph, "rest.dataSources.User", Content::new()).unwrap();

    assert!(graph.get_model("rest.User").is_some());
    assert!(graph.get_data_source("rest.dataSources.User").is_some());
    assert_eq!(graph.get_facet("rest").unwrap().data_sources().len(), 1);
}
