//! Model definitions and their members.
//!
//! A model is stored in two representations. On disk it is one flat JSON
//! document with `properties`, `methods` and `relations` maps. In the graph
//! the flat fields are the model node's content and every member is its
//! own contained node. [`Model::get_definition`] assembles the first from
//! the second; [`create_model`], [`update_definition`] and [`sync_members`]
//! decompose the other way.

use std::collections::BTreeMap;
use std::ops::Deref;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::{Content, Entity, NodeKind, NodeRef};
use super::error::GraphError;
use super::id;
use super::WorkspaceGraph;

/// Keys represented by contained member nodes.
pub const MEMBER_KEYS: [&str; 3] = ["properties", "methods", "relations"];

/// Keys stripped from content passed to [`update_definition`].
///
/// Member keys are represented by contained nodes; `validations` and `acls`
/// are not editable through a definition update.
pub const CONTAINED_KEYS: [&str; 5] = ["properties", "methods", "relations", "validations", "acls"];

/// Assembled model definition: flat content plus member maps keyed by
/// member name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    #[serde(flatten)]
    pub content: Content,
    #[serde(default)]
    pub properties: BTreeMap<String, Content>,
    #[serde(default)]
    pub methods: BTreeMap<String, Content>,
    #[serde(default)]
    pub relations: BTreeMap<String, Content>,
}

impl ModelDefinition {
    pub fn new(content: Content) -> Self {
        Self {
            content,
            ..Self::default()
        }
    }

    /// Parses a model document.
    ///
    /// A property given as a bare type string (`"email": "string"`) is
    /// expanded to `{"type": "string"}`.
    pub fn from_value(mut value: Value) -> Result<Self, serde_json::Error> {
        if let Some(properties) = value.get_mut("properties").and_then(Value::as_object_mut) {
            for property in properties.values_mut() {
                if let Value::String(type_name) = property {
                    let mut expanded = Content::new();
                    expanded.insert("type".to_string(), Value::String(std::mem::take(type_name)));
                    *property = Value::Object(expanded);
                }
            }
        }
        serde_json::from_value(value)
    }

    /// Member map for a member kind.
    pub fn members(&self, kind: NodeKind) -> Option<&BTreeMap<String, Content>> {
        match kind {
            NodeKind::ModelProperty => Some(&self.properties),
            NodeKind::ModelMethod => Some(&self.methods),
            NodeKind::ModelRelation => Some(&self.relations),
            _ => None,
        }
    }

    /// Flat content with the member keys removed.
    ///
    /// Everything else a model file carries, `acls` and `validations`
    /// included, stays in the flat content and is written back unchanged.
    pub fn flat_content(&self) -> Content {
        strip_keys(self.content.clone(), &MEMBER_KEYS)
    }
}

fn strip_keys(mut content: Content, keys: &[&str]) -> Content {
    for key in keys {
        content.remove(*key);
    }
    content
}

/// Typed view of a `ModelDefinition` node.
#[derive(Debug, Clone, Copy)]
pub struct Model<'g> {
    node: NodeRef<'g>,
}

impl<'g> Model<'g> {
    pub fn node(&self) -> NodeRef<'g> {
        self.node
    }

    pub fn id(&self) -> &'g str {
        self.node.entity().id()
    }

    /// Model name: the `name` field, or the last id segment.
    pub fn name(&self) -> &'g str {
        let entity = self.node.entity();
        entity.content_str("name").unwrap_or_else(|| id::leaf(entity.id()))
    }

    /// Facet name: the `facetName` field, or the id without its last segment.
    pub fn facet_name(&self) -> Option<&'g str> {
        let entity = self.node.entity();
        entity
            .content_str("facetName")
            .or_else(|| id::parent(entity.id()))
    }

    pub fn get_property(&self, name: &str) -> Option<NodeRef<'g>> {
        self.member(NodeKind::ModelProperty, name)
    }

    pub fn get_method(&self, name: &str) -> Option<NodeRef<'g>> {
        self.member(NodeKind::ModelMethod, name)
    }

    pub fn get_relation(&self, name: &str) -> Option<NodeRef<'g>> {
        self.member(NodeKind::ModelRelation, name)
    }

    fn member(&self, kind: NodeKind, name: &str) -> Option<NodeRef<'g>> {
        self.node
            .get_contained_node(name)
            .filter(|node| node.kind() == kind)
    }

    /// Target model of a relation, if both are registered.
    pub fn relation_target(&self, name: &str) -> Option<Model<'g>> {
        let relation = self.get_relation(name)?;
        self.node.graph().get_model(relation.target()?)
    }

    /// Assembles the definition from content and contained members.
    ///
    /// Member maps are keyed by the last segment of each member id.
    pub fn get_definition(&self) -> ModelDefinition {
        ModelDefinition {
            content: self.node.content().clone(),
            properties: self.node.contained_contents(NodeKind::ModelProperty),
            methods: self.node.contained_contents(NodeKind::ModelMethod),
            relations: self.node.contained_contents(NodeKind::ModelRelation),
        }
    }

    /// Location of the model file under the workspace directory.
    pub fn file_path(&self, models_dir: &str) -> Option<PathBuf> {
        let facet = self.facet_name()?;
        Some(
            self.node
                .graph()
                .directory()
                .join(id::facet_dir(facet))
                .join(models_dir)
                .join(id::model_file_name(self.name())),
        )
    }
}

impl<'g> Deref for Model<'g> {
    type Target = NodeRef<'g>;

    fn deref(&self) -> &NodeRef<'g> {
        &self.node
    }
}

impl WorkspaceGraph {
    /// Gets a model by id.
    pub fn get_model(&self, id: &str) -> Option<Model<'_>> {
        self.node_of_kind(id, NodeKind::ModelDefinition)
            .map(|node| Model { node })
    }

    pub fn require_model(&self, id: &str) -> Result<Model<'_>, GraphError> {
        self.get_model(id)
            .ok_or_else(|| GraphError::not_found(NodeKind::ModelDefinition, id))
    }

    /// Models contained in a facet, sorted by id.
    pub fn models_in_facet(&self, facet: &str) -> Vec<Model<'_>> {
        self.nodes_of_kind(NodeKind::ModelDefinition)
            .into_iter()
            .map(|node| Model { node })
            .filter(|model| model.facet_name() == Some(facet))
            .collect()
    }
}

/// Creates a model node and its members from a definition.
///
/// The model's parent is the facet named by its id prefix; containment is
/// wired when that facet is registered.
pub fn create_model<'g>(
    graph: &'g mut WorkspaceGraph,
    model_id: &str,
    definition: ModelDefinition,
) -> Result<Model<'g>, GraphError> {
    if model_id.is_empty() || model_id.split(id::SEPARATOR).any(str::is_empty) {
        return Err(GraphError::invalid_id(model_id, "model id has an empty segment"));
    }
    graph.check_vacant(model_id, NodeKind::ModelDefinition)?;
    check_members(graph, model_id, &definition)?;

    let mut entity = Entity::new(NodeKind::ModelDefinition, model_id, definition.flat_content());
    if let Some(facet) = id::parent(model_id) {
        entity = entity.with_parent(facet);
    }
    graph.register(entity)?;
    register_members(graph, model_id, &definition)?;

    graph.require_model(model_id)
}

/// Member ids a definition would register, with their kinds.
///
/// Fails on an invalid member name or on two members of different kinds
/// sharing a name.
fn planned_members(model_id: &str, definition: &ModelDefinition) -> Result<BTreeMap<String, NodeKind>, GraphError> {
    let mut planned = BTreeMap::new();
    for kind in NodeKind::MODEL_MEMBERS {
        if let Some(members) = definition.members(kind) {
            for name in members.keys() {
                id::validate_segment(name)?;
                let member_id = id::member_id(model_id, name);
                if let Some(other) = planned.insert(member_id.clone(), kind) {
                    return Err(GraphError::AlreadyExists { kind: other, id: member_id });
                }
            }
        }
    }
    Ok(planned)
}

/// Makes sure no member id is taken by a node of another kind, so nothing
/// is registered when one of them would fail.
fn check_members(graph: &WorkspaceGraph, model_id: &str, definition: &ModelDefinition) -> Result<(), GraphError> {
    for (member_id, kind) in planned_members(model_id, definition)? {
        graph.check_vacant(&member_id, kind)?;
    }
    Ok(())
}

fn register_members(graph: &mut WorkspaceGraph, model_id: &str, definition: &ModelDefinition) -> Result<(), GraphError> {
    for kind in NodeKind::MODEL_MEMBERS {
        if let Some(members) = definition.members(kind) {
            for (name, content) in members {
                graph.register(member_entity(model_id, kind, name, content.clone()))?;
            }
        }
    }
    Ok(())
}

fn member_entity(model_id: &str, kind: NodeKind, name: &str, content: Content) -> Entity {
    let entity = Entity::new(kind, id::member_id(model_id, name), content).with_parent(model_id);
    if kind == NodeKind::ModelRelation {
        if let Some(target) = disk_relation_target(model_id, entity.content()) {
            return entity.with_target(target);
        }
    }
    entity
}

/// Target id of a relation read from a model document: its `model` field
/// resolved within the source model's facet.
fn disk_relation_target(model_id: &str, data: &Content) -> Option<String> {
    let target = data.get("model")?.as_str()?;
    if target.contains(id::SEPARATOR) {
        return Some(target.to_string());
    }
    id::parent(model_id).map(|facet| id::model_id(facet, target))
}

/// Adds a property or method to an existing model.
pub fn add_member<'g>(
    graph: &'g mut WorkspaceGraph,
    model_id: &str,
    kind: NodeKind,
    name: &str,
    content: Content,
) -> Result<NodeRef<'g>, GraphError> {
    if kind.definition_key().is_none() {
        return Err(GraphError::invalid_id(name, format!("{kind} is not a model member")));
    }
    graph.require_model(model_id)?;
    id::validate_segment(name)?;

    let entity = Entity::new(kind, id::member_id(model_id, name), content).with_parent(model_id);
    let member_id = graph.register(entity)?.id().to_string();
    graph.require(&member_id, kind)
}

/// Adds a relation from `model_id` to `target_id`.
///
/// The target must be a registered model; nothing is created otherwise.
pub fn add_relation<'g>(
    graph: &'g mut WorkspaceGraph,
    model_id: &str,
    name: &str,
    target_id: &str,
    data: Content,
) -> Result<NodeRef<'g>, GraphError> {
    graph.require_model(model_id)?;
    graph.require_model(target_id)?;
    id::validate_segment(name)?;

    let entity = Entity::new(NodeKind::ModelRelation, id::member_id(model_id, name), data)
        .with_parent(model_id)
        .with_target(target_id);
    let relation_id = graph.register(entity)?.id().to_string();
    graph.require(&relation_id, NodeKind::ModelRelation)
}

/// Replaces a model's flat content.
///
/// Contained keys are stripped from `content`; the model's members are left
/// exactly as they were.
pub fn update_definition(
    graph: &mut WorkspaceGraph,
    model_id: &str,
    content: Content,
) -> Result<(), GraphError> {
    graph.require_model(model_id)?;
    let entity = graph
        .entity_mut(model_id)
        .ok_or_else(|| GraphError::not_found(NodeKind::ModelDefinition, model_id))?;
    entity.set_content(strip_keys(content, &CONTAINED_KEYS));
    Ok(())
}

/// Replaces a model's flat content and members with a definition re-read
/// from its file.
///
/// Unlike [`update_definition`], only the member keys are kept out of the
/// flat content, the same as when the model was first created.
pub fn reload_definition(
    graph: &mut WorkspaceGraph,
    model_id: &str,
    definition: &ModelDefinition,
) -> Result<(), GraphError> {
    sync_members(graph, model_id, definition)?;
    let entity = graph
        .entity_mut(model_id)
        .ok_or_else(|| GraphError::not_found(NodeKind::ModelDefinition, model_id))?;
    entity.set_content(definition.flat_content());
    Ok(())
}

/// Makes a model's members match the member maps of `definition`.
///
/// Members absent from the definition are removed, the rest are created or
/// have their content replaced.
pub fn sync_members(
    graph: &mut WorkspaceGraph,
    model_id: &str,
    definition: &ModelDefinition,
) -> Result<(), GraphError> {
    planned_members(model_id, definition)?;

    let existing: Vec<(String, NodeKind)> = graph
        .require_model(model_id)?
        .node()
        .contained_ids()
        .filter(|(_, kind)| kind.definition_key().is_some())
        .map(|(child, kind)| (child.to_string(), kind))
        .collect();

    for (child_id, kind) in existing {
        let keep = definition
            .members(kind)
            .is_some_and(|members| members.contains_key(id::leaf(&child_id)));
        if !keep {
            graph.remove_node(&child_id);
        }
    }

    check_members(graph, model_id, definition)?;
    register_members(graph, model_id, definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::create_facet;
    use serde_json::json;

    fn content(value: Value) -> Content {
        value.as_object().cloned().unwrap()
    }

    fn rest_user() -> WorkspaceGraph {
        let mut graph = WorkspaceGraph::new("/ws");
        create_facet(&mut graph, "rest", Content::new()).unwrap();
        create_model(&mut graph, "rest.User", ModelDefinition::new(content(json!({"name": "User"})))).unwrap();
        graph
    }

    #[test]
    fn test_definition_keyed_by_leaf() {
        let mut graph = rest_user();
        add_member(
            &mut graph,
            "rest.User",
            NodeKind::ModelProperty,
            "email",
            content(json!({"type": "String"})),
        )
        .unwrap();

        let definition = graph.get_model("rest.User").unwrap().get_definition();
        assert_eq!(
            serde_json::to_value(&definition).unwrap(),
            json!({
                "name": "User",
                "properties": {"email": {"type": "String"}},
                "methods": {},
                "relations": {}
            })
        );
    }

    #[test]
    fn test_create_model_decomposes_members() {
        let mut graph = WorkspaceGraph::new("/ws");
        let definition = ModelDefinition::from_value(json!({
            "name": "User",
            "acls": [],
            "properties": {"email": "string"},
            "methods": {"login": {"isStatic": true}}
        }))
        .unwrap();
        let model = create_model(&mut graph, "rest.User", definition).unwrap();

        assert_eq!(model.content().get("acls"), Some(&json!([])));
        assert!(model.content().get("properties").is_none());
        assert_eq!(
            model.get_property("email").unwrap().content(),
            &content(json!({"type": "string"}))
        );
        assert!(model.get_method("login").is_some());
        assert!(model.get_property("login").is_none());
    }

    #[test]
    fn test_create_model_rejects_member_name_shared_across_kinds() {
        let mut graph = WorkspaceGraph::new("/ws");
        let definition = ModelDefinition::from_value(json!({
            "name": "User",
            "properties": {"login": "string"},
            "methods": {"login": {}}
        }))
        .unwrap();

        let err = create_model(&mut graph, "rest.User", definition).unwrap_err();
        assert!(matches!(err, GraphError::AlreadyExists { .. }));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_create_model_over_facet_is_rejected() {
        let mut graph = rest_user();
        create_facet(&mut graph, "rest.Admin", Content::new()).unwrap();

        let err = create_model(&mut graph, "rest.Admin", ModelDefinition::default()).unwrap_err();
        assert_eq!(
            err,
            GraphError::AlreadyExists {
                kind: NodeKind::Facet,
                id: "rest.Admin".to_string()
            }
        );
        assert!(graph.get_facet("rest.Admin").is_some());
    }

    #[test]
    fn test_reload_definition_keeps_file_only_keys() {
        let mut graph = rest_user();
        add_member(&mut graph, "rest.User", NodeKind::ModelProperty, "old", Content::new()).unwrap();
        let disk = ModelDefinition::from_value(json!({
            "name": "User",
            "acls": [{"permission": "DENY"}],
            "properties": {"email": "string"}
        }))
        .unwrap();

        reload_definition(&mut graph, "rest.User", &disk).unwrap();

        let model = graph.get_model("rest.User").unwrap();
        assert_eq!(model.content().get("acls"), Some(&json!([{"permission": "DENY"}])));
        assert!(model.get_property("old").is_none());
        assert!(model.get_property("email").is_some());
    }

    #[test]
    fn test_update_definition_keeps_members() {
        let mut graph = rest_user();
        add_member(&mut graph, "rest.User", NodeKind::ModelProperty, "email", Content::new()).unwrap();

        update_definition(
            &mut graph,
            "rest.User",
            content(json!({
                "name": "User",
                "base": "PersistedModel",
                "properties": {"other": {}},
                "methods": {"x": {}},
                "relations": {"y": {}},
                "validations": [],
                "acls": []
            })),
        )
        .unwrap();

        let model = graph.get_model("rest.User").unwrap();
        assert_eq!(model.content(), &content(json!({"name": "User", "base": "PersistedModel"})));
        let definition = model.get_definition();
        assert_eq!(definition.properties.keys().collect::<Vec<_>>(), vec!["email"]);
        assert!(definition.methods.is_empty());
        assert!(definition.relations.is_empty());
    }

    #[test]
    fn test_get_definition_does_not_mutate() {
        let graph = rest_user();
        let model = graph.get_model("rest.User").unwrap();
        let before = model.content().clone();
        let _ = model.get_definition();
        let _ = model.get_definition();
        assert_eq!(model.content(), &before);
        assert!(model.node().get_contained_set(NodeKind::ModelProperty).is_none());
    }

    #[test]
    fn test_add_relation_requires_target() {
        let mut graph = rest_user();
        let err = add_relation(&mut graph, "rest.User", "orders", "rest.Order", Content::new()).unwrap_err();
        assert_eq!(err, GraphError::not_found(NodeKind::ModelDefinition, "rest.Order"));
        assert!(!graph.contains("rest.User.orders"));

        create_model(&mut graph, "rest.Order", ModelDefinition::default()).unwrap();
        let relation = add_relation(
            &mut graph,
            "rest.User",
            "orders",
            "rest.Order",
            content(json!({"type": "hasMany"})),
        )
        .unwrap();
        assert_eq!(relation.target(), Some("rest.Order"));

        let user = graph.get_model("rest.User").unwrap();
        assert_eq!(user.relation_target("orders").unwrap().id(), "rest.Order");
    }

    #[test]
    fn test_add_member_requires_model() {
        let mut graph = WorkspaceGraph::new("/ws");
        let err = add_member(&mut graph, "rest.Ghost", NodeKind::ModelProperty, "x", Content::new()).unwrap_err();
        assert!(matches!(err, GraphError::NotFound { .. }));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_sync_members_removes_stale() {
        let mut graph = rest_user();
        add_member(&mut graph, "rest.User", NodeKind::ModelProperty, "old", Content::new()).unwrap();
        let disk = ModelDefinition::from_value(json!({
            "name": "User",
            "properties": {"fresh": {"type": "number"}}
        }))
        .unwrap();

        sync_members(&mut graph, "rest.User", &disk).unwrap();

        assert!(!graph.contains("rest.User.old"));
        let definition = graph.get_model("rest.User").unwrap().get_definition();
        assert_eq!(definition.properties, disk.properties);
    }

    #[test]
    fn test_disk_relation_target() {
        let mut graph = rest_user();
        let definition = ModelDefinition::from_value(json!({
            "name": "Order",
            "relations": {"owner": {"type": "belongsTo", "model": "User"}}
        }))
        .unwrap();
        create_model(&mut graph, "rest.Order", definition).unwrap();
        let order = graph.get_model("rest.Order").unwrap();
        assert_eq!(order.relation_target("owner").unwrap().id(), "rest.User");
    }

    #[test]
    fn test_file_path_is_kebab_case() {
        let mut graph = WorkspaceGraph::new("/ws");
        create_model(
            &mut graph,
            "rest.UserAccount",
            ModelDefinition::new(content(json!({"name": "UserAccount", "facetName": "rest"}))),
        )
        .unwrap();
        let model = graph.get_model("rest.UserAccount").unwrap();
        assert_eq!(
            model.file_path("models"),
            Some(PathBuf::from("/ws/rest/models/user-account.json"))
        );
    }

    #[test]
    fn test_models_in_facet() {
        let mut graph = rest_user();
        create_model(&mut graph, "common.Base", ModelDefinition::default()).unwrap();
        let ids: Vec<_> = graph.models_in_facet("rest").iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec!["rest.User"]);
    }
}
