//! Base node type of the workspace graph.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id;
use super::WorkspaceGraph;

/// Flat key/value payload carried by every node.
pub type Content = Map<String, Value>;

/// Kind tag of a node.
///
/// Kind-specific behavior is dispatched by matching on this tag rather than
/// through a type hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Facet,
    ModelDefinition,
    ModelProperty,
    ModelMethod,
    ModelRelation,
    ModelConfig,
    DataSource,
    MiddlewarePhase,
    Middleware,
    PackageDefinition,
}

impl NodeKind {
    /// Member kinds of a model, in definition order.
    pub const MODEL_MEMBERS: [NodeKind; 3] = [
        NodeKind::ModelProperty,
        NodeKind::ModelMethod,
        NodeKind::ModelRelation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Facet => "Facet",
            NodeKind::ModelDefinition => "ModelDefinition",
            NodeKind::ModelProperty => "ModelProperty",
            NodeKind::ModelMethod => "ModelMethod",
            NodeKind::ModelRelation => "ModelRelation",
            NodeKind::ModelConfig => "ModelConfig",
            NodeKind::DataSource => "DataSource",
            NodeKind::MiddlewarePhase => "MiddlewarePhase",
            NodeKind::Middleware => "Middleware",
            NodeKind::PackageDefinition => "PackageDefinition",
        }
    }

    /// Key under which a model definition lists members of this kind.
    pub fn definition_key(&self) -> Option<&'static str> {
        match self {
            NodeKind::ModelProperty => Some("properties"),
            NodeKind::ModelMethod => Some("methods"),
            NodeKind::ModelRelation => Some("relations"),
            _ => None,
        }
    }

    /// Whether nodes of this kind are addressed by their last id segment
    /// inside their parent.
    ///
    /// Middleware entries are keyed by mount path, which may contain dots.
    pub fn keyed_by_leaf(&self) -> bool {
        !matches!(self, NodeKind::Middleware)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node of the workspace graph.
///
/// The graph owns every entity. An entity records the ids of its contained
/// children (with their kinds); the children themselves live in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: String,
    kind: NodeKind,
    parent: Option<String>,
    content: Content,
    contains: BTreeMap<String, NodeKind>,
    target: Option<String>,
}

impl Entity {
    pub fn new(kind: NodeKind, id: impl Into<String>, content: Content) -> Self {
        Self {
            id: id.into(),
            kind,
            parent: None,
            content,
            contains: BTreeMap::new(),
            target: None,
        }
    }

    /// Sets the id of the containing node.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Sets the id of a referenced (not contained) node.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Replaces the flat content. Contained children are untouched.
    pub fn set_content(&mut self, content: Content) {
        self.content = content;
    }

    /// Reads a string field of the content.
    pub fn content_str(&self, key: &str) -> Option<&str> {
        self.content.get(key).and_then(Value::as_str)
    }

    /// Registers `child` in this node's containment set.
    ///
    /// The child id must already be fully qualified. Re-adding an id
    /// overwrites the previous entry.
    pub fn add_contains_relation(&mut self, child: &Entity) {
        self.contains.insert(child.id.clone(), child.kind);
    }

    pub(crate) fn remove_contains_relation(&mut self, child_id: &str) -> bool {
        self.contains.remove(child_id).is_some()
    }

    pub(crate) fn take_contains(&mut self) -> BTreeMap<String, NodeKind> {
        std::mem::take(&mut self.contains)
    }

    pub(crate) fn restore_contains(&mut self, contains: BTreeMap<String, NodeKind>) {
        self.contains = contains;
    }

    /// Qualified id of a contained node with the given leaf name.
    pub fn contained_id(&self, leaf: &str) -> String {
        id::join(&self.id, leaf)
    }

    pub fn contains_id(&self, child_id: &str) -> bool {
        self.contains.contains_key(child_id)
    }

    /// Iterates over `(child id, kind)` pairs in id order.
    pub fn contained_ids(&self) -> impl Iterator<Item = (&str, NodeKind)> {
        self.contains.iter().map(|(id, kind)| (id.as_str(), *kind))
    }

    /// Key of a child inside this node: its leaf segment, or the full
    /// remainder after this id for kinds not keyed by leaf.
    pub fn child_key<'a>(&self, child_id: &'a str, kind: NodeKind) -> &'a str {
        if kind.keyed_by_leaf() {
            id::leaf(child_id)
        } else {
            id::relative_to(&self.id, child_id).unwrap_or(child_id)
        }
    }
}

/// A borrowed entity together with the graph that owns it.
///
/// This is how an entity reaches its contained nodes: through the graph.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'g> {
    graph: &'g WorkspaceGraph,
    entity: &'g Entity,
}

impl<'g> NodeRef<'g> {
    pub(crate) fn new(graph: &'g WorkspaceGraph, entity: &'g Entity) -> Self {
        Self { graph, entity }
    }

    pub fn graph(&self) -> &'g WorkspaceGraph {
        self.graph
    }

    pub fn entity(&self) -> &'g Entity {
        self.entity
    }

    /// Looks up the contained node `<this id>.<leaf>`.
    ///
    /// Absence is not an error: it means "not configured".
    pub fn get_contained_node(&self, leaf: &str) -> Option<NodeRef<'g>> {
        let child_id = self.entity.contained_id(leaf);
        if !self.entity.contains_id(&child_id) {
            return None;
        }
        self.graph.get_node(&child_id)
    }

    /// Contained nodes of `kind`, keyed by qualified id.
    ///
    /// Returns `None` when there are none, so callers must guard before
    /// iterating.
    pub fn get_contained_set(&self, kind: NodeKind) -> Option<BTreeMap<&'g str, NodeRef<'g>>> {
        self.graph.get_contained_set(self.entity.id(), kind)
    }

    /// Contents of contained nodes of `kind`, keyed by child key.
    pub fn contained_contents(&self, kind: NodeKind) -> BTreeMap<String, Content> {
        let mut out = BTreeMap::new();
        if let Some(set) = self.get_contained_set(kind) {
            for (child_id, node) in set {
                let key = self.entity.child_key(child_id, kind);
                out.insert(key.to_string(), node.content().clone());
            }
        }
        out
    }
}

impl Deref for NodeRef<'_> {
    type Target = Entity;

    fn deref(&self) -> &Entity {
        self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content(value: Value) -> Content {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_add_contains_relation_last_write_wins() {
        let mut model = Entity::new(NodeKind::ModelDefinition, "rest.User", Content::new());
        let first = Entity::new(NodeKind::ModelProperty, "rest.User.email", Content::new());
        let second = Entity::new(NodeKind::ModelMethod, "rest.User.email", Content::new());

        model.add_contains_relation(&first);
        model.add_contains_relation(&second);

        let children: Vec<_> = model.contained_ids().collect();
        assert_eq!(children, vec![("rest.User.email", NodeKind::ModelMethod)]);
    }

    #[test]
    fn test_child_key() {
        let phase = Entity::new(NodeKind::MiddlewarePhase, "middleware.files", Content::new());
        assert_eq!(
            phase.child_key("middleware.files.serve.static", NodeKind::Middleware),
            "serve.static"
        );

        let model = Entity::new(NodeKind::ModelDefinition, "rest.User", Content::new());
        assert_eq!(model.child_key("rest.User.email", NodeKind::ModelProperty), "email");
    }

    #[test]
    fn test_content_str() {
        let entity = Entity::new(
            NodeKind::ModelDefinition,
            "rest.User",
            content(json!({"name": "User", "strict": true})),
        );
        assert_eq!(entity.content_str("name"), Some("User"));
        assert_eq!(entity.content_str("strict"), None);
        assert_eq!(entity.contained_id("email"), "rest.User.email");
    }
}
