//! In-memory graph of workspace artifacts.
//!
//! The graph is the registry that owns every node by id. Nodes form a
//! containment tree (facet → model → property, phase → middleware, ...) and
//! may also reference other nodes by id (a relation's target model).
//!
//! # Components
//!
//! - [`WorkspaceGraph`] - the node registry
//! - [`Entity`] / [`NodeRef`] - base node record and its graph-aware view
//! - [`Model`], [`Facet`], [`DataSource`], [`MiddlewarePhase`],
//!   [`PackageDefinition`] - typed views with per-kind factory functions
//! - [`id`] - pure identity derivation
//!
//! Each node kind has one factory function that builds the entity and
//! registers it, so no node ever exists detached from the graph.

mod datasource;
mod entity;
mod error;
mod facet;
pub mod id;
mod middleware;
mod model;
mod package;

pub use datasource::{create_data_source, reconcile_data_sources, DataSource};
pub use entity::{Content, Entity, NodeKind, NodeRef};
pub use error::GraphError;
pub use facet::{
    add_model_config, create_facet, ensure_facet, is_reserved_key, reconcile_model_configs,
    update_model_config, Facet,
};
pub use middleware::{
    add_middleware, create_middleware_phase, ensure_middleware_phase, reconcile_middleware,
    MiddlewarePhase,
};
pub use model::{
    add_member, add_relation, create_model, reload_definition, sync_members, update_definition,
    Model, ModelDefinition, CONTAINED_KEYS, MEMBER_KEYS,
};
pub use package::{create_package_definition, PackageDefinition};
pub use id::ArtifactPath;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Registry of every node of one workspace session.
#[derive(Debug, Default)]
pub struct WorkspaceGraph {
    directory: PathBuf,
    nodes: HashMap<String, Entity>,
}

impl WorkspaceGraph {
    /// Creates an empty graph for the workspace rooted at `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            nodes: HashMap::new(),
        }
    }

    /// Workspace root directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Inserts a node, replacing any node with the same id.
    ///
    /// Returns the replaced node. References to the old node do not survive.
    pub fn add_node(&mut self, node: Entity) -> Option<Entity> {
        self.nodes.insert(node.id().to_string(), node)
    }

    /// Registers a freshly constructed node.
    ///
    /// If a node of the same kind exists at that id, the new node takes over
    /// its containment set so existing descendants stay reachable. A node of
    /// another kind at that id is never replaced. The node is then added to
    /// its parent's containment set when the parent is registered.
    pub fn register(&mut self, mut node: Entity) -> Result<&Entity, GraphError> {
        self.check_vacant(node.id(), node.kind())?;
        let id = node.id().to_string();

        if let Some(mut previous) = self.nodes.remove(&id) {
            node.restore_contains(previous.take_contains());
        }

        if let Some(parent_id) = node.parent().map(str::to_string) {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.add_contains_relation(&node);
            }
        }

        tracing::trace!(id = %id, kind = %node.kind(), "registered node");
        let registered: &Entity = self.nodes.entry(id).or_insert(node);
        Ok(registered)
    }

    /// Fails if `id` is taken by a node of a kind other than `kind`.
    pub fn check_vacant(&self, id: &str, kind: NodeKind) -> Result<(), GraphError> {
        match self.nodes.get(id) {
            Some(existing) if existing.kind() != kind => Err(GraphError::AlreadyExists {
                kind: existing.kind(),
                id: id.to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.nodes.get(id)
    }

    pub(crate) fn entity_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.nodes.get_mut(id)
    }

    /// Gets a node by id.
    pub fn get_node(&self, id: &str) -> Option<NodeRef<'_>> {
        self.nodes.get(id).map(|entity| NodeRef::new(self, entity))
    }

    /// Gets a node by id if it has the given kind.
    pub fn node_of_kind(&self, id: &str, kind: NodeKind) -> Option<NodeRef<'_>> {
        self.get_node(id).filter(|node| node.kind() == kind)
    }

    /// Gets a node that the caller requires to exist.
    pub fn require(&self, id: &str, kind: NodeKind) -> Result<NodeRef<'_>, GraphError> {
        self.node_of_kind(id, kind)
            .ok_or_else(|| GraphError::not_found(kind, id))
    }

    /// Contained nodes of `kind` under `parent_id`, keyed by qualified id.
    ///
    /// Returns `None` when the parent is absent or has no such children.
    pub fn get_contained_set(
        &self,
        parent_id: &str,
        kind: NodeKind,
    ) -> Option<BTreeMap<&str, NodeRef<'_>>> {
        let parent = self.nodes.get(parent_id)?;
        let set: BTreeMap<_, _> = parent
            .contained_ids()
            .filter(|(_, child_kind)| *child_kind == kind)
            .filter_map(|(child_id, _)| {
                self.nodes
                    .get_key_value(child_id)
                    .map(|(key, entity)| (key.as_str(), NodeRef::new(self, entity)))
            })
            .collect();

        if set.is_empty() {
            None
        } else {
            Some(set)
        }
    }

    /// Adds `child_id` to the containment set of `parent_id`.
    ///
    /// Both nodes must be registered.
    pub fn add_contains_relation(&mut self, parent_id: &str, child_id: &str) -> Result<(), GraphError> {
        let child = self
            .nodes
            .get(child_id)
            .cloned()
            .ok_or_else(|| GraphError::invalid_id(child_id, "child is not registered"))?;
        let parent = self
            .nodes
            .get_mut(parent_id)
            .ok_or_else(|| GraphError::invalid_id(parent_id, "parent is not registered"))?;
        parent.add_contains_relation(&child);
        Ok(())
    }

    /// Removes a node, its contained descendants, and its entry in its
    /// parent's containment set.
    ///
    /// Returns the removed node itself, or `None` if it was not registered.
    pub fn remove_node(&mut self, id: &str) -> Option<Entity> {
        let removed = self.nodes.remove(id)?;

        if let Some(parent_id) = removed.parent() {
            if let Some(parent) = self.nodes.get_mut(parent_id) {
                parent.remove_contains_relation(id);
            }
        }

        let mut pending: Vec<String> = removed.contained_ids().map(|(c, _)| c.to_string()).collect();
        while let Some(child_id) = pending.pop() {
            if let Some(child) = self.nodes.remove(&child_id) {
                pending.extend(child.contained_ids().map(|(c, _)| c.to_string()));
            }
        }

        tracing::trace!(id = %id, "removed node");
        Some(removed)
    }

    /// All nodes of a kind, sorted by id.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeRef<'_>> {
        let mut nodes: Vec<_> = self
            .nodes
            .values()
            .filter(|entity| entity.kind() == kind)
            .map(|entity| NodeRef::new(self, entity))
            .collect();
        nodes.sort_by(|a, b| a.id().cmp(b.id()));
        nodes
    }
}
