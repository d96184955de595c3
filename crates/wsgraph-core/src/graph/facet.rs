//! Facets and the model configs they own.

use std::ops::Deref;

use serde_json::Value;

use super::entity::{Content, Entity, NodeKind, NodeRef};
use super::error::GraphError;
use super::id;
use super::WorkspaceGraph;

/// Typed view of a `Facet` node.
#[derive(Debug, Clone, Copy)]
pub struct Facet<'g> {
    node: NodeRef<'g>,
}

impl<'g> Facet<'g> {
    pub fn name(&self) -> &'g str {
        self.node.entity().id()
    }

    /// Model config of `model_name` in this facet.
    pub fn get_model_config(&self, model_name: &str) -> Option<NodeRef<'g>> {
        let config_id = id::model_config_id(self.name(), model_name);
        if !self.node.contains_id(&config_id) {
            return None;
        }
        self.node.graph().node_of_kind(&config_id, NodeKind::ModelConfig)
    }

    /// All model configs of this facet as the `model-config.json` object.
    pub fn model_configs(&self) -> Content {
        self.node
            .contained_contents(NodeKind::ModelConfig)
            .into_iter()
            .map(|(name, config)| (name, Value::Object(config)))
            .collect()
    }

    /// All datasources of this facet as the `datasources.json` object.
    pub fn data_sources(&self) -> Content {
        self.node
            .contained_contents(NodeKind::DataSource)
            .into_iter()
            .map(|(name, config)| (name, Value::Object(config)))
            .collect()
    }
}

impl<'g> Deref for Facet<'g> {
    type Target = NodeRef<'g>;

    fn deref(&self) -> &NodeRef<'g> {
        &self.node
    }
}

impl WorkspaceGraph {
    /// Gets a facet by name.
    pub fn get_facet(&self, name: &str) -> Option<Facet<'_>> {
        self.node_of_kind(name, NodeKind::Facet)
            .map(|node| Facet { node })
    }

    pub fn require_facet(&self, name: &str) -> Result<Facet<'_>, GraphError> {
        self.get_facet(name)
            .ok_or_else(|| GraphError::not_found(NodeKind::Facet, name))
    }
}

/// Creates (or replaces the content of) a facet.
///
/// Models, configs and datasources already registered under the facet's
/// name are attached to it.
pub fn create_facet<'g>(
    graph: &'g mut WorkspaceGraph,
    name: &str,
    content: Content,
) -> Result<Facet<'g>, GraphError> {
    id::validate_facet_name(name)?;
    graph.register(Entity::new(NodeKind::Facet, name, content))?;
    adopt_children(graph, name)?;
    graph.require_facet(name)
}

/// Returns the facet, creating an empty one if it is not registered.
pub fn ensure_facet<'g>(graph: &'g mut WorkspaceGraph, name: &str) -> Result<Facet<'g>, GraphError> {
    if graph.get_facet(name).is_none() {
        return create_facet(graph, name, Content::new());
    }
    graph.require_facet(name)
}

/// Attaches nodes whose parent is `facet` but which were registered first.
fn adopt_children(graph: &mut WorkspaceGraph, facet: &str) -> Result<(), GraphError> {
    let orphans: Vec<String> = [NodeKind::ModelDefinition, NodeKind::ModelConfig, NodeKind::DataSource]
        .into_iter()
        .flat_map(|kind| graph.nodes_of_kind(kind))
        .filter(|node| node.parent() == Some(facet))
        .map(|node| node.id().to_string())
        .collect();

    for child in orphans {
        graph.add_contains_relation(facet, &child)?;
    }
    Ok(())
}

/// Adds a model config to an existing facet.
pub fn add_model_config<'g>(
    graph: &'g mut WorkspaceGraph,
    facet: &str,
    model_name: &str,
    config: Content,
) -> Result<NodeRef<'g>, GraphError> {
    graph.require_facet(facet)?;
    id::validate_segment(model_name)?;

    let config_id = id::model_config_id(facet, model_name);
    graph.register(Entity::new(NodeKind::ModelConfig, config_id.as_str(), config).with_parent(facet))?;
    graph.require(&config_id, NodeKind::ModelConfig)
}

/// Replaces the content of an existing model config.
pub fn update_model_config(
    graph: &mut WorkspaceGraph,
    facet: &str,
    model_name: &str,
    config: Content,
) -> Result<(), GraphError> {
    let config_id = graph
        .require_facet(facet)?
        .get_model_config(model_name)
        .map(|node| node.id().to_string())
        .ok_or_else(|| GraphError::not_found(NodeKind::ModelConfig, id::model_config_id(facet, model_name)))?;

    if let Some(entity) = graph.entity_mut(&config_id) {
        entity.set_content(config);
    }
    Ok(())
}

/// Keys of config objects that carry file metadata rather than entries.
pub fn is_reserved_key(key: &str) -> bool {
    key.starts_with('_')
}

/// Makes a facet's model configs match a `model-config.json` object.
///
/// The facet is created if needed. Reserved keys (such as `_meta`) and
/// non-object entries are skipped.
pub fn reconcile_model_configs(
    graph: &mut WorkspaceGraph,
    facet: &str,
    configs: &Content,
) -> Result<(), GraphError> {
    ensure_facet(graph, facet)?;

    let stale: Vec<String> = graph
        .require_facet(facet)?
        .contained_ids()
        .filter(|(_, kind)| *kind == NodeKind::ModelConfig)
        .map(|(child, _)| child.to_string())
        .filter(|child| {
            configs
                .get(id::leaf(child))
                .map_or(true, |value| !value.is_object())
        })
        .collect();
    for child in stale {
        graph.remove_node(&child);
    }

    for (model_name, value) in configs {
        let Some(config) = value.as_object() else {
            continue;
        };
        if is_reserved_key(model_name) {
            continue;
        }
        if id::validate_segment(model_name).is_err() {
            tracing::debug!(facet = %facet, key = %model_name, "skipping model config key");
            continue;
        }
        add_model_config(graph, facet, model_name, config.clone())?;
    }
    Ok(())
}
