//! Datasource nodes.

use std::ops::Deref;

use super::entity::{Content, Entity, NodeKind, NodeRef};
use super::error::GraphError;
use super::facet::{ensure_facet, is_reserved_key};
use super::id;
use super::WorkspaceGraph;

/// Typed view of a `DataSource` node.
#[derive(Debug, Clone, Copy)]
pub struct DataSource<'g> {
    node: NodeRef<'g>,
}

impl<'g> DataSource<'g> {
    pub fn id(&self) -> &'g str {
        self.node.entity().id()
    }

    pub fn facet_name(&self) -> &'g str {
        id::split_data_source_id(self.id()).map_or("", |(facet, _)| facet)
    }

    pub fn name(&self) -> &'g str {
        id::split_data_source_id(self.id()).map_or_else(|| id::leaf(self.id()), |(_, name)| name)
    }
}

impl<'g> Deref for DataSource<'g> {
    type Target = NodeRef<'g>;

    fn deref(&self) -> &NodeRef<'g> {
        &self.node
    }
}

impl WorkspaceGraph {
    /// Gets a datasource by id (`<facet>.dataSources.<name>`).
    pub fn get_data_source(&self, id: &str) -> Option<DataSource<'_>> {
        self.node_of_kind(id, NodeKind::DataSource)
            .map(|node| DataSource { node })
    }

    pub fn require_data_source(&self, id: &str) -> Result<DataSource<'_>, GraphError> {
        self.get_data_source(id)
            .ok_or_else(|| GraphError::not_found(NodeKind::DataSource, id))
    }
}

/// Creates a datasource from its qualified id.
///
/// The owning facet is attached if registered; datasources may be created
/// before their facet.
pub fn create_data_source<'g>(
    graph: &'g mut WorkspaceGraph,
    data_source_id: &str,
    content: Content,
) -> Result<DataSource<'g>, GraphError> {
    let (facet, name) = id::split_data_source_id(data_source_id).ok_or_else(|| {
        GraphError::invalid_id(data_source_id, "expected <facet>.dataSources.<name>")
    })?;
    id::validate_facet_name(facet)?;
    id::validate_segment(name)?;

    graph.register(Entity::new(NodeKind::DataSource, data_source_id, content).with_parent(facet))?;
    graph.require_data_source(data_source_id)
}

/// Makes a facet's datasources match a `datasources.json` object.
pub fn reconcile_data_sources(
    graph: &mut WorkspaceGraph,
    facet: &str,
    definitions: &Content,
) -> Result<(), GraphError> {
    ensure_facet(graph, facet)?;

    let stale: Vec<String> = graph
        .require_facet(facet)?
        .contained_ids()
        .filter(|(_, kind)| *kind == NodeKind::DataSource)
        .map(|(child, _)| child.to_string())
        .filter(|child| {
            definitions
                .get(id::leaf(child))
                .map_or(true, |value| !value.is_object())
        })
        .collect();
    for child in stale {
        graph.remove_node(&child);
    }

    for (name, value) in definitions {
        let Some(definition) = value.as_object() else {
            continue;
        };
        if is_reserved_key(name) || id::validate_segment(name).is_err() {
            continue;
        }
        create_data_source(graph, &id::data_source_id(facet, name), definition.clone())?;
    }
    Ok(())
}
