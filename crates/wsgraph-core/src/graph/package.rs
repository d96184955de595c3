//! The workspace package definition.

use std::ops::Deref;

use crate::config::PACKAGE_DEFINITION_ID;

use super::entity::{Content, Entity, NodeKind, NodeRef};
use super::error::GraphError;
use super::WorkspaceGraph;

/// Typed view of the single `PackageDefinition` node.
#[derive(Debug, Clone, Copy)]
pub struct PackageDefinition<'g> {
    node: NodeRef<'g>,
}

impl<'g> PackageDefinition<'g> {
    /// Package name from the `name` field.
    pub fn name(&self) -> Option<&'g str> {
        self.node.entity().content_str("name")
    }

    pub fn version(&self) -> Option<&'g str> {
        self.node.entity().content_str("version")
    }
}

impl<'g> Deref for PackageDefinition<'g> {
    type Target = NodeRef<'g>;

    fn deref(&self) -> &NodeRef<'g> {
        &self.node
    }
}

impl WorkspaceGraph {
    pub fn get_package_definition(&self) -> Option<PackageDefinition<'_>> {
        self.node_of_kind(PACKAGE_DEFINITION_ID, NodeKind::PackageDefinition)
            .map(|node| PackageDefinition { node })
    }

    pub fn require_package_definition(&self) -> Result<PackageDefinition<'_>, GraphError> {
        self.get_package_definition().ok_or_else(|| {
            GraphError::not_found(NodeKind::PackageDefinition, PACKAGE_DEFINITION_ID)
        })
    }
}

/// Creates or replaces the package definition.
pub fn create_package_definition(
    graph: &mut WorkspaceGraph,
    content: Content,
) -> Result<PackageDefinition<'_>, GraphError> {
    graph.register(Entity::new(NodeKind::PackageDefinition, PACKAGE_DEFINITION_ID, content))?;
    graph.require_package_definition()
}
