//! Workspace graph error types.

use thiserror::Error;

use super::entity::NodeKind;

/// Errors raised by graph operations that require an existing node.
///
/// Plain lookups never produce these; they return `None` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A required node is not registered (or has a different kind).
    #[error("{kind} not found: {id}")]
    NotFound { kind: NodeKind, id: String },

    /// A node with the derived id is already registered.
    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: NodeKind, id: String },

    /// An id or name that cannot be used to address a node.
    #[error("Invalid id '{id}': {reason}")]
    InvalidId { id: String, reason: String },
}

impl GraphError {
    pub fn not_found(kind: NodeKind, id: impl Into<String>) -> Self {
        GraphError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid_id(id: impl Into<String>, reason: impl Into<String>) -> Self {
        GraphError::InvalidId {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
