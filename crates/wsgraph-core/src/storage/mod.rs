//! Persistence of workspace artifacts.
//!
//! [`WorkspaceStore`] is the port between the in-memory graph and the
//! workspace on disk. Writes receive the graph plus the id of what changed
//! and serialize the assembled definition; reads return plain definitions
//! that the task layer folds back into the graph.

mod error;
mod file;

pub use error::StorageError;
pub use file::FileStore;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::graph::{Content, ModelDefinition, WorkspaceGraph};

/// Trait for workspace storage backends.
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    /// Workspace root the store reads from and writes to.
    fn root(&self) -> &Path;

    /// Writes a facet's own config file.
    async fn write_facet(&self, graph: &WorkspaceGraph, facet: &str) -> Result<(), StorageError>;

    /// Writes the assembled definition of a model to its model file.
    async fn write_model(&self, graph: &WorkspaceGraph, model_id: &str) -> Result<(), StorageError>;

    /// Writes every model config of a facet.
    async fn write_model_config(&self, graph: &WorkspaceGraph, facet: &str) -> Result<(), StorageError>;

    /// Writes every datasource of a facet.
    async fn write_data_sources(&self, graph: &WorkspaceGraph, facet: &str) -> Result<(), StorageError>;

    /// Writes every middleware phase.
    async fn write_middleware(&self, graph: &WorkspaceGraph) -> Result<(), StorageError>;

    async fn write_package_definition(&self, graph: &WorkspaceGraph) -> Result<(), StorageError>;

    /// Deletes a model file. Deleting a missing file is not an error.
    async fn remove_model(&self, facet: &str, model_name: &str) -> Result<(), StorageError>;

    async fn read_facet(&self, facet: &str) -> Result<Content, StorageError>;

    async fn read_model(&self, facet: &str, model_name: &str) -> Result<ModelDefinition, StorageError>;

    async fn read_model_config(&self, facet: &str) -> Result<Content, StorageError>;

    async fn read_data_sources(&self, facet: &str) -> Result<Content, StorageError>;

    async fn read_middleware(&self) -> Result<Content, StorageError>;

    async fn read_package_definition(&self) -> Result<Content, StorageError>;

    /// Reads any artifact by its path relative to the root.
    async fn read_artifact(&self, relative: &Path) -> Result<Value, StorageError>;

    /// Lists every artifact under the root, as paths relative to it.
    async fn list_artifacts(&self) -> Result<Vec<PathBuf>, StorageError>;
}
