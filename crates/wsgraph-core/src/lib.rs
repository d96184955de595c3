pub mod config;
pub mod graph;
pub mod manager;
pub mod storage;

pub use config::{Config, ConfigError, WorkspaceConfig};
pub use graph::{Content, GraphError, ModelDefinition, NodeKind, WorkspaceGraph};
pub use manager::{LoadSummary, TaskError, WorkspaceManager};
pub use storage::{FileStore, StorageError, WorkspaceStore};
