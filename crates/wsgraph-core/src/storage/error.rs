use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid artifact {path}: {message}")]
    InvalidArtifact { path: PathBuf, message: String },

    #[error("Node not in graph: {0}")]
    MissingNode(String),

    #[error("Workspace scan failed: {0}")]
    Scan(String),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return StorageError::NotFound(path);
        }
        StorageError::Io { path, source }
    }

    pub fn invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        StorageError::InvalidArtifact {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether the artifact simply does not exist yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}
