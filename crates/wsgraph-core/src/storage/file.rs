use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ignore::WalkBuilder;
use serde::ser::{Serialize, Serializer};
use serde_json::Value;
use tokio::fs;

use crate::config::{WorkspaceConfig, ARTIFACT_EXTENSION};
use crate::graph::{id, is_reserved_key, Content, ModelDefinition, WorkspaceGraph};

use super::error::StorageError;
use super::WorkspaceStore;

/// File-based workspace store.
///
/// Reads and writes the JSON artifacts of a workspace:
/// ```text
/// <root>/
///   package.json                   # Package definition
///   <facet>/
///     config.json                  # Facet config
///     model-config.json            # Model configs of the facet
///     datasources.json             # Datasources of the facet
///     middleware.json              # Middleware (middleware facet only)
///     models/
///       <kebab-model-name>.json    # One file per model
/// ```
/// Nested facets (`a.b`) live in nested directories (`a/b`).
#[derive(Debug, Clone)]
pub struct FileStore {
    config: WorkspaceConfig,
}

impl FileStore {
    /// Creates a store for the given workspace layout.
    pub fn new(config: WorkspaceConfig) -> Self {
        Self { config }
    }

    /// Creates a store with the default layout rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self::new(WorkspaceConfig::with_root(root))
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Path of a per-facet file.
    fn facet_file(&self, facet: &str, file_name: &str) -> PathBuf {
        self.config.root.join(id::facet_dir(facet)).join(file_name)
    }

    /// Path of a model file.
    pub fn model_path(&self, facet: &str, model_name: &str) -> PathBuf {
        self.config
            .root
            .join(id::facet_dir(facet))
            .join(&self.config.models_dir)
            .join(id::model_file_name(model_name))
    }

    fn middleware_path(&self) -> PathBuf {
        self.facet_file(&self.config.middleware_facet, &self.config.middleware_file)
    }

    fn package_path(&self) -> PathBuf {
        self.config.root.join(&self.config.package_file)
    }
}

/// Phases serialized as one JSON object in the given order.
struct OrderedPhases<'a>(&'a [(String, Content)]);

impl Serialize for OrderedPhases<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(phase, entries)| (phase, entries)))
    }
}

async fn read_json(path: &Path) -> Result<Value, StorageError> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|e| StorageError::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}

async fn read_object(path: &Path) -> Result<Content, StorageError> {
    match read_json(path).await? {
        Value::Object(object) => Ok(object),
        _ => Err(StorageError::invalid(path, "expected a JSON object")),
    }
}

async fn write_json(path: &Path, json: String) -> Result<(), StorageError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| StorageError::io(dir, e))?;
    }
    fs::write(path, json + "\n")
        .await
        .map_err(|e| StorageError::io(path, e))?;
    tracing::trace!(path = %path.display(), "wrote artifact");
    Ok(())
}

/// Collects `.json` files under `root`, skipping excluded directories.
fn scan_artifacts(root: &Path, exclude_dirs: &[String]) -> Result<Vec<PathBuf>, StorageError> {
    let exclude = exclude_dirs.to_vec();
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(entry.depth() > 0
                && is_dir
                && exclude.iter().any(|d| entry.file_name() == OsStr::new(d)))
        })
        .build();

    let mut artifacts = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| StorageError::Scan(e.to_string()))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(ARTIFACT_EXTENSION) {
            continue;
        }
        artifacts.push(path.strip_prefix(root).unwrap_or(path).to_path_buf());
    }
    artifacts.sort();
    Ok(artifacts)
}

#[async_trait]
impl WorkspaceStore for FileStore {
    fn root(&self) -> &Path {
        &self.config.root
    }

    async fn write_facet(&self, graph: &WorkspaceGraph, facet: &str) -> Result<(), StorageError> {
        let node = graph
            .get_facet(facet)
            .ok_or_else(|| StorageError::MissingNode(facet.to_string()))?;
        let json = serde_json::to_string_pretty(node.content())?;
        write_json(&self.facet_file(facet, &self.config.facet_file), json).await
    }

    async fn write_model(&self, graph: &WorkspaceGraph, model_id: &str) -> Result<(), StorageError> {
        let (path, json) = {
            let model = graph
                .get_model(model_id)
                .ok_or_else(|| StorageError::MissingNode(model_id.to_string()))?;
            let facet = model
                .facet_name()
                .ok_or_else(|| StorageError::MissingNode(format!("facet of {model_id}")))?;
            let path = self.model_path(facet, model.name());
            (path, serde_json::to_string_pretty(&model.get_definition())?)
        };
        write_json(&path, json).await
    }

    async fn write_model_config(&self, graph: &WorkspaceGraph, facet: &str) -> Result<(), StorageError> {
        let mut configs = graph
            .get_facet(facet)
            .ok_or_else(|| StorageError::MissingNode(facet.to_string()))?
            .model_configs();
        let path = self.facet_file(facet, &self.config.model_config_file);

        // Keep file metadata such as `_meta` that has no node in the graph.
        match read_object(&path).await {
            Ok(existing) => {
                for (key, value) in existing {
                    if is_reserved_key(&key) {
                        configs.insert(key, value);
                    }
                }
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        write_json(&path, serde_json::to_string_pretty(&configs)?).await
    }

    async fn write_data_sources(&self, graph: &WorkspaceGraph, facet: &str) -> Result<(), StorageError> {
        let sources = graph
            .get_facet(facet)
            .ok_or_else(|| StorageError::MissingNode(facet.to_string()))?
            .data_sources();
        let json = serde_json::to_string_pretty(&sources)?;
        write_json(&self.facet_file(facet, &self.config.data_sources_file), json).await
    }

    async fn write_middleware(&self, graph: &WorkspaceGraph) -> Result<(), StorageError> {
        let phases = graph.middleware_definition();
        let json = serde_json::to_string_pretty(&OrderedPhases(&phases))?;
        write_json(&self.middleware_path(), json).await
    }

    async fn write_package_definition(&self, graph: &WorkspaceGraph) -> Result<(), StorageError> {
        let package = graph
            .get_package_definition()
            .ok_or_else(|| StorageError::MissingNode(crate::config::PACKAGE_DEFINITION_ID.to_string()))?;
        let json = serde_json::to_string_pretty(package.content())?;
        write_json(&self.package_path(), json).await
    }

    async fn remove_model(&self, facet: &str, model_name: &str) -> Result<(), StorageError> {
        let path = self.model_path(facet, model_name);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }

    async fn read_facet(&self, facet: &str) -> Result<Content, StorageError> {
        read_object(&self.facet_file(facet, &self.config.facet_file)).await
    }

    async fn read_model(&self, facet: &str, model_name: &str) -> Result<ModelDefinition, StorageError> {
        let path = self.model_path(facet, model_name);
        let value = read_json(&path).await?;
        if !value.is_object() {
            return Err(StorageError::invalid(&path, "model file is not a JSON object"));
        }
        Ok(ModelDefinition::from_value(value)?)
    }

    async fn read_model_config(&self, facet: &str) -> Result<Content, StorageError> {
        read_object(&self.facet_file(facet, &self.config.model_config_file)).await
    }

    async fn read_data_sources(&self, facet: &str) -> Result<Content, StorageError> {
        read_object(&self.facet_file(facet, &self.config.data_sources_file)).await
    }

    async fn read_middleware(&self) -> Result<Content, StorageError> {
        read_object(&self.middleware_path()).await
    }

    async fn read_package_definition(&self) -> Result<Content, StorageError> {
        read_object(&self.package_path()).await
    }

    async fn read_artifact(&self, relative: &Path) -> Result<Value, StorageError> {
        read_json(&self.config.root.join(relative)).await
    }

    async fn list_artifacts(&self) -> Result<Vec<PathBuf>, StorageError> {
        let root = self.config.root.clone();
        let exclude = self.config.exclude_dirs.clone();
        tokio::task::spawn_blocking(move || scan_artifacts(&root, &exclude))
            .await
            .map_err(|e| StorageError::Scan(e.to_string()))?
    }
}
