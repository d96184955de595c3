//! Workspace task layer.
//!
//! [`WorkspaceManager`] links the in-memory graph with the workspace on
//! disk. Every write task mutates the graph first and then persists the
//! affected artifact through the [`WorkspaceStore`]; a failed write leaves
//! the graph ahead of the disk and is not rolled back. Read tasks fold what
//! the store returns back into the graph.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::config::WorkspaceConfig;
use crate::graph::{
    self, add_member, add_middleware, add_model_config, add_relation, create_data_source,
    create_facet, create_middleware_phase, create_model, create_package_definition, ensure_facet,
    id, reconcile_data_sources, reconcile_middleware, reconcile_model_configs, reload_definition,
    update_definition, ArtifactPath, Content, GraphError, ModelDefinition, NodeKind,
    WorkspaceGraph,
};
use crate::storage::{FileStore, StorageError, WorkspaceStore};

/// Errors that can occur in workspace task operations.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: NodeKind, id: String },

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The artifact is not part of any facet and was skipped.
    #[error("File ignored: {}", .0.display())]
    Ignored(PathBuf),

    #[error("Persistence failed: {0}")]
    Persistence(#[from] StorageError),

    #[error("Cannot rename {id}: {field} '{from}' differs from '{to}'")]
    RenameUnsupported {
        id: String,
        field: &'static str,
        from: String,
        to: String,
    },

    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl TaskError {
    pub fn is_ignored(&self) -> bool {
        matches!(self, TaskError::Ignored(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TaskError::NotFound { .. })
    }
}

impl From<GraphError> for TaskError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NotFound { kind, id } => TaskError::NotFound { kind, id },
            GraphError::AlreadyExists { id, .. } => TaskError::AlreadyExists(id),
            GraphError::InvalidId { .. } => TaskError::Invalid(err.to_string()),
        }
    }
}

/// Counts of artifacts folded into the graph by [`WorkspaceManager::load_workspace`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub facets: usize,
    pub models: usize,
    pub model_configs: usize,
    pub data_sources: usize,
    pub middleware: usize,
    pub package_definition: bool,
    /// Artifacts that could not be attributed to a facet.
    pub ignored: Vec<PathBuf>,
    /// JSON files that are not workspace artifacts.
    pub skipped: usize,
}

/// Role of a scanned artifact, in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ArtifactRole {
    Facet,
    Model,
    ModelConfig,
    DataSources,
    Middleware,
    Package,
}

/// Logs and wraps a write that failed after the graph was already updated.
fn persisted(id: &str, result: Result<(), StorageError>) -> Result<(), TaskError> {
    result.map_err(|e| {
        tracing::warn!(id = %id, error = %e, "write failed, graph is ahead of disk");
        TaskError::Persistence(e)
    })
}

/// Manages one workspace: its graph and its persistence.
pub struct WorkspaceManager<S: WorkspaceStore> {
    graph: WorkspaceGraph,
    store: S,
    config: WorkspaceConfig,
}

impl WorkspaceManager<FileStore> {
    /// Creates a manager backed by the file store for `config`.
    pub fn open(config: WorkspaceConfig) -> Self {
        let store = FileStore::new(config.clone());
        Self::new(config, store)
    }
}

impl<S: WorkspaceStore> WorkspaceManager<S> {
    /// Creates a manager with an empty graph.
    pub fn new(config: WorkspaceConfig, store: S) -> Self {
        Self {
            graph: WorkspaceGraph::new(store.root()),
            store,
            config,
        }
    }

    pub fn graph(&self) -> &WorkspaceGraph {
        &self.graph
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Write tasks
    // ------------------------------------------------------------------

    /// Creates a facet and writes its config file.
    pub async fn add_facet(&mut self, name: &str, definition: Content) -> Result<(), TaskError> {
        create_facet(&mut self.graph, name, definition)?;
        tracing::debug!(facet = %name, "added facet");
        persisted(name, self.store.write_facet(&self.graph, name).await)
    }

    /// Creates a model with its members and writes the model file.
    pub async fn add_model(&mut self, model_id: &str, definition: ModelDefinition) -> Result<(), TaskError> {
        if self.graph.contains(model_id) {
            return Err(TaskError::AlreadyExists(model_id.to_string()));
        }
        create_model(&mut self.graph, model_id, definition)?;
        tracing::debug!(model = %model_id, "added model");
        persisted(model_id, self.store.write_model(&self.graph, model_id).await)
    }

    /// Adds the config of `model_name` to an existing facet.
    pub async fn add_model_config(
        &mut self,
        model_name: &str,
        facet: &str,
        config: Content,
    ) -> Result<(), TaskError> {
        let config_id = add_model_config(&mut self.graph, facet, model_name, config)?
            .id()
            .to_string();
        tracing::debug!(id = %config_id, "added model config");
        persisted(&config_id, self.store.write_model_config(&self.graph, facet).await)
    }

    /// Adds a datasource (`<facet>.dataSources.<name>`) to an existing facet.
    pub async fn add_data_source(&mut self, data_source_id: &str, definition: Content) -> Result<(), TaskError> {
        let (facet, _) = id::split_data_source_id(data_source_id).ok_or_else(|| {
            TaskError::Invalid(format!(
                "datasource id '{data_source_id}' is not <facet>.dataSources.<name>"
            ))
        })?;
        self.graph.require_facet(facet)?;
        create_data_source(&mut self.graph, data_source_id, definition)?;
        tracing::debug!(id = %data_source_id, "added datasource");
        persisted(data_source_id, self.store.write_data_sources(&self.graph, facet).await)
    }

    pub async fn add_model_property(
        &mut self,
        model_id: &str,
        name: &str,
        definition: Content,
    ) -> Result<(), TaskError> {
        self.add_model_member(model_id, NodeKind::ModelProperty, name, definition)
            .await
    }

    pub async fn add_model_method(
        &mut self,
        model_id: &str,
        name: &str,
        definition: Content,
    ) -> Result<(), TaskError> {
        self.add_model_member(model_id, NodeKind::ModelMethod, name, definition)
            .await
    }

    async fn add_model_member(
        &mut self,
        model_id: &str,
        kind: NodeKind,
        name: &str,
        definition: Content,
    ) -> Result<(), TaskError> {
        let member_id = add_member(&mut self.graph, model_id, kind, name, definition)?
            .id()
            .to_string();
        tracing::debug!(id = %member_id, kind = %kind, "added model member");
        persisted(&member_id, self.store.write_model(&self.graph, model_id).await)
    }

    /// Adds a relation from one model to another. Both must be loaded.
    pub async fn add_model_relation(
        &mut self,
        name: &str,
        from_model_id: &str,
        to_model_id: &str,
        data: Content,
    ) -> Result<(), TaskError> {
        let relation_id = add_relation(&mut self.graph, from_model_id, name, to_model_id, data)?
            .id()
            .to_string();
        tracing::debug!(id = %relation_id, target = %to_model_id, "added relation");
        persisted(&relation_id, self.store.write_model(&self.graph, from_model_id).await)
    }

    pub async fn add_middleware_phase(&mut self, phase: &str) -> Result<(), TaskError> {
        let phase_id = id::middleware_phase_id(phase);
        if self.graph.contains(&phase_id) {
            return Err(TaskError::AlreadyExists(phase_id));
        }
        create_middleware_phase(&mut self.graph, phase, Content::new())?;
        tracing::debug!(id = %phase_id, "added middleware phase");
        persisted(&phase_id, self.store.write_middleware(&self.graph).await)
    }

    /// Mounts middleware at `path` in an existing phase.
    pub async fn add_middleware(&mut self, phase: &str, path: &str, data: Content) -> Result<(), TaskError> {
        let entry_id = add_middleware(&mut self.graph, phase, path, data)?
            .id()
            .to_string();
        tracing::debug!(id = %entry_id, "added middleware");
        persisted(&entry_id, self.store.write_middleware(&self.graph).await)
    }

    pub async fn add_package_definition(&mut self, definition: Content) -> Result<(), TaskError> {
        let package_id = create_package_definition(&mut self.graph, definition)?
            .id()
            .to_string();
        tracing::debug!(id = %package_id, "added package definition");
        persisted(&package_id, self.store.write_package_definition(&self.graph).await)
    }

    // ------------------------------------------------------------------
    // Update tasks
    // ------------------------------------------------------------------

    /// Replaces a model's flat content; its members are kept.
    ///
    /// Changing the model's `name` or `facetName` is rejected.
    pub async fn update_model(&mut self, model_id: &str, definition: ModelDefinition) -> Result<(), TaskError> {
        {
            let model = self.graph.require_model(model_id)?;
            let current = [("name", Some(model.name())), ("facetName", model.facet_name())];
            for (field, existing) in current {
                let requested = definition.content.get(field).and_then(Value::as_str);
                if let (Some(from), Some(to)) = (existing, requested) {
                    if from != to {
                        return Err(TaskError::RenameUnsupported {
                            id: model_id.to_string(),
                            field,
                            from: from.to_string(),
                            to: to.to_string(),
                        });
                    }
                }
            }
        }

        update_definition(&mut self.graph, model_id, definition.content)?;
        tracing::debug!(model = %model_id, "updated model");
        persisted(model_id, self.store.write_model(&self.graph, model_id).await)
    }

    /// Replaces the definition of an existing property.
    pub async fn update_model_property(
        &mut self,
        model_id: &str,
        name: &str,
        definition: Content,
    ) -> Result<(), TaskError> {
        let model = self.graph.require_model(model_id)?;
        if model.get_property(name).is_none() {
            return Err(GraphError::not_found(NodeKind::ModelProperty, id::member_id(model_id, name)).into());
        }
        self.add_model_member(model_id, NodeKind::ModelProperty, name, definition)
            .await
    }

    pub async fn update_model_config(
        &mut self,
        facet: &str,
        model_name: &str,
        config: Content,
    ) -> Result<(), TaskError> {
        graph::update_model_config(&mut self.graph, facet, model_name, config)?;
        let config_id = id::model_config_id(facet, model_name);
        tracing::debug!(id = %config_id, "updated model config");
        persisted(&config_id, self.store.write_model_config(&self.graph, facet).await)
    }

    pub async fn update_data_source(&mut self, data_source_id: &str, config: Content) -> Result<(), TaskError> {
        let facet = self
            .graph
            .require_data_source(data_source_id)?
            .facet_name()
            .to_string();
        create_data_source(&mut self.graph, data_source_id, config)?;
        tracing::debug!(id = %data_source_id, "updated datasource");
        persisted(data_source_id, self.store.write_data_sources(&self.graph, &facet).await)
    }

    // ------------------------------------------------------------------
    // Remove tasks
    // ------------------------------------------------------------------

    pub async fn remove_model_property(&mut self, model_id: &str, name: &str) -> Result<(), TaskError> {
        self.remove_model_member(model_id, NodeKind::ModelProperty, name)
            .await
    }

    pub async fn remove_model_method(&mut self, model_id: &str, name: &str) -> Result<(), TaskError> {
        self.remove_model_member(model_id, NodeKind::ModelMethod, name)
            .await
    }

    pub async fn remove_model_relation(&mut self, model_id: &str, name: &str) -> Result<(), TaskError> {
        self.remove_model_member(model_id, NodeKind::ModelRelation, name)
            .await
    }

    async fn remove_model_member(&mut self, model_id: &str, kind: NodeKind, name: &str) -> Result<(), TaskError> {
        let member_id = id::member_id(model_id, name);
        self.graph.require_model(model_id)?;
        self.graph.require(&member_id, kind)?;
        self.graph.remove_node(&member_id);
        tracing::debug!(id = %member_id, kind = %kind, "removed model member");
        persisted(&member_id, self.store.write_model(&self.graph, model_id).await)
    }

    /// Removes a model with its members and deletes its model file.
    pub async fn remove_model(&mut self, model_id: &str) -> Result<(), TaskError> {
        let (facet, name) = {
            let model = self.graph.require_model(model_id)?;
            let facet = model
                .facet_name()
                .ok_or_else(|| TaskError::Invalid(format!("model '{model_id}' has no facet")))?;
            (facet.to_string(), model.name().to_string())
        };
        self.graph.remove_node(model_id);
        tracing::debug!(model = %model_id, "removed model");
        persisted(model_id, self.store.remove_model(&facet, &name).await)
    }

    pub async fn remove_data_source(&mut self, data_source_id: &str) -> Result<(), TaskError> {
        let facet = self
            .graph
            .require_data_source(data_source_id)?
            .facet_name()
            .to_string();
        self.graph.remove_node(data_source_id);
        tracing::debug!(id = %data_source_id, "removed datasource");
        persisted(data_source_id, self.store.write_data_sources(&self.graph, &facet).await)
    }

    // ------------------------------------------------------------------
    // Refresh tasks
    // ------------------------------------------------------------------

    /// Re-reads a model file and returns the assembled definition.
    ///
    /// A model that is not loaded yet is created from the file; its facet
    /// and name are taken from the id.
    pub async fn refresh_model(&mut self, model_id: &str) -> Result<ModelDefinition, TaskError> {
        let (facet, name, exists) = match self.graph.get_model(model_id) {
            Some(model) => {
                let facet = model
                    .facet_name()
                    .ok_or_else(|| TaskError::Invalid(format!("model '{model_id}' has no facet")))?;
                (facet.to_string(), model.name().to_string(), true)
            }
            None => {
                let facet = id::parent(model_id).ok_or_else(|| {
                    TaskError::Invalid(format!("model id '{model_id}' has no facet"))
                })?;
                (facet.to_string(), id::leaf(model_id).to_string(), false)
            }
        };

        let definition = self.store.read_model(&facet, &name).await?;
        if exists {
            reload_definition(&mut self.graph, model_id, &definition)?;
        } else {
            ensure_facet(&mut self.graph, &facet)?;
            create_model(&mut self.graph, model_id, definition)?;
        }
        tracing::debug!(model = %model_id, "refreshed model");
        Ok(self.graph.require_model(model_id)?.get_definition())
    }

    /// Re-reads a facet's model configs.
    pub async fn refresh_model_config(&mut self, facet: &str) -> Result<Content, TaskError> {
        let configs = self.store.read_model_config(facet).await?;
        reconcile_model_configs(&mut self.graph, facet, &configs)?;
        tracing::debug!(facet = %facet, count = configs.len(), "refreshed model configs");
        Ok(self.graph.require_facet(facet)?.model_configs())
    }

    /// Re-reads a facet's datasources.
    pub async fn refresh_data_source(&mut self, facet: &str) -> Result<Content, TaskError> {
        let sources = self.store.read_data_sources(facet).await?;
        reconcile_data_sources(&mut self.graph, facet, &sources)?;
        tracing::debug!(facet = %facet, count = sources.len(), "refreshed datasources");
        Ok(self.graph.require_facet(facet)?.data_sources())
    }

    /// Re-reads the middleware file. Phases are returned in canonical order.
    pub async fn refresh_middleware(&mut self) -> Result<Vec<(String, Content)>, TaskError> {
        let definition = self.store.read_middleware().await?;
        reconcile_middleware(&mut self.graph, &definition)?;
        tracing::debug!(phases = definition.len(), "refreshed middleware");
        Ok(self.graph.middleware_definition())
    }

    pub async fn refresh_package_definition(&mut self) -> Result<Content, TaskError> {
        let definition = self.store.read_package_definition().await?;
        let package = create_package_definition(&mut self.graph, definition)?;
        Ok(package.content().clone())
    }

    // ------------------------------------------------------------------
    // Load tasks
    // ------------------------------------------------------------------

    fn artifact_path(&self, path: &Path) -> Result<ArtifactPath, TaskError> {
        ArtifactPath::from_workspace_path(self.store.root(), path)
            .ok_or_else(|| TaskError::Ignored(path.to_path_buf()))
    }

    fn config_facet(&self, path: &Path) -> Result<String, TaskError> {
        self.artifact_path(path)?
            .facet_name()
            .ok_or_else(|| TaskError::Ignored(path.to_path_buf()))
    }

    /// Loads a model from the contents of its file.
    ///
    /// The facet is the file's directory (without the models directory) and
    /// the model name is the file stem in PascalCase. Returns the model id.
    pub fn load_model(&mut self, path: &Path, data: Value) -> Result<String, TaskError> {
        let artifact = self.artifact_path(path)?;
        let facet = artifact
            .model_facet_name(&self.config.models_dir)
            .ok_or_else(|| TaskError::Ignored(path.to_path_buf()))?;
        let model_id = id::model_id(&facet, &artifact.model_name());

        if self.graph.contains(&model_id) {
            return Err(TaskError::AlreadyExists(model_id));
        }

        let definition = ModelDefinition::from_value(data)
            .map_err(|e| TaskError::Invalid(format!("{}: {e}", path.display())))?;
        create_model(&mut self.graph, &model_id, definition)?;
        tracing::debug!(model = %model_id, path = %path.display(), "loaded model");
        Ok(model_id)
    }

    /// Loads a facet config file. Returns the facet name.
    pub async fn load_facet(&mut self, path: &Path) -> Result<String, TaskError> {
        let facet = self.config_facet(path)?;
        let definition = self.store.read_facet(&facet).await?;
        create_facet(&mut self.graph, &facet, definition)?;
        tracing::debug!(facet = %facet, "loaded facet");
        Ok(facet)
    }

    pub async fn load_model_config(&mut self, path: &Path) -> Result<Content, TaskError> {
        let facet = self.config_facet(path)?;
        self.refresh_model_config(&facet).await
    }

    pub async fn load_data_sources(&mut self, path: &Path) -> Result<Content, TaskError> {
        let facet = self.config_facet(path)?;
        self.refresh_data_source(&facet).await
    }

    pub async fn load_middleware(&mut self, path: &Path) -> Result<Vec<(String, Content)>, TaskError> {
        self.config_facet(path)?;
        self.refresh_middleware().await
    }

    fn classify(&self, path: &Path) -> Option<ArtifactRole> {
        let file_name = path.file_name()?.to_str()?;
        let artifact = ArtifactPath::from_relative(path)?;
        let cfg = &self.config;

        if artifact.dirs().is_empty() {
            return (file_name == cfg.package_file).then_some(ArtifactRole::Package);
        }
        if artifact.dirs().last().is_some_and(|dir| *dir == cfg.models_dir) {
            return Some(ArtifactRole::Model);
        }
        if file_name == cfg.facet_file {
            Some(ArtifactRole::Facet)
        } else if file_name == cfg.model_config_file {
            Some(ArtifactRole::ModelConfig)
        } else if file_name == cfg.data_sources_file {
            Some(ArtifactRole::DataSources)
        } else if file_name == cfg.middleware_file
            && artifact.facet_name().as_deref() == Some(cfg.middleware_facet.as_str())
        {
            Some(ArtifactRole::Middleware)
        } else {
            None
        }
    }

    /// Scans the workspace and loads every artifact into the graph.
    ///
    /// Facet configs load first so that later artifacts attach to them.
    pub async fn load_workspace(&mut self) -> Result<LoadSummary, TaskError> {
        let mut summary = LoadSummary::default();
        let mut artifacts = Vec::new();
        for path in self.store.list_artifacts().await? {
            match self.classify(&path) {
                Some(role) => artifacts.push((role, path)),
                None => summary.skipped += 1,
            }
        }
        artifacts.sort();

        for (role, path) in artifacts {
            let result = match role {
                ArtifactRole::Facet => self.load_facet(&path).await.map(|_| summary.facets += 1),
                ArtifactRole::Model => match self.store.read_artifact(&path).await {
                    Ok(data) => self.load_model(&path, data).map(|_| summary.models += 1),
                    Err(e) => Err(e.into()),
                },
                ArtifactRole::ModelConfig => self
                    .load_model_config(&path)
                    .await
                    .map(|_| summary.model_configs += 1),
                ArtifactRole::DataSources => self
                    .load_data_sources(&path)
                    .await
                    .map(|_| summary.data_sources += 1),
                ArtifactRole::Middleware => self
                    .load_middleware(&path)
                    .await
                    .map(|_| summary.middleware += 1),
                ArtifactRole::Package => self
                    .refresh_package_definition()
                    .await
                    .map(|_| summary.package_definition = true),
            };

            match result {
                Ok(()) => {}
                Err(e) if e.is_ignored() => {
                    tracing::debug!(path = %path.display(), "ignored artifact");
                    summary.ignored.push(path);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            facets = summary.facets,
            models = summary.models,
            model_configs = summary.model_configs,
            data_sources = summary.data_sources,
            ignored = summary.ignored.len(),
            "loaded workspace"
        );
        Ok(summary)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Assembled definition of a loaded model.
    pub fn get_model_definition(&self, model_id: &str) -> Result<ModelDefinition, TaskError> {
        Ok(self.graph.require_model(model_id)?.get_definition())
    }

    /// Ids of loaded models, optionally limited to one facet.
    pub fn list_models(&self, facet: Option<&str>) -> Vec<String> {
        let models = match facet {
            Some(facet) => self.graph.models_in_facet(facet),
            None => self
                .graph
                .nodes_of_kind(NodeKind::ModelDefinition)
                .into_iter()
                .filter_map(|node| self.graph.get_model(node.id()))
                .collect(),
        };
        models.into_iter().map(|model| model.id().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn content(value: Value) -> Content {
        value.as_object().cloned().unwrap()
    }

    fn create_test_manager() -> (WorkspaceManager<FileStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let manager = WorkspaceManager::open(WorkspaceConfig::with_root(temp_dir.path()));
        (manager, temp_dir)
    }

    #[tokio::test]
    async fn test_add_model_writes_file() {
        let (mut manager, temp) = create_test_manager();
        manager
            .add_model(
                "rest.User",
                ModelDefinition::new(content(json!({"name": "User", "base": "PersistedModel"}))),
            )
            .await
            .unwrap();

        assert!(temp.path().join("rest/models/user.json").exists());
        assert_eq!(manager.list_models(Some("rest")), vec!["rest.User".to_string()]);
    }

    #[tokio::test]
    async fn test_add_model_twice_already_exists() {
        let (mut manager, _temp) = create_test_manager();
        manager.add_model("rest.User", ModelDefinition::default()).await.unwrap();
        let err = manager
            .add_model("rest.User", ModelDefinition::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::AlreadyExists(id) if id == "rest.User"));
    }

    #[tokio::test]
    async fn test_add_property_to_missing_model() {
        let (mut manager, _temp) = create_test_manager();
        let err = manager
            .add_model_property("rest.User", "email", Content::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(manager.graph().is_empty());
    }

    #[tokio::test]
    async fn test_update_model_rejects_rename() {
        let (mut manager, _temp) = create_test_manager();
        manager
            .add_model("rest.User", ModelDefinition::new(content(json!({"name": "User"}))))
            .await
            .unwrap();

        let err = manager
            .update_model("rest.User", ModelDefinition::new(content(json!({"name": "Person"}))))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::RenameUnsupported { field: "name", .. }));
    }

    #[tokio::test]
    async fn test_update_model_keeps_members() {
        let (mut manager, _temp) = create_test_manager();
        manager
            .add_model("rest.User", ModelDefinition::new(content(json!({"name": "User"}))))
            .await
            .unwrap();
        manager
            .add_model_property("rest.User", "email", content(json!({"type": "string"})))
            .await
            .unwrap();

        manager
            .update_model(
                "rest.User",
                ModelDefinition::new(content(json!({"name": "User", "strict": true}))),
            )
            .await
            .unwrap();

        let definition = manager.get_model_definition("rest.User").unwrap();
        assert_eq!(definition.content.get("strict"), Some(&json!(true)));
        assert!(definition.properties.contains_key("email"));
    }

    #[test]
    fn test_load_model_ignored_without_facet() {
        let (mut manager, _temp) = create_test_manager();
        let err = manager
            .load_model(Path::new("user.json"), json!({"name": "User"}))
            .unwrap_err();
        assert!(err.is_ignored());
    }

    #[tokio::test]
    async fn test_load_model_config_ignored_at_root() {
        let (mut manager, _temp) = create_test_manager();
        let err = manager
            .load_model_config(Path::new("model-config.json"))
            .await
            .unwrap_err();
        assert!(err.is_ignored());
    }
}
