//! Middleware phases and their entries.
//!
//! Phases are workspace-wide (`middleware.<phase>`). Each phase contains
//! middleware entries keyed by mount path; a path may contain dots, so
//! entries are keyed by everything after the phase id rather than by leaf.

use std::cmp::Ordering;
use std::ops::Deref;

use serde_json::Value;

use crate::config::DEFAULT_MIDDLEWARE_PHASES;

use super::entity::{Content, Entity, NodeKind, NodeRef};
use super::error::GraphError;
use super::facet::is_reserved_key;
use super::id;
use super::WorkspaceGraph;

/// Typed view of a `MiddlewarePhase` node.
#[derive(Debug, Clone, Copy)]
pub struct MiddlewarePhase<'g> {
    node: NodeRef<'g>,
}

impl<'g> MiddlewarePhase<'g> {
    pub fn name(&self) -> &'g str {
        let phase_id = self.node.entity().id();
        id::relative_to(crate::config::MIDDLEWARE_SEGMENT, phase_id).unwrap_or(phase_id)
    }

    /// Middleware mounted at `path` in this phase.
    pub fn get_middleware(&self, path: &str) -> Option<NodeRef<'g>> {
        self.node
            .get_contained_node(path)
            .filter(|node| node.kind() == NodeKind::Middleware)
    }

    /// Entries of this phase as a `path → config` object.
    pub fn entries(&self) -> Content {
        self.node
            .contained_contents(NodeKind::Middleware)
            .into_iter()
            .map(|(path, config)| (path, Value::Object(config)))
            .collect()
    }
}

impl<'g> Deref for MiddlewarePhase<'g> {
    type Target = NodeRef<'g>;

    fn deref(&self) -> &NodeRef<'g> {
        &self.node
    }
}

impl WorkspaceGraph {
    /// Gets a middleware phase by name.
    pub fn get_middleware_phase(&self, name: &str) -> Option<MiddlewarePhase<'_>> {
        self.node_of_kind(&id::middleware_phase_id(name), NodeKind::MiddlewarePhase)
            .map(|node| MiddlewarePhase { node })
    }

    pub fn require_middleware_phase(&self, name: &str) -> Result<MiddlewarePhase<'_>, GraphError> {
        self.get_middleware_phase(name)
            .ok_or_else(|| GraphError::not_found(NodeKind::MiddlewarePhase, id::middleware_phase_id(name)))
    }

    /// Every phase with its entries, in canonical phase order.
    pub fn middleware_definition(&self) -> Vec<(String, Content)> {
        let mut phases: Vec<(String, Content)> = self
            .nodes_of_kind(NodeKind::MiddlewarePhase)
            .into_iter()
            .map(|node| {
                let phase = MiddlewarePhase { node };
                (phase.name().to_string(), phase.entries())
            })
            .collect();
        phases.sort_by(|(a, _), (b, _)| compare_phases(a, b));
        phases
    }
}

/// Orders phases by their position in [`DEFAULT_MIDDLEWARE_PHASES`], with
/// `:before` ahead of and `:after` behind the bare phase.
pub fn compare_phases(a: &str, b: &str) -> Ordering {
    phase_rank(a).cmp(&phase_rank(b)).then_with(|| a.cmp(b))
}

fn phase_rank(phase: &str) -> (usize, u8) {
    let (base, sub) = match phase.split_once(':') {
        Some((base, "before")) => (base, 0),
        Some((base, "after")) => (base, 2),
        Some((base, _)) => (base, 3),
        None => (phase, 1),
    };
    let position = DEFAULT_MIDDLEWARE_PHASES
        .iter()
        .position(|known| *known == base)
        .unwrap_or(DEFAULT_MIDDLEWARE_PHASES.len());
    (position, sub)
}

/// Creates a middleware phase.
pub fn create_middleware_phase<'g>(
    graph: &'g mut WorkspaceGraph,
    name: &str,
    content: Content,
) -> Result<MiddlewarePhase<'g>, GraphError> {
    id::validate_segment(name)?;
    graph.register(Entity::new(NodeKind::MiddlewarePhase, id::middleware_phase_id(name), content))?;
    graph.require_middleware_phase(name)
}

/// Returns the phase, creating it if it is not registered.
pub fn ensure_middleware_phase<'g>(
    graph: &'g mut WorkspaceGraph,
    name: &str,
) -> Result<MiddlewarePhase<'g>, GraphError> {
    if graph.get_middleware_phase(name).is_none() {
        return create_middleware_phase(graph, name, Content::new());
    }
    graph.require_middleware_phase(name)
}

/// Mounts middleware at `path` in an existing phase.
pub fn add_middleware<'g>(
    graph: &'g mut WorkspaceGraph,
    phase: &str,
    path: &str,
    data: Content,
) -> Result<NodeRef<'g>, GraphError> {
    let phase_id = graph.require_middleware_phase(phase)?.id().to_string();
    if path.is_empty() {
        return Err(GraphError::invalid_id(path, "middleware path is empty"));
    }

    let entry_id = id::middleware_id(phase, path);
    graph.register(Entity::new(NodeKind::Middleware, entry_id.as_str(), data).with_parent(phase_id))?;
    graph.require(&entry_id, NodeKind::Middleware)
}

/// Makes the middleware phases match a `middleware.json` object.
pub fn reconcile_middleware(graph: &mut WorkspaceGraph, definition: &Content) -> Result<(), GraphError> {
    let stale_phases: Vec<String> = graph
        .nodes_of_kind(NodeKind::MiddlewarePhase)
        .into_iter()
        .map(|node| MiddlewarePhase { node }.name().to_string())
        .filter(|name| !definition.get(name).is_some_and(Value::is_object))
        .collect();
    for phase in stale_phases {
        graph.remove_node(&id::middleware_phase_id(&phase));
    }

    for (phase, entries) in definition {
        let Some(entries) = entries.as_object() else {
            continue;
        };
        if is_reserved_key(phase) || id::validate_segment(phase).is_err() {
            tracing::debug!(phase = %phase, "skipping middleware phase key");
            continue;
        }

        let phase_id = ensure_middleware_phase(graph, phase)?.id().to_string();
        let stale_entries: Vec<String> = graph
            .require(&phase_id, NodeKind::MiddlewarePhase)?
            .contained_ids()
            .filter(|(child, _)| {
                id::relative_to(&phase_id, child).map_or(true, |path| !entries.contains_key(path))
            })
            .map(|(child, _)| child.to_string())
            .collect();
        for child in stale_entries {
            graph.remove_node(&child);
        }

        for (path, config) in entries {
            match config.as_object() {
                Some(config) => {
                    add_middleware(graph, phase, path, config.clone())?;
                }
                None => tracing::debug!(phase = %phase, path = %path, "skipping non-object middleware entry"),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content(value: Value) -> Content {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_add_middleware_requires_phase() {
        let mut graph = WorkspaceGraph::new("/ws");
        let err = add_middleware(&mut graph, "routes", "loopback#rest", Content::new()).unwrap_err();
        assert_eq!(
            err,
            GraphError::not_found(NodeKind::MiddlewarePhase, "middleware.routes")
        );
    }

    #[test]
    fn test_entries_keyed_by_full_path() {
        let mut graph = WorkspaceGraph::new("/ws");
        create_middleware_phase(&mut graph, "files", Content::new()).unwrap();
        add_middleware(&mut graph, "files", "serve.static", content(json!({"params": "client"}))).unwrap();

        let phase = graph.get_middleware_phase("files").unwrap();
        assert_eq!(phase.name(), "files");
        assert!(phase.get_middleware("serve.static").is_some());
        assert_eq!(
            Value::Object(phase.entries()),
            json!({"serve.static": {"params": "client"}})
        );
    }

    #[test]
    fn test_phase_order() {
        let mut phases = vec!["zzz", "routes:after", "final", "initial", "routes", "routes:before"];
        phases.sort_by(|a, b| compare_phases(a, b));
        assert_eq!(
            phases,
            vec!["initial", "routes:before", "routes", "routes:after", "final", "zzz"]
        );
    }

    #[test]
    fn test_reconcile_middleware() {
        let mut graph = WorkspaceGraph::new("/ws");
        create_middleware_phase(&mut graph, "gone", Content::new()).unwrap();
        create_middleware_phase(&mut graph, "routes", Content::new()).unwrap();
        add_middleware(&mut graph, "routes", "old", Content::new()).unwrap();

        let disk = content(json!({
            "initial": {"compression": {}},
            "routes": {"loopback#rest": {"paths": ["/api"]}}
        }));
        reconcile_middleware(&mut graph, &disk).unwrap();

        assert!(graph.get_middleware_phase("gone").is_none());
        assert!(!graph.contains("middleware.routes.old"));
        let definition = graph.middleware_definition();
        let names: Vec<_> = definition.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["initial", "routes"]);
        assert_eq!(
            Value::Object(definition[1].1.clone()),
            json!({"loopback#rest": {"paths": ["/api"]}})
        );
    }
}
