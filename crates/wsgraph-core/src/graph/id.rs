//! Node identity derivation.
//!
//! Every node id is the dot-join of its ancestor segments, e.g.
//! `rest.User.email`. The functions here are pure: they know nothing about
//! the graph or the file system, only about segments. [`ArtifactPath`] is the
//! structured form of an artifact location that the loaders derive ids from.

use std::path::{Component, Path, PathBuf};

use convert_case::{Case, Casing};

use crate::config::{
    ARTIFACT_EXTENSION, DATA_SOURCES_SEGMENT, MIDDLEWARE_SEGMENT, MODEL_CONFIG_SEGMENT,
};

use super::error::GraphError;

/// Separator between id segments.
pub const SEPARATOR: char = '.';
const SEPARATOR_STR: &str = ".";

/// Joins a parent id and a leaf segment.
pub fn join(parent: &str, leaf: &str) -> String {
    format!("{parent}{SEPARATOR}{leaf}")
}

/// Returns the last segment of an id.
pub fn leaf(id: &str) -> &str {
    id.rsplit(SEPARATOR).next().unwrap_or(id)
}

/// Returns the id with its last segment removed, if it has more than one.
pub fn parent(id: &str) -> Option<&str> {
    id.rfind(SEPARATOR).map(|idx| &id[..idx])
}

/// Checks that `name` can be used as a single id segment.
pub fn validate_segment(name: &str) -> Result<(), GraphError> {
    if name.is_empty() {
        return Err(GraphError::invalid_id(name, "segment is empty"));
    }
    if name.contains(SEPARATOR) {
        return Err(GraphError::invalid_id(
            name,
            format!("segment must not contain '{SEPARATOR}'"),
        ));
    }
    Ok(())
}

/// Checks that `facet` is a non-empty dot path without empty segments.
pub fn validate_facet_name(facet: &str) -> Result<(), GraphError> {
    if facet.is_empty() || facet.split(SEPARATOR).any(str::is_empty) {
        return Err(GraphError::invalid_id(facet, "facet name has an empty segment"));
    }
    Ok(())
}

pub fn model_id(facet: &str, model_name: &str) -> String {
    join(facet, model_name)
}

/// Id of a property, method or relation of a model.
pub fn member_id(model_id: &str, member: &str) -> String {
    join(model_id, member)
}

/// Prefix shared by every model config id of a facet.
pub fn model_config_prefix(facet: &str) -> String {
    join(facet, MODEL_CONFIG_SEGMENT)
}

pub fn model_config_id(facet: &str, model_name: &str) -> String {
    join(&model_config_prefix(facet), model_name)
}

/// Prefix shared by every datasource id of a facet.
pub fn data_source_prefix(facet: &str) -> String {
    join(facet, DATA_SOURCES_SEGMENT)
}

pub fn data_source_id(facet: &str, name: &str) -> String {
    join(&data_source_prefix(facet), name)
}

/// Splits a datasource id into `(facet, name)`.
pub fn split_data_source_id(id: &str) -> Option<(&str, &str)> {
    let (prefix, name) = id.rsplit_once(SEPARATOR)?;
    let facet = prefix.strip_suffix(DATA_SOURCES_SEGMENT)?.strip_suffix(SEPARATOR)?;
    if facet.is_empty() || name.is_empty() {
        return None;
    }
    Some((facet, name))
}

pub fn middleware_phase_id(phase: &str) -> String {
    join(MIDDLEWARE_SEGMENT, phase)
}

/// Id of a middleware entry; `path` may itself contain dots.
pub fn middleware_id(phase: &str, path: &str) -> String {
    join(&middleware_phase_id(phase), path)
}

/// Returns the portion of `child` after `parent_id` and the separator.
///
/// Unlike [`leaf`] this keeps dots inside the child segment, which
/// middleware mount paths may contain.
pub fn relative_to<'a>(parent_id: &str, child: &'a str) -> Option<&'a str> {
    child
        .strip_prefix(parent_id)
        .and_then(|rest| rest.strip_prefix(SEPARATOR))
}

/// Directory of a facet relative to the workspace root.
///
/// Nested facets (`a.b`) map to nested directories (`a/b`).
pub fn facet_dir(facet: &str) -> PathBuf {
    facet.split(SEPARATOR).collect()
}

/// File name of a model definition: the kebab-cased model name.
pub fn model_file_name(model_name: &str) -> String {
    format!("{}.{ARTIFACT_EXTENSION}", model_name.to_case(Case::Kebab))
}

/// Model name encoded by a model file stem.
pub fn model_name_from_stem(stem: &str) -> String {
    stem.to_case(Case::Pascal)
}

/// Structured location of an artifact relative to the workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPath {
    dirs: Vec<String>,
    stem: String,
}

impl ArtifactPath {
    /// Builds an artifact path from directory segments and a file stem.
    pub fn new(dirs: Vec<String>, stem: impl Into<String>) -> Self {
        Self {
            dirs,
            stem: stem.into(),
        }
    }

    /// Parses a relative file path.
    ///
    /// Returns `None` for paths with no file name or with components other
    /// than plain names and `.` (absolute roots, `..`).
    pub fn from_relative(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?.to_string();
        let mut dirs = Vec::new();
        if let Some(dir) = path.parent() {
            for component in dir.components() {
                match component {
                    Component::Normal(segment) => dirs.push(segment.to_str()?.to_string()),
                    Component::CurDir => {}
                    _ => return None,
                }
            }
        }
        Some(Self { dirs, stem })
    }

    /// Parses a path that may be absolute under `root`.
    pub fn from_workspace_path(root: &Path, path: &Path) -> Option<Self> {
        let relative = path.strip_prefix(root).unwrap_or(path);
        Self::from_relative(relative)
    }

    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Facet name of a config artifact: its directory segments dot-joined.
    pub fn facet_name(&self) -> Option<String> {
        if self.dirs.is_empty() {
            None
        } else {
            Some(self.dirs.join(SEPARATOR_STR))
        }
    }

    /// Facet name of a model artifact.
    ///
    /// Same as [`facet_name`](Self::facet_name) but a trailing `models_dir`
    /// segment is dropped, so `rest/models/user.json` belongs to `rest`.
    /// This deliberately differs from dot-joining every directory, which
    /// would give `rest.models` and not match where models are written.
    pub fn model_facet_name(&self, models_dir: &str) -> Option<String> {
        let dirs = match self.dirs.split_last() {
            Some((last, rest)) if last == models_dir => rest,
            _ => &self.dirs[..],
        };
        if dirs.is_empty() {
            None
        } else {
            Some(dirs.join(SEPARATOR_STR))
        }
    }

    pub fn model_name(&self) -> String {
        model_name_from_stem(&self.stem)
    }

    /// Model id derived from this path, if a facet can be derived.
    pub fn model_id(&self, models_dir: &str) -> Option<String> {
        self.model_facet_name(models_dir)
            .map(|facet| model_id(&facet, &self.model_name()))
    }
}
