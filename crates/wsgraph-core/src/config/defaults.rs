//! Default values for wsgraph configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Workspace Layout Defaults
// ============================================================================

/// Default workspace root (the current directory).
pub const DEFAULT_WORKSPACE_ROOT: &str = ".";

/// Subdirectory of a facet that holds model definition files.
pub const DEFAULT_MODELS_DIR: &str = "models";

/// Facet configuration file name.
pub const DEFAULT_FACET_FILE: &str = "config.json";

/// Model configuration file name (one per facet).
pub const DEFAULT_MODEL_CONFIG_FILE: &str = "model-config.json";

/// Datasource configuration file name (one per facet).
pub const DEFAULT_DATA_SOURCES_FILE: &str = "datasources.json";

/// Middleware configuration file name.
pub const DEFAULT_MIDDLEWARE_FILE: &str = "middleware.json";

/// Facet whose directory holds the middleware file.
pub const DEFAULT_MIDDLEWARE_FACET: &str = "server";

/// Package definition file name, at the workspace root.
pub const DEFAULT_PACKAGE_FILE: &str = "package.json";

/// Extension of every artifact the store reads and writes.
pub const ARTIFACT_EXTENSION: &str = "json";

/// Directories never scanned when loading a workspace.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "coverage",
    "dist",
    "build",
    "target",
];

/// Canonical order of middleware phases in the middleware file.
///
/// Each phase may also appear with a `:before` or `:after` suffix. Phases not
/// listed here are written after these, in name order.
pub const DEFAULT_MIDDLEWARE_PHASES: &[&str] = &[
    "initial",
    "session",
    "auth",
    "parse",
    "routes",
    "files",
    "final",
];

// ============================================================================
// Identity Segments
// ============================================================================

/// Id segment between a facet and its model configs.
pub const MODEL_CONFIG_SEGMENT: &str = "modelConfig";

/// Id segment between a facet and its datasources.
pub const DATA_SOURCES_SEGMENT: &str = "dataSources";

/// Id prefix of every middleware phase.
pub const MIDDLEWARE_SEGMENT: &str = "middleware";

/// Id of the single package definition node.
pub const PACKAGE_DEFINITION_ID: &str = "package.json";

// ============================================================================
// Config File Locations
// ============================================================================

/// Project-local config file name.
pub const LOCAL_CONFIG_FILE: &str = "wsgraph.toml";

/// Directory under the user config dir.
pub const USER_CONFIG_DIR: &str = "wsgraph";

/// File name under the user config dir.
pub const USER_CONFIG_FILE: &str = "config.toml";
