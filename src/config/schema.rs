//! Layout file schema.
//!
//! A layout describes a tree of mounts; each mount writes directives and
//! definitions, and may carry child mounts of its own.

use serde::{Deserialize, Serialize};

use crate::dispatch::ScopeKind;

/// Root of a layout file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LayoutConfig {
    /// Listening address and main configuration file.
    pub listener: ListenerConfig,

    /// Settings of the top-level server.
    pub server: ServerConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Mounts, in registration order.
    pub mounts: Vec<MountConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Address for the `Listen` directive (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Main httpd configuration file (`-f`).
    pub file: Option<String>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:80".to_string(),
            file: None,
        }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Scoping strategy for mounts below the root.
    pub scope: ScopeKind,

    /// Expression variable tested by conditional scopes.
    pub subject: String,

    /// Startup parameters defined before any mount runs.
    pub defines: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            scope: ScopeKind::Location,
            subject: "%{REQUEST_URI}".to_string(),
            defines: Vec::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Prometheus scrape address for `watch` and `run`; unset disables it.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_address: None,
        }
    }
}

/// One mount in the layout tree.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MountConfig {
    /// Mount path; `/` or omitted means unscoped.
    #[serde(default = "default_path")]
    pub path: String,

    /// Scoping strategy for child mounts; inherits from the parent.
    #[serde(default)]
    pub scope: Option<ScopeKind>,

    /// Directives read before the main file (`-C`).
    #[serde(default)]
    pub early_directives: Vec<String>,

    /// Directives read after the main file (`-c`).
    #[serde(default)]
    pub directives: Vec<String>,

    /// Parameters defined while this mount's scope is open.
    #[serde(default)]
    pub defines: Vec<String>,

    /// Stop the build after this mount.
    #[serde(default)]
    pub halt: bool,

    /// Child mounts, relative to this one.
    #[serde(default)]
    pub mounts: Vec<MountConfig>,
}

fn default_path() -> String {
    "/".to_string()
}
