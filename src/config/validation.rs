//! Layout validation.
//!
//! # Responsibilities
//! - Check mount paths can be written into a scoping tag
//! - Reject directives that are empty or span several lines
//! - Reject definitions that are not a single word
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: LayoutConfig → Result<(), Vec<ValidationError>>
//! - Child mounts are reported with their full path

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{LayoutConfig, MountConfig};
use crate::routing::MountPath;

/// A semantic problem in a layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address must not be empty")]
    EmptyBindAddress,

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("mount {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("mount {path:?}: directive {index} is empty")]
    EmptyDirective { path: String, index: usize },

    #[error("mount {path:?}: directive {index} spans several lines")]
    MultilineDirective { path: String, index: usize },

    #[error("{path:?}: define {name:?} must be a single word")]
    InvalidDefine { path: String, name: String },
}

pub fn validate_config(config: &LayoutConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.trim().is_empty() {
        errors.push(ValidationError::EmptyBindAddress);
    }
    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(addr.clone()));
        }
    }
    for name in &config.server.defines {
        check_define("server", name, &mut errors);
    }
    for mount in &config.mounts {
        validate_mount("", mount, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_mount(parent: &str, mount: &MountConfig, errors: &mut Vec<ValidationError>) {
    let full = format!("{}{}", parent, mount.path);
    let path = match MountPath::parse(&mount.path) {
        Ok(path) => path,
        Err(e) => {
            errors.push(ValidationError::InvalidPath {
                path: full,
                reason: e.to_string(),
            });
            return;
        }
    };
    let full = format!("{}{}", parent, path.as_str());

    let directives = mount.early_directives.iter().chain(mount.directives.iter());
    for (index, line) in directives.enumerate() {
        if line.trim().is_empty() {
            errors.push(ValidationError::EmptyDirective {
                path: full.clone(),
                index,
            });
        } else if line.contains(['\n', '\r']) {
            errors.push(ValidationError::MultilineDirective {
                path: full.clone(),
                index,
            });
        }
    }
    for name in &mount.defines {
        check_define(&full, name, errors);
    }
    for child in &mount.mounts {
        validate_mount(&full, child, errors);
    }
}

fn check_define(path: &str, name: &str, errors: &mut Vec<ValidationError>) {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        errors.push(ValidationError::InvalidDefine {
            path: path.to_string(),
            name: name.to_string(),
        });
    }
}
