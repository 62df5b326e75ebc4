//! Normalized mount paths.

use std::fmt;

use crate::error::{Error, Result};

/// A mount path with trailing separators stripped.
///
/// The empty path is the root; layers mounted there are never scoped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MountPath(String);

impl MountPath {
    /// The root mount point.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Normalize and validate a mount path.
    ///
    /// Quotes and control characters are rejected because the path is
    /// written verbatim into a quoted scoping directive. So are backslashes,
    /// which would escape the closing quote.
    pub fn parse(raw: &str) -> Result<Self> {
        if let Some(bad) = raw.chars().find(|c| matches!(*c, '"' | '\\') || c.is_control()) {
            return Err(Error::invalid_mount(
                raw,
                format!("path may not contain {:?}", bad),
            ));
        }
        Ok(Self(raw.trim_end_matches('/').to_string()))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MountPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("/")
        } else {
            f.write_str(&self.0)
        }
    }
}
