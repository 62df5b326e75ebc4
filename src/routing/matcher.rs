//! Path prefix matching.
//!
//! # Responsibilities
//! - Decide whether a request path falls under a mount path
//! - Build the anchored pattern written into conditional scopes
//!
//! # Design Decisions
//! - A match needs the prefix followed by end of input, `/` or `.`
//! - Matching is case-sensitive
//! - `PathPrefixMatcher` is plain string work; `ScopePattern` compiles the
//!   exact regex emitted into the document so both can be checked against
//!   each other

use regex::Regex;

use crate::error::{Error, Result};
use crate::routing::path::MountPath;

/// Trait for matching request paths against a mount point.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if `subject` lies under this mount point.
    fn matches(&self, subject: &str) -> bool;
}

/// Matches a path prefix on a segment boundary.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(path: &MountPath) -> Self {
        Self {
            prefix: path.as_str().to_string(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, subject: &str) -> bool {
        match subject.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('.'),
            None => false,
        }
    }
}

/// What a conditional scope keeps of a mount path: trailing `/` and `.`
/// are stripped. An empty result means the path is unscoped.
pub fn scope_prefix(path: &MountPath) -> &str {
    path.as_str().trim_end_matches(['/', '.'])
}

/// The anchored regex used by conditional scopes.
#[derive(Debug, Clone)]
pub struct ScopePattern {
    source: String,
    regex: Regex,
}

impl ScopePattern {
    /// Build the pattern for a mount path.
    ///
    /// Trailing `/` and `.` are stripped first, then the remainder is
    /// escaped so `.` only ever matches a literal dot.
    pub fn for_path(path: &MountPath) -> Result<Self> {
        let source = format!("^{}([/.].*)?$", regex::escape(scope_prefix(path)));
        let regex = Regex::new(&source).map_err(|source| Error::Pattern {
            path: path.to_string(),
            source,
        })?;
        Ok(Self { source, regex })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Matcher for ScopePattern {
    fn matches(&self, subject: &str) -> bool {
        self.regex.is_match(subject)
    }
}
