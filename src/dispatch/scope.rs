//! Scoping strategies.
//!
//! # Responsibilities
//! - Write the opening tag of a scoping block before a non-root layer runs
//! - Write the matching closing tag once that layer is done
//! - Redirect definitions made inside the block
//!
//! # Design Decisions
//! - Tags go to both the prepended (`-C`) and appended (`-c`) lists so
//!   directives written to either side end up inside the block
//! - `LocationScope` closes eagerly through a sentinel step
//! - `ConditionalScope` closes lazily, right before the next step
//! - Exactly one open/close pair per scoped layer

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dispatch::context::{Context, DefineMode};
use crate::error::Result;
use crate::routing::{scope_prefix, Matcher, MountPath, PathPrefixMatcher, ScopePattern};

/// When a traversal closes the block a layer opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closing {
    /// A sentinel step queued right after the layer.
    Eager,
    /// Before the next step of the same traversal, or at end of stack.
    Lazy,
}

/// A policy for wrapping a layer's output in a scoping block.
pub trait ScopeStrategy: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn open_tag(&self, path: &MountPath) -> Result<String>;

    fn close_tag(&self) -> &'static str;

    fn closing(&self) -> Closing;

    fn define_mode(&self) -> DefineMode;

    /// Whether a layer mounted at `path` is wrapped in a block at all.
    fn is_scoped(&self, path: &MountPath) -> bool {
        !path.is_root()
    }

    /// Whether the block opened for `path` applies to `subject`.
    fn covers(&self, path: &MountPath, subject: &str) -> bool {
        PathPrefixMatcher::new(path).matches(subject)
    }

    /// Open a block for `path`.
    fn enter(&self, cx: &mut Context<'_>, path: &MountPath) -> Result<ScopeFrame> {
        let open = self.open_tag(path)?;
        let owns_hoist = cx.enter_scope(self.define_mode())?;
        cx.prepend(&open).append(&open);
        tracing::trace!(
            build_id = %cx.build_id(),
            scope = self.name(),
            path = %path,
            depth = cx.depth(),
            "Scope opened"
        );
        Ok(ScopeFrame {
            path: path.clone(),
            close: self.close_tag(),
            owns_hoist,
        })
    }
}

/// An open scoping block, waiting to be closed.
#[derive(Debug, Clone)]
pub struct ScopeFrame {
    path: MountPath,
    close: &'static str,
    owns_hoist: bool,
}

impl ScopeFrame {
    pub fn path(&self) -> &MountPath {
        &self.path
    }

    /// Write the closing tag and restore the previous define override.
    pub fn close(self, cx: &mut Context<'_>) {
        cx.prepend(self.close).append(self.close);
        cx.leave_scope(self.owns_hoist);
        tracing::trace!(
            build_id = %cx.build_id(),
            path = %self.path,
            depth = cx.depth(),
            "Scope closed"
        );
    }
}

/// `<Location "P">` blocks bound to the literal mount path.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationScope;

impl ScopeStrategy for LocationScope {
    fn name(&self) -> &'static str {
        "location"
    }

    fn open_tag(&self, path: &MountPath) -> Result<String> {
        Ok(format!("<Location \"{}\">", path))
    }

    fn close_tag(&self) -> &'static str {
        "</Location>"
    }

    fn closing(&self) -> Closing {
        Closing::Eager
    }

    fn define_mode(&self) -> DefineMode {
        DefineMode::Inline
    }
}

/// `<If>` blocks guarded by an anchored prefix match.
#[derive(Debug, Clone)]
pub struct ConditionalScope {
    subject: String,
}

impl ConditionalScope {
    pub fn new() -> Self {
        Self {
            subject: "%{REQUEST_URI}".to_string(),
        }
    }

    /// Match against another expression variable, e.g. `%{REQUEST_FILENAME}`.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }
}

impl Default for ConditionalScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStrategy for ConditionalScope {
    fn name(&self) -> &'static str {
        "conditional"
    }

    fn open_tag(&self, path: &MountPath) -> Result<String> {
        let pattern = ScopePattern::for_path(path)?;
        Ok(format!("<If \"{} =~ m#{}#\">", self.subject, pattern.as_str()))
    }

    fn close_tag(&self) -> &'static str {
        "</If>"
    }

    fn closing(&self) -> Closing {
        Closing::Lazy
    }

    fn define_mode(&self) -> DefineMode {
        DefineMode::Hoist
    }

    fn is_scoped(&self, path: &MountPath) -> bool {
        !scope_prefix(path).is_empty()
    }

    fn covers(&self, path: &MountPath, subject: &str) -> bool {
        ScopePattern::for_path(path)
            .map(|pattern| pattern.matches(subject))
            .unwrap_or(false)
    }
}

/// Strategy selector used by layout files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    #[default]
    Location,
    Conditional,
}

impl ScopeKind {
    /// `subject` is only used by conditional scopes.
    pub fn strategy(self, subject: &str) -> Arc<dyn ScopeStrategy> {
        match self {
            ScopeKind::Location => Arc::new(LocationScope),
            ScopeKind::Conditional => Arc::new(ConditionalScope::new().with_subject(subject)),
        }
    }
}
