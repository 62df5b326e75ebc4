//! Per-build state handed to every handler.

use uuid::Uuid;

use crate::conf::DirectiveSink;
use crate::error::{Error, Result};

/// Where `Context::define` sends a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefineMode {
    /// Straight to the sink as a startup parameter.
    Sink,
    /// As a `Define` directive at the current position, inside the open block.
    Inline,
    /// As a `Define` directive placed just before the outermost open
    /// conditional block, which cannot contain one.
    Hoist,
}

/// The sink being built plus the scoping state of one traversal.
///
/// Handlers write through the context so definitions made inside a scope
/// land where that scope allows them.
pub struct Context<'a> {
    sink: &'a mut dyn DirectiveSink,
    overrides: Vec<DefineMode>,
    hoist_at: Option<usize>,
    build_id: Uuid,
}

impl<'a> Context<'a> {
    pub fn new(sink: &'a mut dyn DirectiveSink) -> Self {
        Self {
            sink,
            overrides: Vec::new(),
            hoist_at: None,
            build_id: Uuid::new_v4(),
        }
    }

    /// Identifier of this build, for log correlation.
    pub fn build_id(&self) -> Uuid {
        self.build_id
    }

    /// Number of scoping blocks currently open.
    pub fn depth(&self) -> usize {
        self.overrides.len()
    }

    pub fn define_mode(&self) -> DefineMode {
        self.overrides.last().copied().unwrap_or(DefineMode::Sink)
    }

    pub fn sink(&mut self) -> &mut dyn DirectiveSink {
        &mut *self.sink
    }

    /// Write a directive evaluated before the main configuration.
    pub fn prepend(&mut self, line: impl AsRef<str>) -> &mut Self {
        self.sink.prepend_directive(line.as_ref());
        self
    }

    /// Write a directive evaluated after the main configuration.
    pub fn append(&mut self, line: impl AsRef<str>) -> &mut Self {
        self.sink.add_directive(line.as_ref());
        self
    }

    /// Define a parameter, honoring the innermost open scope.
    ///
    /// An empty parameter is ignored.
    pub fn define(&mut self, parameter: &str) -> Result<()> {
        if parameter.is_empty() {
            return Ok(());
        }
        match self.define_mode() {
            DefineMode::Sink => self.sink.define(parameter),
            DefineMode::Inline => {
                self.sink.prepend_directive(&format!("Define {}", parameter));
                Ok(())
            }
            DefineMode::Hoist => {
                let at = self
                    .hoist_at
                    .ok_or(Error::MissingCapability("prepended_len"))?;
                self.sink.insert_prepended(at, &format!("Define {}", parameter))?;
                self.hoist_at = Some(at + 1);
                Ok(())
            }
        }
    }

    /// Forward a raw argument to the sink.
    pub fn add_argument(&mut self, flag: &str, value: Option<&str>) -> Result<()> {
        self.sink.add_argument(flag, value)
    }

    /// Push a define override for a scope about to open.
    ///
    /// Returns true when this scope owns the hoist point, which is the case
    /// for the outermost hoisting scope only. Must be called before the
    /// opening tag is written.
    pub(crate) fn enter_scope(&mut self, mode: DefineMode) -> Result<bool> {
        let mut owns_hoist = false;
        if mode == DefineMode::Hoist && self.hoist_at.is_none() {
            let mark = self
                .sink
                .prepended_len()
                .ok_or(Error::MissingCapability("prepended_len"))?;
            self.hoist_at = Some(mark);
            owns_hoist = true;
        }
        self.overrides.push(mode);
        Ok(owns_hoist)
    }

    /// Restore the override that was active before the scope opened.
    pub(crate) fn leave_scope(&mut self, owns_hoist: bool) {
        self.overrides.pop();
        if owns_hoist {
            self.hoist_at = None;
        }
    }
}
