//! The contract the dispatcher consumes from a configuration builder.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A configuration builder that directives are written into.
///
/// "Prepended" directives are evaluated before the main configuration file
/// (`httpd -C`), "added" directives after it (`httpd -c`).
pub trait DirectiveSink: Send {
    /// Add a directive evaluated before the main configuration file.
    fn prepend_directive(&mut self, line: &str);

    /// Add a directive evaluated after the main configuration file.
    fn add_directive(&mut self, line: &str);

    /// Define a startup parameter (`httpd -D`).
    fn define(&mut self, parameter: &str) -> Result<()> {
        let _ = parameter;
        Err(Error::MissingCapability("define"))
    }

    /// Add a raw command line argument, optionally with a value.
    fn add_argument(&mut self, flag: &str, value: Option<&str>) -> Result<()> {
        let _ = (flag, value);
        Err(Error::MissingCapability("add_argument"))
    }

    /// Main configuration file, if one was chosen.
    fn file(&self) -> Option<&Path> {
        None
    }

    fn set_file(&mut self, path: PathBuf) -> Result<()> {
        let _ = path;
        Err(Error::MissingCapability("set_file"))
    }

    /// Number of prepended directives written so far.
    ///
    /// `None` when the sink cannot report positions; conditional scopes
    /// need this to hoist definitions out of their blocks.
    fn prepended_len(&self) -> Option<usize> {
        None
    }

    /// Insert a prepended directive at `index`.
    fn insert_prepended(&mut self, index: usize, line: &str) -> Result<()> {
        let _ = (index, line);
        Err(Error::MissingCapability("insert_prepended"))
    }

    /// Default completion hook, used when `handle` gets no callback.
    fn end(&mut self) -> Result<()> {
        Err(Error::MissingCapability("end"))
    }
}
