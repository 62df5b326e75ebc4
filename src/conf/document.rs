//! The bundled configuration builder.
//!
//! # Responsibilities
//! - Collect defines, prepended and appended directives, file and flags
//! - Render them as an httpd command line or as a readable document
//! - Split flat argument lists back into flag/value pairs

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::conf::sink::DirectiveSink;
use crate::error::{Error, Result};

/// A command line flag with an optional value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Argument {
    pub flag: String,
    pub value: Option<String>,
}

impl Argument {
    pub fn flag(flag: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            value: None,
        }
    }

    pub fn with_value(flag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            value: Some(value.into()),
        }
    }
}

/// Configuration for one httpd invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Conf {
    /// Main configuration file (`-f`).
    file: Option<PathBuf>,
    /// Startup parameters (`-D`).
    defines: Vec<String>,
    /// Directives read before the main file (`-C`).
    before: Vec<String>,
    /// Directives read after the main file (`-c`).
    after: Vec<String>,
    /// Any other flags.
    extra: Vec<Argument>,
    #[serde(skip)]
    ended: bool,
}

impl Conf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn defines(&self) -> &[String] {
        &self.defines
    }

    pub fn prepended(&self) -> &[String] {
        &self.before
    }

    pub fn appended(&self) -> &[String] {
        &self.after
    }

    /// True once the default completion hook ran.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Flat argument list, without the main file.
    pub fn arguments(&self) -> Vec<String> {
        let mut args = Vec::new();
        for define in &self.defines {
            args.push("-D".to_string());
            args.push(define.clone());
        }
        for line in &self.before {
            args.push("-C".to_string());
            args.push(line.clone());
        }
        for line in &self.after {
            args.push("-c".to_string());
            args.push(line.clone());
        }
        for arg in &self.extra {
            args.push(arg.flag.clone());
            if let Some(value) = &arg.value {
                args.push(value.clone());
            }
        }
        args
    }

    /// Complete httpd command line.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(file) = &self.file {
            args.push("-f".to_string());
            args.push(file.display().to_string());
        }
        args.extend(self.arguments());
        args
    }

    /// Render as a single configuration document, in evaluation order.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Conf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for define in &self.defines {
            writeln!(f, "Define {}", define)?;
        }
        for line in &self.before {
            writeln!(f, "{}", line)?;
        }
        if let Some(file) = &self.file {
            writeln!(f, "Include \"{}\"", file.display())?;
        }
        for line in &self.after {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl DirectiveSink for Conf {
    fn prepend_directive(&mut self, line: &str) {
        self.before.push(line.to_string());
    }

    fn add_directive(&mut self, line: &str) {
        self.after.push(line.to_string());
    }

    fn define(&mut self, parameter: &str) -> Result<()> {
        self.defines.push(parameter.to_string());
        Ok(())
    }

    fn add_argument(&mut self, flag: &str, value: Option<&str>) -> Result<()> {
        match flag {
            "-C" => self.prepend_directive(required(flag, value)?),
            "-c" => self.add_directive(required(flag, value)?),
            "-D" => self.define(required(flag, value)?)?,
            "-f" => self.file = Some(PathBuf::from(required(flag, value)?)),
            _ => self.extra.push(Argument {
                flag: flag.to_string(),
                value: value.map(str::to_string),
            }),
        }
        Ok(())
    }

    fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    fn set_file(&mut self, path: PathBuf) -> Result<()> {
        self.file = Some(path);
        Ok(())
    }

    fn prepended_len(&self) -> Option<usize> {
        Some(self.before.len())
    }

    fn insert_prepended(&mut self, index: usize, line: &str) -> Result<()> {
        let index = index.min(self.before.len());
        self.before.insert(index, line.to_string());
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.ended = true;
        tracing::trace!(arguments = self.before.len() + self.after.len(), "Conf ended");
        Ok(())
    }
}

fn required<'v>(flag: &str, value: Option<&'v str>) -> Result<&'v str> {
    value.ok_or_else(|| Error::invalid_argument(flag, "flag requires a value"))
}

/// Split a flat argument list into flags, pairing a flag with the token
/// after it unless that token is itself a flag.
///
/// A value that does not follow a flag is rejected.
pub fn split_arguments<S: AsRef<str>>(args: &[S]) -> Result<Vec<Argument>> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let token = args[i].as_ref();
        if !token.starts_with('-') {
            return Err(Error::invalid_argument(token, "value without a preceding flag"));
        }
        match args.get(i + 1).map(|next| next.as_ref()) {
            Some(next) if !next.starts_with('-') => {
                out.push(Argument::with_value(token, next));
                i += 2;
            }
            _ => {
                out.push(Argument::flag(token));
                i += 1;
            }
        }
    }
    Ok(out)
}
