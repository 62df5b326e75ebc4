//! Error types for configuration building.

use thiserror::Error;

/// Main error type for the dispatcher.
#[derive(Error, Debug)]
pub enum Error {
    /// A `use` call was given something that cannot be mounted.
    #[error("Invalid mount at {path:?}: {reason}")]
    InvalidMount { path: String, reason: String },

    #[error("Invalid argument `{flag}`: {reason}")]
    InvalidArgument { flag: String, reason: String },

    /// The sink does not implement an operation the build needed.
    #[error("Directive sink does not support `{0}`")]
    MissingCapability(&'static str),

    #[error("Invalid scope pattern for {path}: {source}")]
    Pattern {
        path: String,
        #[source]
        source: regex::Error,
    },

    #[error("Handler `{name}` failed: {message}")]
    Handler { name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_mount(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidMount {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(flag: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            flag: flag.into(),
            reason: reason.into(),
        }
    }

    /// Convenience for handlers reporting their own failures.
    pub fn handler(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Handler {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for the dispatcher.
pub type Result<T> = std::result::Result<T, Error>;
