//! Mount path subsystem.
//!
//! # Data Flow
//! ```text
//! Server::mount(path, ..)
//!     → path.rs (normalize, reject unsafe paths)
//!     → MountPath stored on the Layer
//!
//! Conditional scopes at build time:
//!     MountPath
//!     → matcher.rs (strip, escape, anchor)
//!     → ScopePattern (regex source + compiled matcher)
//! ```
//!
//! # Design Decisions
//! - Paths are normalized once, at registration
//! - Prefix matching respects segment boundaries: `/admin` never matches `/administrator`
//! - Every regex metacharacter in a path is escaped, not only dots

pub mod matcher;
pub mod path;

pub use matcher::{scope_prefix, Matcher, PathPrefixMatcher, ScopePattern};
pub use path::MountPath;
