//! Layout file subsystem.
//!
//! # Data Flow
//! ```text
//! layout file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks, all errors at once)
//!     → LayoutConfig (validated, immutable)
//!     → app::layout::build_server (Server tree)
//!
//! In watch mode:
//!     watcher.rs detects change
//!     → loader.rs loads the new layout
//!     → validation.rs validates
//!     → new Server tree is built and rendered
//! ```
//!
//! # Design Decisions
//! - Every section has defaults so a minimal layout is a few lines
//! - Serde handles syntax, validation handles meaning
//! - A layout that fails validation never replaces a good one

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{LayoutConfig, ListenerConfig, MountConfig, ObservabilityConfig, ServerConfig};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
