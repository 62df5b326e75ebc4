//! Build Apache httpd configurations from composable, path-scoped layers.
//!
//! # Architecture Overview
//!
//! ```text
//!   Server::mount("/admin", handler)          layout.toml
//!            │                                     │
//!            ▼                                     ▼
//!   ┌──────────────┐   snapshot   ┌───────────────────────┐
//!   │ dispatch     │─────────────▶│ Traversal (per build) │
//!   │ Stack        │              │  scope open / close   │
//!   └──────────────┘              └───────────┬───────────┘
//!                                             │ Context
//!                                             ▼
//!                                 ┌───────────────────────┐
//!                                 │ conf::DirectiveSink   │
//!                                 │  -D  -C  -c  -f       │
//!                                 └───────────┬───────────┘
//!                                             ▼
//!                                   httpd argument list
//! ```
//!
//! Handlers registered under a path only see their output wrapped in a
//! scoping block for that path: `<Location>` by default, or `<If>` with an
//! anchored prefix match when the server uses [`ConditionalScope`].

pub mod app;
pub mod conf;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use app::{build_server, create, BlockHandler, Listener, Mountable, Server, ServerEvent};
pub use conf::{Conf, DirectiveSink};
pub use config::LayoutConfig;
pub use dispatch::{
    handler_fn, ConditionalScope, Context, Flow, Handler, LocationScope, Outcome, ScopeStrategy,
};
pub use error::{Error, Result};
pub use lifecycle::Shutdown;
pub use routing::MountPath;
