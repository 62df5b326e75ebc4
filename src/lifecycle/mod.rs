//! Process lifecycle for the long-running commands.
//!
//! # Data Flow
//! ```text
//! Ctrl+C / SIGTERM (signals.rs)
//!     → Shutdown::trigger (shutdown.rs)
//!     → `watch` stops re-rendering, `run` kills httpd
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::forward_signals;
