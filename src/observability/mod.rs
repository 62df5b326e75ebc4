//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Server::mount / Server::handle / Traversal::drive
//!     → logging.rs (structured tracing events, build_id on every event)
//!     → metrics.rs (build and layer counters, build duration)
//! ```
//!
//! # Design Decisions
//! - `tracing` events only; the binary installs the subscriber
//! - Metrics go through the `metrics` facade; with no recorder installed
//!   they cost next to nothing

pub mod logging;
pub mod metrics;
