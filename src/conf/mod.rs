//! Directive sink subsystem.
//!
//! # Data Flow
//! ```text
//! Server::handle(sink)
//!     → dispatch::Context (borrows the sink for one build)
//!     → handlers write through the context
//!     → sink.rs (DirectiveSink contract)
//!     → document.rs (Conf: -f / -D / -C / -c / flags)
//!     → rendered as an httpd command line or a text document
//! ```
//!
//! # Design Decisions
//! - The core only depends on the `DirectiveSink` trait
//! - Optional capabilities fail fast with `Error::MissingCapability`
//! - `Conf` is the bundled sink; any other type may implement the trait

pub mod document;
pub mod sink;

pub use document::{split_arguments, Argument, Conf};
pub use sink::DirectiveSink;
