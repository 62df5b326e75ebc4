//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Server::handle(sink)
//!     → stack.rs (snapshot of registered layers)
//!     → traversal.rs (per-build deque + state machine)
//!         → scope.rs (open/close scoping blocks for non-root layers)
//!         → layer.rs (invoke handler with the context)
//!     → context.rs (sink + define overrides for this build)
//!     → completion after a scheduler yield
//! ```
//!
//! # Design Decisions
//! - The stack is append-only; traversals never mutate it
//! - Sentinel close steps live in the traversal's own deque
//! - Handlers return `Flow::Next` or `Flow::Halt` instead of calling a continuation
//! - Concurrent builds of one server share nothing but the snapshot

pub mod context;
pub mod layer;
pub mod scope;
pub mod stack;
pub mod traversal;

pub use context::{Context, DefineMode};
pub use layer::{handler_fn, Flow, FnHandler, Handler, Layer};
pub use scope::{Closing, ConditionalScope, LocationScope, ScopeFrame, ScopeKind, ScopeStrategy};
pub use stack::Stack;
pub use traversal::{Action, Outcome, State, Traversal};
