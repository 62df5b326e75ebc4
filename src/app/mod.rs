//! Composition layer.
//!
//! # Data Flow
//! ```text
//! Server::mount(path, handler | server | block)
//!     → Layer appended to the stack
//!
//! Server::handle(sink)
//!     → Traversal over a stack snapshot
//!     → handlers write through Context into the sink
//!     → sink.end() once the stack is exhausted
//!
//! Listener::bootstrap(server)
//!     → fresh Conf with `Listen` → Server::handle → Conf
//! ```

pub mod block;
pub mod layout;
pub mod listen;
pub mod server;

pub use block::BlockHandler;
pub use layout::build_server;
pub use listen::Listener;
pub use server::{create, Mountable, Server, ServerEvent};
