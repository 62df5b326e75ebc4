//! Layers and the handler contract.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::app::Server;
use crate::dispatch::context::Context;
use crate::error::Result;
use crate::routing::MountPath;

/// What a handler wants the traversal to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Continue with the next layer.
    Next,
    /// Stop this build; later layers and the completion callback never run.
    Halt,
}

/// A unit of configuration work.
///
/// A handler may await its own deferred work before returning; the
/// traversal only moves on once the returned future resolves.
pub trait Handler: Send + Sync + 'static {
    fn call<'a, 'b>(&'a self, cx: &'a mut Context<'b>) -> BoxFuture<'a, Result<Flow>>;

    /// Name used in logs.
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// Adapter turning a synchronous closure into a `Handler`.
pub struct FnHandler<F> {
    f: F,
}

/// Build a handler from a closure.
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&mut Context<'_>) -> Result<Flow> + Send + Sync + 'static,
{
    FnHandler { f }
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(&mut Context<'_>) -> Result<Flow> + Send + Sync + 'static,
{
    fn call<'a, 'b>(&'a self, cx: &'a mut Context<'b>) -> BoxFuture<'a, Result<Flow>> {
        let flow = (self.f)(cx);
        Box::pin(std::future::ready(flow))
    }
}

/// A handler bound to a mount path.
#[derive(Clone)]
pub struct Layer {
    path: MountPath,
    handler: Arc<dyn Handler>,
    nested: Option<Server>,
}

impl Layer {
    pub fn new(path: MountPath, handler: Arc<dyn Handler>) -> Self {
        Self {
            path,
            handler,
            nested: None,
        }
    }

    /// A layer delegating to a mounted server.
    pub(crate) fn nested(path: MountPath, handler: Arc<dyn Handler>, server: Server) -> Self {
        Self {
            path,
            handler,
            nested: Some(server),
        }
    }

    pub fn path(&self) -> &MountPath {
        &self.path
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// The mounted server, when this layer wraps one.
    pub fn server(&self) -> Option<&Server> {
        self.nested.as_ref()
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("path", &self.path)
            .field("handler", &self.handler.name())
            .field("nested", &self.nested.is_some())
            .finish()
    }
}
