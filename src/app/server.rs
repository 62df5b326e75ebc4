//! The composed server facade.
//!
//! # Responsibilities
//! - Own the layer stack and the scoping strategy
//! - Register handlers, nested servers and pre-built blocks (`use`)
//! - Run builds and signal completion
//! - Publish lifecycle events
//!
//! # Design Decisions
//! - Cheap to clone; clones share one stack
//! - Registration arguments are resolved once into a `Layer`
//! - Each build gets its own traversal and context, so concurrent builds
//!   of one server never interfere

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use futures_util::future::BoxFuture;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::app::block::BlockHandler;
use crate::app::listen::Listener;
use crate::conf::{Conf, DirectiveSink};
use crate::dispatch::{
    Context, Flow, Handler, Layer, LocationScope, Outcome, ScopeStrategy, Stack, Traversal,
};
use crate::error::{Error, Result};
use crate::observability::metrics;
use crate::routing::MountPath;

/// Lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// This server was mounted into another one.
    Mounted { path: MountPath },
    BuildStarted { build_id: Uuid },
    BuildCompleted { build_id: Uuid },
    BuildHalted { build_id: Uuid },
}

/// Anything `Server::mount` accepts.
pub enum Mountable {
    Handler(Arc<dyn Handler>),
    Server(Server),
    /// A pre-built configuration whose arguments are replayed into the sink.
    Block(Conf),
}

impl<H: Handler> From<H> for Mountable {
    fn from(handler: H) -> Self {
        Mountable::Handler(Arc::new(handler))
    }
}

impl From<Arc<dyn Handler>> for Mountable {
    fn from(handler: Arc<dyn Handler>) -> Self {
        Mountable::Handler(handler)
    }
}

impl From<Server> for Mountable {
    fn from(server: Server) -> Self {
        Mountable::Server(server)
    }
}

impl From<&Server> for Mountable {
    fn from(server: &Server) -> Self {
        Mountable::Server(server.clone())
    }
}

impl From<Conf> for Mountable {
    fn from(block: Conf) -> Self {
        Mountable::Block(block)
    }
}

struct Inner {
    route: ArcSwap<MountPath>,
    stack: Stack,
    scope: Arc<dyn ScopeStrategy>,
    events: broadcast::Sender<ServerEvent>,
}

/// A stack of mount-scoped configuration layers.
#[derive(Clone)]
pub struct Server {
    inner: Arc<Inner>,
}

/// Create a server with an empty stack and `<Location>` scoping.
pub fn create() -> Server {
    Server::new()
}

impl Server {
    pub fn new() -> Self {
        Self::with_scope(LocationScope)
    }

    pub fn with_scope(strategy: impl ScopeStrategy + 'static) -> Self {
        Self::with_strategy(Arc::new(strategy))
    }

    pub fn with_strategy(strategy: Arc<dyn ScopeStrategy>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Inner {
                route: ArcSwap::from_pointee(MountPath::root()),
                stack: Stack::new(),
                scope: strategy,
                events,
            }),
        }
    }

    /// Where this server is mounted; root until mounted into another server.
    pub fn route(&self) -> MountPath {
        self.inner.route.load().as_ref().clone()
    }

    pub fn scope(&self) -> &Arc<dyn ScopeStrategy> {
        &self.inner.scope
    }

    /// Registered layers, in order.
    pub fn layers(&self) -> Arc<Vec<Arc<Layer>>> {
        self.inner.stack.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.inner.events.subscribe()
    }

    /// Register `target` at the root.
    pub fn attach(&self, target: impl Into<Mountable>) -> Result<&Self> {
        self.mount("/", target)
    }

    /// Register `target` under `path`.
    ///
    /// Builds already running keep the stack they started with.
    pub fn mount(&self, path: &str, target: impl Into<Mountable>) -> Result<&Self> {
        let path = MountPath::parse(path)?;

        let layer = match target.into() {
            Mountable::Handler(handler) => Layer::new(path, handler),
            Mountable::Server(server) => {
                if server.reaches(self) {
                    return Err(Error::invalid_mount(
                        path.to_string(),
                        "a server cannot be mounted inside itself",
                    ));
                }
                server.inner.route.store(Arc::new(path.clone()));
                let _ = server.inner.events.send(ServerEvent::Mounted { path: path.clone() });
                let handler: Arc<dyn Handler> = Arc::new(Mounted {
                    server: server.clone(),
                });
                Layer::nested(path, handler, server)
            }
            Mountable::Block(block) => {
                let handler = BlockHandler::new(&block)
                    .map_err(|e| Error::invalid_mount(path.to_string(), e.to_string()))?;
                Layer::new(path, Arc::new(handler))
            }
        };

        tracing::debug!(path = %layer.path(), handler = layer.handler().name(), "use");
        self.inner.stack.push(layer);
        Ok(self)
    }

    /// True if `other` is this server or is mounted somewhere below it.
    fn reaches(&self, other: &Server) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || self
                .inner
                .stack
                .snapshot()
                .iter()
                .filter_map(|layer| layer.server())
                .any(|nested| nested.reaches(other))
    }

    /// Walk this server's stack inside an existing build.
    pub async fn dispatch(&self, cx: &mut Context<'_>) -> Result<Outcome> {
        let layers = self.inner.stack.snapshot();
        Traversal::new(&layers, self.inner.scope.clone())
            .drive(cx)
            .await
    }

    /// Run a build without invoking any completion hook.
    pub async fn build(&self, sink: &mut dyn DirectiveSink) -> Result<Outcome> {
        let start = Instant::now();
        let mut cx = Context::new(sink);
        let build_id = cx.build_id();

        tracing::debug!(build_id = %build_id, layers = self.inner.stack.len(), "Build started");
        let _ = self.inner.events.send(ServerEvent::BuildStarted { build_id });

        match self.dispatch(&mut cx).await {
            Ok(outcome) => {
                metrics::record_build(outcome, start);
                let event = match outcome {
                    Outcome::Completed => ServerEvent::BuildCompleted { build_id },
                    Outcome::Halted => ServerEvent::BuildHalted { build_id },
                };
                tracing::debug!(build_id = %build_id, outcome = ?outcome, "Build finished");
                let _ = self.inner.events.send(event);
                Ok(outcome)
            }
            Err(e) => {
                metrics::record_build_error();
                tracing::warn!(build_id = %build_id, error = %e, "Build failed");
                Err(e)
            }
        }
    }

    /// Build into `sink`, then call its default `end` hook.
    pub async fn handle(&self, sink: &mut dyn DirectiveSink) -> Result<Outcome> {
        self.handle_with(sink, |sink| sink.end()).await
    }

    /// Build into `sink`, then call `done` once if the stack was exhausted.
    ///
    /// `done` runs on a later scheduler tick than the last handler.
    pub async fn handle_with<F>(&self, sink: &mut dyn DirectiveSink, done: F) -> Result<Outcome>
    where
        F: FnOnce(&mut dyn DirectiveSink) -> Result<()> + Send,
    {
        let outcome = self.build(&mut *sink).await?;
        if outcome == Outcome::Completed {
            done(sink)?;
        }
        Ok(outcome)
    }

    /// Build a fresh configuration listening on `bind_address`.
    pub async fn listen(&self, bind_address: &str) -> Result<Conf> {
        Listener::new(bind_address).bootstrap(self).await
    }

    /// Full mount paths of the layers whose scope covers `subject`,
    /// descending into nested servers.
    pub fn routes_for(&self, subject: &str) -> Vec<MountPath> {
        let mut out = Vec::new();
        self.collect_routes("", subject, &mut out);
        out
    }

    fn collect_routes(&self, prefix: &str, subject: &str, out: &mut Vec<MountPath>) {
        for layer in self.inner.stack.snapshot().iter() {
            let full = format!("{}{}", prefix, layer.path().as_str());
            let Ok(full) = MountPath::parse(&full) else {
                continue;
            };
            let scope = &self.inner.scope;
            if scope.is_scoped(layer.path()) && !scope.covers(&full, subject) {
                continue;
            }
            match layer.server() {
                Some(nested) => nested.collect_routes(full.as_str(), subject, out),
                None => out.push(full),
            }
        }
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("route", &self.route())
            .field("scope", &self.inner.scope.name())
            .field("layers", &self.inner.stack.len())
            .finish()
    }
}

/// Delegates to a nested server's own traversal.
struct Mounted {
    server: Server,
}

impl Handler for Mounted {
    fn call<'a, 'b>(&'a self, cx: &'a mut Context<'b>) -> BoxFuture<'a, Result<Flow>> {
        Box::pin(async move {
            match self.server.dispatch(cx).await? {
                Outcome::Completed => Ok(Flow::Next),
                Outcome::Halted => Ok(Flow::Halt),
            }
        })
    }

    fn name(&self) -> &str {
        "server"
    }
}
