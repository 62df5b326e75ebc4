//! The per-build traversal state machine.
//!
//! # Responsibilities
//! - Walk a stack snapshot once, in registration order
//! - Open a scope before each non-root layer and close it after
//! - Report completion exactly once, after a scheduler yield
//!
//! # Design Decisions
//! - `step` does all scope bookkeeping and never calls a handler, so the
//!   ordering rules can be tested without an executor
//! - `drive` is the only place handlers run
//! - Sentinel closes are pushed to the front of the private deque and are
//!   consumed by the very next step

use std::collections::VecDeque;
use std::sync::Arc;

use crate::dispatch::context::Context;
use crate::dispatch::layer::{Flow, Layer};
use crate::dispatch::scope::{Closing, ScopeFrame, ScopeStrategy};
use crate::error::Result;
use crate::observability::metrics;

/// Lifecycle of one traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    /// `cursor` layers have been handed out so far.
    Dispatching { cursor: usize },
    Halted,
    Done,
}

/// What the driver must do after a step.
#[derive(Debug)]
pub enum Action {
    /// Run this layer's handler.
    Invoke(Arc<Layer>),
    /// End of stack reached; completion is due.
    Complete,
    /// The traversal already finished or halted.
    Stopped,
}

/// How a build ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Halted,
}

enum Step {
    Layer(Arc<Layer>),
    Close(ScopeFrame),
}

/// Private walk over one stack snapshot.
pub struct Traversal {
    pending: VecDeque<Step>,
    open: Option<ScopeFrame>,
    strategy: Arc<dyn ScopeStrategy>,
    state: State,
}

impl Traversal {
    pub fn new(layers: &[Arc<Layer>], strategy: Arc<dyn ScopeStrategy>) -> Self {
        Self {
            pending: layers.iter().cloned().map(Step::Layer).collect(),
            open: None,
            strategy,
            state: State::Idle,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Advance to the next layer, writing any scope tags that are due.
    pub fn step(&mut self, cx: &mut Context<'_>) -> Result<Action> {
        let cursor = match self.state {
            State::Idle => 0,
            State::Dispatching { cursor } => cursor,
            State::Halted | State::Done => return Ok(Action::Stopped),
        };

        if let Some(frame) = self.open.take() {
            frame.close(cx);
        }

        loop {
            match self.pending.pop_front() {
                Some(Step::Close(frame)) => frame.close(cx),
                Some(Step::Layer(layer)) => {
                    if self.strategy.is_scoped(layer.path()) {
                        let frame = self.strategy.enter(cx, layer.path())?;
                        match self.strategy.closing() {
                            Closing::Eager => self.pending.push_front(Step::Close(frame)),
                            Closing::Lazy => self.open = Some(frame),
                        }
                    }
                    self.state = State::Dispatching { cursor: cursor + 1 };
                    return Ok(Action::Invoke(layer));
                }
                None => {
                    self.state = State::Done;
                    return Ok(Action::Complete);
                }
            }
        }
    }

    /// Stop for good, closing whatever this traversal still has open.
    pub fn halt(&mut self, cx: &mut Context<'_>) {
        self.state = State::Halted;
        if let Some(frame) = self.open.take() {
            frame.close(cx);
        }
        for step in self.pending.drain(..) {
            if let Step::Close(frame) = step {
                frame.close(cx);
            }
        }
    }

    /// Run handlers until the stack is exhausted or one of them halts.
    pub async fn drive(mut self, cx: &mut Context<'_>) -> Result<Outcome> {
        loop {
            match self.step(cx)? {
                Action::Invoke(layer) => {
                    let scoped = self.strategy.is_scoped(layer.path());
                    tracing::debug!(
                        build_id = %cx.build_id(),
                        handler = layer.handler().name(),
                        path = %layer.path(),
                        depth = cx.depth(),
                        "Invoking layer"
                    );
                    metrics::record_layer(scoped);

                    if layer.handler().call(cx).await? == Flow::Halt {
                        tracing::debug!(
                            build_id = %cx.build_id(),
                            path = %layer.path(),
                            "Layer halted traversal"
                        );
                        self.halt(cx);
                        return Ok(Outcome::Halted);
                    }
                }
                Action::Complete => {
                    // completion never runs in the same poll as the last handler
                    tokio::task::yield_now().await;
                    return Ok(Outcome::Completed);
                }
                Action::Stopped => return Ok(Outcome::Halted),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::Conf;
    use crate::dispatch::layer::handler_fn;
    use crate::dispatch::scope::{ConditionalScope, LocationScope};
    use crate::routing::MountPath;

    fn layers(paths: &[&str]) -> Vec<Arc<Layer>> {
        paths
            .iter()
            .map(|p| {
                Arc::new(Layer::new(
                    MountPath::parse(p).unwrap(),
                    Arc::new(handler_fn(|_| Ok(Flow::Next))),
                ))
            })
            .collect()
    }

    fn invoked(action: Action) -> String {
        match action {
            Action::Invoke(layer) => layer.path().to_string(),
            other => panic!("expected a layer, got {:?}", other),
        }
    }

    #[test]
    fn test_eager_sentinel_runs_before_next_layer() {
        let mut conf = Conf::new();
        let mut cx = Context::new(&mut conf);
        let mut traversal = Traversal::new(&layers(&["/a", "/"]), Arc::new(LocationScope));

        assert_eq!(traversal.state(), State::Idle);
        assert_eq!(invoked(traversal.step(&mut cx).unwrap()), "/a");
        cx.append("a-body");
        assert_eq!(invoked(traversal.step(&mut cx).unwrap()), "/");
        cx.append("root-body");
        assert!(matches!(traversal.step(&mut cx).unwrap(), Action::Complete));
        assert_eq!(traversal.state(), State::Done);
        assert!(matches!(traversal.step(&mut cx).unwrap(), Action::Stopped));

        assert_eq!(
            conf.appended(),
            ["<Location \"/a\">", "a-body", "</Location>", "root-body"]
        );
    }

    #[test]
    fn test_lazy_close_happens_once_per_scope() {
        let mut conf = Conf::new();
        let mut cx = Context::new(&mut conf);
        let mut traversal =
            Traversal::new(&layers(&["/a", "/b", "/"]), Arc::new(ConditionalScope::new()));

        while let Action::Invoke(layer) = traversal.step(&mut cx).unwrap() {
            cx.append(format!("body {}", layer.path()));
        }

        let appended = conf.appended();
        assert_eq!(appended.len(), 7);
        assert!(appended[0].starts_with("<If "));
        assert_eq!(appended[1], "body /a");
        assert_eq!(appended[2], "</If>");
        assert!(appended[3].contains("m#^/b([/.].*)?$#"));
        assert_eq!(appended[4], "body /b");
        assert_eq!(appended[5], "</If>");
        assert_eq!(appended[6], "body /");
    }

    #[test]
    fn test_lazy_scope_closed_at_end_of_stack() {
        let mut conf = Conf::new();
        let mut cx = Context::new(&mut conf);
        let mut traversal = Traversal::new(&layers(&["/a"]), Arc::new(ConditionalScope::new()));

        assert_eq!(invoked(traversal.step(&mut cx).unwrap()), "/a");
        assert!(matches!(traversal.step(&mut cx).unwrap(), Action::Complete));
        assert_eq!(conf.prepended().last().map(String::as_str), Some("</If>"));
        assert_eq!(conf.appended().last().map(String::as_str), Some("</If>"));
    }

    #[test]
    fn test_conditional_path_empty_after_stripping_is_root() {
        let mut conf = Conf::new();
        let mut cx = Context::new(&mut conf);
        let mut traversal =
            Traversal::new(&layers(&["/.", "/a"]), Arc::new(ConditionalScope::new()));

        assert_eq!(invoked(traversal.step(&mut cx).unwrap()), "/.");
        assert_eq!(cx.depth(), 0);
        cx.append("dot-body");
        assert_eq!(invoked(traversal.step(&mut cx).unwrap()), "/a");
        assert_eq!(cx.depth(), 1);

        assert_eq!(conf.appended()[0], "dot-body");
        assert!(conf.appended()[1].starts_with("<If "));
    }

    #[test]
    fn test_halt_closes_open_scope() {
        let mut conf = Conf::new();
        let mut cx = Context::new(&mut conf);
        let mut traversal = Traversal::new(&layers(&["/a", "/b"]), Arc::new(LocationScope));

        assert_eq!(invoked(traversal.step(&mut cx).unwrap()), "/a");
        traversal.halt(&mut cx);
        assert_eq!(traversal.state(), State::Halted);
        assert!(matches!(traversal.step(&mut cx).unwrap(), Action::Stopped));
        assert_eq!(cx.depth(), 0);

        assert_eq!(conf.appended(), ["<Location \"/a\">", "</Location>"]);
    }

    #[tokio::test]
    async fn test_drive_stops_on_halt() {
        let mut conf = Conf::new();
        let mut cx = Context::new(&mut conf);
        let stack = vec![
            Arc::new(Layer::new(
                MountPath::root(),
                Arc::new(handler_fn(|cx| {
                    cx.append("first");
                    Ok(Flow::Halt)
                })),
            )),
            Arc::new(Layer::new(
                MountPath::parse("/never").unwrap(),
                Arc::new(handler_fn(|cx| {
                    cx.append("second");
                    Ok(Flow::Next)
                })),
            )),
        ];

        let outcome = Traversal::new(&stack, Arc::new(LocationScope))
            .drive(&mut cx)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Halted);
        assert_eq!(conf.appended(), ["first"]);
    }
}
