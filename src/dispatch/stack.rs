//! The ordered layer stack.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::dispatch::layer::Layer;

/// Append-only sequence of layers.
///
/// Readers take a snapshot and never observe a push that happens while
/// they iterate; a build in progress keeps the stack it started with.
#[derive(Debug)]
pub struct Stack {
    layers: ArcSwap<Vec<Arc<Layer>>>,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            layers: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub fn push(&self, layer: Layer) {
        let layer = Arc::new(layer);
        self.layers.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(layer.clone());
            next
        });
    }

    /// Current layers, in registration order.
    pub fn snapshot(&self) -> Arc<Vec<Arc<Layer>>> {
        self.layers.load_full()
    }

    pub fn len(&self) -> usize {
        self.layers.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::layer::{handler_fn, Flow};
    use crate::routing::MountPath;

    fn layer(path: &str) -> Layer {
        Layer::new(
            MountPath::parse(path).unwrap(),
            Arc::new(handler_fn(|_| Ok(Flow::Next))),
        )
    }

    #[test]
    fn test_snapshot_is_stable() {
        let stack = Stack::new();
        stack.push(layer("/a"));
        let before = stack.snapshot();
        stack.push(layer("/b"));

        assert_eq!(before.len(), 1);
        assert_eq!(stack.len(), 2);
        let paths: Vec<_> = stack.snapshot().iter().map(|l| l.path().to_string()).collect();
        assert_eq!(paths, vec!["/a", "/b"]);
    }
}
