//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use apache_connect::{handler_fn, Context, DirectiveSink, Flow, Handler, Result};
use futures_util::future::BoxFuture;

/// Handler that appends `line` and continues.
pub fn writer(line: &'static str) -> impl Handler {
    handler_fn(move |cx| {
        cx.append(line);
        Ok(Flow::Next)
    })
}

/// Handler that appends `line` and stops the build.
pub fn stopper(line: &'static str) -> impl Handler {
    handler_fn(move |cx| {
        cx.append(line);
        Ok(Flow::Halt)
    })
}

/// Handler that counts its invocations.
pub fn counter(calls: Arc<AtomicUsize>) -> impl Handler {
    handler_fn(move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(Flow::Next)
    })
}

/// Handler that suspends before writing, so concurrent builds interleave.
pub struct Deferred {
    pub line: &'static str,
    pub yields: usize,
}

impl Handler for Deferred {
    fn call<'a, 'b>(&'a self, cx: &'a mut Context<'b>) -> BoxFuture<'a, Result<Flow>> {
        Box::pin(async move {
            for _ in 0..self.yields {
                tokio::task::yield_now().await;
            }
            cx.append(self.line);
            Ok(Flow::Next)
        })
    }

    fn name(&self) -> &str {
        "deferred"
    }
}

/// A sink with only the two required operations, recording into a shared log.
#[derive(Clone, Default)]
pub struct MinimalSink {
    pub log: Arc<Mutex<Vec<String>>>,
}

impl MinimalSink {
    pub fn lines(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl DirectiveSink for MinimalSink {
    fn prepend_directive(&mut self, line: &str) {
        self.log.lock().unwrap().push(format!("C {}", line));
    }

    fn add_directive(&mut self, line: &str) {
        self.log.lock().unwrap().push(format!("c {}", line));
    }
}
