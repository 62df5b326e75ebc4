//! Metrics collection.
//!
//! # Metrics
//! - `confbuild_builds_total` (counter): finished builds by outcome
//! - `confbuild_build_duration_seconds` (histogram): time from start to completion
//! - `confbuild_layers_total` (counter): invoked layers, by whether they were scoped
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; with no recorder installed
//!   it is a no-op, so library users may install their own
//! - The binary installs the Prometheus exporter only for long-running
//!   commands and only when an address is configured

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::dispatch::Outcome;

/// Install the global Prometheus recorder with a scrape endpoint on `addr`.
///
/// Must be called from inside a tokio runtime.
pub fn init_exporter(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_build(outcome: Outcome, start: Instant) {
    let label = match outcome {
        Outcome::Completed => "completed",
        Outcome::Halted => "halted",
    };
    ::metrics::counter!("confbuild_builds_total", "outcome" => label).increment(1);
    ::metrics::histogram!("confbuild_build_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_build_error() {
    ::metrics::counter!("confbuild_builds_total", "outcome" => "error").increment(1);
}

pub fn record_layer(scoped: bool) {
    let label = if scoped { "true" } else { "false" };
    ::metrics::counter!("confbuild_layers_total", "scoped" => label).increment(1);
}
