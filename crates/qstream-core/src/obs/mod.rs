//! Observability: resolution and render telemetry behind a sink boundary.
//!
//! Structured log lines go through `tracing` at the call sites; counters
//! flow through `MetricsEvent` into whichever `MetricsSink` is active.

pub mod metrics;
pub mod sink;


// re-exports
pub use metrics::{EntityCounters, EventOps, EventReport};
pub use sink::{
    MetricsEvent, MetricsSink, ResolveOutcome, metrics_report, metrics_reset_all,
    with_metrics_sink,
};
