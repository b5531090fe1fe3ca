//! Metrics sink boundary.
//!
//! Resolution and rendering MUST NOT touch obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between query logic and the
//! global metrics state.
use crate::obs::metrics::{self, Counter};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// ResolveOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolveOutcome {
    Hit,
    Miss,
    Failed,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    Resolve {
        entity_path: &'static str,
        outcome: ResolveOutcome,
    },
    RenderFinish {
        entity_path: &'static str,
        parameters: u64,
    },
    RenderFailed {
        entity_path: &'static str,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the process-wide counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::Resolve {
                entity_path,
                outcome,
            } => {
                let counter = match outcome {
                    ResolveOutcome::Hit => Counter::ResolveHit,
                    ResolveOutcome::Miss => Counter::ResolveMiss,
                    ResolveOutcome::Failed => Counter::ResolveFailure,
                };
                metrics::add(entity_path, counter, 1);
            }

            MetricsEvent::RenderFinish {
                entity_path,
                parameters,
            } => {
                metrics::add(entity_path, Counter::Render, 1);
                metrics::add(entity_path, Counter::ParametersBound, parameters);
            }

            MetricsEvent::RenderFailed { entity_path } => {
                metrics::add(entity_path, Counter::RenderFailure, 1);
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    if let Some(sink) = override_sink {
        sink.record(event);
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the process-wide counters.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all process-wide counters.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary, thread-local metrics sink override.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let previous = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = previous;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}
