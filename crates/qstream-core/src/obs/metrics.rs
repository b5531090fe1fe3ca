use serde::Serialize;
use std::{
    collections::BTreeMap,
    sync::{
        PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

///
/// EventOps
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Resolution
    pub resolve_hits: u64,
    pub resolve_misses: u64,
    pub resolve_failures: u64,

    // Rendering
    pub renders: u64,
    pub render_failures: u64,
    pub parameters_bound: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EntityCounters {
    pub resolve_hits: u64,
    pub resolve_misses: u64,
    pub resolve_failures: u64,
    pub renders: u64,
    pub render_failures: u64,
}

///
/// EventReport
/// Point-in-time snapshot handed to callers.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
}

///
/// Counter
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Counter {
    ResolveHit,
    ResolveMiss,
    ResolveFailure,
    Render,
    RenderFailure,
    ParametersBound,
}

///
/// Counters
/// Lock-free cells for one scope: the process totals or one entity.
///

#[derive(Debug, Default)]
struct Counters {
    resolve_hits: AtomicU64,
    resolve_misses: AtomicU64,
    resolve_failures: AtomicU64,
    renders: AtomicU64,
    render_failures: AtomicU64,
    parameters_bound: AtomicU64,
}

impl Counters {
    const fn new() -> Self {
        Self {
            resolve_hits: AtomicU64::new(0),
            resolve_misses: AtomicU64::new(0),
            resolve_failures: AtomicU64::new(0),
            renders: AtomicU64::new(0),
            render_failures: AtomicU64::new(0),
            parameters_bound: AtomicU64::new(0),
        }
    }

    const fn cell(&self, counter: Counter) -> &AtomicU64 {
        match counter {
            Counter::ResolveHit => &self.resolve_hits,
            Counter::ResolveMiss => &self.resolve_misses,
            Counter::ResolveFailure => &self.resolve_failures,
            Counter::Render => &self.renders,
            Counter::RenderFailure => &self.render_failures,
            Counter::ParametersBound => &self.parameters_bound,
        }
    }

    fn add(&self, counter: Counter, n: u64) {
        self.cell(counter).fetch_add(n, Ordering::Relaxed);
    }

    fn get(&self, counter: Counter) -> u64 {
        self.cell(counter).load(Ordering::Relaxed)
    }

    fn ops(&self) -> EventOps {
        EventOps {
            resolve_hits: self.get(Counter::ResolveHit),
            resolve_misses: self.get(Counter::ResolveMiss),
            resolve_failures: self.get(Counter::ResolveFailure),
            renders: self.get(Counter::Render),
            render_failures: self.get(Counter::RenderFailure),
            parameters_bound: self.get(Counter::ParametersBound),
        }
    }

    fn entity(&self) -> EntityCounters {
        EntityCounters {
            resolve_hits: self.get(Counter::ResolveHit),
            resolve_misses: self.get(Counter::ResolveMiss),
            resolve_failures: self.get(Counter::ResolveFailure),
            renders: self.get(Counter::Render),
            render_failures: self.get(Counter::RenderFailure),
        }
    }

    fn reset(&self) {
        for cell in [
            &self.resolve_hits,
            &self.resolve_misses,
            &self.resolve_failures,
            &self.renders,
            &self.render_failures,
            &self.parameters_bound,
        ] {
            cell.store(0, Ordering::Relaxed);
        }
    }
}

// Resolution runs on arbitrary threads, so the state is process-wide.
// Counting never takes an exclusive lock once an entity has been seen.
static OPS: Counters = Counters::new();
static ENTITIES: RwLock<BTreeMap<&'static str, Counters>> = RwLock::new(BTreeMap::new());

/// Add `n` to one counter, both in the totals and for `entity_path`.
pub(crate) fn add(entity_path: &'static str, counter: Counter, n: u64) {
    OPS.add(counter, n);

    {
        let entities = ENTITIES.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(counters) = entities.get(entity_path) {
            counters.add(counter, n);
            return;
        }
    }

    ENTITIES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(entity_path)
        .or_default()
        .add(counter, n);
}

/// Reset all counters (useful in tests).
pub fn reset_all() {
    OPS.reset();
    ENTITIES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}

/// Snapshot the current counters.
#[must_use]
pub fn report() -> EventReport {
    let entities = ENTITIES.read().unwrap_or_else(PoisonError::into_inner);

    EventReport {
        ops: OPS.ops(),
        entities: entities
            .iter()
            .map(|(path, counters)| ((*path).to_string(), counters.entity()))
            .collect(),
    }
}
