//! Process-wide descriptor cache; write-once per fingerprint, never evicted.

use crate::resolve::{FieldDescriptor, Fingerprint};
use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex, MutexGuard, OnceLock, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

type Cell = Arc<OnceLock<Arc<FieldDescriptor>>>;

static GLOBAL: OnceLock<Arc<DescriptorCache>> = OnceLock::new();

///
/// CacheOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CacheOutcome {
    Hit,
    Computed,
}

///
/// CacheStats
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub size: usize,
}

///
/// DescriptorCache
///
/// Fingerprint → descriptor store with at most one computation per key.
///
/// The map lock is held only long enough to fetch or create the per-key
/// cell; computation runs inside that cell's `OnceLock`, so concurrent
/// callers for the same key wait for the first one while callers for other
/// keys proceed.
///

#[derive(Debug, Default)]
pub struct DescriptorCache {
    cells: Mutex<BTreeMap<Fingerprint, Cell>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl DescriptorCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared process-wide instance, created on first use.
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
    }

    /// Return the descriptor for `fingerprint`, running `compute` only if no
    /// caller has published one yet.
    pub fn get_or_compute(
        &self,
        fingerprint: Fingerprint,
        compute: impl FnOnce() -> FieldDescriptor,
    ) -> Arc<FieldDescriptor> {
        self.lookup(fingerprint, compute).0
    }

    pub(crate) fn lookup(
        &self,
        fingerprint: Fingerprint,
        compute: impl FnOnce() -> FieldDescriptor,
    ) -> (Arc<FieldDescriptor>, CacheOutcome) {
        let cell = Arc::clone(self.cells().entry(fingerprint).or_default());

        let mut outcome = CacheOutcome::Hit;
        let descriptor = cell.get_or_init(|| {
            outcome = CacheOutcome::Computed;
            Arc::new(compute())
        });

        // Stats are best-effort; relaxed ordering is enough.
        match outcome {
            CacheOutcome::Hit => self.hits.fetch_add(1, Ordering::Relaxed),
            CacheOutcome::Computed => self.misses.fetch_add(1, Ordering::Relaxed),
        };

        (Arc::clone(descriptor), outcome)
    }

    /// Published descriptor for `fingerprint`, if any.
    #[must_use]
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Arc<FieldDescriptor>> {
        self.cells()
            .get(fingerprint)
            .and_then(|cell| cell.get().cloned())
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let size = self
            .cells()
            .values()
            .filter(|cell| cell.get().is_some())
            .count();

        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size,
        }
    }

    // Entries are write-once, so a panic elsewhere cannot leave the map in a
    // torn state; recover the guard instead of propagating poison.
    fn cells(&self) -> MutexGuard<'_, BTreeMap<Fingerprint, Cell>> {
        self.cells.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
