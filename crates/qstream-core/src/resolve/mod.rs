//! Module: resolve
//! Responsibility: turn accessor values into cached field descriptors.
//! Does not own: alias binding (query scopes) or column naming (render).
//! Boundary: the only process-wide mutable state lives in `cache`.

mod accessor;
mod cache;
mod descriptor;
mod fingerprint;
mod key;
mod naming;


use crate::{
    obs::sink::{self, MetricsEvent, ResolveOutcome},
    traits::EntityKind,
};
use std::{any::type_name, sync::Arc};
use thiserror::Error as ThisError;

// re-exports
pub use accessor::{Accessor, Field, Getter, Navigate};
pub use cache::{CacheOutcome, CacheStats, DescriptorCache};
pub use descriptor::FieldDescriptor;
pub use fingerprint::Fingerprint;
pub use key::StructuralKey;
pub use naming::field_name_for;

///
/// ResolutionError
///
/// An accessor could not be reduced to a field identity. Fatal to the call
/// that raised it; the calling builder keeps its pre-call state.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ResolutionError {
    #[error("accessor '{type_name}' cannot be resolved to a field: {reason}")]
    NotReducible {
        type_name: String,
        reason: &'static str,
    },

    #[error("no enclosing query scope over entity '{entity}' for correlated field '{field}'")]
    NoOuterScope { entity: String, field: String },
}

///
/// Resolver
///
/// Resolves accessors through a descriptor cache. Cheap to clone; clones
/// share the cache.
///

#[derive(Clone, Debug)]
pub struct Resolver {
    cache: Arc<DescriptorCache>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::global()
    }
}

impl Resolver {
    /// Resolver backed by an injected cache (tests use a fresh one each).
    #[must_use]
    pub const fn new(cache: Arc<DescriptorCache>) -> Self {
        Self { cache }
    }

    /// Resolver backed by the process-wide cache.
    #[must_use]
    pub fn global() -> Self {
        Self::new(DescriptorCache::global())
    }

    #[must_use]
    pub const fn cache(&self) -> &Arc<DescriptorCache> {
        &self.cache
    }

    /// Resolve `accessor` to the shared descriptor for its field.
    pub fn resolve<E, A>(&self, accessor: &A) -> Result<Arc<FieldDescriptor>, ResolutionError>
    where
        E: EntityKind,
        A: Accessor<E> + ?Sized,
    {
        let key = match <A as Accessor<E>>::structural_key(accessor) {
            Ok(key) => key,
            Err(err) => {
                tracing::warn!(entity = E::MODEL.entity_name, error = %err, "accessor resolution failed");
                sink::record(MetricsEvent::Resolve {
                    entity_path: E::PATH,
                    outcome: ResolveOutcome::Failed,
                });
                return Err(err);
            }
        };

        let fingerprint = Fingerprint::of(&key, type_name::<E>());
        let (descriptor, outcome) = self.cache.lookup(fingerprint, || {
            FieldDescriptor::from_key(E::MODEL, key, fingerprint)
        });

        match outcome {
            CacheOutcome::Hit => {
                tracing::trace!(
                    fingerprint = %fingerprint.short(),
                    field = descriptor.name(),
                    "accessor cache hit"
                );
            }
            CacheOutcome::Computed => {
                tracing::debug!(
                    fingerprint = %fingerprint.short(),
                    entity = descriptor.entity_name(),
                    accessor = descriptor.accessor(),
                    field = descriptor.name(),
                    "accessor resolved"
                );
            }
        }

        sink::record(MetricsEvent::Resolve {
            entity_path: E::PATH,
            outcome: match outcome {
                CacheOutcome::Hit => ResolveOutcome::Hit,
                CacheOutcome::Computed => ResolveOutcome::Miss,
            },
        });

        Ok(descriptor)
    }
}
