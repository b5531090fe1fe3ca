use crate::{
    model::{entity::EntityModel, field::TemporalKind},
    resolve::{Fingerprint, StructuralKey, naming::field_name_for},
};

///
/// FieldDescriptor
///
/// Resolved identity of one entity field reachable through an accessor.
/// Immutable once built; shared by reference through the descriptor cache,
/// so aliases are bound per query scope (see `query::ScopedField`) rather
/// than stored here.
///

#[derive(Debug)]
pub struct FieldDescriptor {
    fingerprint: Fingerprint,
    entity: &'static EntityModel,
    key: StructuralKey,
    name: String,
    temporal: Option<TemporalKind>,
}

impl FieldDescriptor {
    pub(crate) fn from_key(
        entity: &'static EntityModel,
        key: StructuralKey,
        fingerprint: Fingerprint,
    ) -> Self {
        let name = field_name_for(key.method());
        let temporal = entity.field(&name).and_then(|field| field.temporal);

        Self {
            fingerprint,
            entity,
            key,
            name,
            temporal,
        }
    }

    #[must_use]
    pub const fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Model of the entity this field belongs to.
    #[must_use]
    pub const fn entity(&self) -> &'static EntityModel {
        self.entity
    }

    /// Owning entity name as it appears in query text.
    #[must_use]
    pub const fn entity_name(&self) -> &'static str {
        self.entity.entity_name
    }

    /// Query-facing field name (`lastName`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accessor method name the field was derived from (`last_name`).
    #[must_use]
    pub fn accessor(&self) -> &str {
        self.key.method()
    }

    #[must_use]
    pub const fn key(&self) -> &StructuralKey {
        &self.key
    }

    #[must_use]
    pub const fn temporal(&self) -> Option<TemporalKind> {
        self.temporal
    }
}
