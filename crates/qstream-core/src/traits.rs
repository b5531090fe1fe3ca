use crate::model::entity::EntityModel;

// ============================================================================
// ENTITY IDENTITY
// ============================================================================
//
// These traits describe *what an entity is*; they are implemented by
// `#[derive(Entity)]` and never by hand in normal use.
//

///
/// Path
/// Fully-qualified Rust path of the implementing type.
///

pub trait Path {
    const PATH: &'static str;
}

///
/// EntityKind
///
/// An entity that can be the subject of a query stream.
/// `MODEL` is the macro-generated metadata consulted by resolution and
/// by the default type mapping.
///

pub trait EntityKind: Path + 'static {
    const MODEL: &'static EntityModel;
}

// ============================================================================
// ASSOCIATIONS
// ============================================================================

///
/// Association
///
/// Output type of an accessor that navigates to a related entity.
/// Join and subquery entry points use `Target` to type the child stream.
///

pub trait Association {
    type Target: EntityKind;
}

impl<T: EntityKind> Association for Vec<T> {
    type Target = T;
}

impl<T: EntityKind> Association for [T] {
    type Target = T;
}

impl<T: EntityKind> Association for Option<T> {
    type Target = T;
}

impl<T: EntityKind> Association for Box<T> {
    type Target = T;
}
