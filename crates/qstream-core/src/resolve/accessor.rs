use crate::{
    resolve::{ResolutionError, StructuralKey},
    traits::EntityKind,
};
use std::{any::type_name, marker::PhantomData};

///
/// Getter
///
/// Lifetime-indexed view of "something that names a field of `&E`".
/// Lets one blanket impl cover getters returning owned values and getters
/// returning borrows tied to the entity. The default key comes from the
/// implementing type's path; declared fields override it.
///

pub trait Getter<'a, E: 'a> {
    fn structural_key(&self) -> Result<StructuralKey, ResolutionError> {
        StructuralKey::from_type_name(type_name::<Self>())
    }
}

impl<'a, E: 'a, F, O> Getter<'a, E> for F where F: Fn(&'a E) -> O {}

///
/// Accessor
///
/// A value that names one field of `E` without a string literal.
///
/// Method paths (`Person::last_name`) are zero-sized fn items whose type
/// carries the declaring type and method name; `structural_key` recovers
/// that identity without ever calling the accessor. Closures, function
/// pointers, and trait objects have no such path and are rejected.
/// Declared `Field`s reach this impl through their own `Getter` impl.
///

pub trait Accessor<E>: 'static {
    fn structural_key(&self) -> Result<StructuralKey, ResolutionError>;
}

impl<E, F> Accessor<E> for F
where
    E: EntityKind,
    F: for<'a> Getter<'a, E> + 'static,
{
    fn structural_key(&self) -> Result<StructuralKey, ResolutionError> {
        <Self as Getter<'_, E>>::structural_key(self)
    }
}

///
/// Navigate
///
/// Accessor output seen through a borrow, used by joins and subqueries to
/// learn the associated collection (or single entity) type `C`.
///

pub trait Navigate<E, C: ?Sized> {}

impl<E, C, F> Navigate<E, C> for F
where
    C: ?Sized,
    F: Fn(&E) -> &C,
{
}

///
/// Field
///
/// Explicitly declared accessor: the structural key is recorded by the
/// caller instead of recovered from a method path. `T` is the field's type
/// and only matters for joins (`Field<Person, Vec<Address>>`).
///

pub struct Field<E, T: ?Sized = ()> {
    method: &'static str,
    _marker: PhantomData<(fn() -> E, fn() -> *const T)>,
}

impl<E, T: ?Sized> Field<E, T> {
    /// Declare an accessor by its method (or field) name.
    #[must_use]
    pub const fn declared(method: &'static str) -> Self {
        Self {
            method,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn method(&self) -> &'static str {
        self.method
    }
}

impl<E, T: ?Sized> Clone for Field<E, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, T: ?Sized> Copy for Field<E, T> {}

impl<'a, E, T> Getter<'a, E> for Field<E, T>
where
    E: EntityKind + 'a,
    T: ?Sized,
{
    fn structural_key(&self) -> Result<StructuralKey, ResolutionError> {
        StructuralKey::declared(type_name::<E>(), self.method)
    }
}

impl<E, T: ?Sized> Navigate<E, T> for Field<E, T> {}
