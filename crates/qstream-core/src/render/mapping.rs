use crate::{model::entity::EntityModel, resolve::FieldDescriptor};
use std::borrow::Cow;

///
/// TypeMapping
///
/// External naming authority consulted while rendering. `None` means the
/// entity or field has no mapping, which the renderer reports as an error
/// instead of guessing a name.
///

pub trait TypeMapping {
    /// Name the `FROM` clause uses for `entity`.
    fn table_name_for(&self, entity: &'static EntityModel) -> Option<Cow<'static, str>>;

    /// Name emitted after `alias.` for `field`.
    fn column_name_for(&self, field: &FieldDescriptor) -> Option<Cow<'static, str>>;
}

///
/// ModelMapping
///
/// Default mapping backed by the derive-generated model: `#[entity(table)]`
/// and `#[entity(column)]` when given, the entity and field names otherwise.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct ModelMapping;

impl TypeMapping for ModelMapping {
    fn table_name_for(&self, entity: &'static EntityModel) -> Option<Cow<'static, str>> {
        (!entity.table.is_empty()).then_some(Cow::Borrowed(entity.table))
    }

    fn column_name_for(&self, field: &FieldDescriptor) -> Option<Cow<'static, str>> {
        field
            .entity()
            .field(field.name())
            .map(|model| Cow::Borrowed(model.column))
    }
}
