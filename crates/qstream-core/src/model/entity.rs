use crate::model::field::EntityFieldModel;

///
/// EntityModel
/// Minimal, macro-generated runtime model for one entity.
///

#[derive(Debug)]
pub struct EntityModel {
    /// Fully-qualified Rust type path (for dispatch and diagnostics).
    pub path: &'static str,
    /// Entity name as it appears in rendered query text.
    pub entity_name: &'static str,
    /// Mapped table/type name consumed by the default type mapping.
    pub table: &'static str,
    /// Ordered field list.
    pub fields: &'static [EntityFieldModel],
}

impl EntityModel {
    /// Look up a field by its query-facing name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static EntityFieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Look up a field by its Rust identifier.
    #[must_use]
    pub fn field_by_ident(&self, ident: &str) -> Option<&'static EntityFieldModel> {
        self.fields.iter().find(|field| field.ident == ident)
    }
}

impl PartialEq for EntityModel {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for EntityModel {}
