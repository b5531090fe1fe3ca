use proc_macro::TokenStream;

mod entity;

/// Record entity metadata and generate one accessor method per field.
///
/// Struct attributes: `#[entity(name = "..", table = "..")]`.
/// Field attributes: `#[entity(column = "..", temporal = "date" | "time" |
/// "timestamp", skip)]`.
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    entity::derive_entity(input.into()).into()
}
