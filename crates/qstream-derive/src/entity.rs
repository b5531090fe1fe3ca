use convert_case::{Case, Casing};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Error, Fields, GenericArgument, LitStr, PathArguments, Type,
};

const SNAKE_PREFIXES: [&str; 2] = ["get_", "is_"];

// derive_entity
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    match expand(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(input: &DeriveInput) -> Result<TokenStream, Error> {
    let ident = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "Entity cannot be derived for generic structs",
        ));
    }

    let Data::Struct(data) = &input.data else {
        return Err(Error::new_spanned(
            ident,
            "Entity can only be derived for structs with named fields",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(Error::new_spanned(
            &data.fields,
            "Entity can only be derived for structs with named fields",
        ));
    };

    let entity_attrs = EntityAttrs::parse(&input.attrs)?;
    let entity_name = entity_attrs.name.unwrap_or_else(|| ident.to_string());
    let table = entity_attrs.table.unwrap_or_else(|| entity_name.clone());

    let mut field_models = Vec::new();
    let mut accessors = Vec::new();
    for field in &named.named {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = FieldAttrs::parse(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let raw_ident = field_ident.to_string();
        let raw_ident = raw_ident.trim_start_matches("r#");
        let name = field_name_for(raw_ident);
        let column = attrs.column.unwrap_or_else(|| name.clone());
        let temporal = match attrs.temporal {
            Some(kind) => Some(kind),
            None => infer_temporal(&field.ty),
        };
        let temporal = temporal_tokens(temporal.as_deref(), field)?;

        field_models.push(quote! {
            ::qstream::model::field::EntityFieldModel {
                ident: #raw_ident,
                name: #name,
                column: #column,
                temporal: #temporal,
            }
        });

        let ty = &field.ty;
        let vis = &field.vis;
        let doc = format!("Accessor for `{name}`.");
        accessors.push(quote! {
            #[doc = #doc]
            #[must_use]
            #vis fn #field_ident(&self) -> &#ty {
                &self.#field_ident
            }
        });
    }

    let ident_str = ident.to_string();

    Ok(quote! {
        impl ::qstream::traits::Path for #ident {
            const PATH: &'static str = concat!(module_path!(), "::", #ident_str);
        }

        impl ::qstream::traits::EntityKind for #ident {
            const MODEL: &'static ::qstream::model::entity::EntityModel =
                &::qstream::model::entity::EntityModel {
                    path: <Self as ::qstream::traits::Path>::PATH,
                    entity_name: #entity_name,
                    table: #table,
                    fields: &[#(#field_models),*],
                };
        }

        impl ::qstream::traits::Association for #ident {
            type Target = Self;
        }

        impl #ident {
            #(#accessors)*
        }
    })
}

///
/// EntityAttrs
///

#[derive(Default)]
struct EntityAttrs {
    name: Option<String>,
    table: Option<String>,
}

impl EntityAttrs {
    fn parse(attrs: &[Attribute]) -> Result<Self, Error> {
        let mut out = Self::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("entity")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    out.name = Some(meta.value()?.parse::<LitStr>()?.value());
                    Ok(())
                } else if meta.path.is_ident("table") {
                    out.table = Some(meta.value()?.parse::<LitStr>()?.value());
                    Ok(())
                } else {
                    Err(meta.error("unknown entity attribute; expected `name` or `table`"))
                }
            })?;
        }

        Ok(out)
    }
}

///
/// FieldAttrs
///

#[derive(Default)]
struct FieldAttrs {
    column: Option<String>,
    temporal: Option<String>,
    skip: bool,
}

impl FieldAttrs {
    fn parse(attrs: &[Attribute]) -> Result<Self, Error> {
        let mut out = Self::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("entity")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("column") {
                    out.column = Some(meta.value()?.parse::<LitStr>()?.value());
                    Ok(())
                } else if meta.path.is_ident("temporal") {
                    out.temporal = Some(meta.value()?.parse::<LitStr>()?.value());
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    out.skip = true;
                    Ok(())
                } else {
                    Err(meta.error(
                        "unknown field attribute; expected `column`, `temporal`, or `skip`",
                    ))
                }
            })?;
        }

        Ok(out)
    }
}

// Must agree with the resolver's accessor naming so that the method name
// recovered at runtime finds this field's model entry.
fn field_name_for(ident: &str) -> String {
    let stripped = SNAKE_PREFIXES
        .iter()
        .find_map(|prefix| ident.strip_prefix(prefix).filter(|rest| !rest.is_empty()))
        .unwrap_or(ident);

    stripped.to_case(Case::Camel)
}

fn temporal_tokens(kind: Option<&str>, field: &syn::Field) -> Result<TokenStream, Error> {
    let variant = match kind {
        None => return Ok(quote!(None)),
        Some("date") => quote!(Date),
        Some("time") => quote!(Time),
        Some("timestamp") => quote!(Timestamp),
        Some(other) => {
            return Err(Error::new_spanned(
                field,
                format!("unknown temporal kind '{other}'; expected date, time, or timestamp"),
            ));
        }
    };

    Ok(quote!(Some(::qstream::model::field::TemporalKind::#variant)))
}

fn infer_temporal(ty: &Type) -> Option<String> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;

    let kind = match segment.ident.to_string().as_str() {
        "Date" => "date",
        "Time" => "time",
        "PrimitiveDateTime" | "OffsetDateTime" => "timestamp",
        "Option" => return option_inner(&segment.arguments).and_then(infer_temporal),
        _ => return None,
    };

    Some(kind.to_string())
}

fn option_inner(arguments: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = arguments else {
        return None;
    };

    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

///
/// TESTS
///
