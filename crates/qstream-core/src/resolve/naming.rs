use convert_case::{Case, Casing};

const SNAKE_PREFIXES: [&str; 2] = ["get_", "is_"];
const CAMEL_PREFIXES: [&str; 2] = ["get", "is"];

/// Derive the query-facing field name from an accessor method name.
///
/// A `get_`/`is_` prefix (or camel `get`/`is` followed by an uppercase
/// letter) is stripped when something remains; the rest is lowerCamel-cased.
/// Names without a prefix are used as-is apart from casing.
#[must_use]
pub fn field_name_for(method: &str) -> String {
    strip_accessor_prefix(method).to_case(Case::Camel)
}

fn strip_accessor_prefix(method: &str) -> &str {
    for prefix in SNAKE_PREFIXES {
        if let Some(rest) = method.strip_prefix(prefix)
            && !rest.is_empty()
        {
            return rest;
        }
    }

    for prefix in CAMEL_PREFIXES {
        if let Some(rest) = method.strip_prefix(prefix)
            && rest.starts_with(|c: char| c.is_ascii_uppercase())
        {
            return rest;
        }
    }

    method
}
