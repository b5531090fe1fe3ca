use crate::resolve::ResolutionError;
use std::fmt;

///
/// StructuralKey
///
/// Declaring type path plus method name of an accessor.
/// Two accessor values built from the same method path produce equal keys;
/// object identity never participates.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StructuralKey {
    declaring: String,
    method: String,
}

impl StructuralKey {
    /// Build a key from an explicitly recorded declaring type and method.
    pub fn declared(declaring: &str, method: &str) -> Result<Self, ResolutionError> {
        if declaring.is_empty() || !is_identifier(method) {
            return Err(ResolutionError::NotReducible {
                type_name: format!("{declaring}::{method}"),
                reason: "declared accessors need a type path and an identifier method name",
            });
        }

        Ok(Self {
            declaring: declaring.to_string(),
            method: method.to_string(),
        })
    }

    /// Recover the key from an accessor's type name.
    ///
    /// Accepts `path::Type::method`, `<path::Type as path::Trait>::method`,
    /// and a trailing turbofish. Everything else is rejected.
    pub fn from_type_name(type_name: &str) -> Result<Self, ResolutionError> {
        let reject = |reason: &'static str| ResolutionError::NotReducible {
            type_name: type_name.to_string(),
            reason,
        };

        let trimmed = type_name.trim();
        if trimmed.contains("{{closure}}") {
            return Err(reject(
                "closures carry no method path; pass `Entity::method` or a declared `Field`",
            ));
        }
        if ["fn(", "for<", "unsafe ", "extern ", "&", "*", "dyn ", "("]
            .iter()
            .any(|prefix| trimmed.starts_with(prefix))
        {
            return Err(reject(
                "function pointers and trait objects carry no method path",
            ));
        }

        let segments = split_top_level(trimmed);
        let mut tail = segments.len();
        // drop a trailing `::<T>` turbofish
        if tail > 1 && segments[tail - 1].starts_with('<') {
            tail -= 1;
        }
        if tail < 2 {
            return Err(reject("accessor path has no declaring type"));
        }

        let method = segments[tail - 1];
        if !is_identifier(method) {
            return Err(reject("accessor path does not end in a method name"));
        }

        Ok(Self {
            declaring: segments[..tail - 1].join("::"),
            method: method.to_string(),
        })
    }

    #[must_use]
    pub fn declaring(&self) -> &str {
        &self.declaring
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl fmt::Display for StructuralKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring, self.method)
    }
}

// Split on `::` outside of angle brackets. `->` inside generics is not a
// closing bracket.
fn split_top_level(path: &str) -> Vec<&str> {
    let bytes = path.as_bytes();
    let mut segments = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&path[start..i]);
                start = i + 2;
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(&path[start..]);

    segments
}

fn is_identifier(raw: &str) -> bool {
    let mut chars = raw.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}
