use serde::{Deserialize, Serialize};
use std::fmt;

///
/// EntityFieldModel
/// Runtime field metadata used by resolution and the default type mapping.
///

#[derive(Debug, Eq, PartialEq)]
pub struct EntityFieldModel {
    /// Rust identifier of the struct field.
    pub ident: &'static str,
    /// Field name as used in query text (lowerCamel form of `ident`).
    pub name: &'static str,
    /// Mapped column name; equals `name` unless overridden.
    pub column: &'static str,
    /// Temporal binding hint for date/time fields.
    pub temporal: Option<TemporalKind>,
}

///
/// TemporalKind
///
/// Semantic tag telling the execution side how to bind a temporal value.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum TemporalKind {
    Date,
    Time,
    Timestamp,
}

impl TemporalKind {
    /// Parse the attribute spelling used by `#[entity(temporal = "...")]`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            "timestamp" => Some(Self::Timestamp),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for TemporalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
