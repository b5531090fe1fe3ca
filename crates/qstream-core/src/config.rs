//! Module: config
//! Responsibility: text conventions used by the renderer.
//! Does not own: entity/table naming (see `render::mapping`).
//! Boundary: loaded once by the caller, passed to `Renderer` by value.

use serde::Deserialize;
use thiserror::Error as ThisError;

///
/// RenderConfig
///
/// Tokens the renderer emits around aliases, fields, and parameters.
/// Defaults produce `SELECT c0 FROM Person c0 WHERE c0.lastName like :p0`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Token placed in front of every bound parameter name.
    pub parameter_prefix: String,
    /// Stem of generated parameter names (`p` yields `p0`, `p1`, ...).
    pub parameter_name: String,
    /// Stem of generated aliases (`c` yields `c0`, `c1`, ...).
    pub alias_prefix: String,
    /// Single character between an alias and a field name.
    pub separator: char,
    /// Wildcard wrapped around LIKE operands.
    pub like_wildcard: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            parameter_prefix: ":".to_string(),
            parameter_name: "p".to_string(),
            alias_prefix: "c".to_string(),
            separator: '.',
            like_wildcard: "%".to_string(),
        }
    }
}

impl RenderConfig {
    /// Parse and validate a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Check that the configured tokens can produce well-formed query text.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parameter_prefix.is_empty() {
            return Err(ConfigError::invalid("parameter_prefix", "must not be empty"));
        }
        if !is_identifier(&self.parameter_name) {
            return Err(ConfigError::invalid(
                "parameter_name",
                "must be an ASCII identifier",
            ));
        }
        if !is_identifier(&self.alias_prefix) {
            return Err(ConfigError::invalid("alias_prefix", "must be an ASCII identifier"));
        }
        if self.separator.is_alphanumeric() || self.separator.is_whitespace() || self.separator == '_'
        {
            return Err(ConfigError::invalid(
                "separator",
                "must be a punctuation character",
            ));
        }

        Ok(())
    }

    /// Format the alias token for an allocated alias index.
    #[must_use]
    pub fn alias(&self, index: u32) -> String {
        format!("{}{index}", self.alias_prefix)
    }
}

fn is_identifier(raw: &str) -> bool {
    let mut chars = raw.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to parse render config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid render config key '{key}': {message}")]
    Invalid { key: &'static str, message: &'static str },
}

impl ConfigError {
    const fn invalid(key: &'static str, message: &'static str) -> Self {
        Self::Invalid { key, message }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_keeps_defaults() {
        let config = RenderConfig::from_toml_str("").expect("empty config should parse");

        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn partial_document_overrides_only_named_keys() {
        let config = RenderConfig::from_toml_str(
            r#"
            parameter_name = "arg"
            alias_prefix = "t"
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.parameter_name, "arg");
        assert_eq!(config.alias(3), "t3");
        assert_eq!(config.parameter_prefix, ":");
        assert_eq!(config.separator, '.');
    }

    #[test]
    fn alphanumeric_separator_is_rejected() {
        let err = RenderConfig::from_toml_str(r#"separator = "x""#)
            .expect_err("alphanumeric separator must be rejected");

        assert!(matches!(err, ConfigError::Invalid { key: "separator", .. }));
    }

    #[test]
    fn non_identifier_alias_prefix_is_rejected() {
        let err = RenderConfig::from_toml_str(r#"alias_prefix = "9a""#)
            .expect_err("alias prefix must be an identifier");

        assert!(matches!(err, ConfigError::Invalid { key: "alias_prefix", .. }));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let err = RenderConfig::from_toml_str("dialect = \"mysql\"")
            .expect_err("unknown keys must be rejected");

        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
