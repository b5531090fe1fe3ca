use crate::{config::ConfigError, render::RenderError, resolve::ResolutionError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Crate-level error surfaced to callers that mix resolution, rendering,
/// and configuration in one `?` chain. Every failure is caller-visible;
/// nothing in the core retries or swallows an error.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("{0}")]
    Resolution(#[from] ResolutionError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Config(#[from] ConfigError),
}

impl Error {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Resolution(ResolutionError::NoOuterScope { .. })
            | Self::Render(RenderError::OrderInSubquery { .. }) => ErrorClass::Unsupported,
            Self::Resolution(_) | Self::Render(_) => ErrorClass::Usage,
            Self::Config(_) => ErrorClass::Config,
        }
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::Resolution(_) => ErrorOrigin::Resolve,
            Self::Render(_) => ErrorOrigin::Render,
            Self::Config(_) => ErrorOrigin::Config,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {self}", self.origin(), self.class())
    }
}

///
/// ErrorClass
/// Coarse failure category, stable across message wording changes.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// The caller passed something the core cannot work with.
    Usage,
    /// The construct is understood but deliberately not rendered.
    Unsupported,
    /// Configuration failed to load or validate.
    Config,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Usage => "usage",
            Self::Unsupported => "unsupported",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Resolve,
    Render,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Resolve => "resolve",
            Self::Render => "render",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
