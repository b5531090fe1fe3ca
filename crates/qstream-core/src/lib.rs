//! Core runtime for qstream: entity metadata, accessor resolution, the
//! query stream builder, and the renderer that turns a finished stream into
//! query text plus ordered parameters.
#![warn(unreachable_pub)]

extern crate self as qstream;

// public exports are one module level down
pub mod config;
pub mod error;
pub mod exec;
pub mod model;
pub mod obs;
pub mod query;
pub mod render;
pub mod resolve;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::Error;

///
/// CONSTANTS
///

/// Alias index reserved for the root entity of every query stream.
pub const ROOT_ALIAS: u32 = 0;

///
/// Prelude
///
/// Prelude contains only the vocabulary needed to build and render queries.
/// Caches, sinks, and metrics plumbing stay behind their modules.
///

pub mod prelude {
    pub use crate::{
        model::{entity::EntityModel, field::TemporalKind},
        query::{Query, QueryStream},
        render::{RenderedQuery, Renderer},
        resolve::{Accessor, Field},
        traits::{Association, EntityKind, Path},
        value::Value,
    };
}
