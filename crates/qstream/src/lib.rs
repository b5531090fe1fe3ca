//! ## Crate layout
//! - `core`: runtime model, accessor resolution, query streams, rendering.
//! - `macros`: `#[derive(Entity)]`, which records entity metadata and
//!   generates the accessor methods query streams resolve.
//!
//! The runtime modules are re-exported at the root so derive output can
//! name them as `::qstream::<module>`. `prelude` carries the vocabulary
//! needed to build and render a query.

pub use qstream_core as core;
pub use qstream_derive as macros;

pub use qstream_core::{
    config, error, exec, model, obs, query, render, resolve, traits, value,
};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use qstream_core::{Error, ROOT_ALIAS};
pub use qstream_derive::Entity;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Entity,
        core::{
            config::RenderConfig,
            exec::Executor,
            prelude::*,
            query::{CompareOp, Direction, JoinKind},
            resolve::ResolutionError,
        },
    };
}
