//! Execution boundary.
//!
//! The core renders; it never executes. Callers hand a `RenderedQuery` to
//! whatever implements `Executor` for their backend.

use crate::render::RenderedQuery;

///
/// Executor
///
/// Accepts rendered text plus parameters and returns rows or an
/// affected-row count. `query.page` carries the row window.
///

pub trait Executor {
    type Row;
    type Error;

    /// Run a selecting query and return its rows.
    fn fetch(&self, query: &RenderedQuery) -> Result<Vec<Self::Row>, Self::Error>;

    /// Run a modifying statement and return the affected-row count.
    fn execute(&self, query: &RenderedQuery) -> Result<u64, Self::Error>;
}
