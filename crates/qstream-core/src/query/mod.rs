//! Module: query
//! Responsibility: fluent accumulation of expression nodes and the frozen
//!                 query value handed to the renderer.
//! Does not own: accessor resolution (resolve) or query text (render).
//! Boundary: node sequences are only ever appended to; nothing here
//!           rewrites or reorders a node once pushed.

mod compose;
pub mod node;
mod scope;
mod stream;

#[cfg(test)]
mod tests;

use crate::{
    render::{RenderError, RenderedQuery, Renderer},
    traits::EntityKind,
};
use derive_more::{Deref, IntoIterator};
use std::marker::PhantomData;

// re-exports
pub use node::{
    Alias, CompareOp, Connector, Direction, JoinKind, Node, Operand, ScopedField, SubSelect,
    SubSource,
};
pub use stream::QueryStream;

///
/// Nodes
///
/// Insertion-ordered node sequence of a frozen query.
/// Read-only view; a `Query` never changes after `build()`.
///

#[derive(Clone, Debug, Default, Deref, IntoIterator, PartialEq)]
#[into_iterator(owned, ref)]
pub struct Nodes(Vec<Node>);

///
/// Projection
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Projection {
    /// `SELECT c0`
    #[default]
    Entity,
    /// `SELECT count(c0)`
    Count,
}

///
/// PageSpec
///
/// Row window carried beside the rendered text for the execution side.
/// The query grammar itself has no LIMIT clause.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Serialize)]
pub struct PageSpec {
    pub limit: Option<u32>,
    pub offset: u32,
}

impl PageSpec {
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.limit.is_none() && self.offset == 0
    }
}

///
/// Query
///
/// Immutable result of `QueryStream::build`. Modifiers consume and return
/// the query; rendering borrows it and may be repeated.
///

#[derive(Debug)]
pub struct Query<E: EntityKind> {
    root: Alias,
    nodes: Nodes,
    projection: Projection,
    distinct: bool,
    page: PageSpec,
    _marker: PhantomData<fn() -> E>,
}

impl<E: EntityKind> Clone for Query<E> {
    fn clone(&self) -> Self {
        Self {
            root: self.root,
            nodes: self.nodes.clone(),
            projection: self.projection,
            distinct: self.distinct,
            page: self.page,
            _marker: PhantomData,
        }
    }
}

impl<E: EntityKind> Query<E> {
    pub(crate) const fn from_parts(root: Alias, nodes: Vec<Node>) -> Self {
        Self {
            root,
            nodes: Nodes(nodes),
            projection: Projection::Entity,
            distinct: false,
            page: PageSpec {
                limit: None,
                offset: 0,
            },
            _marker: PhantomData,
        }
    }

    // ------------------------------------------------------------------
    // Modifiers
    // ------------------------------------------------------------------

    /// Emit `SELECT DISTINCT`.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Project `count(alias)` instead of the entity.
    #[must_use]
    pub const fn select_count(mut self) -> Self {
        self.projection = Projection::Count;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.page.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.page.offset = offset;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn nodes(&self) -> &Nodes {
        &self.nodes
    }

    #[must_use]
    pub const fn root_alias(&self) -> Alias {
        self.root
    }

    #[must_use]
    pub const fn projection(&self) -> Projection {
        self.projection
    }

    #[must_use]
    pub const fn is_distinct(&self) -> bool {
        self.distinct
    }

    #[must_use]
    pub const fn page(&self) -> PageSpec {
        self.page
    }

    /// Render with default settings.
    pub fn render(&self) -> Result<RenderedQuery, RenderError> {
        Renderer::default().render(self)
    }
}
