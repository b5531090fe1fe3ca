//! Module: query::compose
//! Responsibility: child streams for joins, subqueries, and correlation.
//! Does not own: rendering of the nodes it produces.
//! Boundary: every child draws aliases from the parent's allocator and
//!           hands it back only when the child was configured successfully.

use crate::{
    query::{
        QueryStream,
        node::{Alias, CompareOp, JoinKind, Node, Operand, ScopedField, SubSelect, SubSource},
    },
    resolve::{Accessor, Navigate, ResolutionError},
    traits::{Association, EntityKind},
};

impl<E: EntityKind> QueryStream<E> {
    // ------------------------------------------------------------------
    // Joins
    // ------------------------------------------------------------------

    /// Inner join over an association of `E`.
    ///
    /// `configure` receives a stream scoped to the associated entity; its
    /// predicates render as the join's `ON` condition.
    pub fn join<A, C, F>(&mut self, association: A, configure: F) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E> + Navigate<E, C>,
        C: Association + ?Sized,
        F: FnOnce(&mut QueryStream<C::Target>) -> Result<(), ResolutionError>,
    {
        self.push_join(JoinKind::Inner, &association, configure)
    }

    pub fn left_join<A, C, F>(
        &mut self,
        association: A,
        configure: F,
    ) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E> + Navigate<E, C>,
        C: Association + ?Sized,
        F: FnOnce(&mut QueryStream<C::Target>) -> Result<(), ResolutionError>,
    {
        self.push_join(JoinKind::Left, &association, configure)
    }

    pub fn fetch_join<A, C, F>(
        &mut self,
        association: A,
        configure: F,
    ) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E> + Navigate<E, C>,
        C: Association + ?Sized,
        F: FnOnce(&mut QueryStream<C::Target>) -> Result<(), ResolutionError>,
    {
        self.push_join(JoinKind::Fetch, &association, configure)
    }

    pub fn left_fetch_join<A, C, F>(
        &mut self,
        association: A,
        configure: F,
    ) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E> + Navigate<E, C>,
        C: Association + ?Sized,
        F: FnOnce(&mut QueryStream<C::Target>) -> Result<(), ResolutionError>,
    {
        self.push_join(JoinKind::LeftFetch, &association, configure)
    }

    // ------------------------------------------------------------------
    // Subqueries
    // ------------------------------------------------------------------

    /// `EXISTS (SELECT cN FROM <alias>.<association> cN WHERE ...)`.
    pub fn exists<A, C, F>(&mut self, association: A, configure: F) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E> + Navigate<E, C>,
        C: Association + ?Sized,
        F: FnOnce(&mut QueryStream<C::Target>) -> Result<(), ResolutionError>,
    {
        self.push_exists(false, &association, configure)
    }

    pub fn not_exists<A, C, F>(
        &mut self,
        association: A,
        configure: F,
    ) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E> + Navigate<E, C>,
        C: Association + ?Sized,
        F: FnOnce(&mut QueryStream<C::Target>) -> Result<(), ResolutionError>,
    {
        self.push_exists(true, &association, configure)
    }

    /// `<field> in (SELECT cN.<select> FROM <S> cN WHERE ...)`.
    ///
    /// The subquery ranges over any entity `S`; use `eq_outer` inside
    /// `configure` to correlate it with this stream.
    pub fn in_subquery<S, A, B, F>(
        &mut self,
        accessor: A,
        select: B,
        configure: F,
    ) -> Result<&mut Self, ResolutionError>
    where
        S: EntityKind,
        A: Accessor<E>,
        B: Accessor<S>,
        F: FnOnce(&mut QueryStream<S>) -> Result<(), ResolutionError>,
    {
        self.push_in_subquery(false, &accessor, &select, configure)
    }

    pub fn not_in_subquery<S, A, B, F>(
        &mut self,
        accessor: A,
        select: B,
        configure: F,
    ) -> Result<&mut Self, ResolutionError>
    where
        S: EntityKind,
        A: Accessor<E>,
        B: Accessor<S>,
        F: FnOnce(&mut QueryStream<S>) -> Result<(), ResolutionError>,
    {
        self.push_in_subquery(true, &accessor, &select, configure)
    }

    // ------------------------------------------------------------------
    // Correlation
    // ------------------------------------------------------------------

    /// Compare a field of this scope with a field of the nearest enclosing
    /// scope over `P`.
    pub fn compare_outer<P, A, B>(
        &mut self,
        accessor: A,
        op: CompareOp,
        outer: B,
    ) -> Result<&mut Self, ResolutionError>
    where
        P: EntityKind,
        A: Accessor<E>,
        B: Accessor<P>,
    {
        let field = self.field(&accessor)?;
        let outer_descriptor = self.resolver.resolve::<P, B>(&outer)?;
        let Some(outer_alias) = self.scope.find_outer(P::PATH) else {
            return Err(ResolutionError::NoOuterScope {
                entity: P::MODEL.entity_name.to_string(),
                field: outer_descriptor.name().to_string(),
            });
        };

        let operand = if op.is_unary() {
            Operand::None
        } else {
            Operand::Field(ScopedField::new(outer_descriptor, outer_alias))
        };
        self.push_condition(Node::Predicate { field, op, operand });

        Ok(self)
    }

    /// `<field> = <outer alias>.<outer field>`.
    pub fn eq_outer<P, A, B>(&mut self, accessor: A, outer: B) -> Result<&mut Self, ResolutionError>
    where
        P: EntityKind,
        A: Accessor<E>,
        B: Accessor<P>,
    {
        self.compare_outer::<P, A, B>(accessor, CompareOp::Eq, outer)
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    /// Configure a child stream over `C` with a freshly allocated alias.
    ///
    /// Allocation happens on a copy of the allocator; the parent only
    /// advances when `configure` succeeds.
    fn child<C, F>(&self, orders: usize, configure: F) -> Result<QueryStream<C>, ResolutionError>
    where
        C: EntityKind,
        F: FnOnce(&mut QueryStream<C>) -> Result<(), ResolutionError>,
    {
        let mut aliases = self.aliases;
        let alias = aliases.allocate();
        let scope = self.scope.child(C::PATH, alias);

        let mut child = QueryStream::scoped(self.resolver.clone(), scope, aliases);
        child.orders = orders;
        configure(&mut child)?;

        Ok(child)
    }

    fn push_join<A, C, F>(
        &mut self,
        kind: JoinKind,
        association: &A,
        configure: F,
    ) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E> + Navigate<E, C>,
        C: Association + ?Sized,
        F: FnOnce(&mut QueryStream<C::Target>) -> Result<(), ResolutionError>,
    {
        let association = self.field(association)?;
        let child = self.child(self.orders, configure)?;

        // join ordering clauses share the root ORDER BY sequence
        self.orders = child.orders;
        self.aliases = child.aliases;
        self.nodes.push(Node::Join {
            kind,
            association,
            alias: child.scope.alias(),
            nodes: child.nodes,
        });

        Ok(self)
    }

    fn push_exists<A, C, F>(
        &mut self,
        negated: bool,
        association: &A,
        configure: F,
    ) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E> + Navigate<E, C>,
        C: Association + ?Sized,
        F: FnOnce(&mut QueryStream<C::Target>) -> Result<(), ResolutionError>,
    {
        let association = self.field(association)?;
        let child = self.child(0, configure)?;

        self.aliases = child.aliases;
        let subquery = sub_select(SubSource::Path(association), child.scope.alias(), None, child.nodes);
        self.push_condition(Node::Exists { negated, subquery });

        Ok(self)
    }

    fn push_in_subquery<S, A, B, F>(
        &mut self,
        negated: bool,
        accessor: &A,
        select: &B,
        configure: F,
    ) -> Result<&mut Self, ResolutionError>
    where
        S: EntityKind,
        A: Accessor<E>,
        B: Accessor<S>,
        F: FnOnce(&mut QueryStream<S>) -> Result<(), ResolutionError>,
    {
        let field = self.field(accessor)?;
        let child = self.child(0, configure)?;
        let select = child.field(select)?;

        self.aliases = child.aliases;
        let subquery = sub_select(
            SubSource::Entity(S::MODEL),
            child.scope.alias(),
            Some(select),
            child.nodes,
        );
        self.push_condition(Node::InSubquery {
            field,
            negated,
            subquery,
        });

        Ok(self)
    }
}

const fn sub_select(
    source: SubSource,
    alias: Alias,
    select: Option<ScopedField>,
    nodes: Vec<Node>,
) -> SubSelect {
    SubSelect {
        source,
        alias,
        select,
        nodes,
    }
}
