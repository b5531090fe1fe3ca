use crate::{
    query::{
        Query,
        node::{CompareOp, Connector, Direction, Node, Operand, ScopedField, has_condition},
        scope::{AliasAllocator, Scope},
    },
    render::{RenderError, RenderedQuery, Renderer},
    resolve::{Accessor, ResolutionError, Resolver},
    traits::EntityKind,
    value::Value,
};
use std::marker::PhantomData;

///
/// QueryStream
///
/// Fluent accumulator of expression nodes for one query over `E`.
///
/// Every operation that takes an accessor resolves it first and only then
/// touches the node sequence, so a failed call leaves the stream exactly as
/// it was. Predicates appended without an explicit `and()`/`or()` are
/// AND-ed with what came before.
///
/// A stream is meant for one caller building one query; it is not shared
/// across threads while under construction.
///

#[derive(Debug)]
pub struct QueryStream<E: EntityKind> {
    pub(crate) resolver: Resolver,
    pub(crate) scope: Scope,
    pub(crate) aliases: AliasAllocator,
    pub(crate) nodes: Vec<Node>,
    pub(crate) pending: Option<Connector>,
    pub(crate) filtering: bool,
    pub(crate) orders: usize,
    _marker: PhantomData<fn() -> E>,
}

impl<E: EntityKind> Default for QueryStream<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityKind> QueryStream<E> {
    /// Create a stream backed by the process-wide resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::with_resolver(Resolver::global())
    }

    /// Create a stream backed by an injected resolver.
    #[must_use]
    pub fn with_resolver(resolver: Resolver) -> Self {
        let mut aliases = AliasAllocator::new();
        let root = aliases.allocate();

        Self::scoped(resolver, Scope::root(E::PATH, root), aliases)
    }

    pub(crate) const fn scoped(resolver: Resolver, scope: Scope, aliases: AliasAllocator) -> Self {
        Self {
            resolver,
            scope,
            aliases,
            nodes: Vec::new(),
            pending: None,
            filtering: false,
            orders: 0,
            _marker: PhantomData,
        }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Nodes accumulated so far, in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Whether a predicate region has been opened.
    #[must_use]
    pub const fn is_filtering(&self) -> bool {
        self.filtering
    }

    #[must_use]
    pub const fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    // ------------------------------------------------------------------
    // Region & connectors
    // ------------------------------------------------------------------

    /// Open the predicate region. Idempotent.
    pub const fn where_(&mut self) -> &mut Self {
        self.filtering = true;
        self
    }

    /// Join the next predicate with AND.
    pub const fn and(&mut self) -> &mut Self {
        self.pending = Some(Connector::And);
        self
    }

    /// Join the next predicate with OR. A later `and()`/`or()` before the
    /// next predicate replaces this one.
    pub const fn or(&mut self) -> &mut Self {
        self.pending = Some(Connector::Or);
        self
    }

    // ------------------------------------------------------------------
    // Comparison predicates
    // ------------------------------------------------------------------

    pub fn eq<A>(&mut self, accessor: A, value: impl Into<Value>) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E>,
    {
        self.compare(accessor, CompareOp::Eq, value.into())
    }

    pub fn not_eq<A>(
        &mut self,
        accessor: A,
        value: impl Into<Value>,
    ) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E>,
    {
        self.compare(accessor, CompareOp::NotEq, value.into())
    }

    pub fn gt<A>(&mut self, accessor: A, value: impl Into<Value>) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E>,
    {
        self.compare(accessor, CompareOp::Gt, value.into())
    }

    pub fn lt<A>(&mut self, accessor: A, value: impl Into<Value>) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E>,
    {
        self.compare(accessor, CompareOp::Lt, value.into())
    }

    pub fn ge<A>(&mut self, accessor: A, value: impl Into<Value>) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E>,
    {
        self.compare(accessor, CompareOp::Ge, value.into())
    }

    pub fn le<A>(&mut self, accessor: A, value: impl Into<Value>) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E>,
    {
        self.compare(accessor, CompareOp::Le, value.into())
    }

    /// Substring match; the renderer wraps `pattern` in the configured
    /// wildcard (`lname` binds as `%lname%`).
    pub fn like<A>(
        &mut self,
        accessor: A,
        pattern: impl Into<String>,
    ) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E>,
    {
        self.compare(accessor, CompareOp::Like, Value::Text(pattern.into()))
    }

    pub fn not_like<A>(
        &mut self,
        accessor: A,
        pattern: impl Into<String>,
    ) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E>,
    {
        self.compare(accessor, CompareOp::NotLike, Value::Text(pattern.into()))
    }

    // ------------------------------------------------------------------
    // Structural predicates
    // ------------------------------------------------------------------

    pub fn is_null<A>(&mut self, accessor: A) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E>,
    {
        let field = self.field(&accessor)?;
        self.push_condition(Node::Predicate {
            field,
            op: CompareOp::IsNull,
            operand: Operand::None,
        });

        Ok(self)
    }

    pub fn not_null<A>(&mut self, accessor: A) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E>,
    {
        let field = self.field(&accessor)?;
        self.push_condition(Node::Predicate {
            field,
            op: CompareOp::NotNull,
            operand: Operand::None,
        });

        Ok(self)
    }

    /// Membership in a literal list. An empty list is accepted and matches
    /// no rows.
    pub fn in_<A, I, V>(&mut self, accessor: A, values: I) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.in_list(accessor, values, false)
    }

    /// Exclusion from a literal list. An empty list matches every row.
    pub fn not_in<A, I, V>(&mut self, accessor: A, values: I) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.in_list(accessor, values, true)
    }

    // ------------------------------------------------------------------
    // Grouping & ordering
    // ------------------------------------------------------------------

    /// Group the predicates added by `configure` into one parenthesized unit.
    ///
    /// The sub-stream shares this stream's entity, alias, and alias counter
    /// but starts with its own connector state. Nothing is appended when
    /// `configure` fails or adds no predicate. Joins opened inside the group
    /// are attached to this stream.
    pub fn brackets<F>(&mut self, configure: F) -> Result<&mut Self, ResolutionError>
    where
        F: FnOnce(&mut Self) -> Result<(), ResolutionError>,
    {
        let mut sub = Self::scoped(self.resolver.clone(), self.scope.clone(), self.aliases);
        sub.orders = self.orders;
        configure(&mut sub)?;

        self.aliases = sub.aliases;
        self.orders = sub.orders;

        // joins extend the FROM clause of this scope, never the group
        let (joins, grouped): (Vec<Node>, Vec<Node>) = sub
            .nodes
            .into_iter()
            .partition(|node| matches!(node, Node::Join { .. }));
        self.nodes.extend(joins);

        if has_condition(&grouped) {
            self.push_condition(Node::Bracket(grouped));
        } else {
            // only ordering was added; it does not need a group
            self.nodes.extend(grouped);
        }

        Ok(self)
    }

    /// Append an ascending ORDER BY clause.
    pub fn order_by<A>(&mut self, accessor: A) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E>,
    {
        self.push_order(&accessor, Direction::Asc)
    }

    /// Append a descending ORDER BY clause.
    pub fn order_by_desc<A>(&mut self, accessor: A) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E>,
    {
        self.push_order(&accessor, Direction::Desc)
    }

    // ------------------------------------------------------------------
    // Terminal operations
    // ------------------------------------------------------------------

    /// Freeze the stream into an immutable query.
    #[must_use]
    pub fn build(self) -> Query<E> {
        Query::from_parts(self.scope.alias(), self.nodes)
    }

    /// Render the current state with default settings.
    pub fn render(&self) -> Result<RenderedQuery, RenderError> {
        Renderer::default().render_stream(self)
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    /// Resolve `accessor` and bind it to this stream's alias.
    pub(crate) fn field<A>(&self, accessor: &A) -> Result<ScopedField, ResolutionError>
    where
        A: Accessor<E>,
    {
        let descriptor = self.resolver.resolve::<E, A>(accessor)?;

        Ok(ScopedField::new(descriptor, self.scope.alias()))
    }

    pub(crate) fn compare<A>(
        &mut self,
        accessor: A,
        op: CompareOp,
        value: Value,
    ) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E>,
    {
        let field = self.field(&accessor)?;
        self.push_condition(Node::Predicate {
            field,
            op,
            operand: Operand::Value(value),
        });

        Ok(self)
    }

    fn in_list<A, I, V>(
        &mut self,
        accessor: A,
        values: I,
        negated: bool,
    ) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let field = self.field(&accessor)?;
        let values = values.into_iter().map(Into::into).collect();
        self.push_condition(Node::InList {
            field,
            negated,
            values,
        });

        Ok(self)
    }

    fn push_order<A>(&mut self, accessor: &A, direction: Direction) -> Result<&mut Self, ResolutionError>
    where
        A: Accessor<E>,
    {
        let field = self.field(accessor)?;
        self.nodes.push(Node::OrderBy {
            field,
            direction,
            position: self.orders,
        });
        self.orders += 1;

        Ok(self)
    }

    /// Append a condition, emitting the pending connector first when there
    /// is a previous condition to connect to. Resets the pending connector.
    pub(crate) fn push_condition(&mut self, node: Node) {
        let connector = self.pending.take();
        if let Some(connector) = connector
            && has_condition(&self.nodes)
        {
            self.nodes.push(Node::Connector(connector));
        }

        self.nodes.push(node);
        self.filtering = true;
    }
}
