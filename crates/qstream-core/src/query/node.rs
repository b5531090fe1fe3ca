use crate::{model::entity::EntityModel, resolve::FieldDescriptor, value::Value};
use std::{fmt, sync::Arc};

///
/// Expression nodes
///
/// One flat, insertion-ordered sequence per scope. Nesting only happens
/// through `Bracket`, `Join`, and subquery bodies, each of which owns its
/// own sequence. The renderer matches on every variant exhaustively.
///

///
/// Alias
/// Index of an entity instance within one rendered query.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Alias(u32);

impl Alias {
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

///
/// ScopedField
///
/// A shared descriptor bound to the alias of the scope that referenced it.
///

#[derive(Clone, Debug)]
pub struct ScopedField {
    pub descriptor: Arc<FieldDescriptor>,
    pub alias: Alias,
}

impl ScopedField {
    #[must_use]
    pub const fn new(descriptor: Arc<FieldDescriptor>, alias: Alias) -> Self {
        Self { descriptor, alias }
    }

    /// Query-facing field name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }
}

impl PartialEq for ScopedField {
    fn eq(&self, other: &Self) -> bool {
        self.alias == other.alias && Arc::ptr_eq(&self.descriptor, &other.descriptor)
    }
}

///
/// Connector
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    Ge,
    Le,
    Like,
    NotLike,
    IsNull,
    NotNull,
}

impl CompareOp {
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Like => "like",
            Self::NotLike => "not like",
            Self::IsNull => "is null",
            Self::NotNull => "is not null",
        }
    }

    /// Operators that take no right-hand operand.
    #[must_use]
    pub const fn is_unary(self) -> bool {
        matches!(self, Self::IsNull | Self::NotNull)
    }

    /// Operators whose text operand is wrapped in the LIKE wildcard.
    #[must_use]
    pub const fn is_pattern(self) -> bool {
        matches!(self, Self::Like | Self::NotLike)
    }
}

///
/// Operand
///

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    /// Unary operators (`is null`).
    None,
    /// Bound as a named parameter.
    Value(Value),
    /// Another field, usually from an enclosing scope (correlation).
    Field(ScopedField),
}

///
/// Direction
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

///
/// JoinKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinKind {
    Inner,
    Left,
    Fetch,
    LeftFetch,
}

impl JoinKind {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Inner => "JOIN",
            Self::Left => "LEFT JOIN",
            Self::Fetch => "JOIN FETCH",
            Self::LeftFetch => "LEFT JOIN FETCH",
        }
    }
}

///
/// SubSource
/// What a subquery selects from.
///

#[derive(Clone, Debug, PartialEq)]
pub enum SubSource {
    /// Association of an enclosing alias (`FROM c0.addresses c1`).
    Path(ScopedField),
    /// Another entity (`FROM Order c1`).
    Entity(&'static EntityModel),
}

///
/// SubSelect
///

#[derive(Clone, Debug, PartialEq)]
pub struct SubSelect {
    pub source: SubSource,
    pub alias: Alias,
    /// Projected field; `None` selects the alias itself.
    pub select: Option<ScopedField>,
    pub nodes: Vec<Node>,
}

///
/// Node
///

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Predicate {
        field: ScopedField,
        op: CompareOp,
        operand: Operand,
    },
    /// Joins the next condition to the previous one.
    Connector(Connector),
    Bracket(Vec<Self>),
    InList {
        field: ScopedField,
        negated: bool,
        values: Vec<Value>,
    },
    OrderBy {
        field: ScopedField,
        direction: Direction,
        position: usize,
    },
    Join {
        kind: JoinKind,
        association: ScopedField,
        alias: Alias,
        nodes: Vec<Self>,
    },
    Exists {
        negated: bool,
        subquery: SubSelect,
    },
    InSubquery {
        field: ScopedField,
        negated: bool,
        subquery: SubSelect,
    },
}

impl Node {
    /// Nodes that render inside a WHERE/ON boolean expression.
    #[must_use]
    pub const fn is_condition(&self) -> bool {
        match self {
            Self::Predicate { .. }
            | Self::Bracket(_)
            | Self::InList { .. }
            | Self::Exists { .. }
            | Self::InSubquery { .. } => true,
            Self::Connector(_) | Self::OrderBy { .. } | Self::Join { .. } => false,
        }
    }
}

/// True when `nodes` holds at least one condition.
#[must_use]
pub fn has_condition(nodes: &[Node]) -> bool {
    nodes.iter().any(Node::is_condition)
}
