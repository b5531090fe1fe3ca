use crate::{ROOT_ALIAS, query::node::Alias};

///
/// AliasAllocator
///
/// Monotonic alias counter for one query. Child streams borrow it by value
/// and hand it back when they finish, so every scope in the query draws
/// from the same sequence.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct AliasAllocator {
    next: u32,
}

impl AliasAllocator {
    /// Allocator whose first alias is the root alias.
    pub(crate) const fn new() -> Self {
        Self { next: ROOT_ALIAS }
    }

    pub(crate) const fn allocate(&mut self) -> Alias {
        let alias = Alias::new(self.next);
        self.next += 1;
        alias
    }
}

///
/// ScopeFrame
/// One enclosing scope visible to correlated predicates.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ScopeFrame {
    pub(crate) entity_path: &'static str,
    pub(crate) alias: Alias,
}

///
/// Scope
///
/// Alias of the current stream plus the chain of enclosing scopes,
/// nearest last. Stands in for a back-reference to the parent stream:
/// children only ever need the parents' entity types and aliases.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Scope {
    pub(crate) current: ScopeFrame,
    pub(crate) outer: Vec<ScopeFrame>,
}

impl Scope {
    pub(crate) const fn root(entity_path: &'static str, alias: Alias) -> Self {
        Self {
            current: ScopeFrame { entity_path, alias },
            outer: Vec::new(),
        }
    }

    /// Scope for a child stream nested directly inside this one.
    pub(crate) fn child(&self, entity_path: &'static str, alias: Alias) -> Self {
        let mut outer = self.outer.clone();
        outer.push(self.current);

        Self {
            current: ScopeFrame { entity_path, alias },
            outer,
        }
    }

    pub(crate) const fn alias(&self) -> Alias {
        self.current.alias
    }

    /// Nearest enclosing scope over `entity_path`.
    pub(crate) fn find_outer(&self, entity_path: &str) -> Option<Alias> {
        self.outer
            .iter()
            .rev()
            .find(|frame| frame.entity_path == entity_path)
            .map(|frame| frame.alias)
    }
}
