//! Module: render
//! Responsibility: turn a node sequence into query text plus ordered
//!                 named parameters.
//! Does not own: how entities and fields are named (`TypeMapping`) or how
//!               the result is executed (`exec`).
//! Boundary: rendering is pure; the same input always yields identical
//!           text and parameters.

mod mapping;


use crate::{
    config::RenderConfig,
    model::{entity::EntityModel, field::TemporalKind},
    obs::sink::{self, MetricsEvent},
    query::{
        Alias, CompareOp, Connector, Direction, Node, Operand, PageSpec, Projection, Query,
        QueryStream, ScopedField, SubSelect, SubSource, node::has_condition,
    },
    traits::EntityKind,
    value::Value,
};
use serde::Serialize;
use std::fmt::Write as _;
use thiserror::Error as ThisError;

// re-exports
pub use mapping::{ModelMapping, TypeMapping};

static MODEL_MAPPING: ModelMapping = ModelMapping;

///
/// RenderError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RenderError {
    #[error("entity '{entity}' has no table mapping")]
    UnmappedEntity { entity: String },

    #[error("field '{entity}.{field}' has no column mapping")]
    UnmappedField { entity: String, field: String },

    #[error("ORDER BY on '{field}' is not allowed inside a subquery")]
    OrderInSubquery { field: String },
}

///
/// Parameter
///
/// One bound value. `temporal` is copied from the field the value is
/// compared against so the execution side can pick a date/time binding.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub value: Value,
    pub temporal: Option<TemporalKind>,
}

///
/// RenderedQuery
///
/// Query text plus its parameters in the order they appear in the text.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedQuery {
    pub text: String,
    pub parameters: Vec<Parameter>,
    pub page: PageSpec,
}

impl RenderedQuery {
    /// Parameter bound under `name` (without the prefix).
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|param| param.name == name)
    }

    /// Parameter values in binding order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.parameters.iter().map(|param| &param.value)
    }
}

///
/// Renderer
///
/// Stateless between calls; each render starts parameter numbering at 0.
///

pub struct Renderer<'m> {
    config: RenderConfig,
    mapping: &'m dyn TypeMapping,
}

impl Default for Renderer<'static> {
    fn default() -> Self {
        Self::with_config(RenderConfig::default())
    }
}

impl Renderer<'static> {
    /// Renderer using the model mapping and the given text conventions.
    #[must_use]
    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            config,
            mapping: &MODEL_MAPPING,
        }
    }
}

impl<'m> Renderer<'m> {
    #[must_use]
    pub fn new(config: RenderConfig, mapping: &'m dyn TypeMapping) -> Self {
        Self { config, mapping }
    }

    #[must_use]
    pub const fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render a frozen query, including its projection and page window.
    pub fn render<E: EntityKind>(&self, query: &Query<E>) -> Result<RenderedQuery, RenderError> {
        let head = Head {
            alias: query.root_alias(),
            projection: query.projection(),
            distinct: query.is_distinct(),
        };

        self.finish::<E>(head, query.nodes(), query.page())
    }

    /// Render a stream that has not been built yet.
    pub fn render_stream<E: EntityKind>(
        &self,
        stream: &QueryStream<E>,
    ) -> Result<RenderedQuery, RenderError> {
        let head = Head {
            alias: stream.scope.alias(),
            projection: Projection::Entity,
            distinct: false,
        };

        self.finish::<E>(head, stream.nodes(), PageSpec::default())
    }

    fn finish<E: EntityKind>(
        &self,
        head: Head,
        nodes: &[Node],
        page: PageSpec,
    ) -> Result<RenderedQuery, RenderError> {
        let mut writer = Writer::new(&self.config, self.mapping);

        match writer.root(E::MODEL, &head, nodes) {
            Ok(()) => {
                let rendered = RenderedQuery {
                    text: writer.out,
                    parameters: writer.parameters,
                    page,
                };
                tracing::debug!(
                    entity = E::MODEL.entity_name,
                    parameters = rendered.parameters.len(),
                    text = %rendered.text,
                    "query rendered"
                );
                sink::record(MetricsEvent::RenderFinish {
                    entity_path: E::PATH,
                    parameters: rendered.parameters.len() as u64,
                });

                Ok(rendered)
            }
            Err(err) => {
                tracing::debug!(entity = E::MODEL.entity_name, error = %err, "query render failed");
                sink::record(MetricsEvent::RenderFailed {
                    entity_path: E::PATH,
                });

                Err(err)
            }
        }
    }
}

///
/// Head
/// Root SELECT shape.
///

struct Head {
    alias: Alias,
    projection: Projection,
    distinct: bool,
}

///
/// Writer
///
/// Single-pass text builder. Parameters are numbered in the order their
/// placeholders are written, so numbering always matches text order.
///

struct Writer<'a> {
    config: &'a RenderConfig,
    mapping: &'a dyn TypeMapping,
    out: String,
    parameters: Vec<Parameter>,
}

impl<'a> Writer<'a> {
    fn new(config: &'a RenderConfig, mapping: &'a dyn TypeMapping) -> Self {
        Self {
            config,
            mapping,
            out: String::new(),
            parameters: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn root(
        &mut self,
        entity: &'static EntityModel,
        head: &Head,
        nodes: &[Node],
    ) -> Result<(), RenderError> {
        let alias = self.config.alias(head.alias.index());
        let table = self.table(entity)?;

        self.out.push_str("SELECT ");
        match (head.projection, head.distinct) {
            (Projection::Entity, false) => self.out.push_str(&alias),
            (Projection::Entity, true) => {
                let _ = write!(self.out, "DISTINCT {alias}");
            }
            (Projection::Count, false) => {
                let _ = write!(self.out, "count({alias})");
            }
            (Projection::Count, true) => {
                let _ = write!(self.out, "count(DISTINCT {alias})");
            }
        }
        let _ = write!(self.out, " FROM {table} {alias}");

        self.joins(nodes)?;
        if has_condition(nodes) {
            self.out.push_str(" WHERE ");
            self.conditions(nodes)?;
        }
        self.order_by(nodes)
    }

    /// `SELECT <projection> FROM <source> <alias> [joins] [WHERE ...]`
    fn sub_select(&mut self, subquery: &SubSelect) -> Result<(), RenderError> {
        if let Some(field) = first_order(&subquery.nodes) {
            return Err(RenderError::OrderInSubquery {
                field: field.name().to_string(),
            });
        }

        let alias = self.config.alias(subquery.alias.index());
        self.out.push_str("SELECT ");
        match &subquery.select {
            Some(field) => self.field(field)?,
            None => self.out.push_str(&alias),
        }

        self.out.push_str(" FROM ");
        match &subquery.source {
            SubSource::Path(association) => self.field(association)?,
            SubSource::Entity(entity) => {
                let table = self.table(*entity)?;
                self.out.push_str(&table);
            }
        }
        let _ = write!(self.out, " {alias}");

        self.joins(&subquery.nodes)?;
        if has_condition(&subquery.nodes) {
            self.out.push_str(" WHERE ");
            self.conditions(&subquery.nodes)?;
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Clauses
    // ------------------------------------------------------------------

    /// Joins in insertion order; a join's own joins follow it directly.
    fn joins(&mut self, nodes: &[Node]) -> Result<(), RenderError> {
        for node in nodes {
            let Node::Join {
                kind,
                association,
                alias,
                nodes,
            } = node
            else {
                continue;
            };

            self.out.push(' ');
            self.out.push_str(kind.keyword());
            self.out.push(' ');
            self.field(association)?;
            let _ = write!(self.out, " {}", self.config.alias(alias.index()));

            if has_condition(nodes) {
                self.out.push_str(" ON ");
                self.conditions(nodes)?;
            }
            self.joins(nodes)?;
        }

        Ok(())
    }

    /// Conditions of one scope joined by their connectors. Orderings and
    /// joins are skipped; they render in their own clauses.
    fn conditions(&mut self, nodes: &[Node]) -> Result<(), RenderError> {
        let mut pending: Option<Connector> = None;
        let mut first = true;

        for node in nodes {
            if let Node::Connector(connector) = node {
                pending = Some(*connector);
                continue;
            }
            if !node.is_condition() {
                continue;
            }

            if !first {
                let connector = pending.unwrap_or_default();
                let _ = write!(self.out, " {} ", connector.keyword());
            }
            pending = None;
            first = false;

            self.condition(node)?;
        }

        Ok(())
    }

    fn condition(&mut self, node: &Node) -> Result<(), RenderError> {
        match node {
            Node::Predicate { field, op, operand } => self.predicate(field, *op, operand),

            Node::Bracket(nodes) => {
                self.out.push('(');
                self.conditions(nodes)?;
                self.out.push(')');
                Ok(())
            }

            Node::InList {
                field,
                negated,
                values,
            } => self.in_list(field, *negated, values),

            Node::Exists { negated, subquery } => {
                if *negated {
                    self.out.push_str("NOT ");
                }
                self.out.push_str("EXISTS (");
                self.sub_select(subquery)?;
                self.out.push(')');
                Ok(())
            }

            Node::InSubquery {
                field,
                negated,
                subquery,
            } => {
                self.field(field)?;
                self.out.push_str(if *negated { " not in (" } else { " in (" });
                self.sub_select(subquery)?;
                self.out.push(')');
                Ok(())
            }

            // filtered out by `conditions`
            Node::Connector(_) | Node::OrderBy { .. } | Node::Join { .. } => Ok(()),
        }
    }

    fn predicate(
        &mut self,
        field: &ScopedField,
        op: CompareOp,
        operand: &Operand,
    ) -> Result<(), RenderError> {
        self.field(field)?;
        self.out.push(' ');
        self.out.push_str(op.token());

        match operand {
            Operand::None => {}
            Operand::Value(value) => {
                let value = if op.is_pattern() {
                    self.wildcard(value)
                } else {
                    value.clone()
                };
                self.out.push(' ');
                self.bind(field, value);
            }
            Operand::Field(other) => {
                self.out.push(' ');
                self.field(other)?;
            }
        }

        Ok(())
    }

    /// Empty lists render a constant predicate: no value can be a member of
    /// an empty list, and every value is outside it.
    fn in_list(
        &mut self,
        field: &ScopedField,
        negated: bool,
        values: &[Value],
    ) -> Result<(), RenderError> {
        let mut flat = Vec::with_capacity(values.len());
        flatten(values, &mut flat);

        if flat.is_empty() {
            self.out.push_str(if negated { "1 = 1" } else { "1 = 0" });
            return Ok(());
        }

        self.field(field)?;
        self.out.push_str(if negated { " not in (" } else { " in (" });
        for (index, value) in flat.into_iter().enumerate() {
            if index > 0 {
                self.out.push(',');
            }
            self.bind(field, value);
        }
        self.out.push(')');

        Ok(())
    }

    /// ORDER BY across the root scope and its joins, by call position.
    fn order_by(&mut self, nodes: &[Node]) -> Result<(), RenderError> {
        let mut orders = Vec::new();
        collect_orders(nodes, &mut orders);
        if orders.is_empty() {
            return Ok(());
        }
        orders.sort_by_key(|(position, _, _)| *position);

        self.out.push_str(" ORDER BY ");
        for (index, (_, field, direction)) in orders.into_iter().enumerate() {
            if index > 0 {
                self.out.push_str(", ");
            }
            self.field(field)?;
            self.out.push(' ');
            self.out.push_str(direction.keyword());
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------

    fn table(&self, entity: &'static EntityModel) -> Result<String, RenderError> {
        self.mapping
            .table_name_for(entity)
            .map(|table| table.into_owned())
            .ok_or_else(|| RenderError::UnmappedEntity {
                entity: entity.entity_name.to_string(),
            })
    }

    /// `<alias><separator><column>`
    fn field(&mut self, field: &ScopedField) -> Result<(), RenderError> {
        let column = self
            .mapping
            .column_name_for(&field.descriptor)
            .ok_or_else(|| RenderError::UnmappedField {
                entity: field.descriptor.entity_name().to_string(),
                field: field.name().to_string(),
            })?;

        let _ = write!(
            self.out,
            "{}{}{column}",
            self.config.alias(field.alias.index()),
            self.config.separator
        );

        Ok(())
    }

    /// Write the next placeholder and record its value.
    fn bind(&mut self, field: &ScopedField, value: Value) {
        let name = format!("{}{}", self.config.parameter_name, self.parameters.len());
        let _ = write!(self.out, "{}{name}", self.config.parameter_prefix);

        self.parameters.push(Parameter {
            name,
            value,
            temporal: field.descriptor.temporal(),
        });
    }

    fn wildcard(&self, value: &Value) -> Value {
        match value {
            Value::Text(text) => {
                let wildcard = &self.config.like_wildcard;
                Value::Text(format!("{wildcard}{text}{wildcard}"))
            }
            other => other.clone(),
        }
    }
}

// ----------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------

fn flatten(values: &[Value], out: &mut Vec<Value>) {
    for value in values {
        match value {
            Value::List(items) => flatten(items, out),
            other => out.push(other.clone()),
        }
    }
}

/// Orderings of a scope, including those nested in brackets and joins.
/// Subquery bodies are separate statements and are not visited.
fn collect_orders<'n>(nodes: &'n [Node], out: &mut Vec<(usize, &'n ScopedField, Direction)>) {
    for node in nodes {
        match node {
            Node::OrderBy {
                field,
                direction,
                position,
            } => out.push((*position, field, *direction)),
            Node::Bracket(inner) | Node::Join { nodes: inner, .. } => collect_orders(inner, out),
            _ => {}
        }
    }
}

fn first_order(nodes: &[Node]) -> Option<&ScopedField> {
    let mut orders = Vec::new();
    collect_orders(nodes, &mut orders);

    orders.into_iter().next().map(|(_, field, _)| field)
}
