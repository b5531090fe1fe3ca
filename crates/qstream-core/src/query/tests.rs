use super::*;
use crate::{
    resolve::ResolutionError,
    test_fixtures::{Address, Order, Person, isolated},
};

fn predicate_names(nodes: &[Node]) -> Vec<String> {
    nodes
        .iter()
        .map(|node| match node {
            Node::Predicate { field, op, .. } => format!("{} {}", field.name(), op.token()),
            Node::Connector(connector) => connector.keyword().to_string(),
            Node::Bracket(_) => "()".to_string(),
            Node::InList { field, .. } => format!("{} in", field.name()),
            Node::OrderBy { field, .. } => format!("order {}", field.name()),
            Node::Join { association, .. } => format!("join {}", association.name()),
            Node::Exists { .. } => "exists".to_string(),
            Node::InSubquery { field, .. } => format!("{} in select", field.name()),
        })
        .collect()
}

// ---------------------------------------------------------------------
// Connectors
// ---------------------------------------------------------------------

#[test]
fn adjacent_predicates_default_to_and() {
    let mut q = isolated::<Person>();
    q.eq(Person::last_name, "Smith").unwrap();
    q.eq(Person::first_name, "Ann").unwrap();

    assert_eq!(predicate_names(q.nodes()), ["lastName =", "firstName ="]);
}

#[test]
fn explicit_or_is_recorded_before_the_next_predicate() {
    let mut q = isolated::<Person>();
    q.where_().eq(Person::last_name, "Smith").unwrap();
    q.or().eq(Person::first_name, "Ann").unwrap();

    assert_eq!(
        predicate_names(q.nodes()),
        ["lastName =", "OR", "firstName ="]
    );
}

#[test]
fn later_connector_replaces_earlier_one() {
    let mut q = isolated::<Person>();
    q.eq(Person::last_name, "Smith").unwrap();
    q.or().and().eq(Person::first_name, "Ann").unwrap();

    assert_eq!(
        predicate_names(q.nodes()),
        ["lastName =", "AND", "firstName ="]
    );
}

#[test]
fn leading_connector_is_dropped() {
    let mut q = isolated::<Person>();
    q.where_().or().eq(Person::last_name, "Smith").unwrap();

    assert_eq!(predicate_names(q.nodes()), ["lastName ="]);
}

#[test]
fn connector_resets_after_use() {
    let mut q = isolated::<Person>();
    q.eq(Person::last_name, "Smith").unwrap();
    q.or().eq(Person::first_name, "Ann").unwrap();
    q.eq(Person::personal_no, "42").unwrap();

    assert_eq!(
        predicate_names(q.nodes()),
        ["lastName =", "OR", "firstName =", "personalNo ="]
    );
}

#[test]
fn where_opens_the_predicate_region() {
    let mut q = isolated::<Person>();
    assert!(!q.is_filtering());

    q.where_().where_();

    assert!(q.is_filtering());
    assert!(q.nodes().is_empty());
}

// ---------------------------------------------------------------------
// Failure atomicity
// ---------------------------------------------------------------------

#[test]
fn failed_resolution_leaves_stream_unchanged() {
    let mut q = isolated::<Person>();
    q.eq(Person::last_name, "Smith").unwrap();
    q.or();

    let err = q
        .eq(|person: &Person| person.person_id, 1_u64)
        .expect_err("closures are rejected");

    assert!(matches!(err, ResolutionError::NotReducible { .. }));
    assert_eq!(predicate_names(q.nodes()), ["lastName ="]);

    // the pending OR survives the failed call
    q.eq(Person::first_name, "Ann").unwrap();
    assert_eq!(
        predicate_names(q.nodes()),
        ["lastName =", "OR", "firstName ="]
    );
}

#[test]
fn failed_join_does_not_consume_an_alias() {
    let mut q = isolated::<Person>();
    let err = q
        .join(Person::addresses, |a| {
            a.eq(|address: &Address| address.address_id, 1_u64)?;
            Ok(())
        })
        .expect_err("closure inside join is rejected");
    assert!(matches!(err, ResolutionError::NotReducible { .. }));
    assert!(q.nodes().is_empty());

    q.join(Person::addresses, |_| Ok(())).unwrap();
    let Node::Join { alias, .. } = &q.nodes()[0] else {
        panic!("expected a join node");
    };
    assert_eq!(alias.index(), 1);
}

// ---------------------------------------------------------------------
// Brackets & ordering
// ---------------------------------------------------------------------

#[test]
fn bracket_groups_inner_predicates() {
    let mut q = isolated::<Person>();
    q.eq(Person::last_name, "Smith").unwrap();
    q.brackets(|b| {
        b.like(Person::first_name, "an")?;
        b.or().eq(Person::personal_no, "42")?;
        Ok(())
    })
    .unwrap();

    assert_eq!(predicate_names(q.nodes()), ["lastName =", "()"]);
    let Node::Bracket(inner) = &q.nodes()[1] else {
        panic!("expected a bracket");
    };
    assert_eq!(
        predicate_names(inner),
        ["firstName like", "OR", "personalNo ="]
    );
}

#[test]
fn empty_bracket_appends_nothing() {
    let mut q = isolated::<Person>();
    q.eq(Person::last_name, "Smith").unwrap();
    q.or().brackets(|_| Ok(())).unwrap();

    assert_eq!(predicate_names(q.nodes()), ["lastName ="]);

    // the OR is still pending for the next real predicate
    q.eq(Person::first_name, "Ann").unwrap();
    assert_eq!(
        predicate_names(q.nodes()),
        ["lastName =", "OR", "firstName ="]
    );
}

#[test]
fn join_opened_inside_bracket_is_attached_to_the_stream() {
    let mut q = isolated::<Person>();
    q.eq(Person::last_name, "Smith").unwrap();
    q.or()
        .brackets(|b| {
            b.join(Person::addresses, |a| {
                a.eq(Address::city, "Oslo")?;
                Ok(())
            })?;
            b.eq(Person::first_name, "Ann")?;
            Ok(())
        })
        .unwrap();

    assert_eq!(
        predicate_names(q.nodes()),
        ["lastName =", "join addresses", "OR", "()"]
    );
    let Node::Bracket(inner) = &q.nodes()[3] else {
        panic!("expected a bracket");
    };
    assert_eq!(predicate_names(inner), ["firstName ="]);
}

#[test]
fn bracket_with_only_ordering_is_flattened() {
    let mut q = isolated::<Person>();
    q.brackets(|b| {
        b.order_by(Person::last_name)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(predicate_names(q.nodes()), ["order lastName"]);
}

#[test]
fn order_positions_follow_call_order() {
    let mut q = isolated::<Person>();
    q.order_by(Person::last_name).unwrap();
    q.order_by_desc(Person::birth_date).unwrap();

    let positions: Vec<(usize, Direction)> = q
        .nodes()
        .iter()
        .filter_map(|node| match node {
            Node::OrderBy {
                position,
                direction,
                ..
            } => Some((*position, *direction)),
            _ => None,
        })
        .collect();

    assert_eq!(positions, [(0, Direction::Asc), (1, Direction::Desc)]);
}

// ---------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------

#[test]
fn joins_and_subqueries_share_one_alias_sequence() {
    let mut q = isolated::<Person>();
    q.join(Person::addresses, |a| {
        a.eq(Address::city, "Oslo")?;
        Ok(())
    })
    .unwrap();
    q.exists(Person::addresses, |_| Ok(())).unwrap();
    q.in_subquery::<Order, _, _, _>(Person::person_id, Order::person_id, |_| Ok(()))
        .unwrap();

    let mut aliases = Vec::new();
    for node in q.nodes() {
        match node {
            Node::Join { alias, .. } => aliases.push(alias.index()),
            Node::Exists { subquery, .. } | Node::InSubquery { subquery, .. } => {
                aliases.push(subquery.alias.index());
            }
            _ => {}
        }
    }

    assert_eq!(aliases, [1, 2, 3]);
}

#[test]
fn join_conditions_bind_to_the_child_alias() {
    let mut q = isolated::<Person>();
    q.join(Person::addresses, |a| {
        a.eq(Address::city, "Oslo")?;
        Ok(())
    })
    .unwrap();

    let Node::Join {
        kind,
        association,
        nodes,
        ..
    } = &q.nodes()[0]
    else {
        panic!("expected a join node");
    };
    assert_eq!(*kind, JoinKind::Inner);
    assert_eq!(association.alias.index(), 0);

    let Node::Predicate { field, .. } = &nodes[0] else {
        panic!("expected a predicate");
    };
    assert_eq!(field.alias.index(), 1);
    assert_eq!(field.name(), "city");
}

#[test]
fn correlation_finds_the_enclosing_scope() {
    let mut q = isolated::<Person>();
    q.exists(Person::addresses, |a| {
        a.eq_outer::<Person, _, _>(Address::person_id, Person::person_id)?;
        Ok(())
    })
    .unwrap();

    let Node::Exists { subquery, .. } = &q.nodes()[0] else {
        panic!("expected exists");
    };
    let Node::Predicate {
        field,
        operand: Operand::Field(outer),
        ..
    } = &subquery.nodes[0]
    else {
        panic!("expected a correlated predicate");
    };

    assert_eq!(field.alias.index(), 1);
    assert_eq!(outer.alias.index(), 0);
    assert_eq!(outer.name(), "personId");
}

#[test]
fn correlation_without_enclosing_scope_fails() {
    let mut q = isolated::<Person>();
    let err = q
        .eq_outer::<Order, _, _>(Person::person_id, Order::person_id)
        .expect_err("root stream has no outer scope");

    assert!(matches!(err, ResolutionError::NoOuterScope { .. }));
    assert!(q.nodes().is_empty());
}

// ---------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------

#[test]
fn build_freezes_nodes_and_modifiers_compose() {
    let mut q = isolated::<Person>();
    q.eq(Person::last_name, "Smith").unwrap();

    let query = q.build().distinct().limit(10).offset(20);

    assert_eq!(query.nodes().len(), 1);
    assert!(query.is_distinct());
    assert_eq!(query.projection(), Projection::Entity);
    assert_eq!(
        query.page(),
        PageSpec {
            limit: Some(10),
            offset: 20,
        }
    );
    assert_eq!(query.root_alias().index(), crate::ROOT_ALIAS);

    let counted = query.select_count();
    assert_eq!(counted.projection(), Projection::Count);
    assert_eq!(counted.nodes().into_iter().count(), 1);
}
