use proptest::prelude::*;
use qstream::{
    prelude::*,
    render::Parameter,
    resolve::{DescriptorCache, Resolver},
};
use std::{cell::RefCell, sync::Arc};
use time::{Date, Month};

///
/// Person
///

#[derive(Clone, Debug, Entity)]
pub struct Person {
    pub person_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub personal_no: String,
    pub birth_date: Date,
}

fn stream() -> QueryStream<Person> {
    QueryStream::with_resolver(Resolver::new(Arc::new(DescriptorCache::new())))
}

fn cutoff() -> Date {
    Date::from_calendar_date(1980, Month::January, 1).expect("valid date")
}

#[test]
fn birth_date_and_last_name_filter() -> Result<(), qstream::Error> {
    let mut q = stream();
    q.where_().ge(Person::birth_date, cutoff())?;
    q.and().like(Person::last_name, "lname")?;

    let rendered = q.build().render()?;

    assert_eq!(
        rendered.text,
        "SELECT c0 FROM Person c0 WHERE c0.birthDate >= :p0 AND c0.lastName like :p1"
    );
    assert_eq!(
        rendered.parameters,
        [
            Parameter {
                name: "p0".to_string(),
                value: Value::Date(cutoff()),
                temporal: Some(TemporalKind::Date),
            },
            Parameter {
                name: "p1".to_string(),
                value: Value::Text("%lname%".to_string()),
                temporal: None,
            },
        ]
    );

    Ok(())
}

#[test]
fn in_list_of_five_ids() -> Result<(), qstream::Error> {
    let mut q = stream();
    q.where_().in_(Person::person_id, [1_u64, 2, 3, 4, 5])?;

    let rendered = q.render()?;

    assert_eq!(
        rendered.text,
        "SELECT c0 FROM Person c0 WHERE c0.personId in (:p0,:p1,:p2,:p3,:p4)"
    );
    assert_eq!(
        rendered.values().cloned().collect::<Vec<_>>(),
        (1_u64..=5).map(Value::from).collect::<Vec<_>>()
    );

    Ok(())
}

#[test]
fn bracketed_alternatives() -> Result<(), qstream::Error> {
    let mut q = stream();
    q.where_().brackets(|b| {
        b.like(Person::first_name, "fname")?;
        b.or().eq(Person::personal_no, "123")?;
        Ok(())
    })?;

    assert_eq!(
        q.render()?.text,
        "SELECT c0 FROM Person c0 WHERE (c0.firstName like :p0 OR c0.personalNo = :p1)"
    );

    Ok(())
}

#[test]
fn empty_in_renders_constant_false() -> Result<(), qstream::Error> {
    let mut q = stream();
    q.where_().in_(Person::person_id, Vec::<u64>::new())?;

    let rendered = q.render()?;

    assert_eq!(rendered.text, "SELECT c0 FROM Person c0 WHERE 1 = 0");
    assert!(rendered.parameters.is_empty());

    Ok(())
}

#[test]
fn two_method_references_share_one_descriptor() {
    let resolver = Resolver::new(Arc::new(DescriptorCache::new()));
    let a = Person::last_name;
    let b = Person::last_name;

    let first = resolver.resolve::<Person, _>(&a).expect("resolve");
    let second = resolver.resolve::<Person, _>(&b).expect("resolve");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.name(), "lastName");
}

#[test]
fn errors_surface_with_class_and_origin() {
    let mut q = stream();
    let err: qstream::Error = q
        .eq(|p: &Person| p.person_id, 1_u64)
        .map(|_| ())
        .expect_err("closure accessor")
        .into();

    assert!(err.display_with_class().starts_with("resolve:usage: "));
}

#[test]
fn rendered_query_serializes_to_json() -> Result<(), qstream::Error> {
    let mut q = stream();
    q.eq(Person::last_name, "Smith")?;

    let json = serde_json::to_value(q.build().limit(25).render()?).expect("serialize");

    assert_eq!(
        json["text"],
        "SELECT c0 FROM Person c0 WHERE c0.lastName = :p0"
    );
    assert_eq!(json["parameters"][0]["name"], "p0");
    assert_eq!(json["parameters"][0]["value"]["Text"], "Smith");
    assert_eq!(json["page"]["limit"], 25);

    Ok(())
}

///
/// RecordingExecutor
/// Captures what the caller hands to the execution side.
///

#[derive(Default)]
struct RecordingExecutor {
    seen: RefCell<Vec<RenderedQuery>>,
}

impl Executor for RecordingExecutor {
    type Row = Person;
    type Error = std::convert::Infallible;

    fn fetch(&self, query: &RenderedQuery) -> Result<Vec<Person>, Self::Error> {
        self.seen.borrow_mut().push(query.clone());
        Ok(Vec::new())
    }

    fn execute(&self, query: &RenderedQuery) -> Result<u64, Self::Error> {
        self.seen.borrow_mut().push(query.clone());
        Ok(0)
    }
}

#[test]
fn executor_receives_text_parameters_and_page() -> Result<(), qstream::Error> {
    let executor = RecordingExecutor::default();
    let mut q = stream();
    q.eq(Person::first_name, "Ann")?;
    q.order_by(Person::last_name)?;

    let rendered = q.build().limit(10).offset(30).render()?;
    let rows = executor.fetch(&rendered).expect("infallible");

    assert!(rows.is_empty());
    let seen = executor.seen.borrow();
    assert_eq!(
        seen[0].text,
        "SELECT c0 FROM Person c0 WHERE c0.firstName = :p0 ORDER BY c0.lastName asc"
    );
    assert_eq!(seen[0].page.limit, Some(10));
    assert_eq!(seen[0].page.offset, 30);

    Ok(())
}

proptest! {
    #[test]
    fn rendering_twice_is_identical(
        last in "[a-z]{1,8}",
        ids in proptest::collection::vec(any::<u64>(), 0..6),
        use_or in any::<bool>(),
    ) {
        let mut q = stream();
        q.like(Person::last_name, last.as_str()).unwrap();
        if use_or {
            q.or();
        }
        q.in_(Person::person_id, ids).unwrap();
        q.order_by_desc(Person::birth_date).unwrap();
        let query = q.build();

        prop_assert_eq!(query.render().unwrap(), query.render().unwrap());
    }
}
