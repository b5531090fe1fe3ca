use super::*;
use time::Month;

#[test]
fn integer_widths_collapse_to_signed_or_unsigned() {
    assert_eq!(Value::from(7_i8), Value::Int(7));
    assert_eq!(Value::from(-7_i32), Value::Int(-7));
    assert_eq!(Value::from(7_u16), Value::Uint(7));
    assert_eq!(Value::from(7_u64), Value::Uint(7));
}

#[test]
fn option_none_becomes_null() {
    let value: Value = Option::<i64>::None.into();

    assert!(value.is_null());
    assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
}

#[test]
fn from_slice_preserves_order() {
    let value = Value::from_slice(&[3_i64, 1, 2]);

    assert_eq!(
        value,
        Value::List(vec![Value::Int(3), Value::Int(1), Value::Int(2)])
    );
}

#[test]
fn temporal_values_are_flagged() {
    let date = Date::from_calendar_date(1980, Month::March, 14).expect("valid date");

    assert!(Value::from(date).is_temporal());
    assert!(!Value::from("1980-03-14").is_temporal());
    assert_eq!(Value::from(date).kind_label(), "date");
}

#[test]
fn values_serialize_with_variant_tags() {
    let json = serde_json::to_string(&Value::Text("lname".to_string())).expect("serialize");

    assert_eq!(json, r#"{"Text":"lname"}"#);
}
