//! Unit tests for requirement classification and predicates

use crate::common::*;
use regex::Regex;
use serde_json::json;
use tabcheck::{classify, Comparator, Data, Predicate, Requirement, Value};

#[test]
fn test_requirement_from_json_shapes() {
    let requirement = Requirement::from(Value::from(json!({
        "ids": [1, 2, 3],
        "name": "x",
        "nested": {"inner": [true]}
    })));

    let map = match requirement {
        Requirement::Mapping(map) => map,
        other => panic!("expected mapping requirement, got {:?}", other),
    };
    assert!(matches!(map[&Value::from("ids")], Requirement::Sequence(ref s) if s.len() == 3));
    assert!(matches!(map[&Value::from("name")], Requirement::Value(Value::Str(_))));
    assert!(matches!(map[&Value::from("nested")], Requirement::Mapping(_)));
}

#[test]
fn test_classify_uses_data_shape_for_literals() {
    let literal = Requirement::equals(5);

    let (_, comparator) = classify(&literal, &Data::element(5));
    assert_eq!(comparator, Comparator::SingleEquality);

    let (_, comparator) = classify(&literal, &Data::sequence(ints(&[5])));
    assert_eq!(comparator, Comparator::Equality);

    let (_, comparator) = classify(&literal, &Data::collection(ints(&[5])));
    assert_eq!(comparator, Comparator::Equality);
}

#[test]
fn test_mapping_requirement_message() {
    let requirement = Requirement::mapping(vec![(Value::from("a"), Requirement::equals(1))]);
    let (message, comparator) = classify(&requirement, &Data::not_found());
    assert_eq!(message, "does not satisfy mapping requirement");
    assert_eq!(comparator, Comparator::Mapping);
}

#[test]
fn test_predicate_and_pattern_conversions() {
    let predicate = Predicate::unary("positive", |v| Ok((v.as_f64().unwrap_or(0.0) > 0.0).into()));
    assert_eq!(predicate.name(), "positive");
    assert!(matches!(Requirement::from(predicate), Requirement::Predicate(_)));

    let regex = Regex::new(r"^\d+$").unwrap();
    assert!(matches!(Requirement::from(regex), Requirement::Pattern(_)));
}

#[test]
fn test_kind_names() {
    assert_eq!(Requirement::sequence(vec![]).kind_name(), "sequence");
    assert_eq!(Requirement::set(vec![]).kind_name(), "set");
    assert_eq!(Requirement::not_found().kind_name(), "value");
}
