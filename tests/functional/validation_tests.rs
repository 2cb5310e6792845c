//! End-to-end validation of data against each requirement shape

use crate::common::*;
use regex::Regex;
use tabcheck::{
    difference_info, CheckConfig, Checker, Data, Difference, Differences, Predicate,
    Requirement, SequenceAlgorithm, Value,
};

#[test]
fn test_sequence_failure() {
    init_logging();
    let data = Data::sequence(strs(&["a", "b", "x", "d"]));
    let requirement = Requirement::sequence(strs(&["a", "b", "c", "d"]));

    let failure = difference_info(&data, &requirement).unwrap().unwrap();
    assert_eq!(failure.message, "does not match sequence order");
    match &failure.differences {
        Differences::Positional(map) => {
            assert_eq!(map.len(), 1);
            assert_eq!(map[&(2, 2)], Difference::invalid_with("x", "c"));
        }
        other => panic!("expected positional differences, got {:?}", other),
    }
}

#[test]
fn test_sequence_algorithms_agree_on_simple_edits() {
    let data = Data::sequence(ints(&[1, 2, 4, 5]));
    let requirement = Requirement::sequence(ints(&[1, 2, 3, 4, 5]));
    for algorithm in [SequenceAlgorithm::Lcs, SequenceAlgorithm::Myers, SequenceAlgorithm::Patience] {
        let checker = Checker::new(CheckConfig {
            sequence_algorithm: algorithm,
            ..CheckConfig::default()
        });
        let diffs = checker.compare(&data, &requirement).unwrap();
        assert_eq!(leaves(&diffs), vec![Difference::missing(3)], "{:?}", algorithm);
    }
}

#[test]
fn test_set_failure() {
    let data = Data::sequence(strs(&["a", "b", "b", "x", "x"]));
    let requirement = Requirement::set(strs(&["a", "b", "c"]));
    let failure = difference_info(&data, &requirement).unwrap().unwrap();
    assert_eq!(failure.message, "does not satisfy set membership");
    assert_eq!(
        failure.differences,
        Differences::List(vec![Difference::missing("c"), Difference::extra("x")])
    );
}

#[test]
fn test_predicate_failure() {
    let is_even = Predicate::unary("is_even", |v| {
        Ok(matches!(v, Value::Int(i) if i % 2 == 0).into())
    });
    let data = Data::sequence(ints(&[2, 3, 4, 5]));
    let failure = difference_info(&data, &Requirement::from(is_even)).unwrap().unwrap();
    assert_eq!(failure.message, "does not satisfy 'is_even' condition");
    assert_eq!(
        failure.differences,
        Differences::List(vec![Difference::invalid(3), Difference::invalid(5)])
    );
}

#[test]
fn test_pattern_failure() {
    let regex = Regex::new(r"^\d{3}-\d{4}$").unwrap();
    let data = Data::sequence(strs(&["555-1234", "5551234"]));
    let failure = difference_info(&data, &Requirement::from(regex)).unwrap().unwrap();
    assert_eq!(failure.message, r"does not satisfy '^\d{3}-\d{4}$' regex");
    assert_eq!(
        failure.differences,
        Differences::List(vec![Difference::invalid("5551234")])
    );
}

#[test]
fn test_equality_failures() {
    let data = Data::sequence(vec![Value::Int(10), Value::Float(12.5), Value::from("ten")]);
    let failure = difference_info(&data, &Requirement::equals(10)).unwrap().unwrap();
    assert_eq!(failure.message, "does not equal 10");
    assert_eq!(
        failure.differences,
        Differences::List(vec![
            Difference::deviation(2.5, Some(Value::Int(10))),
            Difference::invalid("ten"),
        ])
    );

    let failure = difference_info(&Data::element(8), &Requirement::equals(10))
        .unwrap()
        .unwrap();
    assert_eq!(failure.message, "does not satisfy equality comparison");
    assert_eq!(
        failure.differences,
        Differences::List(vec![Difference::deviation(-2, Some(Value::Int(10)))])
    );
}

#[test]
fn test_mapping_requirement() {
    let data = grouped(vec![
        ("colors", Data::sequence(strs(&["red", "green"]))),
        ("size", Data::element(3)),
        ("unexpected", Data::element("?")),
    ]);
    let requirement = Requirement::mapping(vec![
        (Value::from("colors"), Requirement::set(strs(&["red", "blue"]))),
        (Value::from("size"), Requirement::equals(3)),
        (Value::from("shape"), Requirement::equals("round")),
    ]);

    let failure = difference_info(&data, &requirement).unwrap().unwrap();
    assert_eq!(failure.message, "does not satisfy mapping requirement");
    let keyed = match &failure.differences {
        Differences::Keyed(map) => map,
        other => panic!("expected keyed differences, got {:?}", other),
    };
    let keys: Vec<String> = keyed.keys().map(|k| k.to_string()).collect();
    assert_eq!(keys, vec!["'colors'", "'unexpected'", "'shape'"]);
    assert_eq!(
        keyed[&Value::from("colors")],
        Differences::List(vec![Difference::missing("blue"), Difference::extra("green")])
    );
    assert_eq!(
        keyed[&Value::from("unexpected")],
        Differences::Single(Difference::invalid("?"))
    );
    assert_eq!(
        keyed[&Value::from("shape")],
        Differences::Single(Difference::invalid_with(Value::None, "round"))
    );
}

#[test]
fn test_nested_mapping_requirement() {
    let data = grouped(vec![(
        "outer",
        grouped(vec![("inner", Data::sequence(ints(&[1, 2])))]),
    )]);
    let requirement = Requirement::from(Value::from(serde_json::json!({
        "outer": {"inner": [1, 2, 3]}
    })));

    let failure = difference_info(&data, &requirement).unwrap().unwrap();
    assert_eq!(leaves(&Some(failure.differences)), vec![Difference::missing(3)]);
}

#[test]
fn test_grouped_data_with_flat_requirement() {
    let data = grouped(vec![
        ("a", Data::sequence(ints(&[1, 1]))),
        ("b", Data::sequence(ints(&[1, 2]))),
    ]);
    let failure = difference_info(&data, &Requirement::equals(1)).unwrap().unwrap();
    assert_eq!(failure.message, "does not equal 1");
    match failure.differences {
        Differences::Keyed(map) => {
            assert_eq!(map.len(), 1);
            assert_eq!(
                map[&Value::from("b")],
                Differences::List(vec![Difference::deviation(1, Some(Value::Int(1)))])
            );
        }
        other => panic!("expected keyed differences, got {:?}", other),
    }
}

#[test]
fn test_pair_data_against_mapping_requirement() {
    let data = Data::sequence(vec![pair("a", 1), pair("b", 2), pair("a", 3)]);
    let requirement = Requirement::mapping(vec![
        (Value::from("a"), Requirement::sequence(ints(&[1, 3]))),
        (Value::from("b"), Requirement::equals(2)),
    ]);
    assert!(difference_info(&data, &requirement).unwrap().is_none());
}

#[test]
fn test_failure_report_rendering() {
    let data = grouped(vec![
        ("a", Data::element("x")),
        ("b", Data::sequence(ints(&[1, 2]))),
    ]);
    let requirement = Requirement::mapping(vec![
        (Value::from("a"), Requirement::equals("y")),
        (Value::from("b"), Requirement::set(ints(&[1]))),
    ]);
    let failure = difference_info(&data, &requirement).unwrap().unwrap();
    assert_eq!(
        failure.to_string(),
        "does not satisfy mapping requirement\n\
         ├─ 'a': Invalid('x', 'y')\n\
         └─ 'b':\n   \
         └─ Extra(2)\n"
    );

    let json = serde_json::to_value(&failure).unwrap();
    assert_eq!(json["differences"][0]["key"], "a");
    assert_eq!(json["differences"][0]["differences"]["kind"], "invalid");
    assert_eq!(json["differences"][1]["differences"][0]["value"], 2);
}
