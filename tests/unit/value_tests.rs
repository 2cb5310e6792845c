//! Unit tests for values, custom equality and deep hashing

use crate::common::*;
use std::collections::HashSet;
use tabcheck::hash::deep_hash;
use tabcheck::{CheckError, CustomValue, SharedValue, Value, NOT_FOUND};

#[derive(Debug)]
struct CaseInsensitive(String);

impl CustomValue for CaseInsensitive {
    fn type_name(&self) -> &str {
        "CaseInsensitive"
    }

    fn eq_value(&self, other: &Value) -> anyhow::Result<bool> {
        match other {
            Value::Str(s) => Ok(s.eq_ignore_ascii_case(&self.0)),
            _ => Ok(false),
        }
    }

    fn hash_bytes(&self) -> Option<Vec<u8>> {
        Some(self.0.to_lowercase().into_bytes())
    }

    fn repr(&self) -> String {
        format!("CaseInsensitive('{}')", self.0)
    }
}

#[derive(Debug)]
struct Explosive;

impl CustomValue for Explosive {
    fn type_name(&self) -> &str {
        "Explosive"
    }

    fn eq_value(&self, _other: &Value) -> anyhow::Result<bool> {
        anyhow::bail!("can not compare")
    }
}

#[test]
fn test_custom_equality_from_either_side() {
    let custom = Value::custom(CaseInsensitive("ABC".to_string()));
    assert_eq!(custom, Value::from("abc"));
    assert_eq!(Value::from("aBc"), custom);
    assert_ne!(custom, Value::from("abd"));
    assert_eq!(custom.to_string(), "CaseInsensitive('ABC')");
}

#[test]
fn test_failing_custom_equality_is_unequal() {
    let explosive = Value::custom(Explosive);
    assert!(explosive.try_eq(&Value::Int(1)).is_err());
    assert_ne!(explosive, Value::Int(1));
}

#[test]
fn test_unhashable_custom_value() {
    let err = deep_hash(&Value::list(vec![Value::Int(1), Value::custom(Explosive)])).unwrap_err();
    assert!(matches!(err, CheckError::Unhashable { ref type_name } if type_name == "Explosive"));
}

#[test]
fn test_equal_values_hash_equal() {
    let pairs = vec![
        (Value::Int(3), Value::Float(3.0)),
        (Value::set(ints(&[1, 2, 3])), Value::set(ints(&[3, 1, 2]))),
        (
            Value::map(vec![(Value::from("a"), Value::Int(1)), (Value::from("b"), Value::Int(2))]),
            Value::map(vec![(Value::from("b"), Value::Int(2)), (Value::from("a"), Value::Int(1))]),
        ),
        (Value::list(strs(&["x", "y"])), Value::shared(Value::list(strs(&["x", "y"])))),
    ];
    for (a, b) in pairs {
        assert_eq!(a, b);
        assert_eq!(deep_hash(&a).unwrap(), deep_hash(&b).unwrap(), "{} vs {}", a, b);
    }
}

#[test]
fn test_distinct_shapes_hash_apart() {
    let values = vec![
        Value::list(ints(&[1, 2])),
        Value::tuple(ints(&[1, 2])),
        Value::set(ints(&[1, 2])),
        Value::list(ints(&[2, 1])),
        Value::from("1"),
        Value::Int(1),
        Value::Bool(true),
        Value::None,
        NOT_FOUND,
    ];
    let digests: HashSet<_> = values.iter().map(|v| deep_hash(v).unwrap()).collect();
    assert_eq!(digests.len(), values.len());
}

#[test]
fn test_values_usable_in_hashed_collections() {
    let mut seen = HashSet::new();
    seen.insert(Value::list(ints(&[1, 2])));
    seen.insert(Value::map(vec![(Value::from("k"), Value::list(ints(&[1])))]));
    assert!(seen.contains(&Value::list(ints(&[1, 2]))));
    assert!(seen.contains(&Value::map(vec![(Value::from("k"), Value::list(ints(&[1])))])));
}

#[test]
fn test_identical_cycles_hash_identically() {
    let build = || {
        let node = SharedValue::new(Value::None);
        node.replace(Value::list(vec![Value::Int(1), Value::Shared(node.clone())]));
        node
    };
    let a = build();
    let b = build();
    assert_eq!(
        deep_hash(&Value::Shared(a.clone())).unwrap(),
        deep_hash(&Value::Shared(b.clone())).unwrap()
    );
    a.replace(Value::None);
    b.replace(Value::None);
}

#[test]
fn test_shared_values_see_updates() {
    let cell = SharedValue::new(Value::Int(1));
    let value = Value::Shared(cell.clone());
    assert_eq!(value, Value::Int(1));
    cell.replace(Value::Int(2));
    assert_eq!(value, Value::Int(2));
    assert_eq!(value.type_name(), "int");
}

#[test]
fn test_serialize_values() {
    let value = Value::map(vec![
        (Value::from("a"), Value::list(vec![Value::Int(1), Value::None])),
        (Value::from("b"), Value::Float(0.5)),
    ]);
    let json = serde_json::to_value(&value).unwrap();
    assert_eq!(json, serde_json::json!({"a": [1, null], "b": 0.5}));
}
