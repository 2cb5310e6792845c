//! Requirement shapes and dispatch

use crate::data::Data;
use crate::predicate::Predicate;
use crate::value::Value;
use indexmap::{IndexMap, IndexSet};
use regex::Regex;

/// The expected value or shape that data is validated against
#[derive(Debug, Clone)]
pub enum Requirement {
    /// Ordered sequence; data must match element order
    Sequence(Vec<Value>),
    /// Unordered membership
    Set(IndexSet<Value>),
    Predicate(Predicate),
    /// Regex searched in string elements
    Pattern(Regex),
    /// Per-key requirements for grouped data
    Mapping(IndexMap<Value, Requirement>),
    /// Scalar literal compared by equality
    Value(Value),
}

impl Requirement {
    pub fn sequence(items: impl IntoIterator<Item = Value>) -> Self {
        Requirement::Sequence(items.into_iter().collect())
    }

    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Requirement::Set(items.into_iter().collect())
    }

    pub fn mapping(items: impl IntoIterator<Item = (Value, Requirement)>) -> Self {
        Requirement::Mapping(items.into_iter().collect())
    }

    pub fn equals(value: impl Into<Value>) -> Self {
        Requirement::Value(value.into())
    }

    pub fn not_found() -> Self {
        Requirement::Value(Value::NotFound)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Requirement::Sequence(_) => "sequence",
            Requirement::Set(_) => "set",
            Requirement::Predicate(_) => "predicate",
            Requirement::Pattern(_) => "pattern",
            Requirement::Mapping(_) => "mapping",
            Requirement::Value(_) => "value",
        }
    }
}

/// Classify a plain value: lists and tuples are sequences, sets are sets,
/// maps are mappings (recursively), anything else is a literal.
impl From<Value> for Requirement {
    fn from(value: Value) -> Self {
        match value {
            Value::List(items) | Value::Tuple(items) => Requirement::Sequence(items),
            Value::Set(items) => Requirement::Set(items),
            Value::Map(items) => Requirement::Mapping(
                items
                    .into_iter()
                    .map(|(key, value)| (key, Requirement::from(value)))
                    .collect(),
            ),
            Value::Shared(shared) => {
                let inner = shared.borrow().clone();
                Requirement::from(inner)
            }
            other => Requirement::Value(other),
        }
    }
}

impl From<Predicate> for Requirement {
    fn from(predicate: Predicate) -> Self {
        Requirement::Predicate(predicate)
    }
}

impl From<Regex> for Requirement {
    fn from(regex: Regex) -> Self {
        Requirement::Pattern(regex)
    }
}

/// Comparison strategy selected for a requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Sequence,
    Set,
    Predicate,
    Pattern,
    Mapping,
    /// Literal against a collection of elements
    Equality,
    /// Literal against one element
    SingleEquality,
}

/// Pick the comparator for `requirement` and the failure header that
/// describes it.
pub fn classify(requirement: &Requirement, data: &Data) -> (String, Comparator) {
    let selected = match requirement {
        Requirement::Sequence(_) => ("does not match sequence order".to_string(), Comparator::Sequence),
        Requirement::Set(_) => ("does not satisfy set membership".to_string(), Comparator::Set),
        Requirement::Predicate(predicate) => (
            format!("does not satisfy '{}' condition", predicate.name()),
            Comparator::Predicate,
        ),
        Requirement::Pattern(regex) => (
            format!("does not satisfy '{}' regex", regex.as_str()),
            Comparator::Pattern,
        ),
        Requirement::Mapping(_) => (
            "does not satisfy mapping requirement".to_string(),
            Comparator::Mapping,
        ),
        Requirement::Value(_) if matches!(data, Data::Element(_)) && !data.is_not_found() => (
            "does not satisfy equality comparison".to_string(),
            Comparator::SingleEquality,
        ),
        Requirement::Value(value) => (format!("does not equal {}", value), Comparator::Equality),
    };
    log::debug!("requirement classified as {:?}", selected.1);
    selected
}
