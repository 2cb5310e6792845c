//! Data shapes supplied by upstream collaborators

use crate::error::{CheckError, Result};
use crate::value::Value;
use indexmap::IndexMap;

/// Observed data, in one of the shapes an upstream adapter can produce.
///
/// Absence is `Data::Element(Value::NotFound)`; see [`Data::not_found`].
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// A single scalar or tuple-like element
    Element(Value),
    /// Ordered collection
    Sequence(Vec<Value>),
    /// Unordered collection
    Collection(Vec<Value>),
    /// Elements grouped by key
    Mapping(IndexMap<Value, Data>),
}

impl Data {
    pub fn not_found() -> Self {
        Data::Element(Value::NotFound)
    }

    pub fn element(value: impl Into<Value>) -> Self {
        Data::Element(value.into())
    }

    pub fn sequence(items: impl IntoIterator<Item = Value>) -> Self {
        Data::Sequence(items.into_iter().collect())
    }

    pub fn collection(items: impl IntoIterator<Item = Value>) -> Self {
        Data::Collection(items.into_iter().collect())
    }

    pub fn mapping(items: impl IntoIterator<Item = (Value, Data)>) -> Self {
        Data::Mapping(items.into_iter().collect())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Data::Element(value) if value.is_not_found())
    }

    /// Type name used in error messages
    pub fn type_name(&self) -> String {
        match self {
            Data::Element(value) => value.type_name(),
            Data::Sequence(_) => "list".to_string(),
            Data::Collection(_) => "collection".to_string(),
            Data::Mapping(_) => "dict".to_string(),
        }
    }

    /// The elements to compare one by one. A single element is a
    /// one-element slice; mappings have no flat elements.
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Data::Element(value) => Some(std::slice::from_ref(value)),
            Data::Sequence(items) | Data::Collection(items) => Some(items),
            Data::Mapping(_) => None,
        }
    }

    /// Key/value groups of mapping data or of an iterable of two-item
    /// tuples. Repeated keys in pair data are gathered into one sequence.
    pub fn items(&self) -> Result<IndexMap<Value, Data>> {
        let pairs = match self {
            Data::Mapping(map) => return Ok(map.clone()),
            _ if self.is_not_found() => return Ok(IndexMap::new()),
            Data::Sequence(items) | Data::Collection(items) if items.iter().all(is_pair) => items,
            _ => {
                return Err(CheckError::input_shape(
                    "data must be mapping or iterable of key-value items",
                ))
            }
        };

        let mut grouped: IndexMap<Value, Vec<Value>> = IndexMap::new();
        for pair in pairs {
            if let Value::Tuple(fields) = pair.resolve().as_ref() {
                grouped
                    .entry(fields[0].clone())
                    .or_default()
                    .push(fields[1].clone());
            }
        }

        Ok(grouped
            .into_iter()
            .map(|(key, mut values)| {
                let data = if values.len() == 1 {
                    Data::from(values.remove(0))
                } else {
                    log::debug!("key {} appears {} times; grouping values", key, values.len());
                    Data::Sequence(values)
                };
                (key, data)
            })
            .collect())
    }
}

fn is_pair(value: &Value) -> bool {
    value.with_resolved(|v| matches!(v, Value::Tuple(fields) if fields.len() == 2))
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        match value {
            Value::List(items) => Data::Sequence(items),
            Value::Set(items) => Data::Collection(items.into_iter().collect()),
            Value::Map(items) => {
                Data::Mapping(items.into_iter().map(|(k, v)| (k, Data::from(v))).collect())
            }
            Value::Shared(shared) => {
                let inner = shared.borrow().clone();
                Data::from(inner)
            }
            other => Data::Element(other),
        }
    }
}

impl From<Vec<Value>> for Data {
    fn from(items: Vec<Value>) -> Self {
        Data::Sequence(items)
    }
}
