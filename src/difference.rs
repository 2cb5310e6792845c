//! Difference taxonomy
//!
//! A [`Difference`] records one discrepancy between data and a requirement.
//! Named key coordinates can be attached for grouped comparisons; they take
//! part in equality and display only.

use crate::value::{format_float, Value};
use indexmap::IndexMap;
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// What kind of discrepancy was found
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DifferenceKind {
    /// Expected but absent from data
    Missing { value: Value },
    /// Present in data but not expected
    Extra { value: Value },
    /// Fails equality or a predicate. `expected` is omitted for predicates
    /// and patterns.
    Invalid { actual: Value, expected: Option<Value> },
    /// Numeric `actual - expected`. `expected` is `None` when the reference
    /// side was never measured.
    Deviation { deviation: Value, expected: Option<Value> },
    /// A strict subset was required but the sets are equal
    NotProperSubset,
    /// A strict superset was required but the sets are equal
    NotProperSuperset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Difference {
    #[serde(flatten)]
    pub kind: DifferenceKind,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub keys: IndexMap<String, Value>,
}

impl Difference {
    pub fn new(kind: DifferenceKind) -> Self {
        Self {
            kind,
            keys: IndexMap::new(),
        }
    }

    pub fn missing(value: impl Into<Value>) -> Self {
        Self::new(DifferenceKind::Missing {
            value: value.into(),
        })
    }

    pub fn extra(value: impl Into<Value>) -> Self {
        Self::new(DifferenceKind::Extra {
            value: value.into(),
        })
    }

    pub fn invalid(actual: impl Into<Value>) -> Self {
        Self::new(DifferenceKind::Invalid {
            actual: actual.into(),
            expected: None,
        })
    }

    pub fn invalid_with(actual: impl Into<Value>, expected: impl Into<Value>) -> Self {
        Self::new(DifferenceKind::Invalid {
            actual: actual.into(),
            expected: Some(expected.into()),
        })
    }

    pub fn deviation(deviation: impl Into<Value>, expected: Option<Value>) -> Self {
        Self::new(DifferenceKind::Deviation {
            deviation: deviation.into(),
            expected,
        })
    }

    pub fn not_proper_subset() -> Self {
        Self::new(DifferenceKind::NotProperSubset)
    }

    pub fn not_proper_superset() -> Self {
        Self::new(DifferenceKind::NotProperSuperset)
    }

    /// Attach a named key coordinate
    pub fn with_key(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keys.insert(name.into(), value.into());
        self
    }

    pub fn with_keys(mut self, keys: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.keys.extend(keys);
        self
    }

    pub fn kind(&self) -> &DifferenceKind {
        &self.kind
    }

    pub fn keys(&self) -> &IndexMap<String, Value> {
        &self.keys
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            DifferenceKind::Missing { .. } => "Missing",
            DifferenceKind::Extra { .. } => "Extra",
            DifferenceKind::Invalid { .. } => "Invalid",
            DifferenceKind::Deviation { .. } => "Deviation",
            DifferenceKind::NotProperSubset => "NotProperSubset",
            DifferenceKind::NotProperSuperset => "NotProperSuperset",
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut args = Vec::new();
        match &self.kind {
            DifferenceKind::Missing { value } | DifferenceKind::Extra { value } => {
                args.push(value.to_string());
            }
            DifferenceKind::Invalid { actual, expected } => {
                args.push(actual.to_string());
                if let Some(expected) = expected {
                    args.push(expected.to_string());
                }
            }
            DifferenceKind::Deviation {
                deviation,
                expected,
            } => {
                args.push(signed(deviation));
                args.push(expected.as_ref().map_or("None".to_string(), |v| v.to_string()));
            }
            DifferenceKind::NotProperSubset | DifferenceKind::NotProperSuperset => {}
        }
        for (name, value) in &self.keys {
            args.push(format!("{}={}", name, value));
        }
        write!(f, "{}({})", self.name(), args.join(", "))
    }
}

fn signed(value: &Value) -> String {
    value.with_resolved(|v| match v {
        Value::Int(i) if *i > 0 => format!("+{}", i),
        Value::Float(x) if *x > 0.0 => format!("+{}", format_float(*x)),
        other => other.to_string(),
    })
}

/// Build the difference for an `actual`/`expected` pair already known to be
/// unequal.
///
/// Numbers (or a number against an absent value) give a `Deviation`; an
/// absent actual counts as zero, an absent expected is recorded as `None`.
/// Anything else, including number-vs-string, gives an `Invalid`.
pub fn make_difference(actual: &Value, expected: &Value, show_expected: bool) -> Difference {
    let actual_absent = actual.is_not_found();
    let expected_absent = expected.is_not_found();
    let numeric_or_absent = |v: &Value| v.is_numeric() || v.is_not_found();

    if numeric_or_absent(actual) && numeric_or_absent(expected) && !(actual_absent && expected_absent) {
        let recorded = if expected_absent {
            None
        } else {
            Some(expected.resolve().into_owned())
        };
        return Difference::deviation(subtract(actual, expected), recorded);
    }

    if actual_absent {
        return Difference::invalid_with(Value::None, expected.resolve().into_owned());
    }
    if show_expected && !expected_absent {
        Difference::invalid_with(actual.clone(), expected.clone())
    } else {
        Difference::invalid(actual.clone())
    }
}

/// `a - b`, with absent operands counting as zero. Integer results stay
/// integral unless they overflow.
fn subtract(a: &Value, b: &Value) -> Value {
    let zero_if_absent = |v: &Value| match v.resolve().into_owned() {
        Value::NotFound => Value::Int(0),
        other => other,
    };
    match (zero_if_absent(a), zero_if_absent(b)) {
        (Value::Int(x), Value::Int(y)) => x
            .checked_sub(y)
            .map(Value::Int)
            .unwrap_or_else(|| Value::Float(x as f64 - y as f64)),
        (x, y) => Value::Float(x.as_f64().unwrap_or(0.0) - y.as_f64().unwrap_or(0.0)),
    }
}

/// A non-empty set of differences, in the shape the comparison produced.
///
/// Values of this type built by the crate always hold at least one
/// difference; "no difference" is expressed as `None` by the callers.
#[derive(Debug, Clone, PartialEq)]
pub enum Differences {
    /// Single-element comparison
    Single(Difference),
    /// Collection comparison
    List(Vec<Difference>),
    /// Sequence alignment keyed by `(data_index, requirement_index)`
    Positional(BTreeMap<(usize, usize), Difference>),
    /// Grouped comparison keyed by group key
    Keyed(IndexMap<Value, Differences>),
}

impl Differences {
    pub fn from_list(list: Vec<Difference>) -> Option<Self> {
        if list.is_empty() {
            None
        } else {
            Some(Self::List(list))
        }
    }

    pub fn from_positional(map: BTreeMap<(usize, usize), Difference>) -> Option<Self> {
        if map.is_empty() {
            None
        } else {
            Some(Self::Positional(map))
        }
    }

    pub fn from_keyed(map: IndexMap<Value, Differences>) -> Option<Self> {
        if map.is_empty() {
            None
        } else {
            Some(Self::Keyed(map))
        }
    }

    /// Total number of leaf differences
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::List(list) => list.len(),
            Self::Positional(map) => map.len(),
            Self::Keyed(map) => map.values().map(Differences::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All leaf differences in presentation order
    pub fn flatten(&self) -> Vec<&Difference> {
        match self {
            Self::Single(diff) => vec![diff],
            Self::List(list) => list.iter().collect(),
            Self::Positional(map) => map.values().collect(),
            Self::Keyed(map) => map.values().flat_map(Differences::flatten).collect(),
        }
    }

    /// Wrap a lone single-element difference into a one-item list
    pub fn into_listed(self) -> Self {
        match self {
            Self::Single(diff) => Self::List(vec![diff]),
            other => other,
        }
    }
}

impl Serialize for Differences {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Single(diff) => diff.serialize(serializer),
            Self::List(list) => serializer.collect_seq(list),
            Self::Positional(map) => {
                let mut seq = serializer.serialize_seq(Some(map.len()))?;
                for (&(data_index, requirement_index), diff) in map {
                    seq.serialize_element(&PositionalEntry {
                        data_index,
                        requirement_index,
                        difference: diff,
                    })?;
                }
                seq.end()
            }
            Self::Keyed(map) => {
                let mut seq = serializer.serialize_seq(Some(map.len()))?;
                for (key, diffs) in map {
                    seq.serialize_element(&KeyedEntry { key, differences: diffs })?;
                }
                seq.end()
            }
        }
    }
}

struct PositionalEntry<'a> {
    data_index: usize,
    requirement_index: usize,
    difference: &'a Difference,
}

impl Serialize for PositionalEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut entry = serializer.serialize_struct("PositionalEntry", 3)?;
        entry.serialize_field("data_index", &self.data_index)?;
        entry.serialize_field("requirement_index", &self.requirement_index)?;
        entry.serialize_field("difference", self.difference)?;
        entry.end()
    }
}

#[derive(Serialize)]
struct KeyedEntry<'a> {
    key: &'a Value,
    differences: &'a Differences,
}
