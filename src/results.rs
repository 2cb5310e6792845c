//! Query result containers
//!
//! [`ResultSet`] holds distinct elements, [`ResultMapping`] holds one value
//! per key. Both compare against plain collections by coercing them into
//! the same container first.

use crate::difference::{make_difference, Difference};
use crate::error::{CheckError, Result};
use crate::hash;
use crate::predicate::Predicate;
use crate::value::Value;
use indexmap::{IndexMap, IndexSet};
use std::cmp::Ordering;
use std::fmt;

/// A named row produced by `make_rows`
pub type Row = IndexMap<String, Value>;

/// Comparison operator for result comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Op {
    #[default]
    Eq,
    Ne,
    Le,
    Lt,
    Ge,
    Gt,
}

impl Op {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "==" => Ok(Op::Eq),
            "!=" => Ok(Op::Ne),
            "<=" => Ok(Op::Le),
            "<" => Ok(Op::Lt),
            ">=" => Ok(Op::Ge),
            ">" => Ok(Op::Gt),
            other => Err(CheckError::unsupported_operator(other, "results")),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::Le => "<=",
            Op::Lt => "<",
            Op::Ge => ">=",
            Op::Gt => ">",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Right-hand side of a [`ResultSet`] comparison
#[derive(Debug, Clone)]
pub enum SetOperand {
    Set(ResultSet),
    /// Plain elements, coerced into a `ResultSet`
    Values(Vec<Value>),
    Predicate(Predicate),
}

impl From<ResultSet> for SetOperand {
    fn from(set: ResultSet) -> Self {
        SetOperand::Set(set)
    }
}

impl From<Vec<Value>> for SetOperand {
    fn from(values: Vec<Value>) -> Self {
        SetOperand::Values(values)
    }
}

impl From<Predicate> for SetOperand {
    fn from(predicate: Predicate) -> Self {
        SetOperand::Predicate(predicate)
    }
}

/// Distinct result elements (scalars or fixed-arity tuples)
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    data: IndexSet<Value>,
}

impl ResultSet {
    /// Collect `items` into a set. Every element must be hashable; mapping
    /// elements are rejected since their meaning as a result is ambiguous.
    pub fn new(items: impl IntoIterator<Item = Value>) -> Result<Self> {
        let mut data = IndexSet::new();
        for item in items {
            if matches!(item.resolve().as_ref(), Value::Map(_)) {
                return Err(CheckError::input_shape(
                    "mapping elements can not be collected into a ResultSet",
                ));
            }
            hash::deep_hash(&item)?;
            data.insert(item);
        }
        Ok(Self { data })
    }

    /// Coerce a single value: lists, tuples and sets contribute their
    /// elements; mappings are rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value.resolve().into_owned() {
            Value::List(items) | Value::Tuple(items) => Self::new(items),
            Value::Set(items) => Self::new(items),
            Value::Map(_) => Err(CheckError::input_shape(
                "ResultSet can not be built from a mapping",
            )),
            other => Self::new(std::iter::once(other)),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.data.contains(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.data.iter()
    }

    pub fn is_subset(&self, other: &ResultSet) -> bool {
        self.data.is_subset(&other.data)
    }

    pub fn is_superset(&self, other: &ResultSet) -> bool {
        self.data.is_superset(&other.data)
    }

    /// Elements of both sets; elements of `self` come first
    pub fn union(&self, other: &ResultSet) -> ResultSet {
        Self {
            data: self.data.union(&other.data).cloned().collect(),
        }
    }

    /// Differences between this set and `other` under `op`.
    ///
    /// `==`/`!=` report `Extra` elements of `self` then `Missing` elements
    /// of `other`. `<=`/`<` report only `Extra`, `>=`/`>` only `Missing`;
    /// a strict relation between equal sets gives `NotProperSubset` or
    /// `NotProperSuperset`. A predicate operand checks every element and
    /// only supports `==`/`!=`.
    pub fn compare(&self, other: impl Into<SetOperand>, op: Op) -> Result<Vec<Difference>> {
        let other = match other.into() {
            SetOperand::Set(set) => set,
            SetOperand::Values(values) => ResultSet::new(values)?,
            SetOperand::Predicate(predicate) => return self.compare_predicate(&predicate, op),
        };

        let extra = || {
            self.data
                .difference(&other.data)
                .map(|value| Difference::extra(value.clone()))
        };
        let missing = || {
            other
                .data
                .difference(&self.data)
                .map(|value| Difference::missing(value.clone()))
        };

        let diffs = match op {
            Op::Eq | Op::Ne => extra().chain(missing()).collect(),
            Op::Lt if self.data == other.data => vec![Difference::not_proper_subset()],
            Op::Le | Op::Lt => extra().collect(),
            Op::Gt if self.data == other.data => vec![Difference::not_proper_superset()],
            Op::Ge | Op::Gt => missing().collect(),
        };
        Ok(diffs)
    }

    fn compare_predicate(&self, predicate: &Predicate, op: Op) -> Result<Vec<Difference>> {
        if !matches!(op, Op::Eq | Op::Ne) {
            return Err(CheckError::unsupported_operator(
                op.symbol(),
                format!("predicate '{}'", predicate.name()),
            ));
        }
        let mut diffs = Vec::new();
        for value in &self.data {
            if let Some(diff) = predicate.check_element(value)? {
                diffs.push(diff);
            }
        }
        Ok(diffs)
    }

    /// One row per element, fields named by `names`. Tuple elements
    /// spread over several names.
    pub fn make_rows(&self, names: &[&str]) -> Result<Vec<Row>> {
        self.data
            .iter()
            .map(|value| {
                let mut row = Row::new();
                spread_into(&mut row, names, value)?;
                Ok(row)
            })
            .collect()
    }
}

impl PartialEq for ResultSet {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

/// Ordered by the subset relation
impl PartialOrd for ResultSet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.data == other.data {
            Some(Ordering::Equal)
        } else if self.is_subset(other) {
            Some(Ordering::Less)
        } else if self.is_superset(other) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

impl PartialEq<Vec<Value>> for ResultSet {
    fn eq(&self, other: &Vec<Value>) -> bool {
        ResultSet::new(other.iter().cloned()).map_or(false, |other| *self == other)
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self.data.iter().map(Value::to_string).collect();
        write!(f, "ResultSet([{}])", items.join(", "))
    }
}

/// Names for the key positions of a [`ResultMapping`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyNames {
    Single(String),
    Composite(Vec<String>),
}

impl KeyNames {
    pub fn len(&self) -> usize {
        match self {
            KeyNames::Single(_) => 1,
            KeyNames::Composite(names) => names.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            KeyNames::Single(single) => single == name,
            KeyNames::Composite(names) => names.iter().any(|n| n == name),
        }
    }

    /// One-name lists behave as a single name
    fn normalized(self) -> Self {
        match self {
            KeyNames::Composite(mut names) if names.len() == 1 => KeyNames::Single(names.remove(0)),
            other => other,
        }
    }

    /// Named coordinates of `key`
    fn coordinates(&self, key: &Value) -> Vec<(String, Value)> {
        match (self, key) {
            (KeyNames::Composite(names), Value::Tuple(fields)) if names.len() == fields.len() => names
                .iter()
                .cloned()
                .zip(fields.iter().cloned())
                .collect(),
            (KeyNames::Composite(names), _) => vec![(names.join(","), key.clone())],
            (KeyNames::Single(name), _) => vec![(name.clone(), key.clone())],
        }
    }
}

impl From<&str> for KeyNames {
    fn from(name: &str) -> Self {
        KeyNames::Single(name.to_string())
    }
}

impl From<String> for KeyNames {
    fn from(name: String) -> Self {
        KeyNames::Single(name)
    }
}

impl From<Vec<&str>> for KeyNames {
    fn from(names: Vec<&str>) -> Self {
        KeyNames::Composite(names.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for KeyNames {
    fn from(names: Vec<String>) -> Self {
        KeyNames::Composite(names)
    }
}

impl<const N: usize> From<[&str; N]> for KeyNames {
    fn from(names: [&str; N]) -> Self {
        KeyNames::Composite(names.iter().map(|n| n.to_string()).collect())
    }
}

impl fmt::Display for KeyNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyNames::Single(name) => write!(f, "{}", Value::from(name.as_str())),
            KeyNames::Composite(names) => {
                let items: Vec<Value> = names.iter().map(|n| Value::from(n.as_str())).collect();
                write!(f, "{}", Value::List(items))
            }
        }
    }
}

/// Right-hand side of a [`ResultMapping`] comparison
#[derive(Debug, Clone)]
pub enum MappingOperand {
    Mapping(ResultMapping),
    /// A plain mapping or list of pairs, coerced with the left side's
    /// key names
    Value(Value),
    Predicate(Predicate),
}

impl From<ResultMapping> for MappingOperand {
    fn from(mapping: ResultMapping) -> Self {
        MappingOperand::Mapping(mapping)
    }
}

impl From<Value> for MappingOperand {
    fn from(value: Value) -> Self {
        MappingOperand::Value(value)
    }
}

impl From<Predicate> for MappingOperand {
    fn from(predicate: Predicate) -> Self {
        MappingOperand::Predicate(predicate)
    }
}

/// One value per key, with named key positions
#[derive(Debug, Clone)]
pub struct ResultMapping {
    data: IndexMap<Value, Value>,
    key_names: KeyNames,
}

impl ResultMapping {
    /// Build from a mapping or from a list, tuple or set of two-item
    /// tuples. With a single key name, one-item tuple keys are unwrapped.
    pub fn new(data: Value, key_names: impl Into<KeyNames>) -> Result<Self> {
        let pairs: Vec<(Value, Value)> = match data.resolve().into_owned() {
            Value::Map(map) => map.into_iter().collect(),
            Value::List(items) | Value::Tuple(items) => pairs_of(items)?,
            Value::Set(items) => pairs_of(items)?,
            other => {
                return Err(CheckError::input_shape(format!(
                    "data must be mapping or iterable of key-value items, got '{}'",
                    other.type_name()
                )))
            }
        };
        Self::from_pairs(pairs, key_names)
    }

    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (Value, Value)>,
        key_names: impl Into<KeyNames>,
    ) -> Result<Self> {
        let key_names = key_names.into().normalized();
        let mut data = IndexMap::new();
        for (key, value) in pairs {
            let key = match (&key_names, key) {
                (KeyNames::Single(_), Value::Tuple(mut fields)) if fields.len() == 1 => fields.remove(0),
                (_, key) => key,
            };
            if let KeyNames::Composite(names) = &key_names {
                if key.arity() != names.len() {
                    return Err(CheckError::input_shape(format!(
                        "key {} does not match key names {}",
                        key, key_names
                    )));
                }
            }
            hash::deep_hash(&key)?;
            data.insert(key, value);
        }
        Ok(Self { data, key_names })
    }

    pub fn key_names(&self) -> &KeyNames {
        &self.key_names
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.data.iter()
    }

    /// Per-key differences against `other`, each tagged with its named key
    /// coordinates. Keys present on one side only are compared against
    /// `NOTFOUND`.
    pub fn compare(&self, other: impl Into<MappingOperand>) -> Result<Vec<Difference>> {
        let other = match other.into() {
            MappingOperand::Mapping(mapping) => mapping,
            MappingOperand::Value(value) => ResultMapping::new(value, self.key_names.clone())?,
            MappingOperand::Predicate(predicate) => return self.compare_predicate(&predicate),
        };

        let keys: IndexSet<&Value> = self.data.keys().chain(other.data.keys()).collect();
        let mut diffs = Vec::new();
        for key in keys {
            let actual = self.data.get(key).unwrap_or(&Value::NotFound);
            let expected = other.data.get(key).unwrap_or(&Value::NotFound);
            let equal = expected.try_eq(actual).unwrap_or_else(|err| {
                log::debug!("comparing values for key {} raised: {}", key, err);
                false
            });
            if !equal {
                let diff = make_difference(actual, expected, true);
                diffs.push(diff.with_keys(self.key_names.coordinates(key)));
            }
        }
        Ok(diffs)
    }

    fn compare_predicate(&self, predicate: &Predicate) -> Result<Vec<Difference>> {
        let mut diffs = Vec::new();
        for (key, value) in &self.data {
            if let Some(diff) = predicate.check_element(value)? {
                diffs.push(diff.with_keys(self.key_names.coordinates(key)));
            }
        }
        Ok(diffs)
    }

    /// One row per key: key fields under the key names, value fields
    /// under `value_names`.
    pub fn make_rows(&self, value_names: &[&str]) -> Result<Vec<Row>> {
        if let Some(name) = value_names.iter().find(|n| self.key_names.contains(n)) {
            return Err(CheckError::input_shape(format!(
                "value name '{}' conflicts with key names {}",
                name, self.key_names
            )));
        }

        self.data
            .iter()
            .map(|(key, value)| {
                let mut row: Row = self.key_names.coordinates(key).into_iter().collect();
                spread_into(&mut row, value_names, value)?;
                Ok(row)
            })
            .collect()
    }

    /// Combine with another partial result. Keys on both sides are merged
    /// through `reducer`; the key names of `self` are kept.
    pub fn merge_with<F>(&self, other: &ResultMapping, reducer: F) -> Result<ResultMapping>
    where
        F: Fn(&Value, &Value) -> anyhow::Result<Value>,
    {
        let mut data = self.data.clone();
        for (key, value) in &other.data {
            let merged = match data.get(key) {
                Some(existing) => reducer(existing, value)?,
                None => value.clone(),
            };
            data.insert(key.clone(), merged);
        }
        Ok(Self {
            data,
            key_names: self.key_names.clone(),
        })
    }

    /// Merge by adding numeric values
    pub fn sum_with(&self, other: &ResultMapping) -> Result<ResultMapping> {
        self.merge_with(other, add_values)
    }
}

fn pairs_of(items: impl IntoIterator<Item = Value>) -> Result<Vec<(Value, Value)>> {
    items
        .into_iter()
        .map(|item| match item.resolve().into_owned() {
            Value::Tuple(mut fields) if fields.len() == 2 => {
                let value = fields.remove(1);
                Ok((fields.remove(0), value))
            }
            other => Err(CheckError::input_shape(format!(
                "data must be mapping or iterable of key-value items, found element {}",
                other
            ))),
        })
        .collect()
}

/// Numeric sum, integral while both sides are integers
fn add_values(a: &Value, b: &Value) -> anyhow::Result<Value> {
    match (a.resolve().as_ref(), b.resolve().as_ref()) {
        (Value::Int(x), Value::Int(y)) => Ok(x
            .checked_add(*y)
            .map(Value::Int)
            .unwrap_or(Value::Float(*x as f64 + *y as f64))),
        (x, y) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => Ok(Value::Float(x + y)),
            _ => anyhow::bail!(
                "can not add '{}' and '{}'",
                x.type_name(),
                y.type_name()
            ),
        },
    }
}

/// Put `value` into `row` under `names`, spreading tuple fields when
/// there are several names.
fn spread_into(row: &mut Row, names: &[&str], value: &Value) -> Result<()> {
    let resolved = value.resolve();
    if resolved.arity() != names.len() {
        return Err(CheckError::row_arity(names.len(), resolved.arity()));
    }
    match (names, resolved.as_ref()) {
        ([name], Value::Tuple(fields)) => {
            row.insert(name.to_string(), fields[0].clone());
        }
        ([name], other) => {
            row.insert(name.to_string(), other.clone());
        }
        (names, Value::Tuple(fields)) => {
            for (name, field) in names.iter().zip(fields) {
                row.insert(name.to_string(), field.clone());
            }
        }
        (_, other) => {
            return Err(CheckError::row_arity(names.len(), other.arity()));
        }
    }
    Ok(())
}

impl PartialEq for ResultMapping {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl PartialEq<Value> for ResultMapping {
    fn eq(&self, other: &Value) -> bool {
        ResultMapping::new(other.clone(), self.key_names.clone()).map_or(false, |other| *self == other)
    }
}

impl fmt::Display for ResultMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .data
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect();
        write!(
            f,
            "ResultMapping({{{}}}, key_names={})",
            entries.join(", "),
            self.key_names
        )
    }
}
