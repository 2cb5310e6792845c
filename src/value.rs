//! Element values compared by the engine

use crate::hash;
use indexmap::{IndexMap, IndexSet};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Marker for "key or element absent". Unequal to every real value,
/// including `Value::None`.
pub const NOT_FOUND: Value = Value::NotFound;

/// User-defined element type with its own equality.
///
/// Equality may fail; a failed comparison counts as "not equal" wherever
/// the engine compares values. Values that compare equal must produce
/// equal `hash_bytes`.
pub trait CustomValue: fmt::Debug {
    fn type_name(&self) -> &str;

    fn eq_value(&self, other: &Value) -> anyhow::Result<bool>;

    /// Canonical bytes for deep hashing. `None` marks the type unhashable.
    fn hash_bytes(&self) -> Option<Vec<u8>> {
        None
    }

    fn repr(&self) -> String {
        format!("<{} object>", self.type_name())
    }
}

/// Reference-counted, interior-mutable value. Lets callers build
/// graph-shaped data, self-references included.
#[derive(Clone)]
pub struct SharedValue(Rc<RefCell<Value>>);

impl SharedValue {
    pub fn new(value: Value) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Replace the wrapped value (used to close a cycle after construction)
    pub fn replace(&self, value: Value) -> Value {
        self.0.replace(value)
    }

    pub fn borrow(&self) -> Ref<'_, Value> {
        self.0.borrow()
    }

    pub fn ptr_eq(&self, other: &SharedValue) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the shared cell, stable for its lifetime
    pub(crate) fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shared({:#x})", self.id())
    }
}

/// A single element of data or of a requirement.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    NotFound,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Fixed-arity composite element (a row of several fields)
    Tuple(Vec<Value>),
    List(Vec<Value>),
    Set(IndexSet<Value>),
    Map(IndexMap<Value, Value>),
    Custom(Rc<dyn CustomValue>),
    Shared(SharedValue),
}

impl Value {
    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Tuple(items.into_iter().collect())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Set(items.into_iter().collect())
    }

    pub fn map(items: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Value::Map(items.into_iter().collect())
    }

    pub fn shared(value: Value) -> Self {
        Value::Shared(SharedValue::new(value))
    }

    pub fn custom(value: impl CustomValue + 'static) -> Self {
        Value::Custom(Rc::new(value))
    }

    /// Type name used in error messages
    pub fn type_name(&self) -> String {
        match self {
            Value::None => "NoneType".to_string(),
            Value::NotFound => "NOTFOUND".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "str".to_string(),
            Value::Tuple(_) => "tuple".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Set(_) => "set".to_string(),
            Value::Map(_) => "dict".to_string(),
            Value::Custom(c) => c.type_name().to_string(),
            Value::Shared(s) => s.borrow().type_name(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.with_resolved(|v| matches!(v, Value::NotFound))
    }

    /// Integers and floats. Booleans are not numeric.
    pub fn is_numeric(&self) -> bool {
        self.with_resolved(|v| matches!(v, Value::Int(_) | Value::Float(_)))
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.with_resolved(|v| match v {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        })
    }

    /// String contents, looking through `Shared` wrappers
    pub fn as_str(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Str(s) => Some(Cow::Borrowed(s)),
            Value::Shared(shared) => {
                let inner = shared.borrow();
                let owned = inner.as_str().map(Cow::into_owned);
                owned.map(Cow::Owned)
            }
            _ => None,
        }
    }

    /// Number of positional fields: tuple length, 1 for anything else
    pub fn arity(&self) -> usize {
        match self {
            Value::Tuple(items) => items.len(),
            _ => 1,
        }
    }

    /// Look through `Shared` wrappers, cloning the inner value when there
    /// is one. Prefer [`Value::with_resolved`] for read-only checks.
    pub fn resolve(&self) -> Cow<'_, Value> {
        match self {
            Value::Shared(shared) => Cow::Owned(shared.borrow().resolve().into_owned()),
            other => Cow::Borrowed(other),
        }
    }

    /// Run `f` on the value behind any `Shared` wrappers without cloning it.
    /// The shared cells stay borrowed while `f` runs.
    pub fn with_resolved<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        match self {
            Value::Shared(shared) => shared.borrow().with_resolved(f),
            other => f(other),
        }
    }

    /// Equality as seen from `self`, the expected side.
    ///
    /// A custom value on the left governs the comparison; otherwise a custom
    /// value on the right is asked. Errors from custom equality propagate so
    /// callers can downgrade them. Self-referential shared values terminate:
    /// a pair of cells met again while still under comparison counts as equal.
    pub fn try_eq(&self, other: &Value) -> anyhow::Result<bool> {
        self.eq_tracked(other, &mut Vec::new())
    }

    /// `comparing` holds the identity pairs of the shared comparisons on the
    /// current path.
    fn eq_tracked(&self, other: &Value, comparing: &mut Vec<(usize, usize)>) -> anyhow::Result<bool> {
        match (self, other) {
            (Value::Shared(a), Value::Shared(b)) if a.ptr_eq(b) => Ok(true),
            (Value::Shared(_), _) | (_, Value::Shared(_)) => {
                let pair = (self.identity(), other.identity());
                if comparing.contains(&pair) {
                    log::trace!("equality: cycle closes on both sides");
                    return Ok(true);
                }
                comparing.push(pair);
                let result = self.eq_through_shared(other, comparing);
                comparing.pop();
                result
            }
            (Value::Custom(a), _) => a.eq_value(other),
            (_, Value::Custom(b)) => b.eq_value(self),
            (Value::None, Value::None) => Ok(true),
            (Value::NotFound, Value::NotFound) => Ok(true),
            (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
            (Value::Int(a), Value::Int(b)) => Ok(a == b),
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                Ok(hash::integral(*b) == Some(*a))
            }
            (Value::Float(a), Value::Float(b)) => Ok(a == b),
            (Value::Str(a), Value::Str(b)) => Ok(a == b),
            (Value::Tuple(a), Value::Tuple(b)) | (Value::List(a), Value::List(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (x, y) in a.iter().zip(b) {
                    if !x.eq_tracked(y, comparing)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Value::Set(a), Value::Set(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for x in a {
                    if find_tracked(b.iter(), x, comparing).is_none() {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Value::Map(a), Value::Map(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (key, x) in a {
                    let y = match find_tracked(b.keys(), key, comparing)
                        .and_then(|found| b.get_index(found))
                    {
                        Some((_, y)) => y,
                        None => return Ok(false),
                    };
                    if !x.eq_tracked(y, comparing)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn eq_through_shared(&self, other: &Value, comparing: &mut Vec<(usize, usize)>) -> anyhow::Result<bool> {
        match (self, other) {
            (Value::Shared(a), Value::Shared(b)) => a.borrow().eq_tracked(&b.borrow(), comparing),
            (Value::Shared(a), _) => a.borrow().eq_tracked(other, comparing),
            (_, Value::Shared(b)) => self.eq_tracked(&b.borrow(), comparing),
            _ => self.eq_tracked(other, comparing),
        }
    }

    /// Shared cell id, or the address of a plain value
    fn identity(&self) -> usize {
        match self {
            Value::Shared(shared) => shared.id(),
            other => other as *const Value as usize,
        }
    }

    fn write_repr(&self, f: &mut fmt::Formatter<'_>, path: &mut Vec<usize>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::NotFound => write!(f, "NOTFOUND"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", format_float(*x)),
            Value::Str(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Value::Tuple(items) => {
                write!(f, "(")?;
                write_items(f, items.iter(), path)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::List(items) => {
                write!(f, "[")?;
                write_items(f, items.iter(), path)?;
                write!(f, "]")
            }
            Value::Set(items) if items.is_empty() => write!(f, "set()"),
            Value::Set(items) => {
                write!(f, "{{")?;
                write_items(f, items.iter(), path)?;
                write!(f, "}}")
            }
            Value::Map(items) => {
                write!(f, "{{")?;
                for (i, (key, value)) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    key.write_repr(f, path)?;
                    write!(f, ": ")?;
                    value.write_repr(f, path)?;
                }
                write!(f, "}}")
            }
            Value::Custom(c) => write!(f, "{}", c.repr()),
            Value::Shared(shared) => {
                let id = shared.id();
                if path.contains(&id) {
                    return write!(f, "[...]");
                }
                path.push(id);
                let result = shared.borrow().write_repr(f, path);
                path.pop();
                result
            }
        }
    }
}

/// Index of the first member of `pool` equal to `target`. Set and mapping
/// members are matched pair by pair so shared cycles stay tracked; a failed
/// custom comparison counts as no match.
fn find_tracked<'a>(
    mut pool: impl Iterator<Item = &'a Value>,
    target: &Value,
    comparing: &mut Vec<(usize, usize)>,
) -> Option<usize> {
    pool.position(|candidate| target.eq_tracked(candidate, comparing).unwrap_or(false))
}

fn write_items<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Value>,
    path: &mut Vec<usize>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        item.write_repr(f, path)?;
    }
    Ok(())
}

pub(crate) fn format_float(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x.is_infinite() {
        let sign = if x > 0.0 { "" } else { "-" };
        format!("{}inf", sign)
    } else {
        format!("{:?}", x)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other).unwrap_or(false)
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match hash::deep_hash(self) {
            Ok(digest) => digest.hash(state),
            // Unhashable custom values still need a slot in hash-based
            // containers; they only collide with their own type.
            Err(_) => self.type_name().hash(state),
        }
    }
}

/// Python-style repr
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_repr(f, &mut Vec::new())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::None => serializer.serialize_none(),
            Value::NotFound => serializer.serialize_unit_variant("Value", 1, "NotFound"),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Tuple(items) | Value::List(items) => serializer.collect_seq(items),
            Value::Set(items) => serializer.collect_seq(items),
            Value::Map(items) if items.keys().all(|k| matches!(k, Value::Str(_))) => {
                let mut map = serializer.serialize_map(Some(items.len()))?;
                for (key, value) in items {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Map(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for pair in items {
                    seq.serialize_element(&pair)?;
                }
                seq.end()
            }
            Value::Custom(c) => serializer.serialize_str(&c.repr()),
            Value::Shared(shared) => shared.borrow().serialize(serializer),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (Value::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}
