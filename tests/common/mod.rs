//! Common test utilities and helpers

use tabcheck::{Data, Difference, DifferenceKind, Differences, Value};

/// Route engine logs to the test harness; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn strs(items: &[&str]) -> Vec<Value> {
    items.iter().map(|s| Value::from(*s)).collect()
}

pub fn ints(items: &[i64]) -> Vec<Value> {
    items.iter().map(|i| Value::Int(*i)).collect()
}

/// Two-field tuple, the shape of key/value rows
pub fn pair(key: impl Into<Value>, value: impl Into<Value>) -> Value {
    Value::tuple(vec![key.into(), value.into()])
}

/// Leaf differences of a result, or nothing when the data passed
pub fn leaves(result: &Option<Differences>) -> Vec<Difference> {
    result
        .as_ref()
        .map(|diffs| diffs.flatten().into_iter().cloned().collect())
        .unwrap_or_default()
}

/// Replay positional differences over `data` to rebuild the expected
/// sequence: `Missing` inserts, `Extra` drops, `Invalid` replaces.
pub fn replay_alignment(data: &[Value], diffs: &Option<Differences>) -> Vec<Value> {
    let mut rebuilt = Vec::new();
    let mut next = 0;

    if let Some(Differences::Positional(map)) = diffs {
        for (&(i, _), diff) in map {
            while next < i {
                rebuilt.push(data[next].clone());
                next += 1;
            }
            match diff.kind() {
                DifferenceKind::Missing { value } => rebuilt.push(value.clone()),
                DifferenceKind::Extra { .. } => next = i + 1,
                DifferenceKind::Invalid {
                    expected: Some(expected),
                    ..
                } => {
                    rebuilt.push(expected.clone());
                    next = i + 1;
                }
                other => panic!("unexpected difference in alignment: {:?}", other),
            }
        }
    }

    rebuilt.extend(data[next.min(data.len())..].iter().cloned());
    rebuilt
}

/// Grouped data from `(key, data)` pairs with string keys
pub fn grouped(groups: Vec<(&str, Data)>) -> Data {
    Data::mapping(groups.into_iter().map(|(key, data)| (Value::from(key), data)))
}
