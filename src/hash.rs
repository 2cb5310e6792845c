//! Deep hashing for compound values
//!
//! Every value, including lists, sets, mappings and self-referential
//! shared structures, is reduced to a blake3 digest that can stand in for
//! the value as a set member or alignment token. Structurally equal values
//! produce equal digests. The digest is an internal aid, not an equality
//! definition.

use crate::error::{CheckError, Result};
use crate::value::Value;
use blake3::Hasher;

/// Digest standing in for a value
pub type HashValue = blake3::Hash;

/// Compute the deep hash of `value`.
///
/// Fails only when a component is a custom value that declares no hash.
pub fn deep_hash(value: &Value) -> Result<HashValue> {
    proxy_digest(value, Vec::new())
}

/// Deep-hash every value of a slice, keeping positions
pub fn hash_values(values: &[Value]) -> Result<Vec<HashValue>> {
    values.iter().map(deep_hash).collect()
}

/// `ancestors` holds the identities of the shared cells on the path from
/// the root to `value`. Siblings never see each other's entries, so a cell
/// referenced twice without a cycle hashes the same both times.
fn proxy_digest(value: &Value, ancestors: Vec<usize>) -> Result<HashValue> {
    let mut hasher = Hasher::new();
    match value {
        Value::None => {
            hasher.update(b"n");
        }
        Value::NotFound => {
            hasher.update(b"?");
        }
        Value::Bool(b) => {
            hasher.update(b"b");
            hasher.update(&[*b as u8]);
        }
        Value::Int(i) => hash_int(&mut hasher, *i),
        Value::Float(x) => match integral(*x) {
            // 2.0 must hash like 2 since they compare equal
            Some(i) => hash_int(&mut hasher, i),
            None => {
                let bits = if x.is_nan() { f64::NAN.to_bits() } else { x.to_bits() };
                hasher.update(b"f");
                hasher.update(&bits.to_le_bytes());
            }
        },
        Value::Str(s) => {
            hasher.update(b"s");
            hasher.update(&(s.len() as u64).to_le_bytes());
            hasher.update(s.as_bytes());
        }
        Value::Tuple(items) => hash_ordered(&mut hasher, b"t", items, &ancestors)?,
        Value::List(items) => hash_ordered(&mut hasher, b"l", items, &ancestors)?,
        Value::Set(items) => {
            let digests = items
                .iter()
                .map(|item| proxy_digest(item, ancestors.clone()))
                .collect::<Result<Vec<_>>>()?;
            hash_unordered(&mut hasher, b"S", digests);
        }
        Value::Map(items) => {
            let mut digests = Vec::with_capacity(items.len());
            for (key, item) in items {
                let mut pair = Hasher::new();
                pair.update(proxy_digest(key, ancestors.clone())?.as_bytes());
                pair.update(proxy_digest(item, ancestors.clone())?.as_bytes());
                digests.push(pair.finalize());
            }
            hash_unordered(&mut hasher, b"m", digests);
        }
        Value::Custom(custom) => match custom.hash_bytes() {
            Some(bytes) => {
                hasher.update(b"c");
                hasher.update(custom.type_name().as_bytes());
                hasher.update(b"|");
                hasher.update(&bytes);
            }
            None => return Err(CheckError::unhashable(custom.type_name())),
        },
        Value::Shared(shared) => {
            let id = shared.id();
            let cycle_start = ancestors.iter().position(|&seen| seen == id);
            match cycle_start {
                Some(position) => {
                    // Placeholder names how many levels up the cycle closes,
                    // which is the same for any structurally identical graph.
                    let distance = (ancestors.len() - position) as u64;
                    log::trace!("deep hash: cycle closes {} levels up", distance);
                    hasher.update(b"@");
                    hasher.update(&distance.to_le_bytes());
                }
                None => {
                    let mut visited = ancestors;
                    visited.push(id);
                    return proxy_digest(&shared.borrow(), visited);
                }
            }
        }
    }
    Ok(hasher.finalize())
}

fn hash_int(hasher: &mut Hasher, i: i64) {
    hasher.update(b"i");
    hasher.update(&i.to_le_bytes());
}

/// The integer an integral, in-range float stands for
pub(crate) fn integral(x: f64) -> Option<i64> {
    if x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 {
        Some(x as i64)
    } else {
        None
    }
}

fn hash_ordered(hasher: &mut Hasher, tag: &[u8], items: &[Value], ancestors: &[usize]) -> Result<()> {
    hasher.update(tag);
    hasher.update(&(items.len() as u64).to_le_bytes());
    for item in items {
        hasher.update(proxy_digest(item, ancestors.to_vec())?.as_bytes());
    }
    Ok(())
}

fn hash_unordered(hasher: &mut Hasher, tag: &[u8], mut digests: Vec<HashValue>) {
    // Sort for an order-independent result
    digests.sort_unstable_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
    hasher.update(tag);
    hasher.update(&(digests.len() as u64).to_le_bytes());
    for digest in &digests {
        hasher.update(digest.as_bytes());
    }
}
