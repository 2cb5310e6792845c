//! Order-sensitive sequence alignment

use crate::config::SequenceAlgorithm;
use crate::data::Data;
use crate::difference::{Difference, Differences};
use crate::error::{CheckError, Result};
use crate::hash;
use crate::value::Value;
use similar::DiffTag;
use std::collections::BTreeMap;

/// Compare ordered `data` against an expected `sequence`.
///
/// Differences are keyed by `(data_index, sequence_index)`. Elements are
/// matched through their deep hashes, so lists, sets and mappings align
/// like scalars do.
pub fn align(
    data: &Data,
    sequence: &[Value],
    algorithm: SequenceAlgorithm,
) -> Result<Option<Differences>> {
    let items = match data {
        Data::Sequence(items) => items,
        other => return Err(CheckError::argument_shape(other.type_name())),
    };
    log::debug!(
        "aligning {} data elements against {} expected ({:?})",
        items.len(),
        sequence.len(),
        algorithm
    );

    let data_proxy = digest_bytes(items)?;
    let sequence_proxy = digest_bytes(sequence)?;
    let ops = similar::capture_diff_slices(algorithm.to_similar(), &data_proxy, &sequence_proxy);

    let aligned = Aligned {
        data: items,
        sequence,
        data_proxy: &data_proxy,
        sequence_proxy: &sequence_proxy,
    };
    let mut differences = BTreeMap::new();
    for op in ops {
        let (tag, old, new) = op.as_tag_tuple();
        if tag != DiffTag::Equal {
            aligned.append_diff(&mut differences, old.start, old.end, new.start, new.end);
        }
    }
    Ok(Differences::from_positional(differences))
}

/// Raw digest bytes: `similar` needs `Ord` tokens
fn digest_bytes(values: &[Value]) -> Result<Vec<[u8; 32]>> {
    Ok(hash::hash_values(values)?
        .iter()
        .map(|digest| *digest.as_bytes())
        .collect())
}

struct Aligned<'a> {
    data: &'a [Value],
    sequence: &'a [Value],
    data_proxy: &'a [[u8; 32]],
    sequence_proxy: &'a [[u8; 32]],
}

impl Aligned<'_> {
    fn append_diff(
        &self,
        differences: &mut BTreeMap<(usize, usize), Difference>,
        i1: usize,
        i2: usize,
        j1: usize,
        j2: usize,
    ) {
        if j1 == j2 {
            for i in i1..i2 {
                differences.insert((i, j1), Difference::extra(self.data[i].clone()));
            }
        } else if i1 == i2 {
            for j in j1..j2 {
                differences.insert((i1, j), Difference::missing(self.sequence[j].clone()));
            }
        } else {
            let shortest = (i2 - i1).min(j2 - j1);
            for (i, j) in (i1..i1 + shortest).zip(j1..j1 + shortest) {
                // Non-minimal algorithms can fold matching tokens into a
                // replace run; those pairs are not differences.
                if self.data_proxy[i] == self.sequence_proxy[j] {
                    continue;
                }
                differences.insert(
                    (i, j),
                    Difference::invalid_with(self.data[i].clone(), self.sequence[j].clone()),
                );
            }
            if i1 + shortest != i2 || j1 + shortest != j2 {
                self.append_diff(differences, i1 + shortest, i2, j1 + shortest, j2);
            }
        }
    }
}
