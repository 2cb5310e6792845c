//! Grouped comparisons

use crate::compare::compare;
use crate::config::CheckConfig;
use crate::data::Data;
use crate::difference::{Difference, Differences};
use crate::error::Result;
use crate::requirement::Requirement;
use crate::value::Value;
use indexmap::IndexMap;

/// Compare grouped data against per-key requirements.
///
/// Keys present in data but not in the requirement are compared against
/// `NOTFOUND`; requirement keys absent from data are compared as absent
/// data and always produce a difference.
pub fn require_mapping(
    data: &Data,
    requirement: &IndexMap<Value, Requirement>,
    config: &CheckConfig,
) -> Result<Option<Differences>> {
    let items = data.items()?;
    let unexpected = Requirement::not_found();
    let mut differences = IndexMap::new();

    for (key, actual) in &items {
        let expected = requirement.get(key).unwrap_or(&unexpected);
        if let Some(diff) = compare(actual, expected, config)? {
            differences.insert(key.clone(), diff);
        }
    }

    for (key, expected) in requirement {
        if items.contains_key(key) {
            continue;
        }
        let absent = match expected {
            Requirement::Sequence(_) => Data::Sequence(Vec::new()),
            _ => Data::not_found(),
        };
        let diff = match compare(&absent, expected, config)? {
            Some(diff) => diff,
            None => {
                log::debug!("key {} is absent but its requirement is empty", key);
                Differences::Single(Difference::missing(key.clone()))
            }
        };
        differences.insert(key.clone(), diff);
    }

    log::debug!(
        "mapping comparison: {} data keys, {} requirement keys, {} differing",
        items.len(),
        requirement.len(),
        differences.len()
    );
    Ok(Differences::from_keyed(differences))
}

/// Apply one requirement to every group of grouped data.
pub fn require_each(
    groups: &IndexMap<Value, Data>,
    requirement: &Requirement,
    config: &CheckConfig,
) -> Result<Option<Differences>> {
    let mut differences = IndexMap::new();
    for (key, group) in groups {
        if let Some(diff) = compare(group, requirement, config)? {
            differences.insert(key.clone(), diff);
        }
    }
    Ok(Differences::from_keyed(differences))
}
