//! Set, predicate and equality comparators

use crate::config::CheckConfig;
use crate::data::Data;
use crate::difference::{make_difference, Difference, Differences};
use crate::error::{CheckError, Result};
use crate::mapping;
use crate::predicate::Predicate;
use crate::requirement::{classify, Comparator, Requirement};
use crate::sequence;
use crate::value::Value;
use indexmap::IndexSet;
use regex::Regex;

/// Compare `data` against `requirement`, dispatching on the requirement's
/// shape. Grouped data is checked group by group.
pub fn compare(data: &Data, requirement: &Requirement, config: &CheckConfig) -> Result<Option<Differences>> {
    if let Data::Mapping(groups) = data {
        if !matches!(requirement, Requirement::Mapping(_)) {
            return mapping::require_each(groups, requirement, config);
        }
    }
    let (_, comparator) = classify(requirement, data);
    comparator.apply(data, requirement, config)
}

impl Comparator {
    /// Run this comparator. The requirement must have the shape the
    /// comparator was classified from.
    pub fn apply(
        self,
        data: &Data,
        requirement: &Requirement,
        config: &CheckConfig,
    ) -> Result<Option<Differences>> {
        match (self, requirement) {
            (Comparator::Sequence, Requirement::Sequence(sequence)) => {
                sequence::align(data, sequence, config.sequence_algorithm)
            }
            (Comparator::Set, Requirement::Set(set)) => require_set(data, set),
            (Comparator::Predicate, Requirement::Predicate(predicate)) => {
                require_predicate(data, predicate)
            }
            (Comparator::Pattern, Requirement::Pattern(regex)) => require_pattern(data, regex),
            (Comparator::Mapping, Requirement::Mapping(map)) => {
                mapping::require_mapping(data, map, config)
            }
            (Comparator::SingleEquality, Requirement::Value(expected)) => match data {
                Data::Element(element) => {
                    Ok(require_single_equality(element, expected).map(Differences::Single))
                }
                _ => require_equality(data, expected),
            },
            (Comparator::Equality, Requirement::Value(expected)) => require_equality(data, expected),
            (comparator, requirement) => Err(CheckError::input_shape(format!(
                "{:?} comparator can not apply a {} requirement",
                comparator,
                requirement.kind_name()
            ))),
        }
    }
}

/// Elements of flat data; absent data has none
fn flat_elements(data: &Data) -> Result<&[Value]> {
    if data.is_not_found() {
        return Ok(&[]);
    }
    data.elements()
        .ok_or_else(|| CheckError::input_shape("grouped data must be compared group by group"))
}

/// Unordered membership: data elements outside the set are `Extra`, set
/// members never seen in data are `Missing`.
pub fn require_set(data: &Data, requirement: &IndexSet<Value>) -> Result<Option<Differences>> {
    let mut matching = IndexSet::new();
    let mut extra = IndexSet::new();
    for element in flat_elements(data)? {
        if requirement.contains(element) {
            matching.insert(element.clone());
        } else {
            extra.insert(element.clone());
        }
    }

    let missing = requirement
        .iter()
        .filter(|value| !matching.contains(*value))
        .map(|value| Difference::missing(value.clone()));
    let diffs = missing.chain(extra.into_iter().map(Difference::extra)).collect();
    Ok(Differences::from_list(diffs))
}

/// Evaluate `predicate` on every element. Absent data always fails with
/// a single `Invalid(None)`.
pub fn require_predicate(data: &Data, predicate: &Predicate) -> Result<Option<Differences>> {
    if data.is_not_found() {
        return Ok(Some(Differences::Single(Difference::invalid(Value::None))));
    }
    if let Data::Element(element) = data {
        return Ok(predicate.check_element(element)?.map(Differences::Single));
    }

    let mut diffs = Vec::new();
    for element in flat_elements(data)? {
        if let Some(diff) = predicate.check_element(element)? {
            diffs.push(diff);
        }
    }
    Ok(Differences::from_list(diffs))
}

pub fn require_pattern(data: &Data, regex: &Regex) -> Result<Option<Differences>> {
    require_predicate(data, &Predicate::pattern(regex.clone()))
}

/// Compare every element with `expected`, using the expected side's
/// equality.
pub fn require_equality(data: &Data, expected: &Value) -> Result<Option<Differences>> {
    if data.is_not_found() {
        let diff = make_difference(&Value::NotFound, expected, false);
        return Ok(Some(Differences::Single(diff)));
    }

    let diffs = flat_elements(data)?
        .iter()
        .filter(|element| !expected_equals(expected, element))
        .map(|element| make_difference(element, expected, false))
        .collect();
    Ok(Differences::from_list(diffs))
}

/// Compare one element with `expected`; the difference shows the
/// expected value.
pub fn require_single_equality(element: &Value, expected: &Value) -> Option<Difference> {
    if expected_equals(expected, element) {
        None
    } else {
        Some(make_difference(element, expected, true))
    }
}

fn expected_equals(expected: &Value, element: &Value) -> bool {
    expected.try_eq(element).unwrap_or_else(|err| {
        log::debug!(
            "comparing {} with {} raised: {}; counting as unequal",
            element,
            expected,
            err
        );
        false
    })
}
