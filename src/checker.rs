//! Top-level validation entry points

use crate::compare;
use crate::config::CheckConfig;
use crate::data::Data;
use crate::difference::Differences;
use crate::error::Result;
use crate::output;
use crate::requirement::{classify, Requirement};
use serde::Serialize;
use std::fmt;

/// A failed check: a header describing the requirement plus the
/// differences found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub message: String,
    pub differences: Differences,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        output::write_tree(f, &self.message, &self.differences)
    }
}

/// Validates data against requirements using one configuration
#[derive(Debug, Clone, Default)]
pub struct Checker {
    config: CheckConfig,
}

impl Checker {
    pub fn new(config: CheckConfig) -> Self {
        Self { config }
    }

    /// Checker configured from the environment
    pub fn from_env() -> Self {
        Self::new(CheckConfig::from_env())
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Raw differences between `data` and `requirement`, or `None` when
    /// the data satisfies it.
    pub fn compare(&self, data: &Data, requirement: &Requirement) -> Result<Option<Differences>> {
        compare::compare(data, requirement, &self.config)
    }

    /// Describe why `data` fails `requirement`, or `None` when it passes.
    pub fn difference_info(&self, data: &Data, requirement: &Requirement) -> Result<Option<Failure>> {
        let (message, _) = classify(requirement, data);
        let differences = match self.compare(data, requirement)? {
            Some(differences) => differences,
            None => return Ok(None),
        };
        log::debug!("{}: {} difference(s)", message, differences.len());

        let differences = if self.config.wrap_single_difference {
            differences.into_listed()
        } else {
            differences
        };
        Ok(Some(Failure {
            message,
            differences,
        }))
    }

    /// Whether `data` satisfies `requirement`
    pub fn check(&self, data: &Data, requirement: &Requirement) -> Result<bool> {
        Ok(self.compare(data, requirement)?.is_none())
    }
}

/// [`Checker::difference_info`] with the default configuration
pub fn difference_info(data: &Data, requirement: &Requirement) -> Result<Option<Failure>> {
    Checker::default().difference_info(data, requirement)
}

/// [`Checker::check`] with the default configuration
pub fn check(data: &Data, requirement: &Requirement) -> Result<bool> {
    Checker::default().check(data, requirement)
}
