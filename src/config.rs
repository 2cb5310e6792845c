//! Engine configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable overriding the sequence alignment algorithm
pub const SEQUENCE_ALGORITHM_ENV: &str = "TABCHECK_SEQUENCE_ALGORITHM";

/// Diff algorithm used by the sequence aligner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceAlgorithm {
    /// Longest common subsequence. Slower, and its runs are not minimal.
    Lcs,
    #[default]
    Myers,
    Patience,
}

impl SequenceAlgorithm {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "lcs" => Ok(Self::Lcs),
            "myers" => Ok(Self::Myers),
            "patience" => Ok(Self::Patience),
            _ => Err(format!(
                "Invalid sequence algorithm: {}. Use 'lcs', 'myers', or 'patience'",
                s
            )),
        }
    }

    pub(crate) fn to_similar(self) -> similar::Algorithm {
        match self {
            Self::Lcs => similar::Algorithm::Lcs,
            Self::Myers => similar::Algorithm::Myers,
            Self::Patience => similar::Algorithm::Patience,
        }
    }
}

/// Settings carried by a [`crate::Checker`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    pub sequence_algorithm: SequenceAlgorithm,
    /// Wrap a lone single-element difference into a one-item list in
    /// top-level failures
    pub wrap_single_difference: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            sequence_algorithm: SequenceAlgorithm::default(),
            wrap_single_difference: true,
        }
    }
}

impl CheckConfig {
    /// Defaults overlaid with environment overrides
    pub fn from_env() -> Self {
        Self::default().with_algorithm_override(env::var(SEQUENCE_ALGORITHM_ENV).ok())
    }

    /// Parse a JSON configuration document; missing fields take defaults
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    fn with_algorithm_override(mut self, raw: Option<String>) -> Self {
        if let Some(raw) = raw {
            match SequenceAlgorithm::parse(&raw) {
                Ok(algorithm) => self.sequence_algorithm = algorithm,
                Err(msg) => log::warn!("{}; keeping {:?}", msg, self.sequence_algorithm),
            }
        }
        self
    }
}
