//! # tabcheck
//!
//! A requirement-based validation engine for structured data. Data is
//! checked against a requirement (a sequence, set, predicate, pattern,
//! mapping or literal) and every discrepancy is reported as a typed
//! difference: `Missing`, `Extra`, `Invalid` or `Deviation`.

pub mod checker;
pub mod compare;
pub mod config;
pub mod data;
pub mod difference;
pub mod error;
pub mod hash;
pub mod mapping;
pub mod output;
pub mod predicate;
pub mod requirement;
pub mod results;
pub mod sequence;
pub mod value;

pub use checker::{check, difference_info, Checker, Failure};
pub use config::{CheckConfig, SequenceAlgorithm};
pub use data::Data;
pub use difference::{make_difference, Difference, DifferenceKind, Differences};
pub use error::{CheckError, Result};
pub use predicate::{Arity, CustomPredicate, Predicate, Verdict};
pub use requirement::{classify, Comparator, Requirement};
pub use results::{KeyNames, MappingOperand, Op, ResultMapping, ResultSet, SetOperand};
pub use value::{CustomValue, SharedValue, Value, NOT_FOUND};
