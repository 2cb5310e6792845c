//! Error types for tabcheck operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CheckError>;

/// Usage and contract errors. Failures raised *inside* user predicates or
/// custom equality never surface here; those become `Invalid` differences.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("data type '{type_name}' can not be checked for sequence order")]
    ArgumentShape { type_name: String },

    #[error("'{name}' returned {returned}, should return True, False or a difference instance")]
    PredicateContract { name: String, returned: String },

    #[error("Invalid input: {message}")]
    InputShape { message: String },

    #[error("unhashable type: '{type_name}'")]
    Unhashable { type_name: String },

    #[error("expected {expected} names for row values, got {found}")]
    RowArity { expected: usize, found: usize },

    #[error("operator '{op}' is not supported against {operand}")]
    UnsupportedOperator { op: String, operand: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl CheckError {
    pub fn argument_shape(type_name: impl Into<String>) -> Self {
        Self::ArgumentShape {
            type_name: type_name.into(),
        }
    }

    pub fn predicate_contract(name: impl Into<String>, returned: impl Into<String>) -> Self {
        Self::PredicateContract {
            name: name.into(),
            returned: returned.into(),
        }
    }

    pub fn input_shape(msg: impl Into<String>) -> Self {
        Self::InputShape {
            message: msg.into(),
        }
    }

    pub fn unhashable(type_name: impl Into<String>) -> Self {
        Self::Unhashable {
            type_name: type_name.into(),
        }
    }

    pub fn row_arity(expected: usize, found: usize) -> Self {
        Self::RowArity { expected, found }
    }

    pub fn unsupported_operator(op: impl Into<String>, operand: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            op: op.into(),
            operand: operand.into(),
        }
    }
}
