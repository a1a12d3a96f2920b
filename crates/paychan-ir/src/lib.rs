#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # paychan-ir
//!
//! Value model shared by every payment channel crate.
//!
//! Provider payloads, transform parameters and mapping records are all
//! loosely typed documents. This crate gives them one variant type with
//! explicit accessors, a typed parameter bag, and a JSONPath evaluator
//! used to drill into nested provider responses.

/// Typed accessors over a rule's parameter bag.
pub mod params;
/// JSONPath parsing and evaluation over [`Value`] trees.
pub mod path;
/// The variant value type.
pub mod value;

/// Parameter bag with typed accessors.
pub use params::Params;
/// Compiled JSONPath expression.
pub use path::JsonPath;
/// Variant value and its object representation.
pub use value::{Object, Value};

use thiserror::Error;

/// Errors that can occur when reading values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("parameter '{key}' not specified")]
    MissingParam { key: String },

    #[error("parameter '{key}' has wrong type: expected {expected}, found {found}")]
    ParamType {
        key: String,
        expected: String,
        found: String,
    },

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

impl Error {
    /// Build a missing-parameter error.
    pub fn missing_param(key: impl Into<String>) -> Self {
        Self::MissingParam { key: key.into() }
    }

    /// Build a parameter type mismatch error.
    pub fn param_type(
        key: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::ParamType {
            key: key.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Build an invalid-path error with input path and parsing reason.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Crate-local result type for value operations.
pub type Result<T> = std::result::Result<T, Error>;
