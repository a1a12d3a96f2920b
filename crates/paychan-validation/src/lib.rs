#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # paychan-validation
//!
//! Field validation rules and mapping definition checks.
//!
//! The field rules are plain predicates over [`paychan_ir::Value`]. The
//! [`MappingValidator`] checks the shape of proposed mapping definitions
//! and cross-checks them against a channel's field catalog, producing a
//! [`MappingReport`] rather than an error.
//!
//! ## Example Usage
//!
//! ```rust
//! use paychan_schema::FieldDefinition;
//! use paychan_validation::{MappingDefinition, MappingValidator};
//! use serde_json::json;
//!
//! let mapping: MappingDefinition = serde_json::from_value(json!({
//!     "mapping_rules": {"channel_field": "total_amount", "internal_field": "amount"},
//!     "test_value": 9.99
//! }))
//! .unwrap();
//! let fields = vec![FieldDefinition::new("total_amount", "number")];
//!
//! let report = MappingValidator::new().validate_mappings(&[mapping], &fields);
//! assert!(report.valid);
//! ```

pub mod engine;
pub mod reporter;
pub mod rules;

pub use engine::{MappingDefinition, MappingValidator};
pub use reporter::{MappingIssue, MappingReport, TypeMismatch};
pub use rules::{
    FieldFormat, FieldType, validate_format, validate_length, validate_range, validate_type,
};

use paychan_schema::FieldDefinition;
use thiserror::Error;

/// Errors that can occur while reading mapping definitions
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid mapping definition: {0}")]
    InvalidDefinition(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Convenience function to validate a mapping set with the default validator
#[must_use]
pub fn validate_mappings(
    mappings: &[MappingDefinition],
    channel_fields: &[FieldDefinition],
) -> MappingReport {
    MappingValidator::new().validate_mappings(mappings, channel_fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_convenience_validate_mappings() {
        let mappings = vec![MappingDefinition::new(paychan_ir::Value::from(json!({})))];
        let report = validate_mappings(&mappings, &[]);
        assert!(!report.valid);
        assert!(report.errors[0].errors.len() >= 2);
    }

    #[test]
    fn test_error_display() {
        let error = Error::InvalidDefinition("expected an object".into());
        assert_eq!(error.to_string(), "Invalid mapping definition: expected an object");
    }
}
