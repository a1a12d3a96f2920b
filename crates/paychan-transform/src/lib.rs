//! # paychan-transform
//!
//! Rule-based value transformation for channel field mappings.
//!
//! A [`TransformRule`] names one of five operations (multiply, datetime,
//! jsonpath, regex, enum_map) and carries its parameters. The
//! [`TransformEngine`] executes a rule against one value and reports the
//! outcome as a [`TransformResult`]; it never returns an error or panics
//! on bad input.

pub mod engine;
pub mod numeric;
pub mod rule;
pub mod transforms;

pub use engine::{DEFAULT_DATETIME_FORMAT, TransformConfig, TransformEngine};
pub use rule::{RuleKind, TransformReport, TransformResult, TransformRule};

use paychan_ir::Value;
use thiserror::Error;

/// Errors raised while executing or reading a transform rule
///
/// `Rule` covers malformed or unsupported rules, `Value` covers inputs the
/// rule cannot interpret. Both are folded into a failed
/// [`TransformResult`] at the engine boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{kind} rule: {message}")]
    Rule { kind: RuleKind, message: String },

    #[error("{kind} rule: {message}")]
    Value { kind: RuleKind, message: String },

    #[error("unsupported rule type: {0}")]
    Unsupported(String),

    #[error("invalid transform rule: {0}")]
    Parse(String),
}

impl Error {
    /// Malformed rule parameters
    pub fn rule(kind: RuleKind, message: impl Into<String>) -> Self {
        Self::Rule {
            kind,
            message: message.into(),
        }
    }

    /// Input value the rule cannot interpret
    pub fn value(kind: RuleKind, message: impl Into<String>) -> Self {
        Self::Value {
            kind,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Execute a rule with the default engine configuration
#[must_use]
pub fn transform(value: &Value, rule: &TransformRule) -> TransformResult {
    TransformEngine::new().transform(value, rule)
}
