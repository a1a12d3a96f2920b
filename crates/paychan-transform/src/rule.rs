//! Transform rule definitions and results

use crate::{Error, Result};
use paychan_ir::{Object, Params, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The operation a rule performs
///
/// Unknown names are kept in `Unsupported` so that reading a rule never
/// fails on its type; the engine rejects them at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleKind {
    Multiply,
    Datetime,
    JsonPath,
    Regex,
    EnumMap,
    Unsupported(String),
}

impl RuleKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RuleKind::Multiply => "multiply",
            RuleKind::Datetime => "datetime",
            RuleKind::JsonPath => "jsonpath",
            RuleKind::Regex => "regex",
            RuleKind::EnumMap => "enum_map",
            RuleKind::Unsupported(name) => name,
        }
    }
}

impl From<&str> for RuleKind {
    fn from(name: &str) -> Self {
        match name {
            "multiply" => RuleKind::Multiply,
            "datetime" => RuleKind::Datetime,
            "jsonpath" => RuleKind::JsonPath,
            "regex" => RuleKind::Regex,
            "enum_map" => RuleKind::EnumMap,
            other => RuleKind::Unsupported(other.to_string()),
        }
    }
}

impl From<String> for RuleKind {
    fn from(name: String) -> Self {
        RuleKind::from(name.as_str())
    }
}

impl From<RuleKind> for String {
    fn from(kind: RuleKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed, parameterized value transformation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(default)]
    pub params: Params,
}

impl TransformRule {
    pub fn new(kind: RuleKind, params: Params) -> Self {
        Self { kind, params }
    }

    /// Multiply by a constant, rounding to cents
    #[must_use]
    pub fn multiply(factor: f64) -> Self {
        Self::new(RuleKind::Multiply, Params::new().with("value", factor))
    }

    /// Reformat a timestamp or ISO-8601 string
    pub fn datetime(format: impl Into<String>) -> Self {
        Self::new(RuleKind::Datetime, Params::new().with("format", Value::String(format.into())))
    }

    /// Extract the first match of a JSONPath expression
    pub fn jsonpath(path: impl Into<String>) -> Self {
        Self::new(RuleKind::JsonPath, Params::new().with("path", Value::String(path.into())))
    }

    /// Extract a capture group of a regex search
    pub fn regex(pattern: impl Into<String>, group: usize) -> Self {
        let group = i64::try_from(group).unwrap_or(i64::MAX);
        Self::new(
            RuleKind::Regex,
            Params::new()
                .with("pattern", Value::String(pattern.into()))
                .with("group", group),
        )
    }

    /// Remap enumerated values
    #[must_use]
    pub fn enum_map(mapping: Object, case_sensitive: bool) -> Self {
        Self::new(
            RuleKind::EnumMap,
            Params::new()
                .with("mapping", mapping)
                .with("case_sensitive", case_sensitive),
        )
    }

    /// Read a rule from a mapping record's `transform_rule` field
    ///
    /// Accepts a structured object, or a string holding a JSON object
    /// (single quotes are normalized to double quotes first). `null`, the
    /// empty string and the placeholder `none` mean "no rule".
    ///
    /// # Errors
    ///
    /// Returns an error when the value cannot be read as a rule.
    pub fn from_value(value: &Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::String(text) => {
                let text = text.trim();
                if text.is_empty() || text.eq_ignore_ascii_case("none") {
                    return Ok(None);
                }
                let normalized = text.replace('\'', "\"");
                serde_json::from_str(&normalized)
                    .map(Some)
                    .map_err(|e| Error::Parse(e.to_string()))
            }
            Value::Object(_) => serde_json::from_value(serde_json::Value::from(value.clone()))
                .map(Some)
                .map_err(|e| Error::Parse(e.to_string())),
            other => Err(Error::Parse(format!(
                "expected an object or string, found {}",
                other.type_name()
            ))),
        }
    }
}

impl std::str::FromStr for TransformRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_value(&Value::from(s))?
            .ok_or_else(|| Error::Parse("placeholder rule has no content".to_string()))
    }
}

/// Outcome of one transform invocation
///
/// Exactly one of `value` and `error` is populated, selected by `success`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformResult {
    pub success: bool,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TransformResult {
    #[must_use]
    pub fn success(value: Value) -> Self {
        Self {
            success: true,
            value: Some(value),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            value: None,
            error: Some(error.into()),
        }
    }

    /// Convert into a standard result, carrying the error message
    ///
    /// # Errors
    ///
    /// Returns the failure message when the transform did not succeed.
    pub fn into_result(self) -> std::result::Result<Value, String> {
        if self.success {
            Ok(self.value.unwrap_or(Value::Null))
        } else {
            Err(self.error.unwrap_or_default())
        }
    }
}

impl From<Result<Value>> for TransformResult {
    fn from(result: Result<Value>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(error) => Self::failure(error.to_string()),
        }
    }
}

/// Response to an interactive "test a rule" request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformReport {
    pub original_value: Value,
    pub transformed_value: Option<Value>,
    pub success: bool,
    pub error: Option<String>,
    pub rule: TransformRule,
}
