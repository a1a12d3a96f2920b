//! Transform engine

use crate::rule::{RuleKind, TransformReport, TransformResult, TransformRule};
use crate::transforms;
use crate::{Error, Result};
use paychan_ir::{JsonPath, Value};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Output pattern of the datetime rule when the rule gives none
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Fallback strftime pattern for the datetime rule
    pub datetime_format: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
        }
    }
}

impl TransformConfig {
    #[must_use]
    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = format.into();
        self
    }
}

/// Executes transform rules against single values
///
/// Stateless apart from its configuration; one engine may be shared by
/// any number of callers.
#[derive(Debug, Clone, Default)]
pub struct TransformEngine {
    config: TransformConfig,
}

impl TransformEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: TransformConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Execute a rule, folding any failure into the result
    #[must_use]
    pub fn transform(&self, value: &Value, rule: &TransformRule) -> TransformResult {
        trace!("Applying {} rule to {}", rule.kind, value);
        match self.apply(value, rule) {
            Ok(transformed) => TransformResult::success(transformed),
            Err(e) => {
                debug!("Transform failed: {}", e);
                TransformResult::failure(e.to_string())
            }
        }
    }

    /// Execute a rule
    ///
    /// # Errors
    ///
    /// Returns an error when the rule type is unknown, its parameters are
    /// malformed, or the value cannot be transformed.
    pub fn apply(&self, value: &Value, rule: &TransformRule) -> Result<Value> {
        let params = &rule.params;
        match &rule.kind {
            RuleKind::Multiply => transforms::multiply(value, params),
            RuleKind::Datetime => transforms::datetime(value, params, &self.config.datetime_format),
            RuleKind::JsonPath => transforms::jsonpath(value, params),
            RuleKind::Regex => transforms::regex(value, params),
            RuleKind::EnumMap => transforms::enum_map(value, params),
            RuleKind::Unsupported(name) => Err(Error::Unsupported(name.clone())),
        }
    }

    /// Cheap precheck of whether a rule can process a value
    ///
    /// Looks at the value's kind and the parameters each rule cannot run
    /// without. A `true` answer does not guarantee the transform succeeds:
    /// a path may still miss or a pattern may not match.
    #[must_use]
    pub fn accepts(&self, value: &Value, rule: &TransformRule) -> bool {
        let params = &rule.params;
        match &rule.kind {
            RuleKind::Multiply => {
                (value.is_null() || value.coerce_f64().is_some()) && params.f64("value").is_ok()
            }
            RuleKind::Datetime => {
                transforms::parse_datetime(value).is_ok() && params.str("format").is_ok()
            }
            RuleKind::JsonPath => {
                matches!(value, Value::Array(_) | Value::Object(_))
                    && matches!(
                        params.required_str("path"),
                        Ok(path) if JsonPath::parse(path).is_ok()
                    )
            }
            RuleKind::Regex => matches!(
                params.required_str("pattern"),
                Ok(pattern) if Regex::new(pattern).is_ok()
            ),
            RuleKind::EnumMap => {
                matches!(params.object("mapping"), Ok(Some(mapping)) if !mapping.is_empty())
                    && params.bool("case_sensitive").is_ok()
            }
            RuleKind::Unsupported(_) => false,
        }
    }

    /// Run a rule against a sample value and report the outcome
    #[must_use]
    pub fn test(&self, value: &Value, rule: &TransformRule) -> TransformReport {
        let result = self.transform(value, rule);
        TransformReport {
            original_value: value.clone(),
            transformed_value: result.value,
            success: result.success,
            error: result.error,
            rule: rule.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paychan_ir::{Object, Params};
    use serde_json::json;

    fn rule(value: serde_json::Value) -> TransformRule {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_dispatch_each_kind() {
        let engine = TransformEngine::new();

        let result = engine.transform(&Value::from("19.99"), &TransformRule::multiply(100.0));
        assert_eq!(result.value, Some(Value::Decimal(1999.0)));

        let result = engine.transform(&Value::Integer(0), &TransformRule::datetime("%Y"));
        assert_eq!(result.value, Some(Value::from("1970")));

        let doc = Value::from(json!({"a": {"b": 5}}));
        let result = engine.transform(&doc, &TransformRule::jsonpath("$.a.b"));
        assert_eq!(result.value, Some(Value::Integer(5)));

        let result = engine.transform(&Value::from("order-42"), &TransformRule::regex("(\\d+)", 1));
        assert_eq!(result.value, Some(Value::from("42")));

        let mut mapping = Object::new();
        mapping.insert("yes".into(), Value::from("Y"));
        let result = engine.transform(&Value::from("YES"), &TransformRule::enum_map(mapping, false));
        assert_eq!(result.value, Some(Value::from("Y")));
    }

    #[test]
    fn test_unsupported_rule_fails_cleanly() {
        let result = TransformEngine::new().transform(
            &Value::from("x"),
            &rule(json!({"type": "base64", "params": {}})),
        );
        assert!(!result.success);
        assert_eq!(result.value, None);
        assert_eq!(result.error.as_deref(), Some("unsupported rule type: base64"));
    }

    #[test]
    fn test_failure_carries_message_not_value() {
        let result = TransformEngine::new().transform(&Value::from("abc"), &TransformRule::multiply(2.0));
        assert!(!result.success);
        assert!(result.value.is_none());
        assert!(result.error.unwrap().starts_with("multiply rule:"));
    }

    #[test]
    fn test_configured_datetime_default() {
        let engine = TransformEngine::with_config(TransformConfig::default().with_datetime_format("%d/%m/%Y"));
        let result = engine.transform(&Value::from("2024-01-15T10:30:00Z"), &rule(json!({"type": "datetime"})));
        assert_eq!(result.value, Some(Value::from("15/01/2024")));

        let result = TransformEngine::new().transform(&Value::from("2024-01-15T10:30:00Z"), &rule(json!({"type": "datetime"})));
        assert_eq!(result.value, Some(Value::from("2024-01-15 10:30:00")));
    }

    #[test]
    fn test_deterministic() {
        let engine = TransformEngine::new();
        let rule = TransformRule::regex("^(\\w+)-", 1);
        let first = engine.transform(&Value::from("abc-123"), &rule);
        let second = engine.transform(&Value::from("abc-123"), &rule);
        assert_eq!(first, second);
    }

    #[test]
    fn test_accepts() {
        let engine = TransformEngine::new();
        let amount = Value::from("12.50");
        assert!(engine.accepts(&amount, &TransformRule::multiply(100.0)));
        assert!(engine.accepts(&Value::Null, &rule(json!({"type": "multiply"}))));
        assert!(!engine.accepts(&Value::from("abc"), &TransformRule::multiply(100.0)));
        assert!(!engine.accepts(&amount, &rule(json!({"type": "multiply", "params": {"value": "ten"}}))));

        let when = TransformRule::datetime("%Y");
        assert!(engine.accepts(&Value::Integer(0), &when));
        assert!(engine.accepts(&Value::from("2024-01-15T10:30:00Z"), &when));
        assert!(!engine.accepts(&Value::from("soon"), &when));

        let doc = Value::from(json!({"a": 1}));
        assert!(engine.accepts(&doc, &TransformRule::jsonpath("$.a")));
        assert!(!engine.accepts(&Value::from("a"), &TransformRule::jsonpath("$.a")));
        assert!(!engine.accepts(&doc, &rule(json!({"type": "jsonpath"}))));

        assert!(engine.accepts(&amount, &TransformRule::regex("\\d+", 0)));
        assert!(!engine.accepts(&amount, &TransformRule::regex("(unclosed", 0)));
        assert!(!engine.accepts(&amount, &TransformRule::new(RuleKind::EnumMap, Params::new())));
        assert!(!engine.accepts(&amount, &rule(json!({"type": "base64"}))));
    }

    #[test]
    fn test_report() {
        let rule = TransformRule::multiply(100.0);
        let report = TransformEngine::new().test(&Value::from("1.5"), &rule);
        assert!(report.success);
        assert_eq!(report.original_value, Value::from("1.5"));
        assert_eq!(report.transformed_value, Some(Value::Decimal(150.0)));
        assert_eq!(report.error, None);
        assert_eq!(report.rule, rule);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: TransformConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config.datetime_format, DEFAULT_DATETIME_FORMAT);
    }
}
