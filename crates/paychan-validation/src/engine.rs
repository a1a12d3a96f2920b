//! Mapping validation engine

use crate::reporter::{MappingReport, TypeMismatch};
use crate::rules::validate_type;
use crate::{Error, Result};
use paychan_ir::{Object, Value};
use paychan_schema::{FieldCatalog, FieldDefinition, FieldMapping};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

const CHANNEL_FIELD: &str = "channel_field";
const INTERNAL_FIELD: &str = "internal_field";
const TRANSFORM_RULE: &str = "transform_rule";

/// A mapping definition as submitted for validation
///
/// Kept loose on purpose: `mapping_rules` is whatever the caller sent, so
/// that shape problems become report entries instead of parse failures.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MappingDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_rules: Option<Value>,
    /// Sample value checked against the channel field's declared type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_value: Option<Value>,
}

impl MappingDefinition {
    /// Definition wrapping the given rules
    pub fn new(mapping_rules: impl Into<Value>) -> Self {
        Self {
            mapping_rules: Some(mapping_rules.into()),
            ..Self::default()
        }
    }

    /// Wrap a [`FieldMapping`] record
    ///
    /// # Errors
    ///
    /// Returns an error when the record cannot be represented as a value.
    pub fn from_field_mapping(mapping: &FieldMapping) -> Result<Self> {
        let rules = serde_json::to_value(mapping)
            .map_err(|e| Error::InvalidDefinition(e.to_string()))?;
        Ok(Self::new(Value::from(rules)))
    }

    /// Read a definition from a loosely typed record
    ///
    /// # Errors
    ///
    /// Returns an error when the record is not an object or a known key
    /// has the wrong kind.
    pub fn from_value(value: &Value) -> Result<Self> {
        if value.as_object().is_none() {
            return Err(Error::InvalidDefinition(format!(
                "expected an object, found {}",
                value.type_name()
            )));
        }
        serde_json::from_value(serde_json::Value::from(value.clone()))
            .map_err(|e| Error::InvalidDefinition(e.to_string()))
    }

    #[must_use]
    pub fn with_test_value(mut self, value: impl Into<Value>) -> Self {
        self.test_value = Some(value.into());
        self
    }

    /// `mapping_rules.channel_field`, when it is a string
    #[must_use]
    pub fn channel_field(&self) -> Option<&str> {
        self.rules()
            .and_then(|rules| rules.get(CHANNEL_FIELD))
            .and_then(Value::as_str)
    }

    fn rules(&self) -> Option<&Object> {
        self.mapping_rules.as_ref().and_then(Value::as_object)
    }
}

/// Validates mapping definitions against a channel's field catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingValidator;

impl MappingValidator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validate one mapping definition
    ///
    /// `channel_field` is the catalog entry named by the mapping, if any.
    /// Returns one message per problem; an empty list means valid.
    ///
    /// A `transform_rule` that is `null` or a placeholder string (`none` in
    /// any case, or blank) means "no transform" and is accepted without a
    /// shape check. Any other rule must be an object with `type` and `params`.
    #[must_use]
    pub fn validate_mapping(
        &self,
        mapping: &MappingDefinition,
        channel_field: Option<&FieldDefinition>,
    ) -> Vec<String> {
        let mut errors = Vec::new();

        // An empty object is reported as missing but its required keys are
        // still checked; only a truly absent value skips those checks
        let rules = match mapping.mapping_rules.as_ref() {
            None | Some(Value::Null) => {
                errors.push("Missing required field: mapping_rules".to_string());
                None
            }
            Some(Value::Object(rules)) => {
                if rules.is_empty() {
                    errors.push("Missing required field: mapping_rules".to_string());
                }
                Some(rules)
            }
            Some(other) => {
                errors.push(format!(
                    "Invalid mapping_rules structure: expected object, found {}",
                    other.type_name()
                ));
                None
            }
        };

        if let Some(rules) = rules {
            for key in [CHANNEL_FIELD, INTERNAL_FIELD] {
                match rules.get(key) {
                    Some(Value::String(name)) if !name.is_empty() => {}
                    Some(value) if !value.is_blank() => {
                        errors.push(format!("Invalid field in mapping_rules: {key} must be a string"));
                    }
                    _ => errors.push(format!("Missing required field in mapping_rules: {key}")),
                }
            }
        }

        if let Some(field) = channel_field.filter(|field| !field.field_type.is_empty()) {
            let test_value = mapping.test_value.as_ref().unwrap_or(&Value::Null);
            if !validate_type(test_value, &field.field_type) {
                errors.push(format!("Invalid field type: expected {}", field.field_type));
            }
        }

        if let Some(rule) = rules.and_then(|rules| rules.get(TRANSFORM_RULE)) {
            if !is_placeholder(rule) && !has_rule_shape(rule) {
                errors.push("Invalid transform rule configuration structure".to_string());
            }
        }

        trace!("Mapping {:?} produced {} errors", mapping.name, errors.len());
        errors
    }

    /// Validate a mapping set against the channel's field list
    ///
    /// Field definitions are looked up by `mapping_rules.channel_field`;
    /// later definitions with the same name replace earlier ones.
    #[must_use]
    pub fn validate_mappings(
        &self,
        mappings: &[MappingDefinition],
        channel_fields: &[FieldDefinition],
    ) -> MappingReport {
        let catalog = FieldCatalog::from_fields(channel_fields.iter().cloned());
        self.validate_against(mappings, &catalog)
    }

    /// Validate a mapping set against a prepared catalog
    #[must_use]
    pub fn validate_against(
        &self,
        mappings: &[MappingDefinition],
        catalog: &FieldCatalog,
    ) -> MappingReport {
        let mut report = MappingReport::new();
        for mapping in mappings {
            let field = mapping.channel_field().and_then(|name| catalog.get(name));
            let errors = self.validate_mapping(mapping, field);
            report.add(mapping.clone(), errors);
        }
        debug!(
            "Validated {} mappings: {} failing",
            mappings.len(),
            report.errors.len()
        );
        report
    }

    /// Channel fields marked required whose value in `data` is blank
    #[must_use]
    pub fn validate_required_fields(&self, data: &Object, mappings: &[FieldMapping]) -> Vec<String> {
        mappings
            .iter()
            .filter(|mapping| mapping.is_required)
            .filter_map(FieldMapping::channel)
            .filter(|channel| data.get(*channel).is_none_or(Value::is_blank))
            .map(str::to_string)
            .collect()
    }

    /// Values in `data` whose type disagrees with their mapping's field type
    #[must_use]
    pub fn validate_data_types(&self, data: &Object, mappings: &[FieldMapping]) -> Vec<TypeMismatch> {
        let mut mismatches = Vec::new();
        for mapping in mappings {
            let Some(channel) = mapping.channel() else {
                continue;
            };
            let Some(expected) = mapping.field_type.as_deref().filter(|t| !t.is_empty()) else {
                continue;
            };
            let Some(value) = data.get(channel).filter(|value| !value.is_null()) else {
                continue;
            };
            if !validate_type(value, expected) {
                mismatches.push(TypeMismatch {
                    field: channel.to_string(),
                    expected_type: expected.to_string(),
                    actual_value: value.clone(),
                });
            }
        }
        mismatches
    }
}

fn is_placeholder(rule: &Value) -> bool {
    match rule {
        Value::String(text) => {
            let text = text.trim();
            text.is_empty() || text.eq_ignore_ascii_case("none")
        }
        other => other.is_blank(),
    }
}

fn has_rule_shape(rule: &Value) -> bool {
    rule.as_object()
        .is_some_and(|rule| rule.contains_key("type") && rule.contains_key("params"))
}
