//! Field definitions and field mapping records

use paychan_ir::Value;
use serde::{Deserialize, Serialize};

/// A provider field extracted from an API document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type", default = "default_type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
    /// Where in the document the field was declared
    #[serde(default)]
    pub source: String,
}

fn default_type() -> String {
    "string".to_string()
}

impl FieldDefinition {
    /// Create a definition with the given name and type
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            required: false,
            description: String::new(),
            source: String::new(),
        }
    }

    /// Mark the field as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the declaring location
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// One field mapping of a channel's mapping set
///
/// Pairs an internal field name with a channel (provider) field name and
/// an optional transform rule. The rule is kept as a raw value: persisted
/// records carry it either as an object or as a quoted string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(default)]
    pub channel_field: Option<String>,
    #[serde(default)]
    pub internal_field: Option<String>,
    #[serde(default = "default_field_type")]
    pub field_type: Option<String>,
    #[serde(default, alias = "required")]
    pub is_required: bool,
    #[serde(default)]
    pub transform_rule: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
}

#[allow(clippy::unnecessary_wraps)]
fn default_field_type() -> Option<String> {
    Some("string".to_string())
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            channel_field: None,
            internal_field: None,
            field_type: default_field_type(),
            is_required: false,
            transform_rule: None,
            description: None,
        }
    }
}

impl FieldMapping {
    /// Create a mapping from a channel field to an internal field
    pub fn new(channel_field: impl Into<String>, internal_field: impl Into<String>) -> Self {
        Self {
            channel_field: Some(channel_field.into()),
            internal_field: Some(internal_field.into()),
            ..Self::default()
        }
    }

    /// Mark the internal field as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// Attach a transform rule (object or quoted string form)
    #[must_use]
    pub fn with_transform(mut self, rule: impl Into<Value>) -> Self {
        self.transform_rule = Some(rule.into());
        self
    }

    /// Set the declared field type
    #[must_use]
    pub fn with_field_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    /// Channel field name, if present and non-empty
    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        self.channel_field.as_deref().filter(|name| !name.is_empty())
    }

    /// Internal field name, if present and non-empty
    #[must_use]
    pub fn internal(&self) -> Option<&str> {
        self.internal_field.as_deref().filter(|name| !name.is_empty())
    }
}
