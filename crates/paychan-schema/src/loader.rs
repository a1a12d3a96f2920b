//! API document loading and field extraction
//!
//! Only the flat field list and the endpoint listing are extracted; the
//! rest of the document is left to the caller.

use crate::model::FieldDefinition;
use crate::{Error, Result};
use paychan_ir::{Object, Value};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, trace};

/// Recognized API document dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Swagger 2.x, fields under `definitions`
    Swagger,
    /// OpenAPI 3.x, fields under `components.schemas`
    OpenApi,
}

/// One operation listed under `paths`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub path: String,
    pub method: String,
    pub summary: String,
    pub description: String,
    pub parameters: Vec<Value>,
    pub responses: Value,
}

/// A provider's uploaded API document
#[derive(Debug, Clone)]
pub struct ApiDocument {
    content: Value,
    kind: DocumentKind,
}

impl ApiDocument {
    /// Wrap a parsed document, detecting its dialect
    ///
    /// # Errors
    ///
    /// Returns an error when the document is neither Swagger 2 nor OpenAPI 3.
    pub fn from_value(content: Value) -> Result<Self> {
        let kind = detect_kind(&content).ok_or_else(|| {
            Error::UnsupportedFormat("expected a 'swagger: 2.x' or 'openapi: 3.x' document".into())
        })?;
        debug!("Detected API document kind: {:?}", kind);
        Ok(Self { content, kind })
    }

    /// Parse a document from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON is malformed or the dialect unsupported.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(parse_json(json)?)
    }

    /// Parse a document from a YAML string
    ///
    /// # Errors
    ///
    /// Returns an error when the YAML is malformed or the dialect unsupported.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_value(parse_yaml(yaml)?)
    }

    /// Load a document from a `.json`, `.yaml` or `.yml` file
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::from_value(load_value(path)?)
    }

    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// The raw document
    #[must_use]
    pub fn content(&self) -> &Value {
        &self.content
    }

    /// Flat list of declared fields
    ///
    /// Schemas are visited in name order, properties in name order.
    #[must_use]
    pub fn fields(&self) -> Vec<FieldDefinition> {
        let (schemas, prefix) = match self.kind {
            DocumentKind::Swagger => (self.content.get("definitions"), "definitions"),
            DocumentKind::OpenApi => (
                self.content
                    .get("components")
                    .and_then(|components| components.get("schemas")),
                "components.schemas",
            ),
        };

        let mut fields = Vec::new();
        let Some(schemas) = schemas.and_then(Value::as_object) else {
            return fields;
        };

        for (schema_name, schema) in schemas {
            let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
                continue;
            };
            let required = required_names(schema);
            for (prop_name, prop) in properties {
                fields.push(FieldDefinition {
                    name: prop_name.clone(),
                    field_type: string_or(prop, "type", "string"),
                    required: required.contains(&prop_name.as_str()),
                    description: string_or(prop, "description", ""),
                    source: format!("{prefix}.{schema_name}"),
                });
            }
        }

        trace!("Extracted {} fields", fields.len());
        fields
    }

    /// Operations listed under `paths`
    #[must_use]
    pub fn endpoints(&self) -> Vec<Endpoint> {
        let Some(paths) = self.content.get("paths").and_then(Value::as_object) else {
            return Vec::new();
        };

        let mut endpoints = Vec::new();
        for (path, methods) in paths {
            let Some(methods) = methods.as_object() else {
                continue;
            };
            for (method, operation) in methods {
                // Path-level entries such as shared `parameters` are not operations
                if operation.as_object().is_none() {
                    continue;
                }
                endpoints.push(Endpoint {
                    path: path.clone(),
                    method: method.to_uppercase(),
                    summary: string_or(operation, "summary", ""),
                    description: string_or(operation, "description", ""),
                    parameters: operation
                        .get("parameters")
                        .and_then(Value::as_array)
                        .map(<[Value]>::to_vec)
                        .unwrap_or_default(),
                    responses: operation
                        .get("responses")
                        .cloned()
                        .unwrap_or_else(|| Value::Object(Object::new())),
                });
            }
        }
        endpoints
    }
}

fn detect_kind(content: &Value) -> Option<DocumentKind> {
    let version = |key: &str| {
        content
            .get(key)
            .filter(|v| matches!(v, Value::String(_) | Value::Integer(_) | Value::Decimal(_)))
            .map(Value::to_text)
    };

    if version("swagger").is_some_and(|v| v.starts_with('2')) {
        Some(DocumentKind::Swagger)
    } else if version("openapi").is_some_and(|v| v.starts_with('3')) {
        Some(DocumentKind::OpenApi)
    } else {
        None
    }
}

fn required_names(schema: &Value) -> Vec<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn string_or(value: &Value, key: &str, default: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

fn parse_json(json: &str) -> Result<Value> {
    serde_json::from_str(json).map_err(|e| Error::InvalidFormat(format!("JSON parse error: {e}")))
}

fn parse_yaml(yaml: &str) -> Result<Value> {
    serde_yaml::from_str(yaml).map_err(|e| Error::InvalidFormat(format!("YAML parse error: {e}")))
}

/// Load a JSON or YAML file into a [`Value`], chosen by extension
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn load_value(path: &Path) -> Result<Value> {
    trace!("Loading document from file: {:?}", path);
    let content = std::fs::read_to_string(path)?;

    if path
        .extension()
        .is_some_and(|e| e == "yaml" || e == "yml")
    {
        parse_yaml(&content)
    } else {
        parse_json(&content)
    }
}
