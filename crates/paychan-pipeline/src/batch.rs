//! Batch mapping application
//!
//! Runs a channel's whole mapping set over one payload. Every mapping is
//! attempted; problems are collected in order and reported together once
//! the set is exhausted.

use crate::policies::{ApplyConfig, output_key};
use crate::{Error, Result};
use paychan_ir::{Object, Value};
use paychan_schema::FieldMapping;
use paychan_transform::{RuleKind, TransformEngine, TransformRule};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Output of a batch run before the accumulate-then-fail decision
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Output fields keyed by channel field name
    pub fields: Object,
    /// Per-field problems, in mapping order
    pub errors: Vec<String>,
}

impl BatchResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The output fields, or every accumulated error
    ///
    /// # Errors
    ///
    /// Returns [`Error::Aggregate`] when any mapping failed.
    pub fn into_result(self) -> Result<Object> {
        if self.errors.is_empty() {
            Ok(self.fields)
        } else {
            Err(Error::Aggregate {
                errors: self.errors,
            })
        }
    }
}

/// What one mapping contributes to the batch
enum Outcome {
    Skip,
    Store(String, Value),
    Fail(String),
}

/// Applies field mapping sets to payloads
#[derive(Debug, Clone, Default)]
pub struct BatchApplier {
    config: ApplyConfig,
    engine: TransformEngine,
}

impl BatchApplier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: ApplyConfig) -> Self {
        let engine = TransformEngine::with_config(config.transform.clone());
        Self { config, engine }
    }

    #[must_use]
    pub fn config(&self) -> &ApplyConfig {
        &self.config
    }

    /// Apply every mapping and return the accumulated fields and errors
    #[must_use]
    pub fn run(&self, payload: &Object, mappings: &[FieldMapping]) -> BatchResult {
        let mut result = BatchResult::new();
        for mapping in mappings {
            record(&mut result, self.apply_mapping(payload, mapping));
        }
        finish(&result);
        result
    }

    /// Apply a mapping set, failing as a unit if any mapping failed
    ///
    /// # Errors
    ///
    /// Returns [`Error::Aggregate`] carrying every per-field error in
    /// mapping order.
    pub fn apply(&self, payload: &Object, mappings: &[FieldMapping]) -> Result<Object> {
        self.run(payload, mappings).into_result()
    }

    /// Apply raw mapping records as read from storage
    ///
    /// A record that cannot be read as a field mapping is recorded as an
    /// error; the remaining records are still applied.
    #[must_use]
    pub fn run_records(&self, payload: &Object, records: &[Value]) -> BatchResult {
        let mut result = BatchResult::new();
        for raw in records {
            let outcome = match read_mapping(raw) {
                Ok(mapping) => self.apply_mapping(payload, &mapping),
                Err(e) => Outcome::Fail(format!("Error processing mapping: {e}")),
            };
            record(&mut result, outcome);
        }
        finish(&result);
        result
    }

    /// Apply raw mapping records, failing as a unit if any record failed
    ///
    /// # Errors
    ///
    /// Returns [`Error::Aggregate`] carrying every per-record error.
    pub fn apply_records(&self, payload: &Object, records: &[Value]) -> Result<Object> {
        self.run_records(payload, records).into_result()
    }

    /// Apply a mapping set to a payload that must be an object
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPayload`] when the payload is not an object,
    /// otherwise as [`BatchApplier::apply`].
    pub fn apply_value(&self, payload: &Value, mappings: &[FieldMapping]) -> Result<Object> {
        let object = payload.as_object().ok_or_else(|| {
            Error::InvalidPayload(format!("expected an object, found {}", payload.type_name()))
        })?;
        self.apply(object, mappings)
    }

    fn apply_mapping(&self, payload: &Object, mapping: &FieldMapping) -> Outcome {
        let (Some(channel), Some(internal)) = (mapping.channel(), mapping.internal()) else {
            trace!("Skipping mapping without field names");
            return Outcome::Skip;
        };
        let namespaced = self.config.is_namespaced(channel);

        let mut value = match payload.get(internal).filter(|value| !value.is_null()) {
            Some(value) => value.clone(),
            None if namespaced => Value::Object(payload.clone()),
            None if mapping.is_required => {
                return Outcome::Fail(format!("Missing required field: {internal}"));
            }
            None => {
                trace!("Skipping absent optional field {}", internal);
                return Outcome::Skip;
            }
        };

        let rule = match mapping.transform_rule.as_ref().map(TransformRule::from_value) {
            None | Some(Ok(None)) => None,
            Some(Ok(Some(rule))) => Some(rule),
            Some(Err(e)) => return Outcome::Fail(format!("Transform error for {internal}: {e}")),
        };

        if let Some(rule) = rule {
            if namespaced {
                let drill = TransformRule::jsonpath(channel);
                match self.engine.transform(&value, &drill).into_result() {
                    Ok(found) => value = found,
                    Err(e) => {
                        return Outcome::Fail(format!(
                            "JSONPath transform failed for {internal}: {e}"
                        ));
                    }
                }
            }
            if rule.kind != RuleKind::JsonPath {
                match self.engine.transform(&value, &rule).into_result() {
                    Ok(transformed) => value = transformed,
                    Err(e) => return Outcome::Fail(format!("Transform failed for {internal}: {e}")),
                }
            }
        }

        Outcome::Store(output_key(channel, namespaced).to_string(), value)
    }
}

fn record(result: &mut BatchResult, outcome: Outcome) {
    match outcome {
        Outcome::Skip => {}
        Outcome::Store(key, value) => {
            result.fields.insert(key, value);
        }
        Outcome::Fail(error) => {
            debug!("Mapping failed: {}", error);
            result.errors.push(error);
        }
    }
}

fn finish(result: &BatchResult) {
    if result.errors.is_empty() {
        debug!("Batch produced {} fields", result.fields.len());
    } else {
        warn!(
            "Batch produced {} fields with {} errors",
            result.fields.len(),
            result.errors.len()
        );
    }
}

fn read_mapping(record: &Value) -> std::result::Result<FieldMapping, String> {
    if record.as_object().is_none() {
        return Err(format!("expected an object, found {}", record.type_name()));
    }
    serde_json::from_value(serde_json::Value::from(record.clone())).map_err(|e| e.to_string())
}
