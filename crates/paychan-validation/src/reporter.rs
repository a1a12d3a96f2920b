//! Validation reports

use crate::engine::MappingDefinition;
use paychan_ir::Value;
use serde::{Deserialize, Serialize};

/// Errors found in one mapping definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingIssue {
    /// The mapping as submitted
    pub mapping: MappingDefinition,
    pub errors: Vec<String>,
}

/// Outcome of validating a mapping set
///
/// Only failing mappings are listed, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingReport {
    pub valid: bool,
    pub errors: Vec<MappingIssue>,
}

impl Default for MappingReport {
    fn default() -> Self {
        Self::new()
    }
}

impl MappingReport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Record the errors of one mapping; an empty list is ignored
    pub fn add(&mut self, mapping: MappingDefinition, errors: Vec<String>) {
        if errors.is_empty() {
            return;
        }
        self.valid = false;
        self.errors.push(MappingIssue { mapping, errors });
    }

    /// Total number of error messages across all mappings
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.iter().map(|issue| issue.errors.len()).sum()
    }

    /// Every message, prefixed with the mapping's channel field when known
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .flat_map(|issue| {
                let label = issue.mapping.channel_field().map(str::to_string);
                issue.errors.iter().map(move |error| match &label {
                    Some(field) => format!("{field}: {error}"),
                    None => error.clone(),
                })
            })
            .collect()
    }
}

/// A payload value whose type disagrees with its mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeMismatch {
    pub field: String,
    pub expected_type: String,
    pub actual_value: Value,
}
