//! Channel field catalog

use crate::model::FieldDefinition;
use std::collections::HashMap;

/// Name-keyed lookup over a channel's field definitions
///
/// Built from the flat field list of a parsed API document. When two
/// definitions share a name, the later one wins.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    fields: HashMap<String, FieldDefinition>,
}

impl FieldCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from definitions in declaration order
    pub fn from_fields(fields: impl IntoIterator<Item = FieldDefinition>) -> Self {
        let mut catalog = Self::new();
        for field in fields {
            catalog.insert(field);
        }
        catalog
    }

    /// Add a definition, replacing any earlier one with the same name
    pub fn insert(&mut self, field: FieldDefinition) {
        self.fields.insert(field.name.clone(), field);
    }

    /// Get a definition by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    /// Check if a definition exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<FieldDefinition> for FieldCatalog {
    fn from_iter<I: IntoIterator<Item = FieldDefinition>>(iter: I) -> Self {
        Self::from_fields(iter)
    }
}
