//! Typed parameter access
//!
//! Transform rule parameters arrive as an untyped key/value bag. The
//! accessors here never coerce silently across kinds: a parameter is
//! either absent (`Ok(None)`), of the requested kind (`Ok(Some(..))`), or
//! a mismatch (`Err(Error::ParamType { .. })`). A `null` parameter counts
//! as absent.

use crate::value::{Object, Value};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Parameter bag of a transform rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Object);

impl Params {
    /// Create an empty parameter bag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, builder style
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set a parameter
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Raw access; `null` parameters are reported as absent
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// String parameter
    ///
    /// # Errors
    ///
    /// Returns an error when the parameter is present but not a string.
    pub fn str(&self, key: &str) -> Result<Option<&str>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(Error::param_type(key, "string", other.type_name())),
        }
    }

    /// Numeric parameter; numeric strings are accepted
    ///
    /// # Errors
    ///
    /// Returns an error when the parameter is present but not numeric.
    pub fn f64(&self, key: &str) -> Result<Option<f64>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .coerce_f64()
                .map(Some)
                .ok_or_else(|| Error::param_type(key, "number", describe(value))),
        }
    }

    /// Boolean parameter
    ///
    /// # Errors
    ///
    /// Returns an error when the parameter is present but not a boolean.
    pub fn bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(Error::param_type(key, "boolean", other.type_name())),
        }
    }

    /// Non-negative integer parameter
    ///
    /// # Errors
    ///
    /// Returns an error when the parameter is present but not a
    /// non-negative integer.
    pub fn usize(&self, key: &str) -> Result<Option<usize>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Integer(i)) => usize::try_from(*i)
                .map(Some)
                .map_err(|_| Error::param_type(key, "non-negative integer", i.to_string())),
            Some(other) => Err(Error::param_type(key, "integer", other.type_name())),
        }
    }

    /// Object parameter
    ///
    /// # Errors
    ///
    /// Returns an error when the parameter is present but not an object.
    pub fn object(&self, key: &str) -> Result<Option<&Object>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(Error::param_type(key, "object", other.type_name())),
        }
    }

    /// String parameter that must be present and non-empty
    ///
    /// # Errors
    ///
    /// Returns an error when the parameter is absent, empty, or not a string.
    pub fn required_str(&self, key: &str) -> Result<&str> {
        match self.str(key)? {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(Error::missing_param(key)),
        }
    }

    /// Numeric parameter with a default
    ///
    /// # Errors
    ///
    /// Returns an error when the parameter is present but not numeric.
    pub fn f64_or(&self, key: &str, default: f64) -> Result<f64> {
        Ok(self.f64(key)?.unwrap_or(default))
    }

    /// Boolean parameter with a default
    ///
    /// # Errors
    ///
    /// Returns an error when the parameter is present but not a boolean.
    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool> {
        Ok(self.bool(key)?.unwrap_or(default))
    }

    /// Integer parameter with a default
    ///
    /// # Errors
    ///
    /// Returns an error when the parameter is present but not a
    /// non-negative integer.
    pub fn usize_or(&self, key: &str, default: usize) -> Result<usize> {
        Ok(self.usize(key)?.unwrap_or(default))
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        other => other.type_name().to_string(),
    }
}

impl From<Object> for Params {
    fn from(map: Object) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
