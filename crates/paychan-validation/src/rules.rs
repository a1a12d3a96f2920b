//! Field validation rules
//!
//! Each predicate is total: it answers `true` or `false` for any input
//! and never panics. A `null` value passes every check; whether a field
//! may be absent is decided by the mapping, not by its type.

use paychan_ir::Value;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern")
});

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern"));

// Prefix match: fractional seconds and offsets may follow
static DATETIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}").expect("datetime pattern"));

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[\w\-.]+(:\d+)?(/[\w\-./]*)?$").expect("url pattern")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\-]{10,}$").expect("phone pattern"));

/// Declared field types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }

    /// Whether a non-null value is of this type
    ///
    /// Booleans are not numbers, and a decimal is never an integer even
    /// when it has no fractional part.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::String => matches!(value, Value::String(_)),
            FieldType::Number => matches!(value, Value::Integer(_) | Value::Decimal(_)),
            FieldType::Integer => matches!(value, Value::Integer(_)),
            FieldType::Boolean => matches!(value, Value::Bool(_)),
            FieldType::Array => matches!(value, Value::Array(_)),
            FieldType::Object => matches!(value, Value::Object(_)),
        }
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(FieldType::String),
            "number" => Ok(FieldType::Number),
            "integer" => Ok(FieldType::Integer),
            "boolean" => Ok(FieldType::Boolean),
            "array" => Ok(FieldType::Array),
            "object" => Ok(FieldType::Object),
            other => Err(format!("unknown field type '{other}'")),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String formats a field may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    Email,
    /// `YYYY-MM-DD`
    Date,
    /// `YYYY-MM-DD[T ]HH:MM:SS`, anything may follow
    DateTime,
    /// `http://` or `https://`
    Url,
    /// Optional `+`, then at least ten digits or hyphens
    Phone,
}

impl FieldFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FieldFormat::Email => "email",
            FieldFormat::Date => "date",
            FieldFormat::DateTime => "datetime",
            FieldFormat::Url => "url",
            FieldFormat::Phone => "phone",
        }
    }

    #[must_use]
    pub fn matches(self, text: &str) -> bool {
        let re: &Regex = match self {
            FieldFormat::Email => &EMAIL_RE,
            FieldFormat::Date => &DATE_RE,
            FieldFormat::DateTime => &DATETIME_RE,
            FieldFormat::Url => &URL_RE,
            FieldFormat::Phone => &PHONE_RE,
        };
        re.is_match(text)
    }
}

impl FromStr for FieldFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(FieldFormat::Email),
            "date" => Ok(FieldFormat::Date),
            "datetime" => Ok(FieldFormat::DateTime),
            "url" => Ok(FieldFormat::Url),
            "phone" => Ok(FieldFormat::Phone),
            other => Err(format!("unknown field format '{other}'")),
        }
    }
}

/// Validate a value against a declared type name
///
/// Unknown type names fail.
#[must_use]
pub fn validate_type(value: &Value, expected_type: &str) -> bool {
    if value.is_null() {
        return true;
    }
    expected_type
        .parse::<FieldType>()
        .is_ok_and(|field_type| field_type.matches(value))
}

/// Validate a string value against a named format
///
/// Blank values pass. Non-string values and unknown format names fail.
#[must_use]
pub fn validate_format(value: &Value, format: &str) -> bool {
    if value.is_blank() {
        return true;
    }
    let Ok(format) = format.parse::<FieldFormat>() else {
        return false;
    };
    value.as_str().is_some_and(|text| format.matches(text))
}

/// Validate the length of a string, array or object
///
/// Strings are measured in characters, containers in entries. Other
/// value kinds fail.
#[must_use]
pub fn validate_length(value: &Value, min: Option<usize>, max: Option<usize>) -> bool {
    let len = match value {
        Value::Null => return true,
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => return false,
    };
    min.is_none_or(|min| len >= min) && max.is_none_or(|max| len <= max)
}

/// Validate that a numeric value, or numeric string, lies within bounds
#[must_use]
pub fn validate_range(value: &Value, min: Option<f64>, max: Option<f64>) -> bool {
    if value.is_null() {
        return true;
    }
    let Some(number) = value.coerce_f64() else {
        return false;
    };
    min.is_none_or(|min| number >= min) && max.is_none_or(|max| number <= max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(value: serde_json::Value) -> Value {
        Value::from(value)
    }

    #[test]
    fn test_type_null_always_passes() {
        for name in ["string", "number", "integer", "boolean", "array", "object", "unknown"] {
            assert!(validate_type(&Value::Null, name));
        }
    }

    #[test]
    fn test_type_correspondence() {
        assert!(validate_type(&v(json!("a")), "string"));
        assert!(validate_type(&v(json!(1)), "number"));
        assert!(validate_type(&v(json!(1.5)), "number"));
        assert!(validate_type(&v(json!(1)), "integer"));
        assert!(!validate_type(&v(json!(1.5)), "integer"));
        assert!(validate_type(&v(json!(true)), "boolean"));
        assert!(validate_type(&v(json!([1])), "array"));
        assert!(validate_type(&v(json!({"a": 1})), "object"));

        assert!(!validate_type(&v(json!("1")), "number"));
        assert!(!validate_type(&v(json!(true)), "number"));
        assert!(!validate_type(&v(json!(1)), "string"));
    }

    #[test]
    fn test_type_unknown_fails() {
        assert!(!validate_type(&v(json!("a")), "text"));
        assert!(!validate_type(&v(json!("a")), ""));
    }

    #[test]
    fn test_format_email() {
        assert!(validate_format(&v(json!("buyer@example.com")), "email"));
        assert!(!validate_format(&v(json!("buyer@example")), "email"));
        assert!(!validate_format(&v(json!("not an email")), "email"));
    }

    #[test]
    fn test_format_date_and_datetime() {
        assert!(validate_format(&v(json!("2024-01-15")), "date"));
        assert!(!validate_format(&v(json!("2024-01-15 10:00:00")), "date"));
        assert!(validate_format(&v(json!("2024-01-15 10:00:00")), "datetime"));
        assert!(validate_format(&v(json!("2024-01-15T10:00:00.123+08:00")), "datetime"));
        assert!(!validate_format(&v(json!("2024-01-15")), "datetime"));
    }

    #[test]
    fn test_format_url_and_phone() {
        assert!(validate_format(&v(json!("https://openapi.example.com/gateway.do")), "url"));
        assert!(validate_format(&v(json!("http://localhost:8080")), "url"));
        assert!(!validate_format(&v(json!("ftp://example.com")), "url"));

        assert!(validate_format(&v(json!("+86-138-0000-0000")), "phone"));
        assert!(validate_format(&v(json!("13800000000")), "phone"));
        assert!(!validate_format(&v(json!("12345")), "phone"));
    }

    #[test]
    fn test_format_blank_passes_unknown_fails() {
        assert!(validate_format(&v(json!("")), "email"));
        assert!(validate_format(&Value::Null, "email"));
        assert!(validate_format(&v(json!("")), "unknown"));
        assert!(!validate_format(&v(json!("abc")), "unknown"));
        assert!(!validate_format(&v(json!(12_345_678_901_i64)), "phone"));
    }

    #[test]
    fn test_length() {
        assert!(validate_length(&v(json!("hello")), Some(3), Some(10)));
        assert!(!validate_length(&v(json!("ab")), Some(3), None));
        assert!(!validate_length(&v(json!("this is too long")), None, Some(5)));
        assert!(validate_length(&v(json!("支付宝")), Some(3), Some(3)));
        assert!(validate_length(&v(json!([1, 2])), Some(2), Some(2)));
        assert!(validate_length(&v(json!({"a": 1})), None, Some(1)));
        assert!(validate_length(&v(json!("anything")), None, None));
    }

    #[test]
    fn test_length_non_applicable_kinds() {
        assert!(!validate_length(&v(json!(12)), None, None));
        assert!(!validate_length(&v(json!(true)), None, None));
        assert!(validate_length(&Value::Null, Some(1), None));
    }

    #[test]
    fn test_range() {
        assert!(validate_range(&v(json!(5)), Some(0.0), Some(10.0)));
        assert!(validate_range(&v(json!("9.99")), Some(0.01), None));
        assert!(!validate_range(&v(json!(-1)), Some(0.0), None));
        assert!(!validate_range(&v(json!(10.5)), None, Some(10.0)));
        assert!(validate_range(&v(json!(10.0)), Some(10.0), Some(10.0)));
        assert!(validate_range(&Value::Null, Some(1.0), None));
    }

    #[test]
    fn test_range_non_numeric_fails() {
        assert!(!validate_range(&v(json!("abc")), None, None));
        assert!(!validate_range(&v(json!([1])), None, None));
        assert!(!validate_range(&v(json!(true)), None, None));
    }

    #[test]
    fn test_names_round_trip() {
        for name in ["string", "number", "integer", "boolean", "array", "object"] {
            assert_eq!(name.parse::<FieldType>().unwrap().as_str(), name);
        }
        for name in ["email", "date", "datetime", "url", "phone"] {
            assert_eq!(name.parse::<FieldFormat>().unwrap().as_str(), name);
        }
    }
}
