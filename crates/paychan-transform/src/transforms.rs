//! Transform operations
//!
//! One function per rule kind. Each returns the transformed value or an
//! [`Error`] naming the rule and the cause.

use crate::numeric::round_money;
use crate::{Error, Result, RuleKind};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use paychan_ir::{JsonPath, Params, Value};
use regex::Regex;
use std::fmt::Write;

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Multiply a numeric value by `params.value` (default 1), rounded to cents
///
/// # Errors
///
/// Returns an error when the input or the multiplier is not numeric.
pub fn multiply(value: &Value, params: &Params) -> Result<Value> {
    let amount = value.coerce_f64().ok_or_else(|| {
        Error::value(
            RuleKind::Multiply,
            format!("input value must be numeric, got {}", describe(value)),
        )
    })?;
    let factor = params
        .f64_or("value", 1.0)
        .map_err(|e| Error::rule(RuleKind::Multiply, format!("multiplier invalid: {e}")))?;

    let product = round_money(amount * factor);
    if !product.is_finite() {
        return Err(Error::value(
            RuleKind::Multiply,
            "result is not a finite number",
        ));
    }
    Ok(Value::Decimal(product))
}

/// Reformat a Unix timestamp or ISO-8601 string
///
/// `params.format` is a strftime pattern; `default_format` applies when
/// it is absent.
///
/// # Errors
///
/// Returns an error when the input cannot be parsed or the pattern is
/// invalid.
pub fn datetime(value: &Value, params: &Params, default_format: &str) -> Result<Value> {
    let format = params
        .str("format")
        .map_err(|e| Error::rule(RuleKind::Datetime, e.to_string()))?
        .unwrap_or(default_format);
    let parsed = parse_datetime(value)?;
    format_datetime(&parsed, format).map(Value::String)
}

/// Interpret a value as a point in time
///
/// Numbers are Unix timestamps in seconds (UTC). Strings are ISO-8601;
/// a trailing `Z` means `+00:00` and values without an offset are UTC.
pub(crate) fn parse_datetime(value: &Value) -> Result<DateTime<FixedOffset>> {
    match value {
        Value::Integer(seconds) => DateTime::<Utc>::from_timestamp(*seconds, 0)
            .map(|dt| dt.fixed_offset())
            .ok_or_else(|| out_of_range(value)),
        Value::Decimal(seconds) => from_fractional_timestamp(*seconds)
            .map(|dt| dt.fixed_offset())
            .ok_or_else(|| out_of_range(value)),
        other => parse_iso(&other.to_text()),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn from_fractional_timestamp(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() || seconds.abs() > 1e15 {
        return None;
    }
    let whole = seconds.floor();
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
    DateTime::<Utc>::from_timestamp(whole as i64, nanos)
}

fn out_of_range(value: &Value) -> Error {
    Error::value(
        RuleKind::Datetime,
        format!("timestamp {} is out of range", value.to_text()),
    )
}

fn parse_iso(text: &str) -> Result<DateTime<FixedOffset>> {
    let trimmed = text.trim();
    let normalized = match trimmed.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => trimmed.to_string(),
    };

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Ok(dt);
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc().fixed_offset());
    }

    Err(Error::value(
        RuleKind::Datetime,
        format!("cannot parse '{text}' as an ISO-8601 datetime"),
    ))
}

fn format_datetime(dt: &DateTime<FixedOffset>, format: &str) -> Result<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(Error::rule(
            RuleKind::Datetime,
            format!("invalid format pattern '{format}'"),
        ));
    }

    let mut output = String::new();
    write!(output, "{}", dt.format_with_items(items.iter())).map_err(|_| {
        Error::rule(
            RuleKind::Datetime,
            format!("cannot render format pattern '{format}'"),
        )
    })?;
    Ok(output)
}

/// Extract the first match of `params.path`
///
/// # Errors
///
/// Returns an error when the path is missing or malformed, or nothing
/// matches.
pub fn jsonpath(value: &Value, params: &Params) -> Result<Value> {
    let path = match params.str("path") {
        Ok(Some(path)) if !path.is_empty() => path,
        Ok(_) => return Err(Error::rule(RuleKind::JsonPath, "path not specified")),
        Err(e) => return Err(Error::rule(RuleKind::JsonPath, e.to_string())),
    };
    let expression = JsonPath::parse(path).map_err(|e| Error::rule(RuleKind::JsonPath, e.to_string()))?;

    expression
        .first(value)
        .cloned()
        .ok_or_else(|| Error::value(RuleKind::JsonPath, format!("no match for path {path}")))
}

/// Capture group selector of the regex rule
enum Group<'a> {
    Index(usize),
    Name(&'a str),
}

/// Search the string form of the value with `params.pattern` and return
/// the capture group `params.group` (index or name, default 0)
///
/// A group that exists but did not take part in the match yields `Null`.
///
/// # Errors
///
/// Returns an error when the pattern is missing or invalid, the group does
/// not exist, or the search finds nothing.
pub fn regex(value: &Value, params: &Params) -> Result<Value> {
    let pattern = match params.str("pattern") {
        Ok(Some(pattern)) if !pattern.is_empty() => pattern,
        Ok(_) => return Err(Error::rule(RuleKind::Regex, "pattern not specified")),
        Err(e) => return Err(Error::rule(RuleKind::Regex, e.to_string())),
    };
    let group = match params.get("group") {
        None => Group::Index(0),
        Some(Value::String(name)) => Group::Name(name),
        Some(_) => Group::Index(
            params
                .usize_or("group", 0)
                .map_err(|e| Error::rule(RuleKind::Regex, e.to_string()))?,
        ),
    };
    let re = Regex::new(pattern)
        .map_err(|e| Error::rule(RuleKind::Regex, format!("invalid pattern: {e}")))?;

    let text = value.to_text();
    let captures = re
        .captures(&text)
        .ok_or_else(|| Error::value(RuleKind::Regex, "no match found"))?;

    let matched = match group {
        Group::Index(index) => {
            if index >= captures.len() {
                return Err(Error::rule(
                    RuleKind::Regex,
                    format!("group {index} not present in pattern"),
                ));
            }
            captures.get(index)
        }
        Group::Name(name) => {
            if !re.capture_names().flatten().any(|n| n == name) {
                return Err(Error::rule(
                    RuleKind::Regex,
                    format!("group '{name}' not present in pattern"),
                ));
            }
            captures.name(name)
        }
    };

    Ok(matched.map_or(Value::Null, |m| Value::String(m.as_str().to_string())))
}

/// Look up the string form of the value in `params.mapping`
///
/// With `params.case_sensitive = false` both sides are lower-cased; when
/// several keys collide after lower-casing, the last one in key order
/// wins.
///
/// # Errors
///
/// Returns an error when the mapping is missing or empty, or the value is
/// not mapped.
pub fn enum_map(value: &Value, params: &Params) -> Result<Value> {
    let mapping = params
        .object("mapping")
        .map_err(|e| Error::rule(RuleKind::EnumMap, e.to_string()))?
        .filter(|mapping| !mapping.is_empty())
        .ok_or_else(|| Error::rule(RuleKind::EnumMap, "mapping not specified"))?;
    let case_sensitive = params
        .bool_or("case_sensitive", true)
        .map_err(|e| Error::rule(RuleKind::EnumMap, e.to_string()))?;

    let key = value.to_text();
    let found = if case_sensitive {
        mapping.get(&key)
    } else {
        let lowered = key.to_lowercase();
        mapping
            .iter()
            .rev()
            .find(|(candidate, _)| candidate.to_lowercase() == lowered)
            .map(|(_, mapped)| mapped)
    };

    found.cloned().ok_or_else(|| {
        Error::value(
            RuleKind::EnumMap,
            format!("no mapping for value {key}"),
        )
    })
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        other => other.type_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paychan_ir::Object;
    use serde_json::json;

    fn params(value: serde_json::Value) -> Params {
        serde_json::from_value(value).unwrap()
    }

    // multiply
    #[test]
    fn test_multiply_yuan_to_fen() {
        let result = multiply(&Value::from("19.99"), &params(json!({"value": 100}))).unwrap();
        assert_eq!(result, Value::Decimal(1999.0));
    }

    #[test]
    fn test_multiply_default_factor() {
        let result = multiply(&Value::Decimal(3.14159), &Params::new()).unwrap();
        assert_eq!(result, Value::Decimal(3.14));
    }

    #[test]
    fn test_multiply_rounds_exact_binary_value() {
        let one = Params::new().with("value", 1_i64);
        assert_eq!(multiply(&Value::Decimal(1.115), &one).unwrap(), Value::Decimal(1.11));
        assert_eq!(multiply(&Value::from("2.675"), &one).unwrap(), Value::Decimal(2.67));
        assert_eq!(multiply(&Value::Decimal(1.005), &one).unwrap(), Value::Decimal(1.0));
    }

    #[test]
    fn test_multiply_integer_input() {
        let result = multiply(&Value::Integer(1999), &params(json!({"value": 0.01}))).unwrap();
        assert_eq!(result, Value::Decimal(19.99));
    }

    #[test]
    fn test_multiply_non_numeric_input() {
        let error = multiply(&Value::from("abc"), &Params::new()).unwrap_err();
        assert!(matches!(error, Error::Value { .. }));
        assert!(error.to_string().contains("'abc'"));
    }

    #[test]
    fn test_multiply_non_numeric_multiplier() {
        let error = multiply(&Value::Integer(1), &params(json!({"value": "ten"}))).unwrap_err();
        assert!(matches!(error, Error::Rule { .. }));
        assert!(error.to_string().contains("multiplier"));
    }

    // datetime
    #[test]
    fn test_datetime_from_timestamp() {
        let result = datetime(&Value::Integer(0), &Params::new(), "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(result, Value::from("1970-01-01 00:00:00"));
    }

    #[test]
    fn test_datetime_from_fractional_timestamp() {
        let result = datetime(
            &Value::Decimal(1_700_000_000.5),
            &params(json!({"format": "%Y-%m-%dT%H:%M:%S%.3f"})),
            "%Y",
        )
        .unwrap();
        assert_eq!(result, Value::from("2023-11-14T22:13:20.500"));
    }

    #[test]
    fn test_datetime_iso_with_zulu() {
        let result = datetime(
            &Value::from("2024-01-15T10:30:00Z"),
            &params(json!({"format": "%Y/%m/%d %H:%M %z"})),
            "%Y",
        )
        .unwrap();
        assert_eq!(result, Value::from("2024/01/15 10:30 +0000"));
    }

    #[test]
    fn test_datetime_iso_with_offset_keeps_offset() {
        let result = datetime(
            &Value::from("2024-01-15 10:30:00+08:00"),
            &params(json!({"format": "%H:%M %:z"})),
            "%Y",
        )
        .unwrap();
        assert_eq!(result, Value::from("10:30 +08:00"));
    }

    #[test]
    fn test_datetime_date_only() {
        let result = datetime(&Value::from("2024-02-29"), &Params::new(), "%d.%m.%Y %H:%M").unwrap();
        assert_eq!(result, Value::from("29.02.2024 00:00"));
    }

    #[test]
    fn test_datetime_fractional_seconds() {
        let result = datetime(
            &Value::from("2024-01-15T10:30:00.123456"),
            &Params::new(),
            "%S",
        )
        .unwrap();
        assert_eq!(result, Value::from("00"));
    }

    #[test]
    fn test_datetime_unparsable() {
        let error = datetime(&Value::from("yesterday"), &Params::new(), "%Y").unwrap_err();
        assert!(matches!(error, Error::Value { .. }));
        assert!(error.to_string().starts_with("datetime rule:"));
    }

    #[test]
    fn test_datetime_invalid_pattern_does_not_panic() {
        let result = datetime(&Value::Integer(0), &params(json!({"format": "%Q"})), "%Y");
        assert!(matches!(result, Err(Error::Rule { .. })));
    }

    // jsonpath
    #[test]
    fn test_jsonpath_nested() {
        let doc = Value::from(json!({"a": {"b": 5}}));
        let result = jsonpath(&doc, &params(json!({"path": "$.a.b"}))).unwrap();
        assert_eq!(result, Value::Integer(5));
    }

    #[test]
    fn test_jsonpath_first_match_wins() {
        let doc = Value::from(json!({"items": [{"sku": "A"}, {"sku": "B"}]}));
        let result = jsonpath(&doc, &params(json!({"path": "$.items[*].sku"}))).unwrap();
        assert_eq!(result, Value::from("A"));
    }

    #[test]
    fn test_jsonpath_missing_path() {
        let error = jsonpath(&Value::from(json!({})), &Params::new()).unwrap_err();
        assert_eq!(error.to_string(), "jsonpath rule: path not specified");
    }

    #[test]
    fn test_jsonpath_no_match() {
        let doc = Value::from(json!({"a": {}}));
        let error = jsonpath(&doc, &params(json!({"path": "$.a.b"}))).unwrap_err();
        assert_eq!(error.to_string(), "jsonpath rule: no match for path $.a.b");
    }

    #[test]
    fn test_jsonpath_malformed() {
        let error = jsonpath(&Value::from(json!({})), &params(json!({"path": "$.a["}))).unwrap_err();
        assert!(matches!(error, Error::Rule { .. }));
    }

    // regex
    #[test]
    fn test_regex_group() {
        let result = regex(
            &Value::from("order-42"),
            &params(json!({"pattern": "(\\d+)", "group": 1})),
        )
        .unwrap();
        assert_eq!(result, Value::from("42"));
    }

    #[test]
    fn test_regex_default_group_is_whole_match() {
        let result = regex(&Value::from("order-42"), &params(json!({"pattern": "r-\\d"}))).unwrap();
        assert_eq!(result, Value::from("r-4"));
    }

    #[test]
    fn test_regex_searches_string_form_of_numbers() {
        let result = regex(&Value::Integer(20240115), &params(json!({"pattern": "^\\d{4}"}))).unwrap();
        assert_eq!(result, Value::from("2024"));
    }

    #[test]
    fn test_regex_named_group() {
        let result = regex(
            &Value::from("ref=AB12"),
            &params(json!({"pattern": "ref=(?P<code>\\w+)", "group": "code"})),
        )
        .unwrap();
        assert_eq!(result, Value::from("AB12"));
    }

    #[test]
    fn test_regex_optional_group_not_taking_part() {
        let result = regex(
            &Value::from("abc"),
            &params(json!({"pattern": "abc(\\d)?", "group": 1})),
        )
        .unwrap();
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn test_regex_failures() {
        let no_match = regex(&Value::from("abc"), &params(json!({"pattern": "\\d+"}))).unwrap_err();
        assert_eq!(no_match.to_string(), "regex rule: no match found");

        let missing = regex(&Value::from("abc"), &Params::new()).unwrap_err();
        assert_eq!(missing.to_string(), "regex rule: pattern not specified");

        let invalid = regex(&Value::from("abc"), &params(json!({"pattern": "(unclosed"}))).unwrap_err();
        assert!(invalid.to_string().contains("invalid pattern"));

        let bad_group = regex(
            &Value::from("abc"),
            &params(json!({"pattern": "a(b)c", "group": 2})),
        )
        .unwrap_err();
        assert!(bad_group.to_string().contains("group 2"));
    }

    // enum_map
    #[test]
    fn test_enum_map_case_sensitive() {
        let p = params(json!({"mapping": {"TRADE_SUCCESS": "paid", "WAIT_BUYER_PAY": "pending"}}));
        assert_eq!(enum_map(&Value::from("TRADE_SUCCESS"), &p).unwrap(), Value::from("paid"));
        assert!(enum_map(&Value::from("trade_success"), &p).is_err());
    }

    #[test]
    fn test_enum_map_case_insensitive() {
        let p = params(json!({"mapping": {"yes": "Y"}, "case_sensitive": false}));
        assert_eq!(enum_map(&Value::from("YES"), &p).unwrap(), Value::from("Y"));

        let p = params(json!({"mapping": {"YES": "Y"}, "case_sensitive": false}));
        assert_eq!(enum_map(&Value::from("yes"), &p).unwrap(), Value::from("Y"));
    }

    #[test]
    fn test_enum_map_non_string_targets_and_keys() {
        let p = params(json!({"mapping": {"1": true, "0": false}}));
        assert_eq!(enum_map(&Value::Integer(1), &p).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_enum_map_unmapped_cites_original_value() {
        let p = params(json!({"mapping": {"yes": "Y"}, "case_sensitive": false}));
        let error = enum_map(&Value::from("MAYBE"), &p).unwrap_err();
        assert_eq!(error.to_string(), "enum_map rule: no mapping for value MAYBE");
    }

    #[test]
    fn test_enum_map_empty_mapping() {
        let p = Params::new().with("mapping", Object::new());
        let error = enum_map(&Value::from("x"), &p).unwrap_err();
        assert_eq!(error.to_string(), "enum_map rule: mapping not specified");
        assert!(enum_map(&Value::from("x"), &Params::new()).is_err());
    }
}
