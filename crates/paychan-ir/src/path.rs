//! JSONPath expressions over [`Value`] trees
//!
//! Supported syntax: optional root `$`, dotted names (`.name`), quoted
//! names (`['name']`, `["name"]`), indices with negative offsets (`[-1]`),
//! wildcards (`.*`, `[*]`), slices (`[start:end:step]`), unions
//! (`[0,2]`, `['a','b']`) and recursive descent (`..name`, `..*`).
//!
//! Matches are produced in document order: array elements by index,
//! object members by key.

use crate::value::Value;
use crate::{Error, Result};
use std::fmt;

/// A single selector inside a path segment
#[derive(Debug, Clone, PartialEq)]
enum Selector {
    Name(String),
    Index(i64),
    Wildcard,
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        step: i64,
    },
    Union(Vec<Selector>),
}

#[derive(Debug, Clone, PartialEq)]
struct Segment {
    selector: Selector,
    /// Apply the selector to the node and all of its descendants
    recursive: bool,
}

/// A compiled JSONPath expression
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    raw: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Parse a JSONPath expression
    ///
    /// # Errors
    ///
    /// Returns an error when the expression is empty or malformed.
    pub fn parse(expression: &str) -> Result<Self> {
        let raw = expression.trim();
        if raw.is_empty() {
            return Err(Error::invalid_path(expression, "empty expression"));
        }

        let chars: Vec<char> = raw.chars().collect();
        let mut pos = 0;
        let mut segments = Vec::new();

        if chars[0] == '$' {
            pos = 1;
        } else if chars[0] != '.' && chars[0] != '[' {
            // Bare leading name, e.g. "a.b"
            let (name, next) = read_name(&chars, pos);
            segments.push(Segment {
                selector: name_selector(raw, name)?,
                recursive: false,
            });
            pos = next;
        }

        while pos < chars.len() {
            match chars[pos] {
                '.' => {
                    let recursive = chars.get(pos + 1) == Some(&'.');
                    pos += if recursive { 2 } else { 1 };
                    match chars.get(pos) {
                        Some('*') => {
                            segments.push(Segment {
                                selector: Selector::Wildcard,
                                recursive,
                            });
                            pos += 1;
                        }
                        Some('[') if recursive => {
                            let (selector, next) = read_bracket(raw, &chars, pos)?;
                            segments.push(Segment {
                                selector,
                                recursive,
                            });
                            pos = next;
                        }
                        Some(_) => {
                            let (name, next) = read_name(&chars, pos);
                            segments.push(Segment {
                                selector: name_selector(raw, name)?,
                                recursive,
                            });
                            pos = next;
                        }
                        None => return Err(Error::invalid_path(raw, "trailing '.'")),
                    }
                }
                '[' => {
                    let (selector, next) = read_bracket(raw, &chars, pos)?;
                    segments.push(Segment {
                        selector,
                        recursive: false,
                    });
                    pos = next;
                }
                other => {
                    return Err(Error::invalid_path(
                        raw,
                        format!("unexpected character '{other}' at offset {pos}"),
                    ));
                }
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The expression as written
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// All matches in document order
    #[must_use]
    pub fn find<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![root];

        for segment in &self.segments {
            let mut next = Vec::new();
            for node in current {
                if segment.recursive {
                    let mut nodes = Vec::new();
                    collect_descendants(node, &mut nodes);
                    for candidate in nodes {
                        select(&segment.selector, candidate, &mut next);
                    }
                } else {
                    select(&segment.selector, node, &mut next);
                }
            }
            current = next;
        }

        current
    }

    /// First match in document order
    #[must_use]
    pub fn first<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.find(root).into_iter().next()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for JsonPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn read_name(chars: &[char], start: usize) -> (String, usize) {
    let mut end = start;
    while end < chars.len() && chars[end] != '.' && chars[end] != '[' {
        end += 1;
    }
    (chars[start..end].iter().collect(), end)
}

fn name_selector(raw: &str, name: String) -> Result<Selector> {
    if name.is_empty() {
        return Err(Error::invalid_path(raw, "empty member name"));
    }
    if name == "*" {
        return Ok(Selector::Wildcard);
    }
    Ok(Selector::Name(name))
}

/// Parse `[...]` starting at `open`, returning the selector and the
/// position after the closing bracket.
fn read_bracket(raw: &str, chars: &[char], open: usize) -> Result<(Selector, usize)> {
    let mut quote: Option<char> = None;
    let mut pos = open + 1;
    let mut items = Vec::new();
    let mut current = String::new();

    loop {
        let Some(&ch) = chars.get(pos) else {
            return Err(Error::invalid_path(raw, "unclosed bracket"));
        };
        match quote {
            Some(q) if ch == q => {
                quote = None;
                current.push(ch);
            }
            Some(_) => current.push(ch),
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                ',' => items.push(std::mem::take(&mut current)),
                ']' => {
                    items.push(current);
                    break;
                }
                _ => current.push(ch),
            },
        }
        pos += 1;
    }

    let mut selectors = items
        .iter()
        .map(|item| parse_bracket_item(raw, item.trim()))
        .collect::<Result<Vec<_>>>()?;

    let selector = if selectors.len() == 1 {
        selectors.remove(0)
    } else {
        Selector::Union(selectors)
    };
    Ok((selector, pos + 1))
}

fn parse_bracket_item(raw: &str, item: &str) -> Result<Selector> {
    if item.is_empty() {
        return Err(Error::invalid_path(raw, "empty bracket selector"));
    }
    if item == "*" {
        return Ok(Selector::Wildcard);
    }

    let first = item.chars().next();
    if matches!(first, Some('\'' | '"')) {
        let quote = first.unwrap_or('\'');
        if item.len() >= 2 && item.ends_with(quote) {
            return Ok(Selector::Name(item[1..item.len() - 1].to_string()));
        }
        return Err(Error::invalid_path(raw, format!("unterminated name {item}")));
    }

    if item.contains(':') {
        let parts: Vec<&str> = item.split(':').map(str::trim).collect();
        if parts.len() > 3 {
            return Err(Error::invalid_path(raw, format!("invalid slice {item}")));
        }
        let bound = |text: &str| -> Result<Option<i64>> {
            if text.is_empty() {
                Ok(None)
            } else {
                text.parse::<i64>()
                    .map(Some)
                    .map_err(|_| Error::invalid_path(raw, format!("invalid slice bound '{text}'")))
            }
        };
        let start = bound(parts[0])?;
        let end = bound(parts[1])?;
        let step = match parts.get(2) {
            Some(&text) => bound(text)?.unwrap_or(1),
            None => 1,
        };
        if step == 0 {
            return Err(Error::invalid_path(raw, "slice step cannot be zero"));
        }
        return Ok(Selector::Slice { start, end, step });
    }

    item.parse::<i64>()
        .map(Selector::Index)
        .map_err(|_| Error::invalid_path(raw, format!("invalid selector '{item}'")))
}

fn collect_descendants<'a>(node: &'a Value, out: &mut Vec<&'a Value>) {
    out.push(node);
    match node {
        Value::Array(items) => {
            for item in items {
                collect_descendants(item, out);
            }
        }
        Value::Object(map) => {
            for value in map.values() {
                collect_descendants(value, out);
            }
        }
        _ => {}
    }
}

fn select<'a>(selector: &Selector, node: &'a Value, out: &mut Vec<&'a Value>) {
    match selector {
        Selector::Name(name) => {
            if let Some(value) = node.get(name) {
                out.push(value);
            }
        }
        Selector::Index(index) => {
            if let Value::Array(items) = node {
                if let Some(position) = normalize_index(*index, items.len()) {
                    out.push(&items[position]);
                }
            }
        }
        Selector::Wildcard => match node {
            Value::Array(items) => out.extend(items.iter()),
            Value::Object(map) => out.extend(map.values()),
            _ => {}
        },
        Selector::Slice { start, end, step } => {
            if let Value::Array(items) = node {
                for position in slice_positions(*start, *end, *step, items.len()) {
                    out.push(&items[position]);
                }
            }
        }
        Selector::Union(selectors) => {
            for inner in selectors {
                select(inner, node, out);
            }
        }
    }
}

fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { len + index } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

/// Python-style slice positions
fn slice_positions(start: Option<i64>, end: Option<i64>, step: i64, len: usize) -> Vec<usize> {
    let Ok(len) = i64::try_from(len) else {
        return Vec::new();
    };
    let clamp = |bound: i64, low: i64, high: i64| -> i64 {
        let resolved = if bound < 0 { bound + len } else { bound };
        resolved.clamp(low, high)
    };

    let mut positions = Vec::new();
    if step > 0 {
        let mut i = start.map_or(0, |s| clamp(s, 0, len));
        let stop = end.map_or(len, |e| clamp(e, 0, len));
        while i < stop {
            positions.extend(usize::try_from(i).ok());
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    } else {
        let mut i = start.map_or(len - 1, |s| clamp(s, -1, len - 1));
        let stop = end.map_or(-1, |e| clamp(e, -1, len - 1));
        while i > stop {
            positions.extend(usize::try_from(i).ok());
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    }
    positions
}
