//! Loosely Typed Field Access
//!
//! Monster files are hand-edited JSON where numbers are sometimes strings,
//! strings are sometimes numbers and anything can be missing. [`MonsterSource`]
//! wraps the raw record and reads each field leniently; nothing here fails.

use serde_json::Value;

/// Read-only view over one raw monster record.
#[derive(Debug, Clone, Copy)]
pub struct MonsterSource<'a>(&'a Value);

impl<'a> MonsterSource<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self(value)
    }

    pub fn raw(&self) -> &'a Value {
        self.0
    }

    /// Field value, treating JSON `null` as absent.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    /// String field. Non-string values are ignored.
    pub fn str_field(&self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Non-empty string field.
    pub fn text(&self, key: &str) -> Option<&'a str> {
        self.str_field(key).filter(|text| !text.is_empty())
    }

    /// Display form of a scalar field: strings verbatim, numbers formatted.
    pub fn raw_text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    /// Integer field with leading-integer semantics (`"30 ft."` is 30).
    pub fn int_field(&self, key: &str) -> Option<i32> {
        self.get(key).and_then(value_as_int)
    }

    /// Integer field where zero counts as missing.
    pub fn int_or(&self, key: &str, default: i32) -> i32 {
        self.int_field(key).filter(|value| *value != 0).unwrap_or(default)
    }

    /// JavaScript-style truthiness of a field.
    pub fn truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_truthy)
    }

    /// Object field viewed as a nested record.
    pub fn object(&self, key: &str) -> Option<MonsterSource<'a>> {
        self.get(key)
            .filter(|value| value.is_object())
            .map(MonsterSource::new)
    }

    /// Array field; anything else reads as empty.
    pub fn array(&self, key: &str) -> &'a [Value] {
        self.get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Integer from a JSON number or the leading integer of a string.
pub fn value_as_int(value: &Value) -> Option<i32> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f.trunc() as i64))
            .and_then(|n| i32::try_from(n).ok()),
        Value::String(text) => leading_int(text),
        _ => None,
    }
}

/// Leading integer of a string, skipping leading whitespace and allowing a sign.
pub fn leading_int(text: &str) -> Option<i32> {
    let text = text.trim_start();
    let (sign, digits) = match text.as_bytes().first() {
        Some(b'-') => (-1, &text[1..]),
        Some(b'+') => (1, &text[1..]),
        _ => (1, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i32>().ok().map(|n| sign * n)
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
