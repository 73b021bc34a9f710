//! Typed page field values.
//!
//! Field values arrive as JSON and are decoded against their
//! [`FieldDefinition`]. [`FieldVisitor`] walks decoded values by class so
//! callers such as the URL collector only look at text-bearing fields.

use std::sync::LazyLock;

use chrono::NaiveDate;
use folio_sdk::types::{FieldDefinition, FieldType, ReferenceTarget};
use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use super::blocks::{BlockValue, StreamValue, is_http_url};
use super::schemas::stream_schema;

/// Absolute http(s) URLs inside free text.
#[allow(clippy::expect_used)]
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:[a-zA-Z0-9]|[$-_@.&+]|[!*(),]|%[0-9a-fA-F]{2})+")
        .expect("valid regex literal")
});

/// A decoded page field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    RichText(String),
    Url(String),
    Bool(bool),
    /// Canonical fixed-point form, e.g. `"12.50"`.
    Decimal(String),
    Date(NaiveDate),
    Json(Value),
    Reference {
        target: ReferenceTarget,
        id: Uuid,
    },
    Stream(StreamValue),
}

/// How a field participates in visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    /// Booleans, numbers, dates, references, opaque JSON.
    Scalar,
    /// Plain text.
    Text,
    Url,
    RichText,
    /// Structured block stream.
    Block,
}

impl FieldValue {
    /// Decode `raw` against `def`, falling back to the declared default when absent.
    pub fn decode(def: &FieldDefinition, raw: Option<&Value>) -> Result<FieldValue, String> {
        let raw = match raw {
            Some(v) if !v.is_null() => v,
            _ => &def.default,
        };

        if raw.is_null() {
            return Ok(match &def.field_type {
                FieldType::Stream(_) => FieldValue::Stream(StreamValue::new()),
                _ => FieldValue::Null,
            });
        }

        match &def.field_type {
            FieldType::Char { max_length } => {
                let s = expect_str(raw)?;
                if s.chars().count() > *max_length {
                    return Err(format!(
                        "Ensure this value has at most {max_length} characters (it has {}).",
                        s.chars().count()
                    ));
                }
                Ok(FieldValue::Text(s.to_string()))
            }
            FieldType::Text => Ok(FieldValue::Text(expect_str(raw)?.to_string())),
            FieldType::RichText => Ok(FieldValue::RichText(expect_str(raw)?.to_string())),
            FieldType::Url => {
                let s = expect_str(raw)?;
                if !s.is_empty() && !is_http_url(s) {
                    return Err("Enter a valid URL.".to_string());
                }
                Ok(FieldValue::Url(s.to_string()))
            }
            FieldType::Boolean => raw
                .as_bool()
                .map(FieldValue::Bool)
                .ok_or_else(|| "Expected true or false.".to_string()),
            FieldType::Decimal {
                max_digits,
                decimal_places,
            } => {
                let text = match raw {
                    Value::Number(n) => n.to_string(),
                    Value::String(s) => s.trim().to_string(),
                    _ => return Err("A valid number is required.".to_string()),
                };
                normalize_decimal(&text, *max_digits, *decimal_places).map(FieldValue::Decimal)
            }
            FieldType::Date => {
                let s = expect_str(raw)?;
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map(FieldValue::Date)
                    .map_err(|_| "Enter a valid date (YYYY-MM-DD).".to_string())
            }
            FieldType::Json => Ok(FieldValue::Json(raw.clone())),
            FieldType::Reference(target) => {
                let s = expect_str(raw)?;
                Uuid::parse_str(s)
                    .map(|id| FieldValue::Reference {
                        target: *target,
                        id,
                    })
                    .map_err(|_| format!("'{s}' is not a valid identifier."))
            }
            FieldType::Stream(schema) => {
                let def = stream_schema(schema)
                    .ok_or_else(|| format!("unknown stream schema '{schema}'"))?;
                def.decode(raw)
                    .map(FieldValue::Stream)
                    .map_err(|e| e.to_string())
            }
        }
    }

    /// Serialize for storage and the read API.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Text(s)
            | FieldValue::RichText(s)
            | FieldValue::Url(s)
            | FieldValue::Decimal(s) => Value::String(s.clone()),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            FieldValue::Json(v) => v.clone(),
            FieldValue::Reference { id, .. } => Value::String(id.to_string()),
            FieldValue::Stream(stream) => stream.to_json(),
        }
    }

    pub fn class(&self) -> FieldClass {
        match self {
            FieldValue::Text(_) => FieldClass::Text,
            FieldValue::Url(_) => FieldClass::Url,
            FieldValue::RichText(_) => FieldClass::RichText,
            FieldValue::Stream(_) => FieldClass::Block,
            _ => FieldClass::Scalar,
        }
    }

    /// Null, whitespace-only text, or an empty stream.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) | FieldValue::RichText(s) | FieldValue::Url(s) => {
                s.trim().is_empty()
            }
            FieldValue::Stream(stream) => stream.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s)
            | FieldValue::RichText(s)
            | FieldValue::Url(s)
            | FieldValue::Decimal(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<Uuid> {
        match self {
            FieldValue::Reference { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Dispatch to the visitor method for this value's class.
    pub fn accept(&self, name: &str, visitor: &mut dyn FieldVisitor) {
        match self {
            FieldValue::Text(s) => visitor.visit_text(name, s),
            FieldValue::Url(s) => visitor.visit_url(name, s),
            FieldValue::RichText(s) => visitor.visit_rich_text(name, s),
            FieldValue::Stream(stream) => visitor.visit_stream(name, stream),
            other => visitor.visit_scalar(name, other),
        }
    }
}

fn expect_str(raw: &Value) -> Result<&str, String> {
    raw.as_str().ok_or_else(|| "Expected a string.".to_string())
}

/// Validate and canonicalize a fixed-point number.
fn normalize_decimal(text: &str, max_digits: u8, decimal_places: u8) -> Result<String, String> {
    let invalid = || "A valid number is required.".to_string();
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if whole.is_empty()
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }
    let whole = whole.trim_start_matches('0');
    let whole = if whole.is_empty() { "0" } else { whole };

    let places = usize::from(decimal_places);
    if fraction.len() > places {
        return Err(format!(
            "Ensure that there are no more than {decimal_places} decimal places."
        ));
    }
    let whole_limit = usize::from(max_digits.saturating_sub(decimal_places));
    if whole != "0" && whole.len() > whole_limit {
        return Err(format!(
            "Ensure that there are no more than {whole_limit} digits before the decimal point."
        ));
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(whole);
    if places > 0 {
        out.push('.');
        out.push_str(fraction);
        out.extend(std::iter::repeat_n('0', places - fraction.len()));
    }
    Ok(out)
}

/// Visits decoded fields by class. Every method defaults to doing nothing.
pub trait FieldVisitor {
    fn visit_scalar(&mut self, _name: &str, _value: &FieldValue) {}

    fn visit_text(&mut self, _name: &str, _text: &str) {}

    fn visit_url(&mut self, _name: &str, _url: &str) {}

    fn visit_rich_text(&mut self, _name: &str, _html: &str) {}

    fn visit_stream(&mut self, _name: &str, _stream: &StreamValue) {}
}

/// Collects absolute URLs from text-bearing fields.
///
/// Plain text, rich text, and stream leaves are scanned for embedded URLs;
/// URL fields contribute their value when absolute. Scalars are ignored.
#[derive(Debug, Default)]
pub struct UrlCollector {
    urls: Vec<String>,
}

impl UrlCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a free-standing string, e.g. a computed property.
    pub fn scan(&mut self, text: &str) {
        for m in URL_PATTERN.find_iter(text) {
            self.push(m.as_str());
        }
    }

    fn push(&mut self, url: &str) {
        if !self.urls.iter().any(|u| u == url) {
            self.urls.push(url.to_string());
        }
    }

    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }
}

impl FieldVisitor for UrlCollector {
    fn visit_text(&mut self, _name: &str, text: &str) {
        self.scan(text);
    }

    fn visit_url(&mut self, _name: &str, url: &str) {
        if is_http_url(url) {
            self.push(url);
        }
    }

    fn visit_rich_text(&mut self, _name: &str, html: &str) {
        self.scan(html);
    }

    fn visit_stream(&mut self, _name: &str, stream: &StreamValue) {
        for child in stream.iter() {
            child.value.walk(&mut |node| {
                if let BlockValue::Text(s) = node {
                    self.scan(s);
                }
            });
        }
    }
}
