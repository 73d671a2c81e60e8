//! Typed column values and the coercion engine.
//!
//! Renderers produce strings; declared column types turn those strings into
//! typed [`Value`]s via [`ColumnType::coerce`]. Coercion is deliberately
//! lenient: a malformed input degrades to the type's default instead of
//! failing the event, because losing a row over one bad field is worse than
//! storing a zero. The only case that drops a field entirely is an empty
//! rendering.
//!
//! # Lenient defaults
//!
//! | declared type | malformed input becomes |
//! |---------------|-------------------------|
//! | `DateTime`    | Unix epoch              |
//! | `Bool`        | `false`                 |
//! | `Int`         | `0`                     |
//! | `Uuid`        | the nil UUID            |

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use uuid::Uuid;

// ============================================================================
// Column Types
// ============================================================================

/// Declared type of a destination column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnType {
    /// Arbitrary text. The default when a field declares no type.
    #[default]
    String,
    /// Point in time, stored at second precision.
    DateTime,
    /// Boolean flag.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// UUID in canonical hyphenated form.
    Uuid,
}

impl ColumnType {
    /// ClickHouse type name used in `CREATE TABLE` column declarations.
    pub fn ddl_name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::DateTime => "DateTime",
            Self::Bool => "Bool",
            Self::Int => "Int64",
            Self::Uuid => "UUID",
        }
    }

    /// Coerce a rendered string into a typed value.
    ///
    /// The input is trimmed first; an empty result yields `None` and the
    /// field is omitted from its row. Malformed input never fails, it
    /// degrades to the type's default (see the module docs).
    pub fn coerce(self, rendered: &str) -> Option<Value> {
        let trimmed = rendered.trim();
        if trimmed.is_empty() {
            return None;
        }
        let value = match self {
            Self::String => Value::String(trimmed.to_string()),
            Self::DateTime => {
                Value::DateTime(parse_datetime(trimmed).unwrap_or(DateTime::UNIX_EPOCH))
            }
            Self::Bool => Value::Bool(trimmed.eq_ignore_ascii_case("true")),
            Self::Int => Value::Int(trimmed.parse().unwrap_or(0)),
            Self::Uuid => Value::Uuid(Uuid::parse_str(trimmed).unwrap_or_else(|_| Uuid::nil())),
        };
        Some(value)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ddl_name())
    }
}

/// Accepted timestamp shapes, tried in order: RFC 3339, `YYYY-MM-DD hh:mm:ss`
/// (space or `T` separator, optional fraction), bare `YYYY-MM-DD`.
fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

// ============================================================================
// Values
// ============================================================================

/// A typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null.
    Null,
    String(String),
    DateTime(DateTime<Utc>),
    Bool(bool),
    Int(i64),
    Uuid(Uuid),
    /// Nested name/value document, e.g. a serialized exception or merged
    /// event properties.
    Document(Document),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Plain-text rendering, used for emptiness checks and JSON-free
    /// diagnostics. Documents render as JSON, timestamps as RFC 3339.
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::String(s) => s.clone(),
            Self::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Uuid(u) => u.to_string(),
            Self::Document(d) => d.to_json(),
        }
    }

    /// Render as a ClickHouse SQL literal for use inside a `VALUES` clause.
    ///
    /// Timestamps are emitted at second precision in the store-neutral
    /// `YYYY-MM-DD hh:mm:ss` form, which ClickHouse parses into `Date`,
    /// `DateTime` and `DateTime64` columns alike. Documents are emitted as
    /// quoted JSON.
    pub fn to_sql(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::String(s) => sql_quote(s),
            Self::DateTime(dt) => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S")),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Uuid(u) => format!("'{u}'"),
            Self::Document(d) => sql_quote(&d.to_json()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<Document> for Value {
    fn from(d: Document) -> Self {
        Self::Document(d)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::String(s) => serializer.serialize_str(s),
            Self::DateTime(dt) => {
                serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Uuid(u) => serializer.collect_str(u),
            Self::Document(d) => d.serialize(serializer),
        }
    }
}

/// Single-quoted SQL string literal with backslash escapes.
fn sql_quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

// ============================================================================
// Documents
// ============================================================================

/// Ordered name/value document nested inside a row cell.
///
/// Insertion order is preserved; re-inserting a name overwrites the value in
/// place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    entries: IndexMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, overwriting any existing entry of the same name
    /// without moving it.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Compact JSON rendering in entry order.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
#[path = "value_test.rs"]
mod value_test;
