//! Connection-string parsing.
//!
//! The sink is configured with an ADO-style connection string: semicolon
//! separated `key=value` segments, e.g.
//! `Host=ch.internal;Port=8123;Database=logs;User=writer;Password=s3cret`.
//! Keys are case-insensitive and the last occurrence of a key wins. Values
//! keep their case. Empty segments (from trailing or doubled semicolons) are
//! skipped; a non-empty segment without `=` is a configuration error.

use indexmap::IndexMap;

use crate::error::SinkError;

/// Parsed connection string. Keys are stored lowercased, in first-seen order.
#[derive(Debug, Clone)]
pub(crate) struct Dsn {
    entries: IndexMap<String, String>,
}

impl Dsn {
    /// Parse a raw connection string.
    pub(crate) fn parse(raw: &str) -> Result<Self, SinkError> {
        if raw.trim().is_empty() {
            return Err(SinkError::EmptyConnectionString);
        }
        let mut entries = IndexMap::new();
        for segment in raw.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let Some((key, value)) = segment.split_once('=') else {
                return Err(SinkError::MalformedConnectionString(segment.to_string()));
            };
            let key = key.trim().to_ascii_lowercase();
            if key.is_empty() {
                return Err(SinkError::MalformedConnectionString(segment.to_string()));
            }
            entries.insert(key, value.trim().to_string());
        }
        Ok(Self { entries })
    }

    /// Look up a value by (case-insensitive) key.
    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The mandatory database name.
    pub(crate) fn database(&self) -> Result<&str, SinkError> {
        match self.get("database") {
            Some(db) if !db.is_empty() => Ok(db),
            _ => Err(SinkError::MissingDatabase),
        }
    }

    /// All entries in first-seen order, keys lowercased.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
