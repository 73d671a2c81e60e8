//! Row assembly.
//!
//! [`RowMapper`] turns one log event into one [`Row`]: default columns
//! first, then configured fields, then the merged `Properties` document.
//! Mapping is best-effort and never fails; a field that renders nothing or
//! renders empty is simply omitted from that row.
//!
//! Column order inside a row is insertion order. A field whose name
//! collides with an earlier column overwrites the value in place, so the
//! column keeps its original position while the last write wins.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::SinkConfig;
use crate::event::LogEvent;
use crate::exception::serialize_exception;
use crate::field::FieldDescriptor;
use crate::value::{Document, Value};

/// One ordered column-to-value mapping, the unit handed to the batch writer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: IndexMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, overwriting an existing column of the same name
    /// without moving it.
    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.cells.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Consume the row into its values, preserving column order.
    pub fn into_values(self) -> Vec<Value> {
        self.cells.into_values().collect()
    }
}

/// Maps log events onto rows according to a sink configuration.
///
/// Built once at startup and shared by every write.
#[derive(Debug, Clone)]
pub struct RowMapper {
    include_defaults: bool,
    include_event_properties: bool,
    fields: Arc<[FieldDescriptor]>,
    property_fields: Arc<[FieldDescriptor]>,
}

impl RowMapper {
    pub fn new(config: &SinkConfig) -> Self {
        Self {
            // a configuration with no fields at all still gets the default
            // columns, otherwise every row would be empty
            include_defaults: config.include_defaults() || config.fields().is_empty(),
            include_event_properties: config.include_event_properties(),
            fields: config.fields().into(),
            property_fields: config.property_fields().into(),
        }
    }

    /// Map one event onto a row. Never fails.
    pub fn map(&self, event: &LogEvent) -> Row {
        let mut row = Row::new();
        if self.include_defaults {
            self.insert_defaults(event, &mut row);
        }
        for field in self.fields.iter() {
            if let Some(rendered) = field.render(event)
                && let Some(value) = field.column_type().coerce(&rendered)
            {
                row.insert(field.name(), value);
            }
        }
        self.merge_properties(event, &mut row);
        row
    }

    /// The built-in columns. `Date` is always present; `Level`, `Logger` and
    /// `Message` only when the event carries them. `Exception` is always
    /// present, explicitly null when the event has none, so the column shows
    /// up uniformly in stored rows.
    fn insert_defaults(&self, event: &LogEvent, row: &mut Row) {
        row.insert("Date", Value::DateTime(event.timestamp()));
        if let Some(level) = event.level() {
            row.insert("Level", Value::String(level.as_str().to_string()));
        }
        if let Some(logger) = event.logger() {
            row.insert("Logger", Value::String(logger.to_string()));
        }
        if let Some(message) = event.message() {
            row.insert("Message", Value::String(message.to_string()));
        }
        match event.exception() {
            Some(exception) => {
                row.insert("Exception", Value::Document(serialize_exception(exception)));
            }
            None => row.insert("Exception", Value::Null),
        }
    }

    /// Build the nested `Properties` document: property fields first, then
    /// the event's own properties with `.` flattened to `_`. Later entries
    /// overwrite earlier ones of the same name. The document is attached
    /// only when it ends up non-empty.
    fn merge_properties(&self, event: &LogEvent, row: &mut Row) {
        let merge_event_properties = self.include_event_properties && event.has_properties();
        if !merge_event_properties && self.property_fields.is_empty() {
            return;
        }
        let mut doc = Document::new();
        for field in self.property_fields.iter() {
            if let Some(rendered) = field.render(event)
                && let Some(value) = field.column_type().coerce(&rendered)
            {
                doc.insert(field.name(), value);
            }
        }
        if merge_event_properties {
            for (name, value) in event.properties() {
                if name.is_empty() || value.is_null() || value.to_text().is_empty() {
                    continue;
                }
                doc.insert(name.replace('.', "_"), value.clone());
            }
        }
        if !doc.is_empty() {
            row.insert("Properties", Value::Document(doc));
        }
    }
}

#[cfg(test)]
#[path = "row_test.rs"]
mod row_test;
