//! Field descriptors.
//!
//! A [`FieldDescriptor`] binds a destination column name to a renderer and a
//! declared [`ColumnType`]. The renderer extracts a string from a log event;
//! returning `None` (absent or failed rendering) omits the field from that
//! row rather than failing it. The column type defaults to
//! [`ColumnType::String`] and can be overridden with
//! [`with_column_type`](FieldDescriptor::with_column_type).

use std::fmt;
use std::sync::Arc;

use crate::event::LogEvent;
use crate::value::ColumnType;

/// Extracts a string representation of a field from a log event.
pub type Renderer = Arc<dyn Fn(&LogEvent) -> Option<String> + Send + Sync>;

/// A named destination column fed by a renderer.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    renderer: Renderer,
    column_type: ColumnType,
}

impl FieldDescriptor {
    /// Create a descriptor with the default `String` column type.
    pub fn new<F>(name: impl Into<String>, renderer: F) -> Self
    where
        F: Fn(&LogEvent) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            renderer: Arc::new(renderer),
            column_type: ColumnType::default(),
        }
    }

    pub fn with_column_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Run the renderer against an event.
    pub fn render(&self, event: &LogEvent) -> Option<String> {
        (self.renderer)(event)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("column_type", &self.column_type)
            .finish_non_exhaustive()
    }
}
