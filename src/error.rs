//! Error types for the sink.
//!
//! Two layers are kept apart on purpose: [`StoreError`](crate::driver::StoreError)
//! is whatever the store driver reports, while [`SinkError`] is the sink's own
//! taxonomy. Configuration problems abort startup, write failures are reported
//! through completion callbacks, and only fatal store failures escape
//! `write_batch` as an `Err`.

use thiserror::Error;

use crate::driver::StoreError;

/// Errors produced by the sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The connection string was empty or all-whitespace.
    #[error("connection string is empty")]
    EmptyConnectionString,

    /// A connection-string segment was not a `key=value` pair.
    #[error("connection string segment '{0}' is not a key=value pair")]
    MalformedConnectionString(String),

    /// The connection string carried no usable `Database` entry.
    #[error("connection string has no Database entry")]
    MissingDatabase,

    /// The configured table name was empty or all-whitespace.
    #[error("table name is empty")]
    EmptyTableName,

    /// A configured field descriptor carried an empty name.
    #[error("field descriptor has an empty name")]
    EmptyFieldName,

    /// A batch row disagreed with the first row on column layout.
    #[error("batch row {index} has columns [{found}], expected [{expected}]")]
    ColumnMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    /// The store driver failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl SinkError {
    /// True for errors that should take the whole sink down rather than be
    /// swallowed after callbacks have run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_fatal())
    }

    /// True for startup-time configuration errors.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::EmptyConnectionString
                | Self::MalformedConnectionString(_)
                | Self::MissingDatabase
                | Self::EmptyTableName
                | Self::EmptyFieldName
        )
    }
}
