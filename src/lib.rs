//! logship - a ClickHouse log-shipping sink.
//!
//! Maps structured log events onto typed rows and bulk-loads them into a
//! single ClickHouse table. The sink is a library building block: it owns no
//! queue, no timer and no background task. Callers hand it batches and await
//! the result; everything else (buffering, flush cadence, retries) stays in
//! the embedding application.
//!
//! # Pipeline
//!
//! ```text
//! LogEvent --> RowMapper --> Row --> BatchWriter --> StoreDriver --> ClickHouse
//!                 |                      |
//!           FieldDescriptor        completion callbacks
//!           ColumnType::coerce     (exactly once, in order)
//! ```
//!
//! Initialization validates the configuration, parses the connection string
//! and issues one idempotent `CREATE TABLE IF NOT EXISTS` derived from the
//! configured fields. Writes map each event best-effort (malformed field
//! values degrade to typed defaults instead of dropping the event), align
//! every row to the first row's column layout, and push the batch through
//! the driver as block inserts with bounded parallelism.
//!
//! # Example
//!
//! ```no_run
//! use logship::{ClickHouseSink, ColumnType, FieldDescriptor, LogEvent, LogLevel, SinkConfig};
//! use uuid::Uuid;
//!
//! # async fn run() -> Result<(), logship::SinkError> {
//! let config = SinkConfig::new("Host=localhost;Port=8123;Database=logs", "app_events")
//!     .with_field(
//!         FieldDescriptor::new("Id", |_| Some(Uuid::new_v4().to_string()))
//!             .with_column_type(ColumnType::Uuid),
//!     )
//!     .with_field(
//!         FieldDescriptor::new("Date", |event: &LogEvent| Some(event.timestamp().to_rfc3339()))
//!             .with_column_type(ColumnType::DateTime),
//!     )
//!     .with_field(FieldDescriptor::new("Message", |event: &LogEvent| {
//!         event.message().map(str::to_string)
//!     }));
//!
//! let sink = ClickHouseSink::initialize(config).await?;
//!
//! let event = LogEvent::now()
//!     .with_level(LogLevel::Info)
//!     .with_logger("app.web")
//!     .with_message("service started")
//!     .with_property("Version", "2.1.0");
//! sink.write_one(event, Box::new(|err| assert!(err.is_none()))).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod driver;
mod dsn;
mod error;
mod event;
mod exception;
mod field;
mod metrics;
mod row;
mod schema;
mod sink;
mod value;
mod writer;

#[cfg(test)]
mod test_support;

pub use config::{DEFAULT_INSERT_PARALLELISM, DEFAULT_MAX_BLOCK_ROWS, SinkConfig};
pub use driver::{ClickHouseDriver, InsertRequest, StoreDriver, StoreError};
pub use error::SinkError;
pub use event::{LogEvent, LogLevel};
pub use exception::{ExceptionInfo, serialize_exception};
pub use field::{FieldDescriptor, Renderer};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use row::{Row, RowMapper};
pub use schema::{TableSchema, ensure_table};
pub use sink::ClickHouseSink;
pub use value::{ColumnType, Document, Value};
pub use writer::{BatchWriter, Completion};

/// Result type for sink operations.
pub type Result<T> = std::result::Result<T, SinkError>;
