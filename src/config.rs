//! Sink configuration.
//!
//! [`SinkConfig`] is assembled with chained `with_*` calls and validated once
//! at startup. The two mandatory settings are the connection string and the
//! destination table name; everything else has a default.

use crate::dsn::Dsn;
use crate::error::SinkError;
use crate::field::FieldDescriptor;

/// Default maximum number of rows per physical insert block.
pub const DEFAULT_MAX_BLOCK_ROWS: usize = 100_000;

/// Default number of insert blocks in flight at once.
pub const DEFAULT_INSERT_PARALLELISM: usize = 4;

/// Configuration for a ClickHouse sink.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    connection_string: String,
    table_name: String,
    cluster_name: Option<String>,
    fields: Vec<FieldDescriptor>,
    property_fields: Vec<FieldDescriptor>,
    include_defaults: bool,
    include_event_properties: bool,
    max_block_rows: usize,
    max_parallel: usize,
}

impl SinkConfig {
    /// Create a configuration from the two mandatory settings.
    pub fn new(connection_string: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            table_name: table_name.into(),
            cluster_name: None,
            fields: Vec::new(),
            property_fields: Vec::new(),
            include_defaults: true,
            include_event_properties: true,
            max_block_rows: DEFAULT_MAX_BLOCK_ROWS,
            max_parallel: DEFAULT_INSERT_PARALLELISM,
        }
    }

    /// Create the destination table `ON CLUSTER` the given cluster.
    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster_name = Some(cluster.into());
        self
    }

    /// Append a top-level column field. Declaration order becomes column
    /// order, both in the DDL and in every row.
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a field rendered into the nested `Properties` document instead
    /// of a top-level column.
    pub fn with_property_field(mut self, field: FieldDescriptor) -> Self {
        self.property_fields.push(field);
        self
    }

    /// Emit the built-in `Date`/`Level`/`Logger`/`Message`/`Exception`
    /// columns. On by default; also forced on when no fields are configured,
    /// so a bare configuration still produces usable rows.
    pub fn with_include_defaults(mut self, include: bool) -> Self {
        self.include_defaults = include;
        self
    }

    /// Merge event properties into the nested `Properties` document. On by
    /// default.
    pub fn with_include_event_properties(mut self, include: bool) -> Self {
        self.include_event_properties = include;
        self
    }

    pub fn with_max_block_rows(mut self, rows: usize) -> Self {
        self.max_block_rows = rows;
        self
    }

    pub fn with_max_parallel(mut self, parallel: usize) -> Self {
        self.max_parallel = parallel;
        self
    }

    #[inline]
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    #[inline]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    #[inline]
    pub fn cluster_name(&self) -> Option<&str> {
        self.cluster_name.as_deref()
    }

    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[inline]
    pub fn property_fields(&self) -> &[FieldDescriptor] {
        &self.property_fields
    }

    pub fn include_defaults(&self) -> bool {
        self.include_defaults
    }

    pub fn include_event_properties(&self) -> bool {
        self.include_event_properties
    }

    #[inline]
    pub fn max_block_rows(&self) -> usize {
        self.max_block_rows
    }

    #[inline]
    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Validate the configuration: the connection string must parse and name
    /// a database, the table name must be non-empty, and every configured
    /// field must carry a name.
    pub fn validate(&self) -> Result<(), SinkError> {
        let dsn = Dsn::parse(&self.connection_string)?;
        dsn.database()?;
        if self.table_name.trim().is_empty() {
            return Err(SinkError::EmptyTableName);
        }
        for field in self.fields.iter().chain(self.property_fields.iter()) {
            if field.name().trim().is_empty() {
                return Err(SinkError::EmptyFieldName);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
