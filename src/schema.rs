//! Destination table schema.
//!
//! [`TableSchema`] is derived once at startup from the configured fields and
//! the database named in the connection string. [`ensure_table`] issues a
//! single `CREATE TABLE IF NOT EXISTS` through the store driver; creation is
//! idempotent, so an existing table makes the statement a no-op on the store
//! side. Any execution error aborts startup.
//!
//! The generated table always uses the `MergeTree` engine with `Id` as the
//! primary key, matching the `Id UUID` field a typical configuration
//! declares first.

use crate::config::SinkConfig;
use crate::driver::StoreDriver;
use crate::error::SinkError;
use crate::value::ColumnType;

/// Column layout of the destination table.
#[derive(Debug, Clone)]
pub struct TableSchema {
    database: String,
    table: String,
    cluster: Option<String>,
    columns: Vec<(String, ColumnType)>,
}

impl TableSchema {
    /// Derive the schema from a validated configuration and the database
    /// named in its connection string. Column order follows field
    /// declaration order.
    pub fn derive(config: &SinkConfig, database: &str) -> Self {
        Self {
            database: database.to_string(),
            table: config.table_name().to_string(),
            cluster: config.cluster_name().map(str::to_string),
            columns: config
                .fields()
                .iter()
                .map(|field| (field.name().to_string(), field.column_type()))
                .collect(),
        }
    }

    #[inline]
    pub fn database(&self) -> &str {
        &self.database
    }

    #[inline]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Table reference as it appears in DDL: database unquoted, table
    /// backquoted.
    pub fn qualified_name(&self) -> String {
        format!("{}.`{}`", self.database, self.table)
    }

    #[inline]
    pub fn columns(&self) -> &[(String, ColumnType)] {
        &self.columns
    }

    /// Render the `CREATE TABLE IF NOT EXISTS` statement.
    pub fn create_table_ddl(&self) -> String {
        let mut ddl = format!("CREATE TABLE IF NOT EXISTS {}", self.qualified_name());
        if let Some(cluster) = self.cluster.as_deref()
            && !cluster.is_empty()
        {
            ddl.push_str(" ON CLUSTER ");
            ddl.push_str(cluster);
        }
        let columns = self
            .columns
            .iter()
            .map(|(name, column_type)| format!("{name} {}", column_type.ddl_name()))
            .collect::<Vec<_>>()
            .join(", ");
        ddl.push_str(&format!(" ({columns}) ENGINE = MergeTree PRIMARY KEY (Id);"));
        ddl
    }
}

/// Create the destination table if it does not exist yet.
///
/// A configuration without field descriptors declares no columns, so there
/// is nothing to create; the table is assumed to exist.
pub async fn ensure_table(schema: &TableSchema, driver: &dyn StoreDriver) -> Result<(), SinkError> {
    if schema.columns.is_empty() {
        tracing::debug!(table = %schema.qualified_name(), "no declared columns, assuming table exists");
        return Ok(());
    }
    let ddl = schema.create_table_ddl();
    tracing::debug!(table = %schema.qualified_name(), ddl = %ddl, "ensuring destination table");
    driver.execute(&ddl).await?;
    Ok(())
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod schema_test;
