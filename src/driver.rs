//! Store drivers.
//!
//! [`StoreDriver`] is the narrow seam between the sink and the store: one
//! method for standalone statements (DDL) and one for bulk inserts. The
//! production implementation, [`ClickHouseDriver`], talks to ClickHouse over
//! HTTP via the `clickhouse` client; tests substitute a recording mock.
//!
//! Nothing here retries. A failed insert is reported upward and the batch's
//! events are handed back through their completion callbacks; redelivery is
//! the caller's policy, not the driver's.

use async_trait::async_trait;
use clickhouse::Client;
use futures::stream::{self, TryStreamExt};
use thiserror::Error;

use crate::dsn::Dsn;
use crate::error::SinkError;
use crate::value::Value;

/// Errors reported by a store driver.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The ClickHouse client failed.
    #[error("clickhouse error: {0}")]
    ClickHouse(#[from] clickhouse::error::Error),

    /// Any other recoverable driver failure.
    #[error("store failure: {0}")]
    Other(String),

    /// A failure the driver considers unrecoverable. Fatal errors escape
    /// `write_batch` as `Err` after completion callbacks have run.
    #[error("fatal store failure: {0}")]
    Fatal(String),
}

impl StoreError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// One bulk-insert call: a table, one column layout and positional rows.
#[derive(Debug)]
pub struct InsertRequest<'a> {
    /// Unqualified destination table name.
    pub table: &'a str,
    /// Column names shared by every row.
    pub columns: &'a [String],
    /// Row values, positionally aligned with `columns`.
    pub rows: &'a [Vec<Value>],
    /// Maximum rows per physical insert block.
    pub max_block_rows: usize,
    /// Maximum insert blocks in flight at once.
    pub max_parallel: usize,
}

/// Minimal store contract needed by the sink.
#[async_trait]
pub trait StoreDriver: Send + Sync {
    /// Execute a standalone statement.
    async fn execute(&self, sql: &str) -> Result<(), StoreError>;

    /// Bulk-insert rows in one logical transfer.
    async fn insert(&self, request: InsertRequest<'_>) -> Result<(), StoreError>;
}

/// Production driver backed by the `clickhouse` HTTP client.
///
/// The client pools connections internally, so each insert runs over a
/// fresh logical session without per-batch connection setup in the sink.
#[derive(Clone)]
pub struct ClickHouseDriver {
    client: Client,
}

impl ClickHouseDriver {
    /// Build a driver from a raw connection string.
    pub fn connect(connection_string: &str) -> Result<Self, SinkError> {
        Ok(Self::from_dsn(&Dsn::parse(connection_string)?))
    }

    /// Build a driver from a parsed connection string. Recognized keys are
    /// consumed; everything else passes through to the client as a
    /// per-query option.
    pub(crate) fn from_dsn(dsn: &Dsn) -> Self {
        let mut client = Client::default().with_url(connection_url(dsn));
        if let Some(database) = dsn.get("database") {
            client = client.with_database(database);
        }
        if let Some(user) = dsn.get("user").or_else(|| dsn.get("username")) {
            client = client.with_user(user);
        }
        if let Some(password) = dsn.get("password") {
            client = client.with_password(password);
        }
        for (key, value) in dsn.entries() {
            if !CONSUMED_KEYS.contains(&key) {
                client = client.with_option(key, value);
            }
        }
        Self { client }
    }
}

/// Connection-string keys handled by the driver itself; all other keys pass
/// through as client options.
const CONSUMED_KEYS: &[&str] = &[
    "host", "port", "protocol", "database", "user", "username", "password",
];

fn connection_url(dsn: &Dsn) -> String {
    format!(
        "{}://{}:{}",
        dsn.get("protocol").unwrap_or("http"),
        dsn.get("host").unwrap_or("localhost"),
        dsn.get("port").unwrap_or("8123"),
    )
}

#[async_trait]
impl StoreDriver for ClickHouseDriver {
    async fn execute(&self, sql: &str) -> Result<(), StoreError> {
        self.client.query(sql).execute().await?;
        Ok(())
    }

    /// Splits the rows into blocks of at most `max_block_rows` and runs up
    /// to `max_parallel` block inserts concurrently. Fails on the first
    /// block error.
    async fn insert(&self, request: InsertRequest<'_>) -> Result<(), StoreError> {
        if request.rows.is_empty() {
            return Ok(());
        }
        let statements: Vec<String> = request
            .rows
            .chunks(request.max_block_rows.max(1))
            .map(|block| compose_insert(request.table, request.columns, block))
            .collect();
        stream::iter(statements.into_iter().map(Ok))
            .try_for_each_concurrent(request.max_parallel.max(1), |sql| {
                let client = self.client.clone();
                async move { client.query(&sql).execute().await.map_err(StoreError::from) }
            })
            .await
    }
}

/// Render one `INSERT INTO ... VALUES ...` statement for a block of rows.
fn compose_insert(table: &str, columns: &[String], rows: &[Vec<Value>]) -> String {
    let column_list = columns
        .iter()
        .map(|name| format!("`{name}`"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!("INSERT INTO `{table}` ({column_list}) VALUES ");
    for (row_index, row) in rows.iter().enumerate() {
        if row_index > 0 {
            sql.push_str(", ");
        }
        sql.push('(');
        for (value_index, value) in row.iter().enumerate() {
            if value_index > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&value.to_sql());
        }
        sql.push(')');
    }
    sql
}

#[cfg(test)]
#[path = "driver_test.rs"]
mod driver_test;
