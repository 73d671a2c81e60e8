//! The ClickHouse sink.
//!
//! [`ClickHouseSink`] is the crate's entry point. Initialization validates
//! the configuration, builds the driver from the connection string, ensures
//! the destination table exists and fixes the row mapping; after that the
//! sink is an immutable write surface safe to share across tasks.
//!
//! The sink owns no queue and spawns nothing. Callers decide when a batch
//! is due and await [`write_batch`](ClickHouseSink::write_batch) directly;
//! back-pressure is simply the await.

use std::fmt;
use std::sync::Arc;

use crate::config::SinkConfig;
use crate::driver::{ClickHouseDriver, StoreDriver};
use crate::dsn::Dsn;
use crate::error::SinkError;
use crate::event::LogEvent;
use crate::metrics::SinkMetrics;
use crate::row::RowMapper;
use crate::schema::{TableSchema, ensure_table};
use crate::writer::{BatchWriter, Completion};

/// A log-shipping sink bound to one ClickHouse table.
pub struct ClickHouseSink {
    config: SinkConfig,
    schema: TableSchema,
    writer: BatchWriter,
    metrics: Arc<SinkMetrics>,
}

impl ClickHouseSink {
    /// Validate the configuration, connect to ClickHouse and create the
    /// destination table if needed.
    pub async fn initialize(config: SinkConfig) -> Result<Self, SinkError> {
        config.validate()?;
        let dsn = Dsn::parse(config.connection_string())?;
        let driver: Arc<dyn StoreDriver> = Arc::new(ClickHouseDriver::from_dsn(&dsn));
        Self::initialize_with(config, dsn, driver).await
    }

    /// Like [`initialize`](Self::initialize), but against a caller-supplied
    /// driver. Used by tests and by embeddings that bring their own store.
    pub async fn with_driver(
        config: SinkConfig,
        driver: Arc<dyn StoreDriver>,
    ) -> Result<Self, SinkError> {
        config.validate()?;
        let dsn = Dsn::parse(config.connection_string())?;
        Self::initialize_with(config, dsn, driver).await
    }

    async fn initialize_with(
        config: SinkConfig,
        dsn: Dsn,
        driver: Arc<dyn StoreDriver>,
    ) -> Result<Self, SinkError> {
        let schema = TableSchema::derive(&config, dsn.database()?);
        ensure_table(&schema, driver.as_ref()).await?;

        let metrics = Arc::new(SinkMetrics::new());
        if !schema.columns().is_empty() {
            metrics.record_ddl_statement();
        }
        let mapper = RowMapper::new(&config);
        let writer = BatchWriter::new(&config, mapper, driver, Arc::clone(&metrics));
        tracing::info!(table = %schema.qualified_name(), "clickhouse sink initialized");
        Ok(Self {
            config,
            schema,
            writer,
            metrics,
        })
    }

    /// Write a batch of events. Every completion callback runs exactly once,
    /// in submission order; see [`BatchWriter::write_batch`].
    pub async fn write_batch(&self, batch: Vec<(LogEvent, Completion)>) -> Result<(), SinkError> {
        self.writer.write_batch(batch).await
    }

    /// Write a single event outside any batch.
    pub async fn write_one(&self, event: LogEvent, completion: Completion) -> Result<(), SinkError> {
        self.writer.write_one(event, completion).await
    }

    #[inline]
    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    #[inline]
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    #[inline]
    pub fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }
}

impl fmt::Debug for ClickHouseSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClickHouseSink")
            .field("config", &self.config)
            .field("schema", &self.schema)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "sink_test.rs"]
mod sink_test;
