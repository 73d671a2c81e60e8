//! Batch writing.
//!
//! [`BatchWriter`] takes a batch of events paired with completion callbacks,
//! maps them onto rows, checks that every row agrees on column layout, and
//! hands the aligned rows to the store driver as one bulk insert.
//!
//! Completion callbacks fire exactly once per event, in submission order,
//! after the whole batch has succeeded or failed. A failed batch produces a
//! single diagnostic log line; the per-event error detail travels through
//! the callbacks. `write_batch` itself only returns `Err` for fatal store
//! failures, and even then the callbacks have already run.

use std::sync::Arc;

use crate::config::SinkConfig;
use crate::driver::{InsertRequest, StoreDriver};
use crate::error::SinkError;
use crate::event::LogEvent;
use crate::metrics::SinkMetrics;
use crate::row::{Row, RowMapper};
use crate::value::Value;

/// Per-event completion callback. Receives `None` on success and the batch
/// error on failure.
pub type Completion = Box<dyn FnOnce(Option<&SinkError>) + Send>;

/// Writes event batches to one destination table.
pub struct BatchWriter {
    table: String,
    max_block_rows: usize,
    max_parallel: usize,
    mapper: RowMapper,
    driver: Arc<dyn StoreDriver>,
    metrics: Arc<SinkMetrics>,
}

impl BatchWriter {
    pub(crate) fn new(
        config: &SinkConfig,
        mapper: RowMapper,
        driver: Arc<dyn StoreDriver>,
        metrics: Arc<SinkMetrics>,
    ) -> Self {
        Self {
            table: config.table_name().to_string(),
            max_block_rows: config.max_block_rows(),
            max_parallel: config.max_parallel(),
            mapper,
            driver,
            metrics,
        }
    }

    /// Write a batch of events and run every completion callback exactly
    /// once, in submission order.
    ///
    /// An empty batch returns immediately without touching the store.
    pub async fn write_batch(&self, batch: Vec<(LogEvent, Completion)>) -> Result<(), SinkError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.metrics.record_batch_received();

        let (events, completions): (Vec<LogEvent>, Vec<Completion>) = batch.into_iter().unzip();
        let rows: Vec<Row> = events.iter().map(|event| self.mapper.map(event)).collect();

        // the first row fixes the column layout for the whole transfer
        let columns: Vec<String> = rows[0].columns().map(str::to_string).collect();
        if let Err(err) = check_alignment(&columns, &rows) {
            return self.fail(completions, err);
        }

        let value_rows: Vec<Vec<Value>> = rows.into_iter().map(Row::into_values).collect();
        let request = InsertRequest {
            table: &self.table,
            columns: &columns,
            rows: &value_rows,
            max_block_rows: self.max_block_rows,
            max_parallel: self.max_parallel,
        };
        match self.driver.insert(request).await {
            Ok(()) => {
                self.metrics.record_batch_written(value_rows.len() as u64);
                tracing::debug!(table = %self.table, rows = value_rows.len(), "batch written");
                for complete in completions {
                    complete(None);
                }
                Ok(())
            }
            Err(err) => self.fail(completions, SinkError::from(err)),
        }
    }

    /// Write a single event outside any batch. Same pipeline as
    /// [`write_batch`], minus the blocking and parallelism controls.
    pub async fn write_one(&self, event: LogEvent, completion: Completion) -> Result<(), SinkError> {
        self.metrics.record_batch_received();

        let row = self.mapper.map(&event);
        let columns: Vec<String> = row.columns().map(str::to_string).collect();
        let value_rows = vec![row.into_values()];
        let request = InsertRequest {
            table: &self.table,
            columns: &columns,
            rows: &value_rows,
            max_block_rows: 1,
            max_parallel: 1,
        };
        match self.driver.insert(request).await {
            Ok(()) => {
                self.metrics.record_batch_written(1);
                completion(None);
                Ok(())
            }
            Err(err) => self.fail(vec![completion], SinkError::from(err)),
        }
    }

    /// Report a failed batch: one log line, the error to every callback, and
    /// an `Err` return only when the failure is fatal.
    fn fail(&self, completions: Vec<Completion>, err: SinkError) -> Result<(), SinkError> {
        self.metrics.record_write_error();
        tracing::error!(error = %err, table = %self.table, events = completions.len(), "batch write failed");
        for complete in completions {
            complete(Some(&err));
        }
        if err.is_fatal() { Err(err) } else { Ok(()) }
    }
}

/// Every row after the first must carry exactly the first row's columns, in
/// the same order. Reports the first offending row.
fn check_alignment(columns: &[String], rows: &[Row]) -> Result<(), SinkError> {
    for (index, row) in rows.iter().enumerate().skip(1) {
        let aligned = row.len() == columns.len()
            && row.columns().zip(columns.iter()).all(|(a, b)| a == b.as_str());
        if !aligned {
            return Err(SinkError::ColumnMismatch {
                index,
                expected: columns.join(", "),
                found: row.columns().collect::<Vec<_>>().join(", "),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod writer_test;
