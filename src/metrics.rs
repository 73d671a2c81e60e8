//! Sink metrics.
//!
//! Cheap atomic counters updated on the write path and read via
//! [`SinkMetrics::snapshot`]. The sink does not export these anywhere; they
//! exist so an embedding application can poll and report them.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one sink instance.
#[derive(Debug, Default)]
pub struct SinkMetrics {
    batches_received: AtomicU64,
    batches_written: AtomicU64,
    rows_written: AtomicU64,
    write_errors: AtomicU64,
    ddl_statements: AtomicU64,
}

impl SinkMetrics {
    pub const fn new() -> Self {
        Self {
            batches_received: AtomicU64::new(0),
            batches_written: AtomicU64::new(0),
            rows_written: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            ddl_statements: AtomicU64::new(0),
        }
    }

    pub(crate) fn record_batch_received(&self) {
        self.batches_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_batch_written(&self, rows: u64) {
        self.batches_written.fetch_add(1, Ordering::Relaxed);
        self.rows_written.fetch_add(rows, Ordering::Relaxed);
    }

    pub(crate) fn record_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_ddl_statement(&self) {
        self.ddl_statements.fetch_add(1, Ordering::Relaxed);
    }

    /// Consistent-enough point-in-time view of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_received: self.batches_received.load(Ordering::Relaxed),
            batches_written: self.batches_written.load(Ordering::Relaxed),
            rows_written: self.rows_written.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            ddl_statements: self.ddl_statements.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time counter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub batches_received: u64,
    pub batches_written: u64,
    pub rows_written: u64,
    pub write_errors: u64,
    pub ddl_statements: u64,
}
