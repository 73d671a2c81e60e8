//! Tests for batch writing and completion callbacks.

use chrono::{DateTime, Utc};

use super::*;
use crate::event::LogLevel;
use crate::test_support::{CompletionLog, MockDriver};

const DSN: &str = "Host=localhost;Database=logs";

fn ts() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-15T10:30:00Z")
        .expect("test timestamp should parse")
        .with_timezone(&Utc)
}

fn event(message: &str) -> LogEvent {
    LogEvent::new(ts())
        .with_level(LogLevel::Info)
        .with_logger("app.web")
        .with_message(message)
}

fn build_writer(config: &SinkConfig, driver: Arc<MockDriver>) -> (BatchWriter, Arc<SinkMetrics>) {
    let metrics = Arc::new(SinkMetrics::new());
    let writer = BatchWriter::new(
        config,
        RowMapper::new(config),
        driver,
        Arc::clone(&metrics),
    );
    (writer, metrics)
}

fn batch_of(log: &CompletionLog, messages: &[&str]) -> Vec<(LogEvent, Completion)> {
    messages
        .iter()
        .enumerate()
        .map(|(index, message)| (event(message), log.completion(index)))
        .collect()
}

// ============================================================================
// Success path
// ============================================================================

#[tokio::test]
async fn test_write_batch_success() {
    let driver = Arc::new(MockDriver::new());
    let config = SinkConfig::new(DSN, "app_events");
    let (writer, metrics) = build_writer(&config, Arc::clone(&driver));
    let log = CompletionLog::new();

    let result = writer.write_batch(batch_of(&log, &["one", "two", "three"])).await;
    assert!(result.is_ok());

    let inserts = driver.inserts();
    assert_eq!(inserts.len(), 1, "one logical transfer expected");
    assert_eq!(inserts[0].table, "app_events");
    assert_eq!(
        inserts[0].columns,
        vec!["Date", "Level", "Logger", "Message", "Exception"]
    );
    assert_eq!(inserts[0].rows.len(), 3);
    // positional alignment: Message is the fourth column
    assert_eq!(inserts[0].rows[1][3], Value::String("two".to_string()));

    assert_eq!(
        log.outcomes(),
        vec![(0, None), (1, None), (2, None)],
        "callbacks should fire once each, in submission order, with no error"
    );

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.batches_received, 1);
    assert_eq!(snapshot.batches_written, 1);
    assert_eq!(snapshot.rows_written, 3);
    assert_eq!(snapshot.write_errors, 0);
}

#[tokio::test]
async fn test_empty_batch_is_a_no_op() {
    let driver = Arc::new(MockDriver::new());
    let config = SinkConfig::new(DSN, "app_events");
    let (writer, metrics) = build_writer(&config, Arc::clone(&driver));

    let result = writer.write_batch(Vec::new()).await;
    assert!(result.is_ok());
    assert_eq!(driver.insert_count(), 0, "no store call for an empty batch");
    assert_eq!(metrics.snapshot().batches_received, 0);
}

#[tokio::test]
async fn test_block_controls_reach_the_driver() {
    let driver = Arc::new(MockDriver::new());
    let config = SinkConfig::new(DSN, "app_events")
        .with_max_block_rows(500)
        .with_max_parallel(2);
    let (writer, _) = build_writer(&config, Arc::clone(&driver));
    let log = CompletionLog::new();

    writer
        .write_batch(batch_of(&log, &["one"]))
        .await
        .expect("write should succeed");

    let inserts = driver.inserts();
    assert_eq!(inserts[0].max_block_rows, 500);
    assert_eq!(inserts[0].max_parallel, 2);
}

// ============================================================================
// Failure path
// ============================================================================

#[tokio::test]
async fn test_failure_reaches_every_callback_in_order() {
    let driver = Arc::new(MockDriver::new());
    driver.fail_inserts("connection refused");
    let config = SinkConfig::new(DSN, "app_events");
    let (writer, metrics) = build_writer(&config, Arc::clone(&driver));
    let log = CompletionLog::new();

    // non-fatal failures are reported through callbacks, not the return value
    let result = writer.write_batch(batch_of(&log, &["one", "two"])).await;
    assert!(result.is_ok());

    let outcomes = log.outcomes();
    assert_eq!(outcomes.len(), 2);
    for (position, (index, error)) in outcomes.iter().enumerate() {
        assert_eq!(*index, position, "callbacks should fire in submission order");
        let message = error.as_deref().unwrap_or_else(|| panic!("callback {index} should carry the error"));
        assert!(message.contains("connection refused"), "unexpected error: {message}");
    }

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.write_errors, 1);
    assert_eq!(snapshot.batches_written, 0);
}

#[tokio::test]
async fn test_fatal_failure_returns_err_after_callbacks() {
    let driver = Arc::new(MockDriver::new());
    driver.fail_inserts_fatal("store shut down");
    let config = SinkConfig::new(DSN, "app_events");
    let (writer, _) = build_writer(&config, Arc::clone(&driver));
    let log = CompletionLog::new();

    let result = writer.write_batch(batch_of(&log, &["one", "two"])).await;

    let err = result.unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(
        log.outcomes().len(),
        2,
        "callbacks must have run before the fatal error is returned"
    );
}

#[tokio::test]
async fn test_misaligned_rows_fail_without_store_call() {
    let driver = Arc::new(MockDriver::new());
    let config = SinkConfig::new(DSN, "app_events");
    let (writer, _) = build_writer(&config, Arc::clone(&driver));
    let log = CompletionLog::new();

    // the second event carries no message, so its row lacks the Message
    // column fixed by the first row
    let batch = vec![
        (event("one"), log.completion(0)),
        (LogEvent::new(ts()), log.completion(1)),
    ];
    let result = writer.write_batch(batch).await;
    assert!(result.is_ok(), "a mismatch is not fatal");

    assert_eq!(driver.insert_count(), 0, "misaligned batch must not reach the store");
    let outcomes = log.outcomes();
    assert_eq!(outcomes.len(), 2);
    let message = outcomes[0].1.as_deref().unwrap_or_default();
    assert!(message.contains("row 1"), "error should name the offending row: {message}");
}

// ============================================================================
// Single-event path
// ============================================================================

#[tokio::test]
async fn test_write_one_success() {
    let driver = Arc::new(MockDriver::new());
    let config = SinkConfig::new(DSN, "app_events");
    let (writer, metrics) = build_writer(&config, Arc::clone(&driver));
    let log = CompletionLog::new();

    writer
        .write_one(event("solo"), log.completion(0))
        .await
        .expect("write_one should succeed");

    let inserts = driver.inserts();
    assert_eq!(inserts.len(), 1);
    assert_eq!(inserts[0].rows.len(), 1);
    assert_eq!(log.outcomes(), vec![(0, None)]);
    assert_eq!(metrics.snapshot().rows_written, 1);
}

#[tokio::test]
async fn test_write_one_failure() {
    let driver = Arc::new(MockDriver::new());
    driver.fail_inserts("table is read only");
    let config = SinkConfig::new(DSN, "app_events");
    let (writer, _) = build_writer(&config, Arc::clone(&driver));
    let log = CompletionLog::new();

    let result = writer.write_one(event("solo"), log.completion(0)).await;
    assert!(result.is_ok());

    let outcomes = log.outcomes();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].1.as_deref().unwrap_or_default().contains("table is read only"));
}
