//! Tests for schema derivation and table creation.

use super::*;
use crate::field::FieldDescriptor;
use crate::test_support::MockDriver;

const DSN: &str = "Host=localhost;Database=logs";

fn events_config() -> SinkConfig {
    SinkConfig::new(DSN, "Events")
        .with_field(FieldDescriptor::new("Id", |_| None).with_column_type(ColumnType::Uuid))
        .with_field(FieldDescriptor::new("Date", |_| None).with_column_type(ColumnType::DateTime))
        .with_field(FieldDescriptor::new("Message", |_| None))
}

#[test]
fn test_create_table_ddl() {
    let schema = TableSchema::derive(&events_config(), "logs");
    let ddl = schema.create_table_ddl();

    assert_eq!(
        ddl,
        "CREATE TABLE IF NOT EXISTS logs.`Events` \
         (Id UUID, Date DateTime, Message String) \
         ENGINE = MergeTree PRIMARY KEY (Id);"
    );
}

#[test]
fn test_ddl_quotes_table_not_database() {
    let schema = TableSchema::derive(&events_config(), "logs");
    let ddl = schema.create_table_ddl();

    assert!(ddl.contains("logs.`Events`"), "table reference should be logs.`Events`: {ddl}");
    assert!(!ddl.contains("`logs`"), "database must not be quoted: {ddl}");
}

#[test]
fn test_ddl_with_cluster() {
    let config = events_config().with_cluster("logs_cluster");
    let ddl = TableSchema::derive(&config, "logs").create_table_ddl();

    assert!(
        ddl.contains("logs.`Events` ON CLUSTER logs_cluster ("),
        "cluster clause should sit between table and columns: {ddl}"
    );
}

#[test]
fn test_ddl_empty_cluster_ignored() {
    let config = events_config().with_cluster("");
    let ddl = TableSchema::derive(&config, "logs").create_table_ddl();

    assert!(!ddl.contains("ON CLUSTER"), "empty cluster should be dropped: {ddl}");
}

#[test]
fn test_column_order_follows_declaration() {
    let schema = TableSchema::derive(&events_config(), "logs");
    let names: Vec<&str> = schema.columns().iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["Id", "Date", "Message"]);
}

#[test]
fn test_qualified_name() {
    let schema = TableSchema::derive(&events_config(), "logs");
    assert_eq!(schema.qualified_name(), "logs.`Events`");
}

#[tokio::test]
async fn test_ensure_table_issues_one_statement() {
    let driver = MockDriver::new();
    let schema = TableSchema::derive(&events_config(), "logs");

    ensure_table(&schema, &driver).await.expect("ensure_table should succeed");

    let statements = driver.statements();
    assert_eq!(statements.len(), 1, "exactly one DDL statement expected");
    assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS logs.`Events`"));
}

#[tokio::test]
async fn test_ensure_table_skips_without_columns() {
    let driver = MockDriver::new();
    let schema = TableSchema::derive(&SinkConfig::new(DSN, "Events"), "logs");

    ensure_table(&schema, &driver).await.expect("no-column schema should be a no-op");
    assert!(driver.statements().is_empty());
}

#[tokio::test]
async fn test_ensure_table_propagates_failure() {
    let driver = MockDriver::new();
    driver.fail_execute("permission denied");
    let schema = TableSchema::derive(&events_config(), "logs");

    let err = ensure_table(&schema, &driver).await.unwrap_err();
    assert!(matches!(err, SinkError::Store(_)));
    assert!(err.to_string().contains("permission denied"));
}
