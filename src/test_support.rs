//! Shared test fixtures.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::driver::{InsertRequest, StoreDriver, StoreError};
use crate::error::SinkError;
use crate::value::Value;
use crate::writer::Completion;

/// One recorded bulk-insert call.
#[derive(Debug, Clone)]
pub struct RecordedInsert {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub max_block_rows: usize,
    pub max_parallel: usize,
}

/// Recording driver with injectable failures.
#[derive(Default)]
pub struct MockDriver {
    statements: Mutex<Vec<String>>,
    inserts: Mutex<Vec<RecordedInsert>>,
    execute_failure: Mutex<Option<(String, bool)>>,
    insert_failure: Mutex<Option<(String, bool)>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `execute` call fail.
    pub fn fail_execute(&self, message: &str) {
        *self.execute_failure.lock().unwrap() = Some((message.to_string(), false));
    }

    /// Make every subsequent `insert` call fail.
    pub fn fail_inserts(&self, message: &str) {
        *self.insert_failure.lock().unwrap() = Some((message.to_string(), false));
    }

    /// Make every subsequent `insert` call fail fatally.
    pub fn fail_inserts_fatal(&self, message: &str) {
        *self.insert_failure.lock().unwrap() = Some((message.to_string(), true));
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    pub fn inserts(&self) -> Vec<RecordedInsert> {
        self.inserts.lock().unwrap().clone()
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.lock().unwrap().len()
    }
}

fn injected(failure: &Mutex<Option<(String, bool)>>) -> Option<StoreError> {
    failure.lock().unwrap().as_ref().map(|(message, fatal)| {
        if *fatal {
            StoreError::Fatal(message.clone())
        } else {
            StoreError::Other(message.clone())
        }
    })
}

#[async_trait]
impl StoreDriver for MockDriver {
    async fn execute(&self, sql: &str) -> Result<(), StoreError> {
        if let Some(err) = injected(&self.execute_failure) {
            return Err(err);
        }
        self.statements.lock().unwrap().push(sql.to_string());
        Ok(())
    }

    async fn insert(&self, request: InsertRequest<'_>) -> Result<(), StoreError> {
        if let Some(err) = injected(&self.insert_failure) {
            return Err(err);
        }
        self.inserts.lock().unwrap().push(RecordedInsert {
            table: request.table.to_string(),
            columns: request.columns.to_vec(),
            rows: request.rows.to_vec(),
            max_block_rows: request.max_block_rows,
            max_parallel: request.max_parallel,
        });
        Ok(())
    }
}

/// Records completion outcomes in invocation order.
#[derive(Clone, Default)]
pub struct CompletionLog {
    outcomes: Arc<Mutex<Vec<(usize, Option<String>)>>>,
}

impl CompletionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A completion callback tagged with the event's submission index.
    pub fn completion(&self, index: usize) -> Completion {
        let outcomes = Arc::clone(&self.outcomes);
        Box::new(move |err: Option<&SinkError>| {
            outcomes
                .lock()
                .unwrap()
                .push((index, err.map(|e| e.to_string())));
        })
    }

    /// `(index, error message)` pairs in the order callbacks fired.
    pub fn outcomes(&self) -> Vec<(usize, Option<String>)> {
        self.outcomes.lock().unwrap().clone()
    }
}
