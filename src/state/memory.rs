//! # In-Memory Backend
//!
//! Process-local [`StateBackend`] with the same contract as DynamoDB.
//!
//! Newly created tables report `CREATING` for a configurable number of
//! `describe_table` calls before turning `ACTIVE`, and a failure can be
//! injected to exercise error paths.

use crate::state::backend::{BackendError, Item, StateBackend, TableStatus};
use crate::state::schema::{ATTR_NAME, ATTR_TYPE};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Table {
    status: Option<TableStatus>,
    creating_polls_left: u32,
    /// Status reached once creation finishes; ACTIVE when unset
    after_creating: Option<TableStatus>,
    items: BTreeMap<(String, String), Item>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: BTreeMap<String, Table>,
    failure: Option<BackendError>,
    describe_calls: u32,
    create_calls: u32,
}

/// In-memory state table store
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    inner: Mutex<Inner>,
    creating_polls: u32,
}

impl InMemoryBackend {
    /// Backend without any table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `describe_table` calls that report `CREATING` after a create
    #[must_use]
    pub fn with_creating_polls(mut self, polls: u32) -> Self {
        self.creating_polls = polls;
        self
    }

    /// Backend with an ACTIVE table already in place
    #[must_use]
    pub fn with_active_table(table: &str) -> Self {
        let mut inner = Inner::default();
        inner.tables.insert(
            table.to_string(),
            Table {
                status: Some(TableStatus::Active),
                ..Table::default()
            },
        );
        Self {
            inner: Mutex::new(inner),
            creating_polls: 0,
        }
    }

    /// Force the status of an existing table
    pub async fn set_status(&self, table: &str, status: TableStatus) {
        let mut inner = self.inner.lock().await;
        let entry = inner.tables.entry(table.to_string()).or_default();
        entry.status = Some(status);
        entry.creating_polls_left = 0;
    }

    /// Put a table into CREATING as if another client had just created it.
    ///
    /// It reports `CREATING` for `polls` describe calls, then `then`.
    pub async fn start_creating(&self, table: &str, polls: u32, then: TableStatus) {
        let mut inner = self.inner.lock().await;
        let entry = inner.tables.entry(table.to_string()).or_default();
        entry.status = Some(TableStatus::Creating);
        entry.creating_polls_left = polls;
        entry.after_creating = Some(then);
    }

    /// Make every following call fail with `error` (`None` clears it)
    pub async fn fail_with(&self, error: Option<BackendError>) {
        self.inner.lock().await.failure = error;
    }

    /// Number of `describe_table` calls served so far
    pub async fn describe_calls(&self) -> u32 {
        self.inner.lock().await.describe_calls
    }

    /// Number of `create_table` calls served so far
    pub async fn create_calls(&self) -> u32 {
        self.inner.lock().await.create_calls
    }

    /// Whether the table exists
    pub async fn has_table(&self, table: &str) -> bool {
        self.inner.lock().await.tables.contains_key(table)
    }
}

impl Inner {
    fn check_failure(&self) -> Result<(), BackendError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn table(&mut self, table: &str) -> Result<&mut Table, BackendError> {
        self.check_failure()?;
        self.tables
            .get_mut(table)
            .ok_or(BackendError::TableNotFound)
    }
}

fn key_of(item: &Item) -> Result<(String, String), BackendError> {
    match (item.get(ATTR_TYPE), item.get(ATTR_NAME)) {
        (Some(record_type), Some(name)) => Ok((record_type.clone(), name.clone())),
        _ => Err(BackendError::Service {
            code: "ValidationException".to_string(),
            message: "One of the required keys was not given a value".to_string(),
        }),
    }
}

#[async_trait]
impl StateBackend for InMemoryBackend {
    async fn describe_table(&self, table: &str) -> Result<TableStatus, BackendError> {
        let mut inner = self.inner.lock().await;
        inner.describe_calls += 1;
        let entry = inner.table(table)?;

        if entry.status == Some(TableStatus::Creating) {
            if entry.creating_polls_left == 0 {
                entry.status = Some(entry.after_creating.take().unwrap_or(TableStatus::Active));
            } else {
                entry.creating_polls_left -= 1;
            }
        }
        Ok(entry.status.clone().unwrap_or(TableStatus::Active))
    }

    async fn create_table(&self, table: &str) -> Result<TableStatus, BackendError> {
        let mut inner = self.inner.lock().await;
        inner.create_calls += 1;
        inner.check_failure()?;

        if inner.tables.contains_key(table) {
            return Err(BackendError::Service {
                code: "ResourceInUseException".to_string(),
                message: format!("Table already exists: {table}"),
            });
        }
        inner.tables.insert(
            table.to_string(),
            Table {
                status: Some(TableStatus::Creating),
                creating_polls_left: self.creating_polls,
                after_creating: None,
                items: BTreeMap::new(),
            },
        );
        Ok(TableStatus::Creating)
    }

    async fn put_item(&self, table: &str, item: Item) -> Result<(), BackendError> {
        let key = key_of(&item)?;
        let mut inner = self.inner.lock().await;
        inner.table(table)?.items.insert(key, item);
        Ok(())
    }

    async fn get_item(
        &self,
        table: &str,
        partition: &str,
        sort: &str,
    ) -> Result<Option<Item>, BackendError> {
        let mut inner = self.inner.lock().await;
        let key = (partition.to_string(), sort.to_string());
        Ok(inner.table(table)?.items.get(&key).cloned())
    }

    async fn delete_item(
        &self,
        table: &str,
        partition: &str,
        sort: &str,
    ) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().await;
        let key = (partition.to_string(), sort.to_string());
        inner.table(table)?.items.remove(&key);
        Ok(())
    }

    async fn query(&self, table: &str, partition: &str) -> Result<Vec<Item>, BackendError> {
        let mut inner = self.inner.lock().await;
        Ok(inner
            .table(table)?
            .items
            .iter()
            .filter(|((record_type, _), _)| record_type == partition)
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn scan(&self, table: &str) -> Result<Vec<Item>, BackendError> {
        let mut inner = self.inner.lock().await;
        Ok(inner.table(table)?.items.values().cloned().collect())
    }
}
