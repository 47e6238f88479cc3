//! # State Backend
//!
//! Key-value operations the Remote State Store needs from its table.
//!
//! Items are flat maps of string attributes. Every item carries the partition
//! key `type` and the sort key `name`; the backend never interprets other
//! attributes.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// One stored item: attribute name -> string value
pub type Item = BTreeMap<String, String>;

/// Lifecycle status of the state table as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Creating,
    Updating,
    Deleting,
    Active,
    /// Any status eden does not act on (archiving, inaccessible key, ...)
    Other(String),
}

impl TableStatus {
    /// Parse the status string used by DynamoDB
    #[must_use]
    pub fn from_status(status: &str) -> Self {
        match status {
            "CREATING" => Self::Creating,
            "UPDATING" => Self::Updating,
            "DELETING" => Self::Deleting,
            "ACTIVE" => Self::Active,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creating => write!(f, "CREATING"),
            Self::Updating => write!(f, "UPDATING"),
            Self::Deleting => write!(f, "DELETING"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Other(status) => write!(f, "{status}"),
        }
    }
}

/// Classified backend failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("table not found")]
    TableNotFound,
    #[error("AWS credentials not found: {0}")]
    Credentials(String),
    #[error("{code}: {message}")]
    Service { code: String, message: String },
    #[error("Unknown exception raised: {0}")]
    Unknown(String),
}

/// Table operations used by the Remote State Store.
///
/// Implementations must treat deletes of absent keys as success and report a
/// missing table as [`BackendError::TableNotFound`].
#[async_trait]
pub trait StateBackend: Send + Sync {
    /// Current status of the table
    async fn describe_table(&self, table: &str) -> Result<TableStatus, BackendError>;

    /// Create the table with the fixed eden schema and return its initial status
    async fn create_table(&self, table: &str) -> Result<TableStatus, BackendError>;

    /// Insert or replace an item
    async fn put_item(&self, table: &str, item: Item) -> Result<(), BackendError>;

    /// Exact-key lookup
    async fn get_item(
        &self,
        table: &str,
        partition: &str,
        sort: &str,
    ) -> Result<Option<Item>, BackendError>;

    /// Delete by key; absent keys are not an error
    async fn delete_item(&self, table: &str, partition: &str, sort: &str)
        -> Result<(), BackendError>;

    /// All items of one partition
    async fn query(&self, table: &str, partition: &str) -> Result<Vec<Item>, BackendError>;

    /// Every item in the table
    async fn scan(&self, table: &str) -> Result<Vec<Item>, BackendError>;
}
