//! # Remote State Errors

use crate::state::backend::{BackendError, TableStatus};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Remote state table {table} does not exist")]
    TableNotFound { table: String },
    #[error("AWS credentials not found!")]
    CredentialsNotFound,
    #[error("Remote state table {table} is {status}, try again later")]
    TableBusy { table: String, status: TableStatus },
    #[error("Remote state table {table} did not become ACTIVE after {attempts} polls ({elapsed:?})")]
    WaitTimedOut {
        table: String,
        attempts: u32,
        elapsed: Duration,
    },
    #[error("Profile {name} not found in remote table!")]
    ProfileNotFound { name: String },
    #[error("Profile {name} does not contain any parameters!")]
    ProfileEmpty { name: String },
    #[error("Profile {name} is not valid JSON: {source}")]
    ProfileDecode {
        name: String,
        source: serde_json::Error,
    },
    #[error("Profile {name} cannot be serialized: {source}")]
    ProfileEncode {
        name: String,
        source: serde_json::Error,
    },
    #[error("\"{name}\" is reserved for profile records and cannot own environments")]
    ReservedProfileName { name: String },
    #[error("{code}: {message}")]
    Backend { code: String, message: String },
    #[error("Unknown exception raised: {0}")]
    Unknown(String),
}

impl StateError {
    /// Lift a backend failure, attaching the table name where it matters
    #[must_use]
    pub fn from_backend(table: &str, error: BackendError) -> Self {
        match error {
            BackendError::TableNotFound => Self::TableNotFound {
                table: table.to_string(),
            },
            BackendError::Credentials(_) => Self::CredentialsNotFound,
            BackendError::Service { code, message } => Self::Backend { code, message },
            BackendError::Unknown(message) => Self::Unknown(message),
        }
    }

    /// Whether the failure means the table itself is missing
    #[must_use]
    pub fn is_table_not_found(&self) -> bool {
        matches!(self, Self::TableNotFound { .. })
    }
}
