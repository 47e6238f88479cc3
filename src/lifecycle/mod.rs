//! # Environment Lifecycle
//!
//! The capability that actually clones or removes an ECS service.
//!
//! eden only hands it an environment name, an image and the resolved profile
//! variables; how the clone happens is the capability's business.

pub mod process;

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

pub use process::ProcessLifecycle;

/// Result of a successful create
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedEnvironment {
    pub name: String,
    /// Hostname the environment is reachable at
    pub cname: String,
}

/// Result of a successful delete
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeletedEnvironment {
    pub name: String,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Failed to start {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("{command} exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("Unexpected output from {command}: {source}")]
    Output {
        command: String,
        source: serde_json::Error,
    },
    #[error("Environment operation failed: {0}")]
    Other(String),
}

/// Create/delete of one environment
#[async_trait]
pub trait EnvironmentLifecycle: Send + Sync {
    async fn create_env(
        &self,
        name: &str,
        image_uri: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<CreatedEnvironment, LifecycleError>;

    async fn delete_env(
        &self,
        name: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<DeletedEnvironment, LifecycleError>;
}
