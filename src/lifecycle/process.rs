//! # Process Lifecycle
//!
//! Runs the lifecycle executable (`eden-core` unless `EDEN_LIFECYCLE_COMMAND`
//! says otherwise) as a child process:
//!
//! ```text
//! eden-core create --name <name> --image-uri <image>
//! eden-core delete --name <name>
//! ```
//!
//! Resolved profile variables are passed in the child's environment. The
//! child prints a JSON object (`{"name": ..., "cname": ...}` for create,
//! `{"name": ...}` for delete) on stdout.

use crate::lifecycle::{CreatedEnvironment, DeletedEnvironment, EnvironmentLifecycle, LifecycleError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Lifecycle capability backed by an external executable
#[derive(Debug, Clone)]
pub struct ProcessLifecycle {
    command: String,
}

impl ProcessLifecycle {
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    async fn run<T: DeserializeOwned>(
        &self,
        args: &[&str],
        variables: &BTreeMap<String, String>,
    ) -> Result<T, LifecycleError> {
        debug!("Running {} {}", self.command, args.join(" "));

        let output = Command::new(&self.command)
            .args(args)
            .envs(variables)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| LifecycleError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(LifecycleError::Failed {
                command: self.command.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_output(&self.command, &output.stdout)
    }
}

/// Decode the last non-empty stdout line; earlier lines are progress output
fn parse_output<T: DeserializeOwned>(command: &str, stdout: &[u8]) -> Result<T, LifecycleError> {
    let text = String::from_utf8_lossy(stdout);
    let line = text
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default();

    serde_json::from_str(line).map_err(|source| LifecycleError::Output {
        command: command.to_string(),
        source,
    })
}

#[async_trait]
impl EnvironmentLifecycle for ProcessLifecycle {
    async fn create_env(
        &self,
        name: &str,
        image_uri: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<CreatedEnvironment, LifecycleError> {
        info!("Creating environment {} with image {}", name, image_uri);
        self.run(&["create", "--name", name, "--image-uri", image_uri], variables)
            .await
    }

    async fn delete_env(
        &self,
        name: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<DeletedEnvironment, LifecycleError> {
        info!("Deleting environment {}", name);
        self.run(&["delete", "--name", name], variables).await
    }
}
