//! # Commands
//!
//! One pipeline per user-facing command. Every dependency (local config path,
//! overrides, state store, wait policy, lifecycle capability) is passed in by
//! the caller, so the same pipelines run against DynamoDB or an in-memory
//! table.
//!
//! - `config`: `config setup|check|push|pull|ls|remote-rm`
//! - `environment`: `create|delete|ls`

pub mod config;
pub mod environment;

use crate::config::ConfigError;
use crate::lifecycle::LifecycleError;
use crate::profile::{Overrides, ResolveError};
use crate::state::StateError;
use std::path::PathBuf;
use thiserror::Error;

pub use config::{config_check, config_ls, config_pull, config_push, config_remote_rm, config_setup};
pub use environment::{create, delete, ls};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Config file {} is empty", .path.display())]
    ConfigMissing { path: PathBuf },
    #[error("No parameters to update were given, exiting")]
    NothingToUpdate,
    #[error("Found {errors} errors")]
    CheckFailed { errors: usize },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// What every command knows about the local side of an invocation
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Profile the command acts on
    pub profile_name: String,
    /// Expanded path of the local configuration file
    pub config_path: PathBuf,
    /// Parameter values given on the command line
    pub overrides: Overrides,
}

impl Invocation {
    #[must_use]
    pub fn new(profile_name: impl Into<String>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            profile_name: profile_name.into(),
            config_path: config_path.into(),
            overrides: Overrides::new(),
        }
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }
}
