//! Command dispatch.
//!
//! The state backend is only built for commands whose [`CommandKind`](crate::cli::CommandKind)
//! requires it, so `config setup` and `config check` work without AWS access.

use crate::cli::output::{format_environments, format_profiles};
use crate::cli::{Cli, Command, ConfigCommand, RemoteArgs};
use crate::commands::{self, CommandError, Invocation};
use crate::config::{expand_path, Settings};
use crate::lifecycle::{EnvironmentLifecycle, ProcessLifecycle};
use crate::state::{DynamoDbBackend, RemoteStateStore, StateBackend, StateError, WaitPolicy};
use std::sync::Arc;
use tracing::{debug, info};

/// Run a parsed command line against DynamoDB and the lifecycle executable
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub async fn run(cli: Cli, settings: &Settings) -> Result<(), CommandError> {
    let kind = cli.command.kind();
    let backend: Option<Arc<dyn StateBackend>> = if kind.requires_remote() {
        Some(Arc::new(DynamoDbBackend::from_settings(settings).await))
    } else {
        debug!("{} does not use the state table", kind.name());
        None
    };
    let lifecycle = ProcessLifecycle::new(settings.lifecycle_command.clone());

    dispatch(cli.command, settings, backend, &lifecycle).await
}

/// Run one command with explicit dependencies
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub async fn dispatch(
    command: Command,
    settings: &Settings,
    backend: Option<Arc<dyn StateBackend>>,
    lifecycle: &dyn EnvironmentLifecycle,
) -> Result<(), CommandError> {
    let kind = command.kind();
    let common = command.common();
    let config_path = expand_path(&common.config_path)?;
    let invocation = Invocation::new(common.profile.clone(), config_path);

    let remote = |args: &RemoteArgs| -> Result<(RemoteStateStore, WaitPolicy), CommandError> {
        let backend = backend.clone().ok_or_else(|| {
            StateError::Unknown(format!("{} needs the state table", kind.name()))
        })?;
        Ok((
            RemoteStateStore::new(backend, args.remote_table_name.clone()),
            settings.wait_policy(args.table_wait_timeout),
        ))
    };

    match command {
        Command::Create {
            remote: args,
            parameters,
            name,
            image_uri,
            ..
        } => {
            let (store, policy) = remote(&args)?;
            let invocation = invocation.with_overrides(parameters.overrides());
            commands::create(&invocation, &name, &image_uri, &store, &policy, lifecycle).await?;
        }
        Command::Delete {
            remote: args,
            parameters,
            name,
            ..
        } => {
            let (store, policy) = remote(&args)?;
            let invocation = invocation.with_overrides(parameters.overrides());
            commands::delete(&invocation, &name, &store, &policy, lifecycle).await?;
        }
        Command::Ls { remote: args, .. } => {
            let (store, _) = remote(&args)?;
            let environments = commands::ls(&store).await?;
            if environments.is_empty() {
                info!("No environments available");
            } else {
                print!("{}", format_environments(&environments));
            }
        }
        Command::Config { command } => match command {
            ConfigCommand::Setup { parameters, .. } => {
                commands::config_setup(&invocation.with_overrides(parameters.overrides()))?;
            }
            ConfigCommand::Check { parameters, .. } => {
                commands::config_check(&invocation.with_overrides(parameters.overrides()))?;
            }
            ConfigCommand::Push {
                remote: args,
                parameters,
                ..
            } => {
                let (store, policy) = remote(&args)?;
                let invocation = invocation.with_overrides(parameters.overrides());
                commands::config_push(&invocation, &store, &policy).await?;
            }
            ConfigCommand::Pull { remote: args, .. } => {
                let (store, policy) = remote(&args)?;
                commands::config_pull(&invocation, &store, &policy).await?;
            }
            ConfigCommand::Ls { remote: args, .. } => {
                let (store, policy) = remote(&args)?;
                let profiles = commands::config_ls(&store, &policy).await?;
                if profiles.is_empty() {
                    info!("No profiles available");
                } else {
                    print!("{}", format_profiles(&profiles));
                }
            }
            ConfigCommand::RemoteRm { remote: args, .. } => {
                let (store, policy) = remote(&args)?;
                commands::config_remote_rm(&invocation, &store, &policy).await?;
            }
        },
    }

    debug!("{} finished", kind.name());
    Ok(())
}
