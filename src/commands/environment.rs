//! # Environment Commands
//!
//! `create` and `delete` resolve the profile strictly before calling the
//! lifecycle capability, then update the environment inventory.

use crate::commands::{CommandError, Invocation};
use crate::config::LocalConfig;
use crate::lifecycle::{CreatedEnvironment, DeletedEnvironment, EnvironmentLifecycle};
use crate::profile::{resolve, ResolvedProfile};
use crate::state::{EnvironmentListing, RemoteStateStore, StateError, WaitPolicy};
use tracing::{error, info};

fn resolve_invocation(invocation: &Invocation) -> Result<ResolvedProfile, CommandError> {
    let config = LocalConfig::load_or_default(&invocation.config_path)?;
    Ok(resolve(
        &invocation.profile_name,
        &invocation.overrides,
        &config,
    )?)
}

/// Create (or redeploy) an environment and record it.
///
/// The table is created when missing. Nothing external is touched unless the
/// profile resolves completely.
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub async fn create(
    invocation: &Invocation,
    name: &str,
    image_uri: &str,
    store: &RemoteStateStore,
    policy: &WaitPolicy,
    lifecycle: &dyn EnvironmentLifecycle,
) -> Result<CreatedEnvironment, CommandError> {
    store.ensure_ready(true, policy).await?;
    let resolved = resolve_invocation(invocation)?;

    let created = lifecycle
        .create_env(name, image_uri, &resolved.variables())
        .await?;
    store
        .put_environment(resolved.name(), &created.name, &created.cname)
        .await?;

    info!(
        "Environment {} of profile {} is available at {}",
        created.name,
        resolved.name(),
        created.cname
    );
    Ok(created)
}

/// Delete an environment and drop its record
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub async fn delete(
    invocation: &Invocation,
    name: &str,
    store: &RemoteStateStore,
    policy: &WaitPolicy,
    lifecycle: &dyn EnvironmentLifecycle,
) -> Result<DeletedEnvironment, CommandError> {
    store.ensure_ready(false, policy).await?;
    let resolved = resolve_invocation(invocation)?;

    let deleted = lifecycle.delete_env(name, &resolved.variables()).await?;
    store
        .delete_environment(resolved.name(), &deleted.name)
        .await?;

    info!(
        "Environment {} of profile {} deleted",
        deleted.name,
        resolved.name()
    );
    Ok(deleted)
}

/// Every recorded environment, grouped by profile
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub async fn ls(store: &RemoteStateStore) -> Result<EnvironmentListing, CommandError> {
    store.list_environments().await.map_err(|e| {
        if let StateError::TableNotFound { table } = &e {
            error!(
                "{} table not found, please create table with \"eden config push\" or \"eden create\" first",
                table
            );
        }
        CommandError::State(e)
    })
}
