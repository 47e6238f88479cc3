//! # Config Commands
//!
//! `setup` and `check` only touch the local file. `push`, `pull`, `ls` and
//! `remote-rm` move profiles between the local file and the state table.

use crate::commands::{CommandError, Invocation};
use crate::config::LocalConfig;
use crate::state::{RemoteStateStore, WaitPolicy};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Write the command-line parameters into the local profile.
///
/// A missing file is bootstrapped. Fails without touching the file when no
/// parameter was given.
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn config_setup(invocation: &Invocation) -> Result<(), CommandError> {
    let mut config = LocalConfig::load_or_default(&invocation.config_path)?;

    if !config.resolve_overrides(&invocation.profile_name, &invocation.overrides)? {
        return Err(CommandError::NothingToUpdate);
    }

    config.persist(&invocation.config_path)?;
    info!(
        "Profile {} saved to {}",
        invocation.profile_name,
        invocation.config_path.display()
    );
    Ok(())
}

/// Validate every profile of the local file, command-line parameters applied.
///
/// Nothing is written back. Fails when the file is missing or any profile has
/// an unsatisfied parameter.
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn config_check(invocation: &Invocation) -> Result<(), CommandError> {
    let mut config =
        LocalConfig::load(&invocation.config_path)?.ok_or_else(|| CommandError::ConfigMissing {
            path: invocation.config_path.clone(),
        })?;
    config.resolve_overrides(&invocation.profile_name, &invocation.overrides)?;

    match config.check() {
        0 => {
            info!("No errors found");
            Ok(())
        }
        errors => Err(CommandError::CheckFailed { errors }),
    }
}

/// Copy the local profile, command-line parameters applied, to the state table.
///
/// Creates the table when needed. Incomplete profiles are pushed with a
/// warning per unsatisfied parameter.
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub async fn config_push(
    invocation: &Invocation,
    store: &RemoteStateStore,
    policy: &WaitPolicy,
) -> Result<(), CommandError> {
    let profile_name = &invocation.profile_name;
    let mut config = LocalConfig::load_or_default(&invocation.config_path)?;
    config.resolve_overrides(profile_name, &invocation.overrides)?;
    let profile = config.profile(profile_name).unwrap_or_default();

    for issue in profile.issues() {
        warn!("{} for profile {}", issue, profile_name);
    }

    store.ensure_ready(true, policy).await?;
    store.put_profile(profile_name, &profile).await?;

    info!(
        "Successfully pushed profile {} to DynamoDB table {}",
        profile_name,
        store.table_name()
    );
    Ok(())
}

/// Copy a profile from the state table into the local file
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub async fn config_pull(
    invocation: &Invocation,
    store: &RemoteStateStore,
    policy: &WaitPolicy,
) -> Result<(), CommandError> {
    let profile_name = &invocation.profile_name;

    store.ensure_ready(false, policy).await?;
    let profile = store.get_profile(profile_name).await?;

    let mut config = LocalConfig::load_or_default(&invocation.config_path)?;
    for (parameter, value) in profile.iter() {
        info!(
            "Setting {} to {} in profile {}",
            parameter, value, profile_name
        );
    }
    config.store_profile(profile_name, &profile)?;
    config.persist(&invocation.config_path)?;

    info!(
        "Successfully pulled profile {} to local configuration",
        profile_name
    );
    Ok(())
}

/// Every profile stored in the state table: name -> raw JSON
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub async fn config_ls(
    store: &RemoteStateStore,
    policy: &WaitPolicy,
) -> Result<BTreeMap<String, String>, CommandError> {
    store.ensure_ready(false, policy).await?;
    Ok(store.list_profiles().await?)
}

/// Delete a profile from the state table
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub async fn config_remote_rm(
    invocation: &Invocation,
    store: &RemoteStateStore,
    policy: &WaitPolicy,
) -> Result<(), CommandError> {
    store.ensure_ready(false, policy).await?;
    store.delete_profile(&invocation.profile_name).await?;

    info!(
        "Successfully removed profile {} from DynamoDB table {}",
        invocation.profile_name,
        store.table_name()
    );
    Ok(())
}
