//! # Remote State Store
//!
//! Profiles and environment records shared through one remote table.
//!
//! ## Table lifecycle
//!
//! [`RemoteStateStore::ensure_ready`] walks the table status machine:
//!
//! | observed                      | result                                   |
//! |-------------------------------|------------------------------------------|
//! | missing, no auto-create       | `TableNotFound`                          |
//! | missing, auto-create          | create, then wait as for `CREATING`      |
//! | `CREATING`                    | poll per [`WaitPolicy`] until `ACTIVE`   |
//! | `UPDATING` / `DELETING`       | `TableBusy`                              |
//! | `ACTIVE`                      | ready                                    |
//! | credential failure            | `CredentialsNotFound`                    |
//!
//! Record operations are single-item round trips; nothing is cached.
//! Concurrent writers to the same key are last-writer-wins.

use crate::constants::PROFILE_RECORD_TYPE;
use crate::profile::Profile;
use crate::state::backend::{StateBackend, TableStatus};
use crate::state::error::StateError;
use crate::state::schema::{self, EnvironmentRecord, ATTR_NAME, ATTR_PROFILE, ATTR_TYPE};
use crate::state::wait::WaitPolicy;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Environments grouped by owning profile, newest first within each group
pub type EnvironmentListing = BTreeMap<String, Vec<EnvironmentRecord>>;

/// Handle on the shared state table
#[derive(Clone)]
pub struct RemoteStateStore {
    backend: Arc<dyn StateBackend>,
    table_name: String,
}

impl std::fmt::Debug for RemoteStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStateStore")
            .field("table_name", &self.table_name)
            .finish_non_exhaustive()
    }
}

impl RemoteStateStore {
    #[must_use]
    pub fn new(backend: Arc<dyn StateBackend>, table_name: impl Into<String>) -> Self {
        Self {
            backend,
            table_name: table_name.into(),
        }
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn lift(&self, error: crate::state::backend::BackendError) -> StateError {
        StateError::from_backend(&self.table_name, error)
    }

    /// Make sure the table exists and is ACTIVE.
    ///
    /// With `auto_create` a missing table is created and awaited. The wait is
    /// bounded by `policy`; dropping the returned future cancels it.
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub async fn ensure_ready(
        &self,
        auto_create: bool,
        policy: &WaitPolicy,
    ) -> Result<(), StateError> {
        let status = match self.backend.describe_table(&self.table_name).await {
            Ok(status) => status,
            Err(crate::state::backend::BackendError::TableNotFound) if auto_create => {
                info!(
                    "Remote state table {} does not exist, creating...",
                    self.table_name
                );
                self.backend
                    .create_table(&self.table_name)
                    .await
                    .map_err(|e| self.lift(e))?
            }
            Err(e) => return Err(self.lift(e)),
        };

        match status {
            TableStatus::Active => {
                debug!("Remote state table {} is ACTIVE", self.table_name);
                Ok(())
            }
            TableStatus::Creating => self.wait_until_active(policy).await,
            status => Err(StateError::TableBusy {
                table: self.table_name.clone(),
                status,
            }),
        }
    }

    async fn wait_until_active(&self, policy: &WaitPolicy) -> Result<(), StateError> {
        info!("Waiting for table creation...");
        let mut wait = policy.start();

        while let Some(delay) = wait.next_delay() {
            tokio::time::sleep(delay).await;

            let status = self
                .backend
                .describe_table(&self.table_name)
                .await
                .map_err(|e| self.lift(e))?;
            debug!(
                "Remote state table {} is {} after {} polls",
                self.table_name,
                status,
                wait.attempts()
            );

            match status {
                TableStatus::Active => {
                    info!("Remote state table {} is ACTIVE", self.table_name);
                    return Ok(());
                }
                TableStatus::Creating => {}
                status => {
                    return Err(StateError::TableBusy {
                        table: self.table_name.clone(),
                        status,
                    })
                }
            }
        }

        Err(StateError::WaitTimedOut {
            table: self.table_name.clone(),
            attempts: wait.attempts(),
            elapsed: wait.elapsed(),
        })
    }

    /// Upsert a profile record
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub async fn put_profile(&self, name: &str, profile: &Profile) -> Result<(), StateError> {
        let json = profile.to_json().map_err(|source| StateError::ProfileEncode {
            name: name.to_string(),
            source,
        })?;
        let item = schema::profile_item(name, json, Utc::now());

        self.backend
            .put_item(&self.table_name, item)
            .await
            .map_err(|e| self.lift(e))?;
        debug!("Stored profile {} in {}", name, self.table_name);
        Ok(())
    }

    /// Fetch and decode a profile record
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub async fn get_profile(&self, name: &str) -> Result<Profile, StateError> {
        let item = self
            .backend
            .get_item(&self.table_name, PROFILE_RECORD_TYPE, name)
            .await
            .map_err(|e| self.lift(e))?
            .ok_or_else(|| StateError::ProfileNotFound {
                name: name.to_string(),
            })?;

        let json = item
            .get(ATTR_PROFILE)
            .ok_or_else(|| StateError::ProfileEmpty {
                name: name.to_string(),
            })?;

        Profile::from_json(json).map_err(|source| StateError::ProfileDecode {
            name: name.to_string(),
            source,
        })
    }

    /// Delete a profile record; absent records are fine
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub async fn delete_profile(&self, name: &str) -> Result<(), StateError> {
        self.backend
            .delete_item(&self.table_name, PROFILE_RECORD_TYPE, name)
            .await
            .map_err(|e| self.lift(e))
    }

    /// Every profile record: name -> raw stored JSON
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub async fn list_profiles(&self) -> Result<BTreeMap<String, String>, StateError> {
        let items = self
            .backend
            .query(&self.table_name, PROFILE_RECORD_TYPE)
            .await
            .map_err(|e| self.lift(e))?;

        let mut profiles = BTreeMap::new();
        for mut item in items {
            let Some(name) = item.remove(ATTR_NAME) else {
                continue;
            };
            match item.remove(ATTR_PROFILE) {
                Some(json) => {
                    profiles.insert(name, json);
                }
                None => warn!("Profile {} does not contain any parameters!", name),
            }
        }
        Ok(profiles)
    }

    /// Upsert the record of one environment, stamped with the current time
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub async fn put_environment(
        &self,
        profile_name: &str,
        env_name: &str,
        endpoint: &str,
    ) -> Result<(), StateError> {
        Self::reject_reserved(profile_name)?;
        let item = schema::environment_item(profile_name, env_name, endpoint, Utc::now());

        self.backend
            .put_item(&self.table_name, item)
            .await
            .map_err(|e| self.lift(e))?;
        debug!(
            "Recorded environment {} of profile {} at {}",
            env_name, profile_name, endpoint
        );
        Ok(())
    }

    /// Delete the record of one environment; absent records are fine
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub async fn delete_environment(
        &self,
        profile_name: &str,
        env_name: &str,
    ) -> Result<(), StateError> {
        Self::reject_reserved(profile_name)?;
        self.backend
            .delete_item(&self.table_name, profile_name, env_name)
            .await
            .map_err(|e| self.lift(e))
    }

    /// Every environment record, grouped by profile; profile records are skipped
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub async fn list_environments(&self) -> Result<EnvironmentListing, StateError> {
        let items = self
            .backend
            .scan(&self.table_name)
            .await
            .map_err(|e| self.lift(e))?;

        let mut environments = EnvironmentListing::new();
        for item in &items {
            if item.get(ATTR_TYPE).map(String::as_str) == Some(PROFILE_RECORD_TYPE) {
                continue;
            }
            match EnvironmentRecord::from_item(item) {
                Some(record) => environments
                    .entry(record.profile_name.clone())
                    .or_default()
                    .push(record),
                None => warn!("Skipping malformed item in {}", self.table_name),
            }
        }

        for records in environments.values_mut() {
            records.sort_by(|a, b| {
                b.last_updated()
                    .cmp(&a.last_updated())
                    .then_with(|| a.name.cmp(&b.name))
            });
        }
        Ok(environments)
    }

    fn reject_reserved(profile_name: &str) -> Result<(), StateError> {
        if profile_name == PROFILE_RECORD_TYPE {
            return Err(StateError::ReservedProfileName {
                name: profile_name.to_string(),
            });
        }
        Ok(())
    }
}
