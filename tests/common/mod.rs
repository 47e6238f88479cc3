//! Common test utilities for eden integration tests
//!
//! Provides valid parameter values, config file fixtures, a fast wait policy
//! and a recording fake of the environment lifecycle capability.

#![allow(dead_code, reason = "Each test binary uses a different subset of helpers")]

use async_trait::async_trait;
use eden::lifecycle::{
    CreatedEnvironment, DeletedEnvironment, EnvironmentLifecycle, LifecycleError,
};
use eden::profile::ParameterId;
use eden::state::{InMemoryBackend, RemoteStateStore, WaitPolicy};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A value for every parameter that passes validation
pub fn complete_values() -> Vec<(ParameterId, &'static str)> {
    vec![
        (ParameterId::NamePrefix, "dev"),
        (
            ParameterId::ReferenceServiceArn,
            "arn:aws:ecs:ap-northeast-1:123456789012:service/dev/dev01-api",
        ),
        (ParameterId::TargetCluster, "dev"),
        (ParameterId::DomainNameSuffix, "dev.example.com"),
        (
            ParameterId::MasterAlbArn,
            "arn:aws:elasticloadbalancing:ap-northeast-1:123456789012:loadbalancer/app/dev-alb/0123456789abcdef",
        ),
        (ParameterId::DynamicZoneId, "Z2ABCDEF123456"),
        (ParameterId::DynamicZoneName, "dev.example.com."),
        (ParameterId::ConfigBucketName, "config-bucket"),
        (ParameterId::ConfigBucketKey, "endpoints.json"),
        (ParameterId::ConfigUpdateKey, "api_endpoint"),
        (ParameterId::ConfigEnvType, "dev"),
        (ParameterId::ConfigNamePrefix, "dev"),
    ]
}

/// INI section for `profile` holding every parameter except `skip`
pub fn profile_section(profile: &str, skip: Option<ParameterId>) -> String {
    let mut out = format!("[{profile}]\n");
    for (parameter, value) in complete_values() {
        if Some(parameter) != skip {
            out.push_str(&format!("{} = {}\n", parameter.name(), value));
        }
    }
    out
}

/// Write a config file into `dir` and return its path
pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("config");
    std::fs::write(&path, content).expect("Failed to write test config");
    path
}

/// Wait policy fast enough for tests
pub fn fast_policy() -> WaitPolicy {
    WaitPolicy::new(Duration::from_millis(1), Duration::from_secs(5))
}

/// Store over an in-memory backend that already has an ACTIVE table
pub fn active_store(table: &str) -> (Arc<InMemoryBackend>, RemoteStateStore) {
    let backend = Arc::new(InMemoryBackend::with_active_table(table));
    let store = RemoteStateStore::new(Arc::<InMemoryBackend>::clone(&backend), table);
    (backend, store)
}

/// One call received by [`FakeLifecycle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleCall {
    Create {
        name: String,
        image_uri: String,
        variables: BTreeMap<String, String>,
    },
    Delete {
        name: String,
        variables: BTreeMap<String, String>,
    },
}

/// Lifecycle fake that records calls and answers with `<name>.<suffix>`
#[derive(Debug, Default)]
pub struct FakeLifecycle {
    calls: Mutex<Vec<LifecycleCall>>,
    fail: bool,
}

impl FakeLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<LifecycleCall> {
        self.calls.lock().expect("lifecycle calls lock").clone()
    }

    fn record(&self, call: LifecycleCall) -> Result<(), LifecycleError> {
        self.calls.lock().expect("lifecycle calls lock").push(call);
        if self.fail {
            return Err(LifecycleError::Other("cluster unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EnvironmentLifecycle for FakeLifecycle {
    async fn create_env(
        &self,
        name: &str,
        image_uri: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<CreatedEnvironment, LifecycleError> {
        self.record(LifecycleCall::Create {
            name: name.to_string(),
            image_uri: image_uri.to_string(),
            variables: variables.clone(),
        })?;
        let suffix = variables
            .get("DOMAIN_NAME_SUFFIX")
            .cloned()
            .unwrap_or_default();
        Ok(CreatedEnvironment {
            name: name.to_string(),
            cname: format!("{name}.{suffix}"),
        })
    }

    async fn delete_env(
        &self,
        name: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<DeletedEnvironment, LifecycleError> {
        self.record(LifecycleCall::Delete {
            name: name.to_string(),
            variables: variables.clone(),
        })?;
        Ok(DeletedEnvironment {
            name: name.to_string(),
        })
    }
}
