//! # Command Orchestration Tests
//!
//! Full command pipelines over a temporary config file, the in-memory state
//! table and a recording lifecycle fake.

mod common;

use common::{
    active_store, complete_values, fast_policy, profile_section, write_config, FakeLifecycle,
    LifecycleCall,
};
use eden::commands::{self, CommandError, Invocation};
use eden::config::{ConfigError, IniError, LocalConfig};
use eden::profile::{Overrides, ParameterId, ResolveError};
use eden::state::{InMemoryBackend, RemoteStateStore, StateError};
use std::sync::Arc;

#[tokio::test]
async fn test_create_records_environment() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), &profile_section("default", None));
    let backend = Arc::new(InMemoryBackend::new());
    let store = RemoteStateStore::new(Arc::<InMemoryBackend>::clone(&backend), "eden");
    let lifecycle = FakeLifecycle::new();

    let created = commands::create(
        &Invocation::new("default", &path),
        "feature-x",
        "repo/image:tag",
        &store,
        &fast_policy(),
        &lifecycle,
    )
    .await
    .unwrap();

    assert_eq!(created.cname, "feature-x.dev.example.com");
    assert!(backend.has_table("eden").await);

    let calls = lifecycle.calls();
    assert_eq!(calls.len(), 1);
    let LifecycleCall::Create {
        name,
        image_uri,
        variables,
    } = &calls[0]
    else {
        panic!("expected a create call");
    };
    assert_eq!(name, "feature-x");
    assert_eq!(image_uri, "repo/image:tag");
    assert_eq!(variables.len(), ParameterId::ALL.len());
    assert_eq!(variables["TARGET_CLUSTER"], "dev");

    let environments = commands::ls(&store).await.unwrap();
    let records = &environments["default"];
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "feature-x");
    assert_eq!(
        records[0].endpoint.as_deref(),
        Some("feature-x.dev.example.com")
    );
}

#[tokio::test]
async fn test_create_prefers_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), &profile_section("default", None));
    let (_, store) = active_store("eden");
    let lifecycle = FakeLifecycle::new();
    let invocation = Invocation::new("default", &path).with_overrides(
        Overrides::new().with(ParameterId::TargetCluster, Some("staging".into())),
    );

    commands::create(&invocation, "x", "repo/api:x", &store, &fast_policy(), &lifecycle)
        .await
        .unwrap();

    let LifecycleCall::Create { variables, .. } = &lifecycle.calls()[0] else {
        panic!("expected a create call");
    };
    assert_eq!(variables["TARGET_CLUSTER"], "staging");

    // overrides never touch the file
    let config = LocalConfig::load(&path).unwrap().unwrap();
    assert_eq!(
        config.profile("default").unwrap().get(ParameterId::TargetCluster),
        Some("dev")
    );
}

#[tokio::test]
async fn test_incomplete_profile_never_reaches_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        &profile_section("default", Some(ParameterId::DynamicZoneId)),
    );
    let (_, store) = active_store("eden");
    let lifecycle = FakeLifecycle::new();

    let err = commands::create(
        &Invocation::new("default", &path),
        "feature-x",
        "repo/image:tag",
        &store,
        &fast_policy(),
        &lifecycle,
    )
    .await
    .unwrap_err();

    match err {
        CommandError::Resolve(ResolveError::MissingParameter { parameter, profile }) => {
            assert_eq!(parameter, ParameterId::DynamicZoneId);
            assert_eq!(profile, "default");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(lifecycle.calls().is_empty());
    assert!(store.list_environments().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_overrides_alone_resolve_without_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let (_, store) = active_store("eden");
    let lifecycle = FakeLifecycle::new();
    let overrides: Overrides = complete_values()
        .into_iter()
        .map(|(parameter, value)| (parameter, Some(value.to_string())))
        .collect();
    let invocation =
        Invocation::new("default", dir.path().join("missing")).with_overrides(overrides);

    commands::create(&invocation, "x", "repo/api:x", &store, &fast_policy(), &lifecycle)
        .await
        .unwrap();
    assert_eq!(lifecycle.calls().len(), 1);
}

#[tokio::test]
async fn test_failed_create_records_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), &profile_section("default", None));
    let (_, store) = active_store("eden");
    let lifecycle = FakeLifecycle::failing();

    let err = commands::create(
        &Invocation::new("default", &path),
        "x",
        "repo/api:x",
        &store,
        &fast_policy(),
        &lifecycle,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CommandError::Lifecycle(_)));
    assert!(store.list_environments().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_removes_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), &profile_section("default", None));
    let (_, store) = active_store("eden");
    let lifecycle = FakeLifecycle::new();
    let invocation = Invocation::new("default", &path);

    commands::create(&invocation, "x", "repo/api:x", &store, &fast_policy(), &lifecycle)
        .await
        .unwrap();
    commands::delete(&invocation, "x", &store, &fast_policy(), &lifecycle)
        .await
        .unwrap();

    assert!(store.list_environments().await.unwrap().is_empty());
    assert!(matches!(
        lifecycle.calls()[1],
        LifecycleCall::Delete { ref name, .. } if name == "x"
    ));
}

#[tokio::test]
async fn test_delete_does_not_create_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), &profile_section("default", None));
    let backend = Arc::new(InMemoryBackend::new());
    let store = RemoteStateStore::new(Arc::<InMemoryBackend>::clone(&backend), "eden");
    let lifecycle = FakeLifecycle::new();

    let err = commands::delete(
        &Invocation::new("default", &path),
        "x",
        &store,
        &fast_policy(),
        &lifecycle,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        CommandError::State(StateError::TableNotFound { .. })
    ));
    assert!(!backend.has_table("eden").await);
    assert!(lifecycle.calls().is_empty());
}

#[tokio::test]
async fn test_ls_on_missing_table() {
    let store = RemoteStateStore::new(Arc::new(InMemoryBackend::new()), "eden");
    assert!(matches!(
        commands::ls(&store).await,
        Err(CommandError::State(StateError::TableNotFound { .. }))
    ));
}

#[test]
fn test_setup_refuses_unreadable_profile_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), &profile_section("default", None));
    let before = std::fs::read_to_string(&path).unwrap();
    let invocation = Invocation::new("", &path).with_overrides(
        Overrides::new().with(ParameterId::NamePrefix, Some("x".into())),
    );

    let err = commands::config_setup(&invocation).unwrap_err();
    assert!(matches!(
        err,
        CommandError::Config(ConfigError::Update {
            source: IniError::InvalidSectionName { .. },
            ..
        })
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    commands::config_check(&Invocation::new("default", &path)).unwrap();
}

#[test]
fn test_setup_bootstraps_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".eden").join("config");
    let invocation = Invocation::new("dev", &path).with_overrides(
        Overrides::new().with(ParameterId::NamePrefix, Some("dev".into())),
    );

    commands::config_setup(&invocation).unwrap();

    let config = LocalConfig::load(&path).unwrap().unwrap();
    assert_eq!(
        config.profile("dev").unwrap().get(ParameterId::NamePrefix),
        Some("dev")
    );
}

#[test]
fn test_setup_without_parameters_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let content = profile_section("default", None);
    let path = write_config(dir.path(), &content);

    let err = commands::config_setup(&Invocation::new("other", &path)).unwrap_err();
    assert!(matches!(err, CommandError::NothingToUpdate));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
}

#[test]
fn test_check_counts_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        &profile_section("default", Some(ParameterId::MasterAlbArn)),
    );

    let err = commands::config_check(&Invocation::new("default", &path)).unwrap_err();
    assert!(matches!(err, CommandError::CheckFailed { errors: 1 }));

    // the override fills the gap in memory only
    let invocation = Invocation::new("default", &path).with_overrides(Overrides::new().with(
        ParameterId::MasterAlbArn,
        Some(
            "arn:aws:elasticloadbalancing:ap-northeast-1:123456789012:loadbalancer/app/dev-alb/0123456789abcdef"
                .into(),
        ),
    ));
    commands::config_check(&invocation).unwrap();
    commands::config_check(&Invocation::new("default", &path)).unwrap_err();
}

#[test]
fn test_check_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = commands::config_check(&Invocation::new("default", dir.path().join("config")))
        .unwrap_err();
    assert!(matches!(err, CommandError::ConfigMissing { .. }));
}

#[tokio::test]
async fn test_push_then_pull_into_fresh_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_config(dir.path(), &profile_section("shared", None));
    let target = dir.path().join("other").join("config");
    let backend = Arc::new(InMemoryBackend::new());
    let store = RemoteStateStore::new(Arc::<InMemoryBackend>::clone(&backend), "eden");

    commands::config_push(&Invocation::new("shared", &source), &store, &fast_policy())
        .await
        .unwrap();
    assert!(backend.has_table("eden").await);

    commands::config_pull(&Invocation::new("shared", &target), &store, &fast_policy())
        .await
        .unwrap();

    let pulled = LocalConfig::load(&target).unwrap().unwrap();
    let original = LocalConfig::load(&source).unwrap().unwrap();
    assert_eq!(pulled.profile("shared"), original.profile("shared"));
    assert_eq!(pulled.check(), 0);
}

#[tokio::test]
async fn test_push_includes_overrides_and_allows_partial_profiles() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[dev]\nname_prefix = dev\n");
    let (_, store) = active_store("eden");
    let invocation = Invocation::new("dev", &path).with_overrides(
        Overrides::new().with(ParameterId::TargetCluster, Some("dev-cluster".into())),
    );

    commands::config_push(&invocation, &store, &fast_policy())
        .await
        .unwrap();

    let remote = store.get_profile("dev").await.unwrap();
    assert_eq!(remote.get(ParameterId::NamePrefix), Some("dev"));
    assert_eq!(remote.get(ParameterId::TargetCluster), Some("dev-cluster"));
    assert_eq!(remote.len(), 2);
}

#[tokio::test]
async fn test_pull_keeps_other_profiles() {
    let dir = tempfile::tempdir().unwrap();
    let mut content = profile_section("default", None);
    content.push_str("[staging]\nname_prefix = stg\n");
    let path = write_config(dir.path(), &content);
    let (_, store) = active_store("eden");

    let mut remote = eden::profile::Profile::new();
    remote.set(ParameterId::TargetCluster, "shared");
    store.put_profile("staging", &remote).await.unwrap();

    commands::config_pull(&Invocation::new("staging", &path), &store, &fast_policy())
        .await
        .unwrap();

    let config = LocalConfig::load(&path).unwrap().unwrap();
    let staging = config.profile("staging").unwrap();
    assert_eq!(staging.get(ParameterId::NamePrefix), Some("stg"));
    assert_eq!(staging.get(ParameterId::TargetCluster), Some("shared"));
    assert!(config.profile("default").unwrap().is_complete());
}

#[tokio::test]
async fn test_pull_of_unknown_profile_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config");
    let (_, store) = active_store("eden");

    let err = commands::config_pull(&Invocation::new("ghost", &path), &store, &fast_policy())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommandError::State(StateError::ProfileNotFound { .. })
    ));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_config_ls_and_remote_rm() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), &profile_section("default", None));
    let (_, store) = active_store("eden");
    let invocation = Invocation::new("default", &path);

    commands::config_push(&invocation, &store, &fast_policy())
        .await
        .unwrap();
    let profiles = commands::config_ls(&store, &fast_policy()).await.unwrap();
    assert_eq!(profiles.keys().collect::<Vec<_>>(), vec!["default"]);

    commands::config_remote_rm(&invocation, &store, &fast_policy())
        .await
        .unwrap();
    commands::config_remote_rm(&invocation, &store, &fast_policy())
        .await
        .unwrap();
    assert!(commands::config_ls(&store, &fast_policy())
        .await
        .unwrap()
        .is_empty());
}
