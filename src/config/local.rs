//! # Local Profile Store
//!
//! Reads and writes the section-per-profile configuration file.
//!
//! The file is optional: a missing file loads as "nothing configured yet" so
//! that `eden config setup` can bootstrap it on first run.

use crate::config::ini::{check_section_name, IniDocument, IniError};
use crate::constants::DEFAULT_SECTION;
use crate::profile::{Overrides, ParameterId, Profile, ProfileIssue};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse { path: PathBuf, source: IniError },
    #[error("Failed to write config file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot update profile {profile}: {source}")]
    Update { profile: String, source: IniError },
    #[error("Cannot expand {path}: home directory not found")]
    NoHomeDirectory { path: String },
}

/// Expand a leading `~` to the current user's home directory
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn expand_path(path: &str) -> Result<PathBuf, ConfigError> {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '\\']) => rest,
        _ => return Ok(PathBuf::from(path)),
    };

    let base = directories::BaseDirs::new().ok_or_else(|| ConfigError::NoHomeDirectory {
        path: path.to_string(),
    })?;
    Ok(base
        .home_dir()
        .join(rest.trim_start_matches(['/', '\\'])))
}

/// The local configuration: one section per profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalConfig {
    document: IniDocument,
}

impl LocalConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub fn parse(input: &str) -> Result<Self, IniError> {
        Ok(Self {
            document: IniDocument::parse(input)?,
        })
    }

    /// Load the configuration file.
    ///
    /// Returns `Ok(None)` when the file does not exist; callers decide whether
    /// that is fatal.
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config file {}", path.display());
        Ok(Some(config))
    }

    /// Load the configuration file, starting from an empty one when missing
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::load(path)?.unwrap_or_else(|| {
            info!("Config file {} is empty", path.display());
            Self::new()
        }))
    }

    /// Profile names, excluding the reserved `DEFAULT` section
    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.document
            .sections()
            .filter(|name| *name != DEFAULT_SECTION)
    }

    #[must_use]
    pub fn has_profile(&self, name: &str) -> bool {
        self.document.has_section(name)
    }

    /// Stored values of a profile, `DEFAULT` fallbacks included.
    ///
    /// Returns `None` when the profile has no section in the file.
    #[must_use]
    pub fn profile(&self, name: &str) -> Option<Profile> {
        if !self.document.has_section(name) {
            return None;
        }

        let mut profile = Profile::new();
        for (key, value) in self.document.items(name) {
            match ParameterId::from_name(key) {
                Some(parameter) => {
                    profile.set(parameter, value);
                }
                None => debug!("Ignoring unknown key {} in profile {}", key, name),
            }
        }
        Some(profile)
    }

    /// Write every override into the profile's section.
    ///
    /// Creates the section if absent, leaves parameters without an override
    /// untouched and returns whether anything was written. Profile names and
    /// values that would not read back unchanged are refused before anything
    /// is written.
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub fn resolve_overrides(
        &mut self,
        profile_name: &str,
        overrides: &Overrides,
    ) -> Result<bool, ConfigError> {
        self.write_values(profile_name, overrides.iter(), true)
    }

    /// Copy every value of `profile` into the profile's section
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub fn store_profile(&mut self, profile_name: &str, profile: &Profile) -> Result<(), ConfigError> {
        self.write_values(profile_name, profile.iter(), false)?;
        Ok(())
    }

    fn write_values<'a>(
        &mut self,
        profile_name: &str,
        values: impl IntoIterator<Item = (ParameterId, &'a str)>,
        log: bool,
    ) -> Result<bool, ConfigError> {
        let values: Vec<_> = values.into_iter().collect();
        let update_error = |source| ConfigError::Update {
            profile: profile_name.to_string(),
            source,
        };

        // Validate everything first so a refused value leaves the section untouched
        check_section_name(profile_name).map_err(update_error)?;
        if let Some((parameter, _)) = values
            .iter()
            .find(|(_, value)| value.contains(['\n', '\r']))
        {
            return Err(update_error(IniError::MultiLineValue {
                key: parameter.name().to_string(),
            }));
        }

        self.document.add_section(profile_name).map_err(update_error)?;
        let mut updated = false;
        for (parameter, value) in values {
            if log {
                info!(
                    "Setting {} to {} in profile {}",
                    parameter, value, profile_name
                );
            }
            self.document
                .set(profile_name, parameter.name(), value)
                .map_err(update_error)?;
            updated = true;
        }
        Ok(updated)
    }

    /// Validation issues of one profile; a missing section is one issue per parameter
    #[must_use]
    pub fn check_profile(&self, name: &str) -> Vec<ProfileIssue> {
        self.profile(name).unwrap_or_default().issues()
    }

    /// Validate every profile in the file.
    ///
    /// Logs one diagnostic per unsatisfied parameter and returns the total.
    /// Zero means every profile is complete and valid.
    #[must_use]
    pub fn check(&self) -> usize {
        let mut errors = 0;
        for name in self.profile_names() {
            for issue in self.check_profile(name) {
                error!("{} for profile {}", issue, name);
                errors += 1;
            }
        }
        if self.document.has_section(DEFAULT_SECTION) {
            debug!("Skipped {} section while checking", DEFAULT_SECTION);
        }
        errors
    }

    /// Atomically replace the configuration file with this configuration
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub fn persist(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(write_error)?;

        // Write next to the target and rename so readers never see a partial file
        let mut file = tempfile::NamedTempFile::new_in(&dir).map_err(write_error)?;
        file.write_all(self.document.to_string().as_bytes())
            .map_err(write_error)?;
        file.as_file().sync_all().map_err(write_error)?;
        file.persist(path).map_err(|e| write_error(e.error))?;

        debug!("Wrote config file {}", path.display());
        Ok(())
    }
}

impl std::fmt::Display for LocalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.document, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests_support::complete_values;
    use crate::profile::IssueKind;

    fn complete_section(name: &str, skip: Option<ParameterId>) -> String {
        let mut out = format!("[{name}]\n");
        for (parameter, value) in complete_values() {
            if Some(parameter) != skip {
                out.push_str(&format!("{} = {}\n", parameter.name(), value));
            }
        }
        out
    }

    #[test]
    fn test_load_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        assert!(LocalConfig::load(&path).unwrap().is_none());
        assert_eq!(LocalConfig::load_or_default(&path).unwrap(), LocalConfig::new());
    }

    #[test]
    fn test_persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config");

        let mut config = LocalConfig::new();
        let overrides = Overrides::new().with(ParameterId::NamePrefix, Some("dev".into()));
        assert!(config.resolve_overrides("default", &overrides).unwrap());
        config.persist(&path).unwrap();

        let loaded = LocalConfig::load(&path).unwrap().unwrap();
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.profile("default").unwrap().get(ParameterId::NamePrefix),
            Some("dev")
        );
    }

    #[test]
    fn test_resolve_overrides_creates_section_without_writing() {
        let mut config = LocalConfig::new();
        assert!(!config.resolve_overrides("fresh", &Overrides::new()).unwrap());
        assert!(config.has_profile("fresh"));
        assert!(config.profile("fresh").unwrap().is_empty());
    }

    #[test]
    fn test_resolve_overrides_is_idempotent() {
        let mut config = LocalConfig::parse(&complete_section("default", None)).unwrap();
        let overrides = Overrides::new()
            .with(ParameterId::TargetCluster, Some("staging".into()))
            .with(ParameterId::NamePrefix, None);

        config.resolve_overrides("default", &overrides).unwrap();
        let once = config.clone();
        config.resolve_overrides("default", &overrides).unwrap();

        assert_eq!(config, once);
        let profile = config.profile("default").unwrap();
        assert_eq!(profile.get(ParameterId::TargetCluster), Some("staging"));
        assert_eq!(profile.get(ParameterId::NamePrefix), Some("dev"));
    }

    #[test]
    fn test_bad_profile_names_never_reach_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        let mut config = LocalConfig::parse(&complete_section("dev", None)).unwrap();
        let overrides = Overrides::new().with(ParameterId::NamePrefix, Some("x".into()));

        for name in ["", " ", " dev", "dev]"] {
            assert!(matches!(
                config.resolve_overrides(name, &overrides),
                Err(ConfigError::Update {
                    source: IniError::InvalidSectionName { .. },
                    ..
                })
            ));
            assert!(config.store_profile(name, &Profile::new()).is_err());
        }
        config.persist(&path).unwrap();

        let loaded = LocalConfig::load(&path).unwrap().unwrap();
        assert_eq!(loaded.profile_names().collect::<Vec<_>>(), vec!["dev"]);
        assert_eq!(loaded.check(), 0);
    }

    #[test]
    fn test_multi_line_values_are_refused_whole() {
        let mut config = LocalConfig::new();
        let mut profile = Profile::new();
        profile.set(ParameterId::NamePrefix, "dev");
        profile.set(ParameterId::TargetCluster, "dev\n# cluster");

        assert!(matches!(
            config.store_profile("default", &profile),
            Err(ConfigError::Update {
                source: IniError::MultiLineValue { .. },
                ..
            })
        ));
        assert!(!config.has_profile("default"));
    }

    #[test]
    fn test_check_counts_each_missing_parameter() {
        let config =
            LocalConfig::parse(&complete_section("default", Some(ParameterId::DynamicZoneId)))
                .unwrap();

        assert_eq!(config.check(), 1);
        let issues = config.check_profile("default");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].parameter, ParameterId::DynamicZoneId);
        assert_eq!(issues[0].kind, IssueKind::Missing);
    }

    #[test]
    fn test_check_skips_default_section_but_uses_its_values() {
        let mut input = String::from("[DEFAULT]\ntarget_cluster = shared\n");
        input.push_str(&complete_section("default", Some(ParameterId::TargetCluster)));
        let config = LocalConfig::parse(&input).unwrap();

        assert_eq!(config.check(), 0);
        assert_eq!(config.profile_names().collect::<Vec<_>>(), vec!["default"]);
    }

    #[test]
    fn test_check_sums_over_profiles() {
        let mut input = complete_section("default", None);
        input.push_str("[broken]\nname_prefix = not_valid!\n");
        let config = LocalConfig::parse(&input).unwrap();

        // every parameter but name_prefix is missing, name_prefix is invalid
        assert_eq!(config.check(), ParameterId::ALL.len());
    }

    #[test]
    fn test_expand_path_leaves_plain_paths_alone() {
        assert_eq!(
            expand_path("/etc/eden/config").unwrap(),
            PathBuf::from("/etc/eden/config")
        );
        assert_eq!(expand_path("~user/config").unwrap(), PathBuf::from("~user/config"));
    }

    #[test]
    fn test_expand_path_uses_home() {
        if let Some(base) = directories::BaseDirs::new() {
            assert_eq!(
                expand_path("~/.eden/config").unwrap(),
                base.home_dir().join(".eden/config")
            );
        }
    }
}
