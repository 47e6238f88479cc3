//! # Envvar Resolution
//!
//! Turns a stored profile plus command-line overrides into the exact variable
//! set handed to the environment lifecycle capability.
//!
//! Resolution is all-or-nothing: one unsatisfied parameter aborts the whole
//! call, so no mutating external call is ever made with a partial profile.

use crate::config::LocalConfig;
use crate::profile::model::{satisfies, IssueKind, Overrides, Profile};
use crate::profile::parameter::ParameterId;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error(
        "Necessary parameter {parameter} not found in profile {profile} and is not provided as an argument"
    )]
    MissingParameter {
        parameter: ParameterId,
        profile: String,
    },
    #[error("Necessary parameter {parameter} is empty in profile {profile}")]
    EmptyParameter {
        parameter: ParameterId,
        profile: String,
    },
    #[error("Validation failed for parameter {parameter} of profile {profile}")]
    InvalidParameter {
        parameter: ParameterId,
        profile: String,
    },
}

impl ResolveError {
    /// The parameter that stopped resolution
    #[must_use]
    pub fn parameter(&self) -> ParameterId {
        match self {
            ResolveError::MissingParameter { parameter, .. }
            | ResolveError::EmptyParameter { parameter, .. }
            | ResolveError::InvalidParameter { parameter, .. } => *parameter,
        }
    }
}

/// A profile in which every schema parameter is satisfied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProfile {
    name: String,
    values: BTreeMap<ParameterId, String>,
}

impl ResolvedProfile {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of a parameter; always present in a resolved profile
    #[must_use]
    pub fn get(&self, parameter: ParameterId) -> &str {
        self.values
            .get(&parameter)
            .map_or("", String::as_str)
    }

    /// Mapping of envvar name to value, as consumed by the lifecycle capability
    #[must_use]
    pub fn variables(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(parameter, value)| {
                (
                    parameter.parameter().envvar_name.to_string(),
                    value.clone(),
                )
            })
            .collect()
    }
}

/// Resolve `profile_name` from the local configuration, preferring overrides
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn resolve(
    profile_name: &str,
    overrides: &Overrides,
    config: &LocalConfig,
) -> Result<ResolvedProfile, ResolveError> {
    let stored = config.profile(profile_name).unwrap_or_default();
    resolve_profile(profile_name, overrides, &stored)
}

/// Resolve against an already loaded profile.
///
/// For every parameter a non-null override wins, otherwise the stored value is
/// used. The first unsatisfied parameter (in catalog order) is reported.
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn resolve_profile(
    profile_name: &str,
    overrides: &Overrides,
    stored: &Profile,
) -> Result<ResolvedProfile, ResolveError> {
    let mut values = BTreeMap::new();

    for parameter in ParameterId::ALL {
        let candidate = overrides
            .get(parameter)
            .or_else(|| stored.get(parameter));

        let value = satisfies(parameter, candidate).map_err(|kind| {
            let profile = profile_name.to_string();
            match kind {
                IssueKind::Missing => ResolveError::MissingParameter { parameter, profile },
                IssueKind::Empty => ResolveError::EmptyParameter { parameter, profile },
                IssueKind::Invalid => ResolveError::InvalidParameter { parameter, profile },
            }
        })?;

        values.insert(parameter, value.to_string());
    }

    Ok(ResolvedProfile {
        name: profile_name.to_string(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests_support::complete_values;

    fn stored() -> Profile {
        complete_values().into_iter().collect()
    }

    #[test]
    fn test_resolves_complete_profile() {
        let resolved = resolve_profile("default", &Overrides::new(), &stored()).unwrap();
        let variables = resolved.variables();

        assert_eq!(variables.len(), ParameterId::ALL.len());
        assert_eq!(variables["NAME_PREFIX"], "dev");
        assert_eq!(variables["TARGET_CLUSTER"], "dev");
        assert_eq!(resolved.name(), "default");
    }

    #[test]
    fn test_override_wins_over_stored_value() {
        let overrides = Overrides::new().with(ParameterId::TargetCluster, Some("staging".into()));
        let resolved = resolve_profile("default", &overrides, &stored()).unwrap();

        assert_eq!(resolved.get(ParameterId::TargetCluster), "staging");
        assert_eq!(resolved.variables()["TARGET_CLUSTER"], "staging");
    }

    #[test]
    fn test_overrides_alone_can_satisfy_everything() {
        let overrides: Overrides = complete_values()
            .into_iter()
            .map(|(parameter, value)| (parameter, Some(value)))
            .collect();

        let resolved = resolve_profile("scratch", &overrides, &Profile::new()).unwrap();
        for (parameter, value) in complete_values() {
            assert_eq!(resolved.get(parameter), value);
        }
    }

    #[test]
    fn test_single_missing_parameter_aborts() {
        let mut profile = Profile::new();
        for (parameter, value) in complete_values() {
            if parameter != ParameterId::MasterAlbArn {
                profile.set(parameter, value);
            }
        }

        let err = resolve_profile("default", &Overrides::new(), &profile).unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingParameter {
                parameter: ParameterId::MasterAlbArn,
                profile: "default".to_string(),
            }
        );
        assert!(err.to_string().contains("master_alb_arn"));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let overrides =
            Overrides::new().with(ParameterId::ReferenceServiceArn, Some("not-an-arn".into()));
        let err = resolve_profile("default", &overrides, &stored()).unwrap_err();

        assert_eq!(err.parameter(), ParameterId::ReferenceServiceArn);
        assert!(matches!(err, ResolveError::InvalidParameter { .. }));
    }

    #[test]
    fn test_empty_stored_value_is_reported() {
        let mut profile = stored();
        profile.set(ParameterId::ConfigBucketKey, "");

        let err = resolve_profile("default", &Overrides::new(), &profile).unwrap_err();
        assert!(matches!(err, ResolveError::EmptyParameter { .. }));
    }
}
