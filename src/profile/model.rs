//! # Profile Model
//!
//! Strongly typed profiles: a mapping from [`ParameterId`] to string values.
//!
//! A [`Profile`] may be partial. Partial profiles are fine to store locally or
//! remotely, but only a complete one can be turned into a
//! [`ResolvedProfile`](crate::profile::ResolvedProfile).

use crate::profile::parameter::ParameterId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Why a parameter is not satisfied by a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// Key is not present at all
    Missing,
    /// Key is present but holds no value
    Empty,
    /// Value does not pass the parameter's validator
    Invalid,
}

/// One unsatisfied parameter of a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileIssue {
    pub parameter: ParameterId,
    pub kind: IssueKind,
}

impl fmt::Display for ProfileIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IssueKind::Missing => write!(f, "Necessary key {} is not provided", self.parameter),
            IssueKind::Empty => write!(f, "Necessary key {} is empty", self.parameter),
            IssueKind::Invalid => write!(f, "Validation failed for key {}", self.parameter),
        }
    }
}

/// Check a single candidate value against the schema.
///
/// This is the one rule shared by `config check`, `config push` and envvar
/// resolution: satisfied iff present, non-empty and valid.
pub fn satisfies(parameter: ParameterId, value: Option<&str>) -> Result<&str, IssueKind> {
    match value {
        None => Err(IssueKind::Missing),
        Some("") => Err(IssueKind::Empty),
        Some(v) if !parameter.parameter().validate(v) => Err(IssueKind::Invalid),
        Some(v) => Ok(v),
    }
}

/// A named-by-context set of parameter values, possibly partial
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Profile {
    values: BTreeMap<ParameterId, String>,
}

impl Profile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, parameter: ParameterId) -> Option<&str> {
        self.values.get(&parameter).map(String::as_str)
    }

    /// Set a value, returning the previous one
    pub fn set(&mut self, parameter: ParameterId, value: impl Into<String>) -> Option<String> {
        self.values.insert(parameter, value.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParameterId, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Every unsatisfied parameter, in catalog order
    #[must_use]
    pub fn issues(&self) -> Vec<ProfileIssue> {
        ParameterId::ALL
            .into_iter()
            .filter_map(|parameter| {
                satisfies(parameter, self.get(parameter))
                    .err()
                    .map(|kind| ProfileIssue { parameter, kind })
            })
            .collect()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.issues().is_empty()
    }

    /// Serialize as a flat JSON object keyed by configuration key
    #[allow(
        clippy::missing_errors_doc,
        reason = "Serialization of a string map cannot fail in practice"
    )]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a flat JSON object of string values.
    ///
    /// Keys that are not part of the schema are skipped with a warning so that
    /// profiles pushed by a newer eden remain readable.
    #[allow(
        clippy::missing_errors_doc,
        reason = "Fails when the input is not a JSON object of strings"
    )]
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;
        let mut profile = Profile::new();
        for (key, value) in raw {
            match ParameterId::from_name(&key) {
                Some(parameter) => {
                    profile.set(parameter, value);
                }
                None => warn!("Ignoring unknown parameter {} in profile", key),
            }
        }
        Ok(profile)
    }
}

impl FromIterator<(ParameterId, String)> for Profile {
    fn from_iter<I: IntoIterator<Item = (ParameterId, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Parameter values supplied on the command line.
///
/// Only non-null values are kept: a flag that was not given, or given an empty
/// string, never overrides anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    values: BTreeMap<ParameterId, String>,
}

impl Overrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value unless it is null
    #[must_use]
    pub fn with(mut self, parameter: ParameterId, value: Option<String>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.values.insert(parameter, value);
        }
        self
    }

    #[must_use]
    pub fn get(&self, parameter: ParameterId) -> Option<&str> {
        self.values.get(&parameter).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParameterId, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<&Profile> for Overrides {
    fn from(profile: &Profile) -> Self {
        Self {
            values: profile.values.clone(),
        }
    }
}

impl FromIterator<(ParameterId, Option<String>)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (ParameterId, Option<String>)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Overrides::new(), |acc, (parameter, value)| acc.with(parameter, value))
    }
}
