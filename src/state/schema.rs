//! # State Table Schema
//!
//! Attribute names and item layout shared by every backend.
//!
//! | record      | `type`          | `name`       | extra attributes                        |
//! |-------------|-----------------|--------------|-----------------------------------------|
//! | profile     | `_profile`      | profile name | `profile` (JSON object)                 |
//! | environment | profile name    | env name     | `endpoint`, `last_updated_time`         |
//!
//! Every item also carries `type_name` (`type` followed by `name`) and
//! `last_updated` (decimal seconds), the key of the secondary index.

use crate::constants::PROFILE_RECORD_TYPE;
use crate::state::backend::Item;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

/// Partition key
pub const ATTR_TYPE: &str = "type";
/// Sort key
pub const ATTR_NAME: &str = "name";
/// Secondary index partition key
pub const ATTR_TYPE_NAME: &str = "type_name";
/// Secondary index sort key
pub const ATTR_LAST_UPDATED: &str = "last_updated";
/// JSON-serialized parameters of a profile record
pub const ATTR_PROFILE: &str = "profile";
/// Creation time of an environment record
pub const ATTR_LAST_UPDATED_TIME: &str = "last_updated_time";
/// Endpoint returned by the lifecycle capability
pub const ATTR_ENDPOINT: &str = "endpoint";

/// Name of the secondary index ordered by `last_updated`
pub const INDEX_TYPE_NAME_LAST_UPDATED: &str = "type_name_last_updated_gsi";

/// Key of a record: (`type`, `name`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey {
    pub record_type: String,
    pub name: String,
}

impl RecordKey {
    #[must_use]
    pub fn profile(name: &str) -> Self {
        Self {
            record_type: PROFILE_RECORD_TYPE.to_string(),
            name: name.to_string(),
        }
    }

    #[must_use]
    pub fn environment(profile_name: &str, env_name: &str) -> Self {
        Self {
            record_type: profile_name.to_string(),
            name: env_name.to_string(),
        }
    }

    /// Value of the derived `type_name` attribute
    #[must_use]
    pub fn type_name(&self) -> String {
        format!("{}{}", self.record_type, self.name)
    }

    fn into_item(self, now: DateTime<Utc>) -> Item {
        let mut item = Item::new();
        item.insert(ATTR_TYPE_NAME.to_string(), self.type_name());
        item.insert(ATTR_LAST_UPDATED.to_string(), format_timestamp(now));
        item.insert(ATTR_TYPE.to_string(), self.record_type);
        item.insert(ATTR_NAME.to_string(), self.name);
        item
    }
}

/// Seconds since the epoch as a decimal string with microsecond precision
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    format!("{}.{:06}", at.timestamp(), at.timestamp_subsec_micros())
}

/// Parse a decimal-seconds timestamp written by any eden release
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let (secs, fraction) = match value.trim().split_once('.') {
        Some((secs, fraction)) => (secs, fraction),
        None => (value.trim(), ""),
    };
    let secs: i64 = secs.parse().ok()?;

    let digits: String = fraction.chars().take(9).collect();
    let nanos: u32 = if digits.is_empty() {
        0
    } else {
        let parsed: u32 = digits.parse().ok()?;
        let scale = 10u32.pow(9 - u32::try_from(digits.len()).ok()?);
        parsed * scale
    };

    Utc.timestamp_opt(secs, nanos).single()
}

/// Build the item of a profile record
#[must_use]
pub fn profile_item(name: &str, profile_json: String, now: DateTime<Utc>) -> Item {
    let mut item = RecordKey::profile(name).into_item(now);
    item.insert(ATTR_PROFILE.to_string(), profile_json);
    item
}

/// Build the item of an environment record
#[must_use]
pub fn environment_item(
    profile_name: &str,
    env_name: &str,
    endpoint: &str,
    now: DateTime<Utc>,
) -> Item {
    let mut item = RecordKey::environment(profile_name, env_name).into_item(now);
    item.insert(ATTR_LAST_UPDATED_TIME.to_string(), format_timestamp(now));
    item.insert(ATTR_ENDPOINT.to_string(), endpoint.to_string());
    item
}

/// One deployed environment as listed by `eden ls`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentRecord {
    pub profile_name: String,
    pub name: String,
    pub endpoint: Option<String>,
    pub last_updated_time: Option<String>,
}

impl EnvironmentRecord {
    /// Convert a scanned item; returns `None` for items without a key
    #[must_use]
    pub fn from_item(item: &Item) -> Option<Self> {
        let profile_name = item.get(ATTR_TYPE)?.clone();
        let name = item.get(ATTR_NAME)?.clone();
        // Older releases only wrote `last_updated`
        let last_updated_time = item
            .get(ATTR_LAST_UPDATED_TIME)
            .or_else(|| item.get(ATTR_LAST_UPDATED))
            .cloned();

        Some(Self {
            profile_name,
            name,
            endpoint: item.get(ATTR_ENDPOINT).cloned(),
            last_updated_time,
        })
    }

    /// Parsed `last_updated_time`, when present and well-formed
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated_time.as_deref().and_then(parse_timestamp)
    }
}
