//! Listing output for `eden ls` and `eden config ls`.

use crate::state::EnvironmentListing;
use chrono::SecondsFormat;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Environments grouped by profile, one line per environment
#[must_use]
pub fn format_environments(environments: &EnvironmentListing) -> String {
    let mut out = String::new();
    for (profile_name, records) in environments {
        let _ = writeln!(out, "Profile {profile_name}:");
        for record in records {
            let endpoint = record.endpoint.as_deref().unwrap_or("-");
            let last_updated = record.last_updated().map_or_else(
                || "unknown".to_string(),
                |at| at.to_rfc3339_opts(SecondsFormat::Secs, true),
            );
            let _ = writeln!(
                out,
                "{} {} (last updated: {})",
                record.name, endpoint, last_updated
            );
        }
        let _ = writeln!(out);
    }
    out
}

/// Remote profiles with their `key = value` pairs
#[must_use]
pub fn format_profiles(profiles: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (profile_name, raw) in profiles {
        let _ = writeln!(out, "Profile {profile_name}:");
        match serde_json::from_str::<BTreeMap<String, String>>(raw) {
            Ok(values) => {
                for (key, value) in values {
                    let _ = writeln!(out, "{key} = {value}");
                }
            }
            Err(e) => {
                let _ = writeln!(out, "<unreadable profile: {e}>");
            }
        }
        let _ = writeln!(out);
    }
    out
}
