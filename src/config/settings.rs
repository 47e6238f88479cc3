//! # Runtime Settings
//!
//! Process-level settings loaded from `EDEN_*` environment variables.
//!
//! Profile parameters never live here: they come from the configuration file
//! and command-line flags. These settings tune how eden talks to AWS and how
//! long it is willing to wait.

use crate::state::WaitPolicy;
use std::time::Duration;

/// Runtime settings
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Interval between `DescribeTable` polls while the state table is being created (milliseconds)
    pub table_poll_interval_ms: u64,
    /// Upper bound on waiting for the state table to become ACTIVE (seconds)
    pub table_wait_timeout_secs: u64,
    /// Optional cap on the number of `DescribeTable` polls
    pub table_wait_max_attempts: Option<u32>,
    /// DynamoDB endpoint override (LocalStack, DynamoDB Local)
    pub dynamodb_endpoint: Option<String>,
    /// AWS region override; the SDK default chain is used when unset
    pub aws_region: Option<String>,
    /// Per-operation timeout for DynamoDB calls (milliseconds)
    pub remote_timeout_ms: Option<u64>,
    /// Executable implementing environment create/delete
    pub lifecycle_command: String,
    /// Enable ANSI colors in log output
    pub log_color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            table_poll_interval_ms: DEFAULT_TABLE_POLL_INTERVAL_MS,
            table_wait_timeout_secs: DEFAULT_TABLE_WAIT_TIMEOUT_SECS,
            table_wait_max_attempts: None,
            dynamodb_endpoint: None,
            aws_region: None,
            remote_timeout_ms: None,
            lifecycle_command: DEFAULT_LIFECYCLE_COMMAND.to_string(),
            log_color: false,
        }
    }
}

impl Settings {
    /// Load settings from the process environment with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        use crate::constants::*;
        Self {
            table_poll_interval_ms: var_or_default(
                &lookup,
                "EDEN_TABLE_POLL_INTERVAL_MS",
                DEFAULT_TABLE_POLL_INTERVAL_MS,
            ),
            table_wait_timeout_secs: var_or_default(
                &lookup,
                "EDEN_TABLE_WAIT_TIMEOUT_SECS",
                DEFAULT_TABLE_WAIT_TIMEOUT_SECS,
            ),
            table_wait_max_attempts: var_parsed(&lookup, "EDEN_TABLE_WAIT_MAX_ATTEMPTS"),
            dynamodb_endpoint: var_non_empty(&lookup, "EDEN_DYNAMODB_ENDPOINT"),
            aws_region: var_non_empty(&lookup, "EDEN_AWS_REGION"),
            remote_timeout_ms: var_parsed(&lookup, "EDEN_REMOTE_TIMEOUT_MS"),
            lifecycle_command: var_non_empty(&lookup, "EDEN_LIFECYCLE_COMMAND")
                .unwrap_or_else(|| DEFAULT_LIFECYCLE_COMMAND.to_string()),
            log_color: var_or_default_bool(&lookup, "EDEN_LOG_COLOR", false),
        }
    }

    /// Get table poll interval duration
    #[must_use]
    pub fn table_poll_interval(&self) -> Duration {
        Duration::from_millis(self.table_poll_interval_ms)
    }

    /// Get table wait timeout duration
    #[must_use]
    pub fn table_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.table_wait_timeout_secs)
    }

    /// Wait policy for table activation, optionally with a caller-supplied timeout
    #[must_use]
    pub fn wait_policy(&self, timeout_override_secs: Option<u64>) -> WaitPolicy {
        let timeout = timeout_override_secs.map_or_else(|| self.table_wait_timeout(), Duration::from_secs);
        let policy = WaitPolicy::new(self.table_poll_interval(), timeout);
        match self.table_wait_max_attempts {
            Some(attempts) => policy.with_max_attempts(attempts),
            None => policy,
        }
    }
}

/// Read variable or return default value
fn var_or_default<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    var_parsed(lookup, key).unwrap_or(default)
}

/// Read variable and parse it; unparsable values count as unset
fn var_parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

/// Read variable as boolean or return default
fn var_or_default_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    lookup(key)
        .map(|v| {
            let v_lower = v.to_lowercase();
            v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
        })
        .unwrap_or(default)
}

/// Read variable as string, treating empty values as unset
fn var_non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}
