//! # Constants
//!
//! Shared constants used throughout eden.
//!
//! These values represent reasonable defaults and can be overridden via
//! command-line flags or `EDEN_*` environment variables where applicable.

/// Default name of the shared DynamoDB state table
pub const DEFAULT_TABLE_NAME: &str = "eden";

/// Default profile used when `--profile` is not given
pub const DEFAULT_PROFILE_NAME: &str = "default";

/// Default location of the local configuration file (`~` is expanded)
pub const DEFAULT_CONFIG_PATH: &str = "~/.eden/config";

/// Reserved INI section whose values act as fallbacks for every profile
/// and which is never validated as a profile of its own
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Partition key value reserved for profile records in the state table.
/// Environment records may never use it as their `type`.
pub const PROFILE_RECORD_TYPE: &str = "_profile";

/// Default interval between `DescribeTable` polls while a table is being created (milliseconds)
pub const DEFAULT_TABLE_POLL_INTERVAL_MS: u64 = 500;

/// Default upper bound on waiting for a table to become ACTIVE (seconds)
pub const DEFAULT_TABLE_WAIT_TIMEOUT_SECS: u64 = 300;

/// Default executable implementing the environment create/delete capability
pub const DEFAULT_LIFECYCLE_COMMAND: &str = "eden-core";
