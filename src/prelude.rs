//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ## Usage
//!
//! ```rust
//! use eden::prelude::*;
//! ```
//!
//! This brings into scope:
//! - Profile types (Profile, Overrides, ParameterId, ResolvedProfile)
//! - Local configuration (LocalConfig, Settings)
//! - Remote state (RemoteStateStore, StateBackend and its implementations, WaitPolicy)
//! - The lifecycle capability trait
//! - Common error types

// Profile types
pub use crate::profile::{
    resolve, Overrides, ParameterId, Profile, ProfileIssue, ResolveError, ResolvedProfile,
};

// Local configuration
pub use crate::config::{ConfigError, LocalConfig, Settings};

// Remote state
pub use crate::state::{
    DynamoDbBackend, EnvironmentListing, EnvironmentRecord, InMemoryBackend, RemoteStateStore,
    StateBackend, StateError, WaitPolicy,
};

// Lifecycle capability
pub use crate::lifecycle::{
    CreatedEnvironment, DeletedEnvironment, EnvironmentLifecycle, LifecycleError,
};

// Command orchestration
pub use crate::commands::{CommandError, Invocation};
