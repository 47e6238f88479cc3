//! # Profiles
//!
//! - `parameter`: the fixed parameter catalog and validators
//! - `model`: partial profiles, command-line overrides, validation issues
//! - `resolve`: strict resolution into the lifecycle capability's input

pub mod model;
pub mod parameter;
pub mod resolve;

pub use model::{satisfies, IssueKind, Overrides, Profile, ProfileIssue};
pub use parameter::{Parameter, ParameterId, PARAMETERS};
pub use resolve::{resolve, resolve_profile, ResolveError, ResolvedProfile};
