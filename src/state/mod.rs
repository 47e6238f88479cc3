//! # Remote State
//!
//! Shared table holding profile records and the environment inventory.
//!
//! - `backend`: table operations as a trait
//! - `dynamodb`: DynamoDB implementation
//! - `memory`: in-process implementation
//! - `schema`: item layout
//! - `store`: the store used by commands
//! - `wait`: bounded table activation wait

pub mod backend;
pub mod dynamodb;
pub mod error;
pub mod memory;
pub mod schema;
pub mod store;
pub mod wait;

pub use backend::{BackendError, Item, StateBackend, TableStatus};
pub use dynamodb::DynamoDbBackend;
pub use error::StateError;
pub use memory::InMemoryBackend;
pub use schema::EnvironmentRecord;
pub use store::{EnvironmentListing, RemoteStateStore};
pub use wait::WaitPolicy;
