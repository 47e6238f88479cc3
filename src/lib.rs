//! eden Library
//!
//! Profile resolution and remote state for the ECS Dynamic Environment Manager.
//! Tests are included in the module files and under `tests/`.
//!
//! ## Quick Start
//!
//! ```rust
//! use eden::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific imports,
//! use the individual modules.

pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod lifecycle;
pub mod observability;
pub mod prelude;
pub mod profile;
pub mod state;
