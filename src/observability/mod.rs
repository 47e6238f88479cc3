//! # Observability
//!
//! - `logging`: tracing subscriber setup

pub mod logging;

pub use logging::{filter_directives, init_logging};
