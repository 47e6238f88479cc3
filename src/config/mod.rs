//! # Configuration
//!
//! - `ini`: the sectioned file format
//! - `local`: the Local Profile Store built on it
//! - `settings`: runtime settings from `EDEN_*` environment variables

pub mod ini;
pub mod local;
pub mod settings;

pub use ini::{IniDocument, IniError};
pub use local::{expand_path, ConfigError, LocalConfig};
pub use settings::Settings;
