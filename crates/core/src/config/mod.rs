//! Settings for every component, read from `unitunes.toml`.
//!
//! Each section falls back to its defaults when absent, and `UNITUNES_`
//! environment variables override file values.

mod loader;
mod types;
mod validate;

pub use loader::{load_config, load_config_from_str, load_default_config};
pub use types::*;
pub use validate::validate_config;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file {0} does not exist")]
    FileNotFound(String),

    #[error("Invalid config: {0}")]
    ParseError(String),

    #[error("Config rejected: {0}")]
    ValidationError(String),
}
