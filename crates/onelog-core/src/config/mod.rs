//! Configuration sources
//!
//! Supports:
//! - YAML files (user level `~/.config/onelog/config.yaml`, or workspace level)
//! - Environment overrides (`ONELOG_BACKEND`, `ONELOG_METHODS`,
//!   `ONELOG_LOG_FILE`, `ONELOG_LOG_LEVEL`)

mod traits;
mod file;

pub use traits::{ConfigError, ConfigResult};
pub use file::{
    ConsoleConfig, FileSettings, OnelogConfig, BACKEND_ENV, DEFAULT_BACKEND, METHODS_ENV,
};
