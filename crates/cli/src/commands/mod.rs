pub mod config_cmd;
pub mod examples;
pub mod run;

use miniagent_config::{AppConfig, ConfigError};
use std::path::Path;

/// Load config from `path` if given, otherwise from the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    }
}
