//! `miniagent config` — Show the effective configuration.

use miniagent_config::AppConfig;
use std::path::Path;

pub fn show(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(path).map_err(|e| format!("Failed to load config: {e}"))?;

    let source = match path {
        Some(path) => path.to_path_buf(),
        None => AppConfig::config_dir().join("config.toml"),
    };
    println!("# Config file: {}", source.display());
    if !config.has_api_key() {
        println!("# Warning: no API key configured");
    }
    println!();
    println!("{}", config.to_redacted_toml());
    Ok(())
}
