use std::path::Path;

use anyhow::{bail, Context, Result};

use unitunes_core::Config;

use crate::DEFAULT_CONFIG_FILE;

/// Write a default configuration into `directory` and create its playlist directory.
pub fn run(directory: &Path) -> Result<()> {
    let config_path = directory.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() {
        bail!("Already initialized: {:?} exists", config_path);
    }

    let config = Config::default();
    std::fs::create_dir_all(directory.join(&config.library.playlist_dir))
        .with_context(|| format!("Failed to create playlist directory in {:?}", directory))?;

    let toml = toml::to_string_pretty(&config).context("Failed to serialize configuration")?;
    std::fs::write(&config_path, toml)
        .with_context(|| format!("Failed to write {:?}", config_path))?;

    println!("Initialized {:?}", config_path);
    Ok(())
}
