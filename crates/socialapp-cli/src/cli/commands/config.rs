//! Config command handlers.

use anyhow::{Context, Result};
use socialapp_core::{api, config};

pub fn path() {
    println!("{}", config::paths::config_path().display());
}

pub fn init() -> Result<()> {
    let config_path = config::paths::config_path();
    config::Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}

pub fn set_url(url: &str) -> Result<()> {
    let url = url.trim();
    api::validate_base_url(url)?;
    config::Config::save_base_url(url)?;
    println!("Saved base URL {url}");
    Ok(())
}
