//! Configuration module for Fakio
//!
//! This module provides configuration types and parsing for the client.

mod client;
mod credentials;
mod transport;

pub use client::{ClientConfig, Config};
pub use credentials::Credentials;
pub use transport::TcpConfig;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = expand_tilde_path(path.as_ref());
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    parse_config(&content)
}

/// Parse configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config =
        toml::from_str(content).with_context(|| "Failed to parse configuration")?;
    config
        .client
        .validate()
        .context("Invalid configuration")?;
    Ok(config)
}

/// Expand a leading `~/` to the current user's home directory
pub fn expand_tilde_path(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
