//! Server config loader (strict parsing).

pub mod schema;

use std::fs;

use coinwallet_core::error::{Result, WalletError};

pub use schema::{PriceSection, Role, ServerConfig, ServerSection, UpstreamSection, WalletSection};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "COINWALLET_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "coinwallet.yaml";

pub fn config_path() -> String {
    std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

pub fn load_from_file(path: &str) -> Result<ServerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| WalletError::InvalidArgument(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let cfg: ServerConfig = serde_yaml::from_str(s)
        .map_err(|e| WalletError::InvalidArgument(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
