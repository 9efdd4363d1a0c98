use std::net::SocketAddr;

use serde::Deserialize;

use coinwallet_core::error::{Result, WalletError};

/// Which of the three services this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Account,
    Price,
    Wallet,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Account => "account",
            Role::Price => "price",
            Role::Wallet => "wallet",
        }
    }

    fn needs_account(self) -> bool {
        matches!(self, Role::Price | Role::Wallet)
    }

    fn needs_price(self) -> bool {
        matches!(self, Role::Wallet)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    pub role: Role,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub upstream: UpstreamSection,

    #[serde(default)]
    pub price: PriceSection,

    #[serde(default)]
    pub wallet: WalletSection,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(WalletError::InvalidArgument(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.upstream.validate(self.role)?;

        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.server.listen.parse().map_err(|e| {
            WalletError::InvalidArgument(format!("server.listen must be a socket address: {e}"))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Appended to the instance hostname as `<host>_<suffix>`.
    #[serde(default)]
    pub hostname_suffix: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            hostname_suffix: String::new(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen.parse::<SocketAddr>().map_err(|e| {
            WalletError::InvalidArgument(format!("server.listen must be a socket address: {e}"))
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamSection {
    #[serde(default = "default_account_server")]
    pub account_server: String,

    #[serde(default = "default_price_server")]
    pub price_server: String,

    #[serde(default = "default_dial_timeout_ms")]
    pub dial_timeout_ms: u64,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            account_server: default_account_server(),
            price_server: default_price_server(),
            dial_timeout_ms: default_dial_timeout_ms(),
        }
    }
}

impl UpstreamSection {
    pub fn validate(&self, role: Role) -> Result<()> {
        if !(100..=60000).contains(&self.dial_timeout_ms) {
            return Err(WalletError::InvalidArgument(
                "upstream.dial_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        if role.needs_account() {
            check_url("upstream.account_server", &self.account_server)?;
        }
        if role.needs_price() {
            check_url("upstream.price_server", &self.price_server)?;
        }
        Ok(())
    }
}

fn check_url(field: &str, url: &str) -> Result<()> {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(WalletError::InvalidArgument(format!(
            "{field} must be an http:// or https:// url"
        ))),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PriceSection {
    /// Reject callers whose validated tier is not premium.
    #[serde(default)]
    pub premium_only: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WalletSection {
    /// Never report per-address balances.
    #[serde(default)]
    pub v1_behavior: bool,
}

fn default_listen() -> String {
    "0.0.0.0:18881".into()
}
fn default_account_server() -> String {
    "http://localhost:18883".into()
}
fn default_price_server() -> String {
    "http://localhost:18882".into()
}
fn default_dial_timeout_ms() -> u64 {
    5000
}
