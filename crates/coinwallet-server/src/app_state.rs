//! Shared application state for one coinwallet process.
//!
//! A process serves exactly one of the three services. `AppState::new`
//! builds it from config, dialing remote upstreams as the role requires;
//! `AppState::serving` wires an already-built service (used by tests and
//! in-process setups).

use std::sync::Arc;

use tokio::time::Duration;

use coinwallet_core::error::{Result, WalletError};
use coinwallet_core::{BalanceAggregator, SineWaveFeed, StaticIdentityStore, StaticLedger};

use crate::config::{Role, ServerConfig};
use crate::host;
use crate::obs::ServiceMetrics;
use crate::policy::MembershipValidator;
use crate::services::{
    AccountApi, AccountResolver, PriceApi, PriceService, WalletApi, WalletService,
};
use crate::transport::client::{RemoteAccountClient, RemotePriceClient};

/// The service a process answers for.
#[derive(Clone)]
pub enum Served {
    Account(Arc<dyn AccountApi>),
    Price(Arc<dyn PriceApi>),
    Wallet(Arc<dyn WalletApi>),
}

impl Served {
    pub fn role(&self) -> Role {
        match self {
            Served::Account(_) => Role::Account,
            Served::Price(_) => Role::Price,
            Served::Wallet(_) => Role::Wallet,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    hostname: String,
    metrics: Arc<ServiceMetrics>,
    served: Served,
}

impl AppState {
    /// Build the configured service. Returns Result so startup errors reach
    /// main instead of panicking.
    pub fn new(cfg: &ServerConfig) -> Result<Self> {
        let hostname = host::instance_hostname(&cfg.server.hostname_suffix);
        let metrics = Arc::new(ServiceMetrics::default());
        let dial = Duration::from_millis(cfg.upstream.dial_timeout_ms);

        let served = match cfg.role {
            Role::Account => Served::Account(Arc::new(AccountResolver::new(
                Arc::new(StaticIdentityStore::seeded()),
                &hostname,
            ))),
            Role::Price => {
                let accounts = Arc::new(RemoteAccountClient::new(&cfg.upstream.account_server, dial)?);
                Served::Price(Arc::new(PriceService::new(
                    MembershipValidator::new(accounts, Arc::clone(&metrics)),
                    Arc::new(SineWaveFeed),
                    cfg.price.premium_only,
                    &hostname,
                    Arc::clone(&metrics),
                )))
            }
            Role::Wallet => {
                let accounts = Arc::new(RemoteAccountClient::new(&cfg.upstream.account_server, dial)?);
                let prices = Arc::new(RemotePriceClient::new(&cfg.upstream.price_server, dial)?);
                Served::Wallet(Arc::new(WalletService::new(
                    MembershipValidator::new(accounts, Arc::clone(&metrics)),
                    prices,
                    BalanceAggregator::new(Arc::new(StaticLedger::seeded()), cfg.wallet.v1_behavior),
                    &hostname,
                    Arc::clone(&metrics),
                )))
            }
        };

        tracing::info!(role = cfg.role.as_str(), %hostname, "service built");
        Ok(Self::serving(hostname, metrics, served))
    }

    pub fn serving(hostname: impl Into<String>, metrics: Arc<ServiceMetrics>, served: Served) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                hostname: hostname.into(),
                metrics,
                served,
            }),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.inner.hostname
    }

    pub fn metrics(&self) -> Arc<ServiceMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    pub fn served(&self) -> &Served {
        &self.inner.served
    }

    pub fn account(&self) -> Result<Arc<dyn AccountApi>> {
        match &self.inner.served {
            Served::Account(svc) => Ok(Arc::clone(svc)),
            other => Err(not_served("account", other.role())),
        }
    }

    pub fn price(&self) -> Result<Arc<dyn PriceApi>> {
        match &self.inner.served {
            Served::Price(svc) => Ok(Arc::clone(svc)),
            other => Err(not_served("price", other.role())),
        }
    }

    pub fn wallet(&self) -> Result<Arc<dyn WalletApi>> {
        match &self.inner.served {
            Served::Wallet(svc) => Ok(Arc::clone(svc)),
            other => Err(not_served("wallet", other.role())),
        }
    }
}

fn not_served(wanted: &str, role: Role) -> WalletError {
    WalletError::Unavailable(format!(
        "{wanted} service is not served here (role {})",
        role.as_str()
    ))
}
