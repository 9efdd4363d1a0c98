//! In-process wiring of the account → price → wallet chain.

#![allow(dead_code)]

use std::sync::Arc;

use coinwallet_core::protocol::{BalanceRequest, Envelope, Metadata};
use coinwallet_core::{
    BalanceAggregator, FixedPriceFeed, PriceFeed, StaticIdentityStore, StaticLedger, Tier,
};
use coinwallet_server::obs::ServiceMetrics;
use coinwallet_server::policy::MembershipValidator;
use coinwallet_server::services::{AccountApi, AccountResolver, PriceApi, PriceService, WalletService};

pub const ALICE: &str = "2bd806c9";
pub const BOB: &str = "81b637d8";

pub struct Chain {
    pub accounts: Arc<dyn AccountApi>,
    pub price: Arc<PriceService>,
    pub wallet: Arc<WalletService>,
    pub metrics: Arc<ServiceMetrics>,
}

pub struct ChainOpts {
    pub feed: Arc<dyn PriceFeed>,
    pub premium_only: bool,
    pub v1_behavior: bool,
}

impl Default for ChainOpts {
    fn default() -> Self {
        Self {
            feed: Arc::new(FixedPriceFeed(10_000)),
            premium_only: false,
            v1_behavior: false,
        }
    }
}

pub fn chain(opts: ChainOpts) -> Chain {
    let metrics = Arc::new(ServiceMetrics::default());
    let accounts: Arc<dyn AccountApi> = Arc::new(AccountResolver::new(
        Arc::new(StaticIdentityStore::seeded()),
        "account-0",
    ));
    let price = Arc::new(PriceService::new(
        MembershipValidator::new(Arc::clone(&accounts), Arc::clone(&metrics)),
        opts.feed,
        opts.premium_only,
        "price-0",
        Arc::clone(&metrics),
    ));
    let wallet = wallet_over(Arc::clone(&accounts), price.clone(), opts.v1_behavior, &metrics);
    Chain {
        accounts,
        price,
        wallet,
        metrics,
    }
}

pub fn wallet_over(
    accounts: Arc<dyn AccountApi>,
    price: Arc<dyn PriceApi>,
    v1_behavior: bool,
    metrics: &Arc<ServiceMetrics>,
) -> Arc<WalletService> {
    Arc::new(WalletService::new(
        MembershipValidator::new(accounts, Arc::clone(metrics)),
        price,
        BalanceAggregator::new(Arc::new(StaticLedger::seeded()), v1_behavior),
        "wallet-0",
        Arc::clone(metrics),
    ))
}

pub fn balance_req(token: &str, tier: Tier, include: bool) -> Envelope<BalanceRequest> {
    Envelope::with_metadata(
        BalanceRequest {
            include_balance_per_address: include,
        },
        Metadata::credentials(token, tier),
    )
}
