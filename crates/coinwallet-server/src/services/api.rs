//! Service contracts shared by the in-process implementations and the
//! remote clients.

use async_trait::async_trait;

use coinwallet_core::error::Result;
use coinwallet_core::protocol::{
    BalanceRequest, BalanceResponse, Envelope, PriceRequest, PriceResponse, ResolveUserRequest,
    UserInfo,
};

use crate::context::CallContext;
use crate::realtime::WatchStream;

#[async_trait]
pub trait AccountApi: Send + Sync {
    async fn resolve_user(
        &self,
        ctx: &CallContext,
        req: Envelope<ResolveUserRequest>,
    ) -> Result<Envelope<UserInfo>>;
}

#[async_trait]
pub trait PriceApi: Send + Sync {
    async fn fetch_price(
        &self,
        ctx: &CallContext,
        req: Envelope<PriceRequest>,
    ) -> Result<Envelope<PriceResponse>>;

    /// Open a price stream. The returned stream is cancelled with `ctx`.
    async fn watch_price(
        &self,
        ctx: &CallContext,
        req: Envelope<PriceRequest>,
    ) -> Result<Envelope<WatchStream<PriceResponse>>>;
}

#[async_trait]
pub trait WalletApi: Send + Sync {
    async fn fetch_balance(
        &self,
        ctx: &CallContext,
        req: Envelope<BalanceRequest>,
    ) -> Result<Envelope<BalanceResponse>>;

    async fn watch_balance(
        &self,
        ctx: &CallContext,
        req: Envelope<BalanceRequest>,
    ) -> Result<Envelope<WatchStream<BalanceResponse>>>;
}
