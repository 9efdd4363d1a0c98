//! Wallet service: validates the caller, pulls prices from the price
//! service with the caller's credentials, and turns each price into a
//! balance.

use std::sync::Arc;

use async_trait::async_trait;

use coinwallet_core::error::Result;
use coinwallet_core::protocol::{BalanceRequest, BalanceResponse, Envelope, PriceRequest};
use coinwallet_core::BalanceAggregator;

use crate::context::CallContext;
use crate::obs::{log_upstream_host, ServiceMetrics};
use crate::policy::MembershipValidator;
use crate::realtime::{StreamEnd, WatchStream};

use super::{PriceApi, WalletApi};

pub struct WalletService {
    validator: MembershipValidator,
    price: Arc<dyn PriceApi>,
    aggregator: Arc<BalanceAggregator>,
    hostname: String,
    metrics: Arc<ServiceMetrics>,
}

impl WalletService {
    pub fn new(
        validator: MembershipValidator,
        price: Arc<dyn PriceApi>,
        aggregator: BalanceAggregator,
        hostname: impl Into<String>,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            validator,
            price,
            aggregator: Arc::new(aggregator),
            hostname: hostname.into(),
            metrics,
        }
    }
}

#[async_trait]
impl WalletApi for WalletService {
    async fn fetch_balance(
        &self,
        ctx: &CallContext,
        req: Envelope<BalanceRequest>,
    ) -> Result<Envelope<BalanceResponse>> {
        let access = self.validator.validate(ctx, &req.metadata).await?;

        let upstream = Envelope::with_metadata(PriceRequest {}, access.forward_credentials());
        let resp = self
            .price
            .fetch_price(ctx, upstream)
            .await
            .map_err(|e| e.wrap("could not fetch price"))?;
        log_upstream_host("price", resp.hostname());
        let price = resp.payload.price;
        tracing::debug!(price, "price");

        let balance = self.aggregator.aggregate(
            &access.display_name,
            price,
            req.payload.include_balance_per_address,
        )?;
        Ok(Envelope::from_host(balance, &self.hostname))
    }

    async fn watch_balance(
        &self,
        ctx: &CallContext,
        req: Envelope<BalanceRequest>,
    ) -> Result<Envelope<WatchStream<BalanceResponse>>> {
        let access = self.validator.validate(ctx, &req.metadata).await?;

        let upstream = Envelope::with_metadata(PriceRequest {}, access.forward_credentials());
        let opened = self
            .price
            .watch_price(ctx, upstream)
            .await
            .map_err(|e| e.wrap("could not open price stream"))?;
        log_upstream_host("price", opened.hostname());
        let mut prices = opened.into_inner();

        let aggregator = Arc::clone(&self.aggregator);
        let include = req.payload.include_balance_per_address;
        let user = access.display_name;
        let guard = self.metrics.stream_guard("wallet");
        tracing::info!(%user, include, "balance stream opened");

        // `prices` moves into the producer; when the producer returns it is
        // dropped, which cancels the upstream stream.
        let stream = WatchStream::spawn(ctx, move |sink| async move {
            let end = loop {
                let next = tokio::select! {
                    biased;
                    _ = sink.context().cancelled() => break StreamEnd::Cancelled,
                    next = prices.recv() => next,
                };
                let price = match next {
                    None => break StreamEnd::Eof,
                    Some(Err(e)) => break sink.fail(e).await,
                    Some(Ok(p)) => p.price,
                };
                tracing::debug!(price, "price");

                let balance = match aggregator.aggregate(&user, price, include) {
                    Ok(b) => b,
                    Err(e) => break sink.fail(e).await,
                };
                if let Err(end) = sink.send(Ok(balance)).await {
                    break end;
                }
                guard.record_update();
            };
            drop(prices);
            tracing::info!(?end, %user, "balance stream closed");
            end
        });
        Ok(Envelope::from_host(stream, &self.hostname))
    }
}
