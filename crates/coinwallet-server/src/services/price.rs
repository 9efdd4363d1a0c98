//! Price service: one-shot and streamed samples of the price feed, paced
//! by the caller's validated tier.

use std::sync::Arc;

use async_trait::async_trait;

use coinwallet_core::error::Result;
use coinwallet_core::protocol::{Envelope, PriceRequest, PriceResponse};
use coinwallet_core::PriceFeed;

use crate::context::{AccessContext, CallContext};
use crate::obs::ServiceMetrics;
use crate::policy::{MembershipValidator, PremiumGate};
use crate::realtime::{cadence, run_ticks, WatchStream};

use super::PriceApi;

pub struct PriceService {
    validator: MembershipValidator,
    feed: Arc<dyn PriceFeed>,
    gate: PremiumGate,
    hostname: String,
    metrics: Arc<ServiceMetrics>,
}

impl PriceService {
    pub fn new(
        validator: MembershipValidator,
        feed: Arc<dyn PriceFeed>,
        premium_only: bool,
        hostname: impl Into<String>,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            validator,
            feed,
            gate: PremiumGate::new(premium_only),
            hostname: hostname.into(),
            metrics,
        }
    }

    async fn admit(&self, ctx: &CallContext, req: &Envelope<PriceRequest>) -> Result<AccessContext> {
        let access = self.validator.validate(ctx, &req.metadata).await?;
        self.gate.check(&access)?;
        Ok(access)
    }
}

#[async_trait]
impl PriceApi for PriceService {
    async fn fetch_price(
        &self,
        ctx: &CallContext,
        req: Envelope<PriceRequest>,
    ) -> Result<Envelope<PriceResponse>> {
        self.admit(ctx, &req).await?;
        Ok(Envelope::from_host(
            PriceResponse {
                price: self.feed.sample(),
            },
            &self.hostname,
        ))
    }

    async fn watch_price(
        &self,
        ctx: &CallContext,
        req: Envelope<PriceRequest>,
    ) -> Result<Envelope<WatchStream<PriceResponse>>> {
        let access = self.admit(ctx, &req).await?;
        let period = cadence(access.service_tier());
        let feed = Arc::clone(&self.feed);
        let guard = self.metrics.stream_guard("price");
        tracing::info!(user = %access.display_name, tier = %access.service_tier(), ?period, "price stream opened");

        let stream = WatchStream::spawn(ctx, move |sink| async move {
            let end = run_ticks(&sink, period, || {
                guard.record_update();
                PriceResponse {
                    price: feed.sample(),
                }
            })
            .await;
            tracing::info!(?end, "price stream closed");
            drop(guard);
            end
        });
        Ok(Envelope::from_host(stream, &self.hostname))
    }
}
