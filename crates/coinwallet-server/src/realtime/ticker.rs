//! Tier-paced tick loop.
//!
//! Premium callers get a sample every 100ms, normal callers every second.
//! The first sample comes one period after open. Each tick produces exactly
//! one item; a late consumer delays the next tick instead of causing a burst.

use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use coinwallet_core::Tier;

use super::stream::{StreamEnd, StreamSink};

pub const PREMIUM_CADENCE: Duration = Duration::from_millis(100);
pub const NORMAL_CADENCE: Duration = Duration::from_secs(1);

pub fn cadence(tier: Tier) -> Duration {
    match tier {
        Tier::Premium => PREMIUM_CADENCE,
        Tier::Normal => NORMAL_CADENCE,
    }
}

/// Push `produce()` into `sink` once per `period` until cancelled or the
/// consumer goes away. Never ends on its own.
pub async fn run_ticks<T, F>(sink: &StreamSink<T>, period: Duration, mut produce: F) -> StreamEnd
where
    F: FnMut() -> T,
{
    let mut tick = interval_at(Instant::now() + period, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = sink.context().cancelled() => return StreamEnd::Cancelled,
            _ = tick.tick() => {}
        }
        if let Err(end) = sink.send(Ok(produce())).await {
            return end;
        }
    }
}
