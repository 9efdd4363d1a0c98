//! Price feed: a bounded oscillating integer price derived from wall-clock time.
//!
//! `price(t) = round(1000 * sin(t_ms / 173) + 10000)`, so samples stay in
//! `[9000, 11000]` and repeat every `2π * 173 ≈ 1087` ms. Nothing is cached;
//! every read recomputes from the clock.

use std::time::{SystemTime, UNIX_EPOCH};

const AMPLITUDE: f64 = 1_000.0;
const BASE: f64 = 10_000.0;
const TIME_DIVISOR_MS: f64 = 173.0;

/// Lowest value `price_at` can return.
pub const PRICE_MIN: i64 = 9_000;
/// Highest value `price_at` can return.
pub const PRICE_MAX: i64 = 11_000;

/// Price at a given unix time in milliseconds.
pub fn price_at(unix_ms: i64) -> i64 {
    (AMPLITUDE * (unix_ms as f64 / TIME_DIVISOR_MS).sin() + BASE).round() as i64
}

/// Source of price samples.
pub trait PriceFeed: Send + Sync {
    fn sample(&self) -> i64;
}

/// The production feed: `price_at(now)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SineWaveFeed;

impl PriceFeed for SineWaveFeed {
    fn sample(&self) -> i64 {
        // A clock before the epoch yields 0ms instead of failing.
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64;
        price_at(now_ms)
    }
}

/// Constant feed, for staging environments and deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedPriceFeed(pub i64);

impl PriceFeed for FixedPriceFeed {
    fn sample(&self) -> i64 {
        self.0
    }
}
