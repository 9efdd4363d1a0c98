//! coinwallet core: transport-agnostic primitives shared by the account,
//! price and wallet services and by the command-line client.
//!
//! This crate defines the error taxonomy, the membership tier order, the
//! metadata envelope that travels with every call, the wire messages, and the
//! pure parts of the pipeline (price feed, stores, balance aggregation). It
//! carries no transport or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied outside tests. Every fallible path
//! surfaces as `WalletError`/`Result`.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

pub mod aggregate;
pub mod error;
pub mod pricing;
pub mod protocol;
pub mod store;
pub mod tier;

pub use aggregate::{balance_of, BalanceAggregator};
pub use error::{Code, Result, WalletError};
pub use pricing::{FixedPriceFeed, PriceFeed, SineWaveFeed};
pub use store::{IdentityRecord, IdentityStore, Ledger, LedgerEntry, StaticIdentityStore, StaticLedger};
pub use tier::Tier;
