//! The three services and the contracts they are called through.
//!
//! Each service is usable in-process behind its trait object, or remotely
//! through the matching client in `transport::client`.

pub mod account;
pub mod api;
pub mod price;
pub mod wallet;

pub use account::AccountResolver;
pub use api::{AccountApi, PriceApi, WalletApi};
pub use price::PriceService;
pub use wallet::WalletService;
