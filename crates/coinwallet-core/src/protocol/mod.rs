//! Wire contracts shared by every hop of the chain.
//!
//! - `metadata`: the typed side-channel envelope (credentials in, hostname out).
//! - `messages`: request/response bodies for the three services.
//! - `frame`: the per-item frame format used by streaming calls.
//!
//! Decoders never panic: malformed input is reported as `WalletError`.

pub mod frame;
pub mod messages;
pub mod metadata;

pub use frame::{decode_frame, encode_frame, ErrorBody, StreamFrame};
pub use messages::{
    AddressBalance, BalanceRequest, BalanceResponse, MembershipType, PriceRequest, PriceResponse,
    ResolveUserRequest, UserInfo,
};
pub use metadata::{Envelope, Metadata};
