//! Request/response bodies of the account, price and wallet services.

use serde::{Deserialize, Serialize};

/// Account resolver request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolveUserRequest {
    pub token: String,
}

/// Resolver-side membership enum. `Unknown` is the sentinel for an unset
/// or unrecognized value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipType {
    Normal,
    Premium,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Account resolver response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    #[serde(default)]
    pub membership: MembershipType,
}

/// Price request (no fields; identity travels in metadata).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRequest {}

/// One price sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceResponse {
    pub price: i64,
}

/// Balance request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRequest {
    #[serde(default)]
    pub include_balance_per_address: bool,
}

/// Balance of one ledger address at the current price.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressBalance {
    pub address: String,
    pub balance: i64,
}

/// Balance response (also the item type of the balance stream).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<AddressBalance>,
}
