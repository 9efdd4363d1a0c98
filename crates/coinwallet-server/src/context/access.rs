use coinwallet_core::protocol::Metadata;
use coinwallet_core::Tier;

/// Validated identity of one caller, alive for one call or one stream.
///
/// Built only by `MembershipValidator`; never persisted. Upstream
/// instance details (hostname) are not part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessContext {
    pub display_name: String,
    pub actual_tier: Tier,
    pub requested_tier: Tier,
    pub authorized: bool,
    token: String,
}

impl AccessContext {
    pub(crate) fn authorized(token: String, display_name: String, actual_tier: Tier, requested_tier: Tier) -> Self {
        Self {
            display_name,
            actual_tier,
            requested_tier,
            authorized: true,
            token,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Tier the call is served at: the validated requested tier.
    pub fn service_tier(&self) -> Tier {
        self.requested_tier
    }

    pub fn is_premium(&self) -> bool {
        self.service_tier() == Tier::Premium
    }

    /// Credentials for the next hop, which re-validates them itself.
    pub fn forward_credentials(&self) -> Metadata {
        Metadata::credentials(&self.token, self.requested_tier)
    }
}
