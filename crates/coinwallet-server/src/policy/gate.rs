//! Endpoint-level policy applied after membership validation.

use coinwallet_core::error::{Result, WalletError};

use crate::context::AccessContext;

/// Premium-only gate for the price endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct PremiumGate {
    premium_only: bool,
}

impl PremiumGate {
    pub fn new(premium_only: bool) -> Self {
        Self { premium_only }
    }

    pub fn check(&self, access: &AccessContext) -> Result<()> {
        if self.premium_only && !access.is_premium() {
            return Err(WalletError::PermissionDenied(
                "non-premium request while premium-only".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use coinwallet_core::error::Code;
    use coinwallet_core::Tier;

    use super::*;

    fn access(requested: Tier) -> AccessContext {
        AccessContext::authorized("t".into(), "Alice".into(), Tier::Premium, requested)
    }

    #[test]
    fn open_gate_admits_everyone() {
        assert!(PremiumGate::new(false).check(&access(Tier::Normal)).is_ok());
    }

    #[test]
    fn premium_only_uses_the_validated_requested_tier() {
        let gate = PremiumGate::new(true);
        assert!(gate.check(&access(Tier::Premium)).is_ok());
        let err = gate.check(&access(Tier::Normal)).unwrap_err();
        assert_eq!(err.code(), Code::PermissionDenied);
    }
}
