//! Policy layer: membership validation and endpoint gates.

pub mod gate;
pub mod membership;

pub use gate::PremiumGate;
pub use membership::MembershipValidator;
