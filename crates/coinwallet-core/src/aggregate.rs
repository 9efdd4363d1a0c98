//! Balance aggregation: ledger rows x current price.

use std::sync::Arc;

use crate::error::{Result, WalletError};
use crate::protocol::messages::{AddressBalance, BalanceResponse};
use crate::store::{Ledger, LedgerEntry};

/// `total = Σ unit_count * price`, with one `(address, balance)` row per
/// entry when `include_breakdown` is set. Row order follows the entries and
/// carries no meaning.
pub fn balance_of(entries: &[LedgerEntry], price: i64, include_breakdown: bool) -> BalanceResponse {
    let mut out = BalanceResponse::default();
    for e in entries {
        let balance = e.unit_count.saturating_mul(price);
        out.balance = out.balance.saturating_add(balance);
        if include_breakdown {
            out.addresses.push(AddressBalance {
                address: e.address.clone(),
                balance,
            });
        }
    }
    out
}

/// Ledger-backed aggregator. Stateless between calls: every `aggregate`
/// recomputes from the ledger and the price it is given.
pub struct BalanceAggregator {
    ledger: Arc<dyn Ledger>,
    v1_behavior: bool,
}

impl BalanceAggregator {
    /// `v1_behavior` is the restricted-compatibility mode: per-address detail
    /// is never reported, whatever the caller asks for.
    pub fn new(ledger: Arc<dyn Ledger>, v1_behavior: bool) -> Self {
        Self { ledger, v1_behavior }
    }

    /// Fails only with `NotFound` for an unknown user. Identity is assumed
    /// to be validated by the caller.
    pub fn aggregate(&self, user: &str, price: i64, include_breakdown: bool) -> Result<BalanceResponse> {
        let entries = self
            .ledger
            .lookup(user)
            .ok_or_else(|| WalletError::NotFound(format!("could not identify user: {user}")))?;
        Ok(balance_of(entries, price, include_breakdown && !self.v1_behavior))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::error::Code;
    use crate::store::StaticLedger;

    fn ledger() -> Arc<dyn Ledger> {
        Arc::new(StaticLedger::from_entries([
            LedgerEntry::new("Carol", "addrX", 314),
            LedgerEntry::new("Carol", "addrY", 159),
        ]))
    }

    #[test]
    fn total_and_breakdown_at_fixed_price() {
        let agg = BalanceAggregator::new(ledger(), false);
        let r = agg.aggregate("Carol", 10_000, true).expect("known user");
        assert_eq!(r.balance, 4_730_000);

        let got: HashSet<(String, i64)> = r.addresses.into_iter().map(|a| (a.address, a.balance)).collect();
        let want: HashSet<(String, i64)> =
            [("addrX".to_string(), 3_140_000), ("addrY".to_string(), 1_590_000)].into_iter().collect();
        assert_eq!(got, want);
    }

    #[test]
    fn breakdown_only_on_request() {
        let agg = BalanceAggregator::new(ledger(), false);
        let r = agg.aggregate("Carol", 10_000, false).expect("known user");
        assert_eq!(r.balance, 4_730_000);
        assert!(r.addresses.is_empty());
    }

    #[test]
    fn v1_behavior_suppresses_breakdown() {
        let agg = BalanceAggregator::new(ledger(), true);
        let r = agg.aggregate("Carol", 10_000, true).expect("known user");
        assert_eq!(r.balance, 4_730_000);
        assert!(r.addresses.is_empty());
    }

    #[test]
    fn unknown_user_is_not_found() {
        let agg = BalanceAggregator::new(ledger(), false);
        let e = agg.aggregate("Mallory", 10_000, true).expect_err("unknown user");
        assert_eq!(e.code(), Code::NotFound);
    }

    #[test]
    fn linear_in_price() {
        let ledger = StaticLedger::seeded();
        for user in ["Alice", "Bob"] {
            let entries = ledger.lookup(user).expect("seeded");
            for price in [0_i64, 1, 9_000, 10_537, 11_000] {
                let base = balance_of(entries, price, false).balance;
                for k in 0..=5 {
                    assert_eq!(balance_of(entries, k * price, false).balance, k * base);
                }
            }
        }
    }
}
