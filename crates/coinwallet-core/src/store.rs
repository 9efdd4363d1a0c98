//! Read-only lookup stores: identity (token -> user) and ledger (user -> addresses).
//!
//! Both are built once at process start and never mutated afterwards, so they
//! are shared across concurrent calls without locking.

use std::collections::HashMap;

use crate::tier::Tier;

/// One known caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub token: String,
    pub display_name: String,
    pub tier: Tier,
}

/// One address owned by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub user: String,
    pub address: String,
    pub unit_count: i64,
}

impl LedgerEntry {
    pub fn new(user: &str, address: &str, unit_count: i64) -> Self {
        Self {
            user: user.to_string(),
            address: address.to_string(),
            unit_count,
        }
    }
}

pub trait IdentityStore: Send + Sync {
    fn lookup(&self, token: &str) -> Option<IdentityRecord>;
}

pub trait Ledger: Send + Sync {
    fn lookup(&self, user: &str) -> Option<&[LedgerEntry]>;
}

/// In-memory identity store.
#[derive(Debug, Default)]
pub struct StaticIdentityStore {
    by_token: HashMap<String, IdentityRecord>,
}

impl StaticIdentityStore {
    pub fn from_records(records: impl IntoIterator<Item = IdentityRecord>) -> Self {
        let by_token = records
            .into_iter()
            .map(|r| (r.token.clone(), r))
            .collect();
        Self { by_token }
    }

    /// Alice (premium) and Bob (normal).
    pub fn seeded() -> Self {
        Self::from_records([
            IdentityRecord {
                token: "2bd806c9".into(),
                display_name: "Alice".into(),
                tier: Tier::Premium,
            },
            IdentityRecord {
                token: "81b637d8".into(),
                display_name: "Bob".into(),
                tier: Tier::Normal,
            },
        ])
    }
}

impl IdentityStore for StaticIdentityStore {
    fn lookup(&self, token: &str) -> Option<IdentityRecord> {
        self.by_token.get(token).cloned()
    }
}

/// In-memory ledger, grouped by user.
#[derive(Debug, Default)]
pub struct StaticLedger {
    by_user: HashMap<String, Vec<LedgerEntry>>,
}

impl StaticLedger {
    pub fn from_entries(entries: impl IntoIterator<Item = LedgerEntry>) -> Self {
        let mut by_user: HashMap<String, Vec<LedgerEntry>> = HashMap::new();
        for e in entries {
            by_user.entry(e.user.clone()).or_default().push(e);
        }
        Self { by_user }
    }

    pub fn seeded() -> Self {
        Self::from_entries([
            LedgerEntry::new("Alice", "cd0aa985", 314),
            LedgerEntry::new("Alice", "454349e4", 159),
            LedgerEntry::new("Bob", "148de9c5", 271),
            LedgerEntry::new("Bob", "2e7d2c03", 828),
        ])
    }
}

impl Ledger for StaticLedger {
    fn lookup(&self, user: &str) -> Option<&[LedgerEntry]> {
        self.by_user.get(user).map(Vec::as_slice)
    }
}
