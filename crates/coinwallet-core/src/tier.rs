//! Membership tiers and their total order (`Normal < Premium`).

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::messages::MembershipType;

/// Membership level of a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Normal,
    Premium,
}

impl Tier {
    /// Parse the `membership` metadata literal. Case-sensitive: only
    /// `"normal"` and `"premium"` are recognized.
    pub fn from_metadata(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(Tier::Normal),
            "premium" => Some(Tier::Premium),
            _ => None,
        }
    }

    /// Metadata literal for this tier.
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Normal => "normal",
            Tier::Premium => "premium",
        }
    }

    /// Map a resolver membership enum to a tier; `None` for the sentinel.
    pub fn from_membership(m: MembershipType) -> Option<Self> {
        match m {
            MembershipType::Normal => Some(Tier::Normal),
            MembershipType::Premium => Some(Tier::Premium),
            MembershipType::Unknown => None,
        }
    }

    /// Resolver membership enum for this tier.
    pub fn membership(self) -> MembershipType {
        match self {
            Tier::Normal => MembershipType::Normal,
            Tier::Premium => MembershipType::Premium,
        }
    }

    fn rank(self) -> u8 {
        match self {
            Tier::Normal => 0,
            Tier::Premium => 1,
        }
    }
}

impl PartialOrd for Tier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
