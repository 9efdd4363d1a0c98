//! Side-channel metadata attached to every request and response.
//!
//! Keys are case-insensitive and stored lowercased, matching HTTP header
//! semantics. Only the first value of a key is kept.

use std::collections::BTreeMap;

use crate::tier::Tier;

/// Caller token.
pub const AUTHORIZATION: &str = "authorization";
/// Requested membership tier (`normal` | `premium`).
pub const MEMBERSHIP: &str = "membership";
/// Opaque routing hint, forwarded to the account resolver untouched.
pub const ROUTE: &str = "route";
/// Responding instance, set on every response.
pub const HOSTNAME: &str = "hostname";

/// String-to-string attribute map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: BTreeMap<String, String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outbound credentials for a chained call.
    pub fn credentials(token: &str, tier: Tier) -> Self {
        Self::new()
            .with(AUTHORIZATION, token)
            .with(MEMBERSHIP, tier.as_str())
    }

    /// Insert unless the key is already present (first value wins).
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entries
            .entry(key.to_ascii_lowercase())
            .or_insert_with(|| value.into());
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&key.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut md = Metadata::new();
        for (k, v) in iter {
            md.insert(k.as_ref(), v);
        }
        md
    }
}

/// A payload together with its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<T> {
    pub payload: T,
    pub metadata: Metadata,
}

impl<T> Envelope<T> {
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(payload: T, metadata: Metadata) -> Self {
        Self { payload, metadata }
    }

    /// Response envelope stamped with the responding instance.
    pub fn from_host(payload: T, hostname: &str) -> Self {
        Self::with_metadata(payload, Metadata::new().with(HOSTNAME, hostname))
    }

    pub fn hostname(&self) -> Option<&str> {
        self.metadata.get(HOSTNAME)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            payload: f(self.payload),
            metadata: self.metadata,
        }
    }

    pub fn into_inner(self) -> T {
        self.payload
    }
}
