//! Account service: token to `(name, membership)` lookup.

use std::sync::Arc;

use async_trait::async_trait;

use coinwallet_core::error::{Result, WalletError};
use coinwallet_core::protocol::{metadata, Envelope, ResolveUserRequest, UserInfo};
use coinwallet_core::IdentityStore;

use crate::context::CallContext;

use super::AccountApi;

pub struct AccountResolver {
    store: Arc<dyn IdentityStore>,
    hostname: String,
}

impl AccountResolver {
    pub fn new(store: Arc<dyn IdentityStore>, hostname: impl Into<String>) -> Self {
        Self {
            store,
            hostname: hostname.into(),
        }
    }
}

#[async_trait]
impl AccountApi for AccountResolver {
    async fn resolve_user(
        &self,
        _ctx: &CallContext,
        req: Envelope<ResolveUserRequest>,
    ) -> Result<Envelope<UserInfo>> {
        if let Some(route) = req.metadata.get(metadata::ROUTE) {
            tracing::debug!(route, "resolve user");
        }
        let record = self
            .store
            .lookup(&req.payload.token)
            .ok_or_else(|| WalletError::NotFound("unrecognized user token".into()))?;

        Ok(Envelope::from_host(
            UserInfo {
                name: record.display_name,
                membership: record.tier.membership(),
            },
            &self.hostname,
        ))
    }
}

#[cfg(test)]
mod tests {
    use coinwallet_core::error::Code;
    use coinwallet_core::protocol::MembershipType;
    use coinwallet_core::StaticIdentityStore;

    use super::*;

    fn resolver() -> AccountResolver {
        AccountResolver::new(Arc::new(StaticIdentityStore::seeded()), "account-1")
    }

    async fn resolve(token: &str) -> Result<Envelope<UserInfo>> {
        let (ctx, _h) = CallContext::new();
        resolver()
            .resolve_user(
                &ctx,
                Envelope::new(ResolveUserRequest {
                    token: token.into(),
                }),
            )
            .await
    }

    #[tokio::test]
    async fn seeded_tokens_resolve() {
        let alice = resolve("2bd806c9").await.unwrap();
        assert_eq!(alice.hostname(), Some("account-1"));
        assert_eq!(alice.payload.name, "Alice");
        assert_eq!(alice.payload.membership, MembershipType::Premium);

        let bob = resolve("81b637d8").await.unwrap().into_inner();
        assert_eq!(bob.name, "Bob");
        assert_eq!(bob.membership, MembershipType::Normal);
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let err = resolve("00000000").await.unwrap_err();
        assert_eq!(err.code(), Code::NotFound);
    }
}
