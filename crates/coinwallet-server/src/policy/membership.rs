//! Membership validation: the authorization step every service runs before
//! doing any work.
//!
//! The validator trusts nothing it is handed. Each call resolves the token
//! against the account service again; results of earlier hops are never
//! reused, only the credentials needed to repeat the check.

use std::sync::Arc;

use coinwallet_core::error::{Result, WalletError};
use coinwallet_core::protocol::{metadata, Envelope, Metadata, ResolveUserRequest};
use coinwallet_core::Tier;

use crate::context::{AccessContext, CallContext};
use crate::obs::{log_upstream_host, ServiceMetrics};
use crate::services::AccountApi;

pub struct MembershipValidator {
    resolver: Arc<dyn AccountApi>,
    metrics: Arc<ServiceMetrics>,
}

impl MembershipValidator {
    pub fn new(resolver: Arc<dyn AccountApi>, metrics: Arc<ServiceMetrics>) -> Self {
        Self { resolver, metrics }
    }

    /// Validate inbound credentials and build the caller's `AccessContext`.
    ///
    /// Every rejection made here is `Unauthenticated`; errors from the
    /// resolver pass through with their own code.
    pub async fn validate(&self, ctx: &CallContext, inbound: &Metadata) -> Result<AccessContext> {
        let outcome = self.check(ctx, inbound).await;
        let label = match &outcome {
            Ok(_) => "authorized",
            Err(_) => "rejected",
        };
        self.metrics.validations.inc(&[("outcome", label)]);
        outcome
    }

    async fn check(&self, ctx: &CallContext, inbound: &Metadata) -> Result<AccessContext> {
        let token = inbound
            .get(metadata::AUTHORIZATION)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| WalletError::Unauthenticated("missing user authentication".into()))?;
        let requested = inbound
            .get(metadata::MEMBERSHIP)
            .and_then(Tier::from_metadata)
            .ok_or_else(|| WalletError::Unauthenticated("unknown user membership".into()))?;

        // only the routing hint travels to the resolver
        let mut outbound = Metadata::new();
        if let Some(route) = inbound.get(metadata::ROUTE) {
            outbound.insert(metadata::ROUTE, route);
        }

        let req = Envelope::with_metadata(
            ResolveUserRequest {
                token: token.to_string(),
            },
            outbound,
        );
        let resp = match self.resolver.resolve_user(ctx, req).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::info!(token, requested = %requested, success = false, error = %e, "validate membership");
                return Err(e.wrap("could not get user info"));
            }
        };
        log_upstream_host("account", resp.hostname());

        let user = resp.into_inner();
        let Some(actual) = Tier::from_membership(user.membership) else {
            tracing::info!(token, name = %user.name, requested = %requested, success = false, "validate membership");
            return Err(WalletError::Unauthenticated(
                "unrecognized user membership type".into(),
            ));
        };

        let success = requested <= actual;
        tracing::info!(
            token,
            name = %user.name,
            membership = %actual,
            requested = %requested,
            success,
            "validate membership"
        );
        if !success {
            return Err(WalletError::Unauthenticated(
                "requested membership higher than actual membership".into(),
            ));
        }

        Ok(AccessContext::authorized(
            token.to_string(),
            user.name,
            actual,
            requested,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use coinwallet_core::error::Code;
    use coinwallet_core::protocol::{MembershipType, UserInfo};

    use super::*;

    /// Resolver double that records the metadata it was called with.
    struct FakeResolver {
        answer: Result<UserInfo>,
        seen: Mutex<Vec<Metadata>>,
    }

    impl FakeResolver {
        fn answering(answer: Result<UserInfo>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl AccountApi for FakeResolver {
        async fn resolve_user(
            &self,
            _ctx: &CallContext,
            req: Envelope<ResolveUserRequest>,
        ) -> Result<Envelope<UserInfo>> {
            self.seen.lock().unwrap().push(req.metadata.clone());
            self.answer
                .clone()
                .map(|u| Envelope::from_host(u, "account-test"))
        }
    }

    fn user(name: &str, membership: MembershipType) -> Result<UserInfo> {
        Ok(UserInfo {
            name: name.into(),
            membership,
        })
    }

    fn validator(resolver: Arc<FakeResolver>) -> MembershipValidator {
        MembershipValidator::new(resolver, Arc::new(ServiceMetrics::default()))
    }

    async fn run(v: &MembershipValidator, md: Metadata) -> Result<AccessContext> {
        let (ctx, _h) = CallContext::new();
        v.validate(&ctx, &md).await
    }

    #[tokio::test]
    async fn premium_user_may_request_normal() {
        let v = validator(FakeResolver::answering(user("Alice", MembershipType::Premium)));
        let access = run(&v, Metadata::credentials("2bd806c9", Tier::Normal))
            .await
            .unwrap();
        assert!(access.authorized);
        assert_eq!(access.display_name, "Alice");
        assert_eq!(access.actual_tier, Tier::Premium);
        assert_eq!(access.requested_tier, Tier::Normal);
        assert_eq!(access.service_tier(), Tier::Normal);
    }

    #[tokio::test]
    async fn normal_user_may_not_escalate() {
        let v = validator(FakeResolver::answering(user("Bob", MembershipType::Normal)));
        let err = run(&v, Metadata::credentials("81b637d8", Tier::Premium))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::Unauthenticated);
        assert!(err.message().contains("higher than actual"));
    }

    #[tokio::test]
    async fn missing_credentials_never_reach_the_resolver() {
        let resolver = FakeResolver::answering(user("Alice", MembershipType::Premium));
        let v = validator(Arc::clone(&resolver));

        let no_token = Metadata::new().with(metadata::MEMBERSHIP, "normal");
        let err = run(&v, no_token).await.unwrap_err();
        assert_eq!(err.code(), Code::Unauthenticated);

        let no_tier = Metadata::new().with(metadata::AUTHORIZATION, "2bd806c9");
        let err = run(&v, no_tier).await.unwrap_err();
        assert_eq!(err.code(), Code::Unauthenticated);

        let shouting = Metadata::new()
            .with(metadata::AUTHORIZATION, "2bd806c9")
            .with(metadata::MEMBERSHIP, "PREMIUM");
        let err = run(&v, shouting).await.unwrap_err();
        assert_eq!(err.code(), Code::Unauthenticated);

        assert!(resolver.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolver_code_passes_through() {
        let v = validator(FakeResolver::answering(Err(WalletError::NotFound(
            "unrecognized user token".into(),
        ))));
        let err = run(&v, Metadata::credentials("deadbeef", Tier::Normal))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::NotFound);
        assert!(err.message().starts_with("could not get user info"));
    }

    #[tokio::test]
    async fn unknown_membership_sentinel_is_rejected() {
        let v = validator(FakeResolver::answering(user("Mallory", MembershipType::Unknown)));
        let err = run(&v, Metadata::credentials("x", Tier::Normal))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::Unauthenticated);
        assert!(err.message().contains("unrecognized user membership type"));
    }

    #[tokio::test]
    async fn only_route_is_forwarded() {
        let resolver = FakeResolver::answering(user("Alice", MembershipType::Premium));
        let v = validator(Arc::clone(&resolver));
        let md = Metadata::credentials("2bd806c9", Tier::Premium).with(metadata::ROUTE, "canary");
        run(&v, md).await.unwrap();

        let seen = resolver.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].get(metadata::ROUTE), Some("canary"));
        assert!(!seen[0].contains(metadata::AUTHORIZATION));
        assert!(!seen[0].contains(metadata::MEMBERSHIP));
    }

    #[tokio::test]
    async fn outcomes_are_counted() {
        let metrics = Arc::new(ServiceMetrics::default());
        let v = MembershipValidator::new(
            FakeResolver::answering(user("Bob", MembershipType::Normal)),
            Arc::clone(&metrics),
        );
        let (ctx, _h) = CallContext::new();
        let _ = v.validate(&ctx, &Metadata::credentials("t", Tier::Normal)).await;
        let _ = v.validate(&ctx, &Metadata::credentials("t", Tier::Premium)).await;
        assert_eq!(metrics.validations.get(&[("outcome", "authorized")]), 1);
        assert_eq!(metrics.validations.get(&[("outcome", "rejected")]), 1);
    }
}
