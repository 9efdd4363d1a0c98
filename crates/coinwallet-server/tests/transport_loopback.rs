#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

//! The three services on loopback sockets, talking through the remote
//! clients.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::time::{timeout, Duration};

use coinwallet_core::error::Code;
use coinwallet_core::protocol::{BalanceRequest, Envelope, Metadata, PriceRequest};
use coinwallet_core::{
    BalanceAggregator, FixedPriceFeed, StaticIdentityStore, StaticLedger, Tier,
};
use coinwallet_server::app_state::{AppState, Served};
use coinwallet_server::context::CallContext;
use coinwallet_server::obs::ServiceMetrics;
use coinwallet_server::policy::MembershipValidator;
use coinwallet_server::router::build_router;
use coinwallet_server::services::{AccountResolver, PriceApi, PriceService, WalletApi, WalletService};
use coinwallet_server::transport::client::{RemoteAccountClient, RemotePriceClient, RemoteWalletClient};

const ALICE: &str = "2bd806c9";
const BOB: &str = "81b637d8";
const DIAL: Duration = Duration::from_secs(2);

async fn serve(state: AppState) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

struct Deployment {
    price_url: String,
    wallet_url: String,
    price_metrics: Arc<ServiceMetrics>,
    wallet_metrics: Arc<ServiceMetrics>,
}

async fn deploy() -> Deployment {
    let account_url = serve(AppState::serving(
        "account-lb",
        Arc::default(),
        Served::Account(Arc::new(AccountResolver::new(
            Arc::new(StaticIdentityStore::seeded()),
            "account-lb",
        ))),
    ))
    .await;

    let price_metrics: Arc<ServiceMetrics> = Arc::default();
    let price = PriceService::new(
        MembershipValidator::new(
            Arc::new(RemoteAccountClient::new(&account_url, DIAL).unwrap()),
            Arc::clone(&price_metrics),
        ),
        Arc::new(FixedPriceFeed(10_000)),
        false,
        "price-lb",
        Arc::clone(&price_metrics),
    );
    let price_url = serve(AppState::serving(
        "price-lb",
        Arc::clone(&price_metrics),
        Served::Price(Arc::new(price)),
    ))
    .await;

    let wallet_metrics: Arc<ServiceMetrics> = Arc::default();
    let wallet = WalletService::new(
        MembershipValidator::new(
            Arc::new(RemoteAccountClient::new(&account_url, DIAL).unwrap()),
            Arc::clone(&wallet_metrics),
        ),
        Arc::new(RemotePriceClient::new(&price_url, DIAL).unwrap()),
        BalanceAggregator::new(Arc::new(StaticLedger::seeded()), false),
        "wallet-lb",
        Arc::clone(&wallet_metrics),
    );
    let wallet_url = serve(AppState::serving(
        "wallet-lb",
        Arc::clone(&wallet_metrics),
        Served::Wallet(Arc::new(wallet)),
    ))
    .await;

    Deployment {
        price_url,
        wallet_url,
        price_metrics,
        wallet_metrics,
    }
}

fn balance_req(token: &str, tier: Tier, include: bool) -> Envelope<BalanceRequest> {
    Envelope::with_metadata(
        BalanceRequest {
            include_balance_per_address: include,
        },
        Metadata::credentials(token, tier),
    )
}

async fn wait_until_zero(metrics: &ServiceMetrics, svc: &str) {
    timeout(Duration::from_secs(3), async {
        while metrics.active_streams(svc) != 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("{svc} stream still open"));
}

/// Account server that answers every resolve with a fixed body.
async fn serve_fixed_account(body: &'static str) -> String {
    use axum::routing::post;

    let app = axum::Router::new().route(
        "/v1/account/resolve",
        post(move || async move { ([("content-type", "application/json")], body) }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn unmapped_remote_membership_is_unauthenticated() {
    for body in [
        r#"{"name":"Eve","membership":"GOLD"}"#,
        r#"{"name":"Eve"}"#,
        r#"{"name":"Eve","membership":"UNKNOWN"}"#,
    ] {
        let url = serve_fixed_account(body).await;
        let validator = MembershipValidator::new(
            Arc::new(RemoteAccountClient::new(&url, DIAL).unwrap()),
            Arc::default(),
        );
        let (ctx, _h) = CallContext::new();
        let err = validator
            .validate(&ctx, &Metadata::credentials("e5e5e5e5", Tier::Normal))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::Unauthenticated, "body {body}");
        assert!(err.message().contains("unrecognized user membership type"));
    }
}

#[tokio::test]
async fn unary_balance_over_http() {
    let d = deploy().await;
    let client = RemoteWalletClient::new(&d.wallet_url, DIAL).unwrap();
    let (ctx, _h) = CallContext::new();

    let resp = client
        .fetch_balance(&ctx, balance_req(ALICE, Tier::Premium, true))
        .await
        .unwrap();
    assert_eq!(resp.hostname(), Some("wallet-lb"));
    assert_eq!(resp.payload.balance, 4_730_000);
    assert_eq!(resp.payload.addresses.len(), 2);
}

#[tokio::test]
async fn error_codes_cross_the_wire() {
    let d = deploy().await;
    let client = RemoteWalletClient::new(&d.wallet_url, DIAL).unwrap();
    let (ctx, _h) = CallContext::new();

    let err = client
        .fetch_balance(&ctx, balance_req(BOB, Tier::Premium, false))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::Unauthenticated);

    let err = client
        .fetch_balance(&ctx, balance_req("ffffffff", Tier::Normal, false))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::NotFound);

    let err = client
        .watch_balance(&ctx, balance_req(BOB, Tier::Premium, false))
        .await
        .err()
        .unwrap();
    assert_eq!(err.code(), Code::Unauthenticated);
}

#[tokio::test]
async fn price_fetch_carries_hostname() {
    let d = deploy().await;
    let client = RemotePriceClient::new(&d.price_url, DIAL).unwrap();
    let (ctx, _h) = CallContext::new();
    let req = Envelope::with_metadata(PriceRequest {}, Metadata::credentials(BOB, Tier::Normal));
    let resp = client.fetch_price(&ctx, req).await.unwrap();
    assert_eq!(resp.hostname(), Some("price-lb"));
    assert_eq!(resp.payload.price, 10_000);
}

#[tokio::test]
async fn balance_stream_over_websocket() {
    let d = deploy().await;
    let client = RemoteWalletClient::new(&d.wallet_url, DIAL).unwrap();
    let (ctx, _h) = CallContext::new();

    let opened = client
        .watch_balance(&ctx, balance_req(ALICE, Tier::Premium, true))
        .await
        .unwrap();
    assert_eq!(opened.hostname(), Some("wallet-lb"));

    let mut stream = opened.into_inner();
    for _ in 0..3 {
        let update = timeout(Duration::from_secs(2), stream.recv())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(update.balance, 4_730_000);
        assert_eq!(update.addresses.len(), 2);
    }
}

#[tokio::test]
async fn client_disconnect_closes_every_hop() {
    let d = deploy().await;
    let client = RemoteWalletClient::new(&d.wallet_url, DIAL).unwrap();
    let (ctx, _h) = CallContext::new();

    let mut stream = client
        .watch_balance(&ctx, balance_req(ALICE, Tier::Premium, false))
        .await
        .unwrap()
        .into_inner();
    timeout(Duration::from_secs(2), stream.recv())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(d.wallet_metrics.active_streams("wallet"), 1);
    assert_eq!(d.price_metrics.active_streams("price"), 1);

    drop(stream);
    wait_until_zero(&d.wallet_metrics, "wallet").await;
    wait_until_zero(&d.price_metrics, "price").await;
}

#[tokio::test]
async fn malformed_body_is_invalid_argument() {
    let d = deploy().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/v1/wallet/balance", d.wallet_url))
        .header("content-type", "application/json")
        .header("authorization", ALICE)
        .header("membership", "premium")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(resp.headers().get("hostname").unwrap(), "wallet-lb");
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn metrics_endpoint_reports_validations() {
    let d = deploy().await;
    let client = RemoteWalletClient::new(&d.wallet_url, DIAL).unwrap();
    let (ctx, _h) = CallContext::new();
    client
        .fetch_balance(&ctx, balance_req(BOB, Tier::Normal, false))
        .await
        .unwrap();

    let text = reqwest::get(format!("{}/metrics", d.wallet_url))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(text.contains("coinwallet_validations_total{outcome=\"authorized\"} 1"));
}

#[tokio::test]
async fn routes_of_other_roles_are_not_mounted() {
    let d = deploy().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/v1/wallet/balance", d.price_url))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}
