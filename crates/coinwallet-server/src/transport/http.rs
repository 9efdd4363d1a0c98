//! Unary HTTP handlers.
//!
//! Each request gets a fresh root `CallContext`; its handle lives in the
//! handler future, so a client that disconnects mid-call cancels the work.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;

use coinwallet_core::error::WalletError;
use coinwallet_core::protocol::{BalanceRequest, Envelope, PriceRequest, ResolveUserRequest};

use crate::app_state::AppState;
use crate::context::CallContext;
use crate::transport::codec::{metadata_from_headers, respond};

fn bad_body(e: JsonRejection) -> WalletError {
    WalletError::InvalidArgument(format!("invalid request body: {}", e.body_text()))
}

pub async fn resolve_user(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ResolveUserRequest>, JsonRejection>,
) -> Response {
    let (ctx, _call) = CallContext::new();
    let result = async {
        let Json(req) = body.map_err(bad_body)?;
        let svc = app.account()?;
        svc.resolve_user(&ctx, Envelope::with_metadata(req, metadata_from_headers(&headers)))
            .await
    }
    .await;
    respond(result, app.hostname())
}

pub async fn fetch_price(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<PriceRequest>, JsonRejection>,
) -> Response {
    let (ctx, _call) = CallContext::new();
    let result = async {
        let Json(req) = body.map_err(bad_body)?;
        let svc = app.price()?;
        svc.fetch_price(&ctx, Envelope::with_metadata(req, metadata_from_headers(&headers)))
            .await
    }
    .await;
    respond(result, app.hostname())
}

pub async fn fetch_balance(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<BalanceRequest>, JsonRejection>,
) -> Response {
    let (ctx, _call) = CallContext::new();
    let result = async {
        let Json(req) = body.map_err(bad_body)?;
        let svc = app.wallet()?;
        svc.fetch_balance(&ctx, Envelope::with_metadata(req, metadata_from_headers(&headers)))
            .await
    }
    .await;
    respond(result, app.hostname())
}

/// Prometheus text exposition of the in-process counters.
pub async fn metrics(State(app): State<AppState>) -> String {
    app.metrics().render()
}
