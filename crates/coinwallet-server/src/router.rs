//! Axum router wiring.
//!
//! Only the routes of the served role are mounted; `/metrics` is always
//! present.

use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::{AppState, Served};
use crate::transport::{http, ws};

pub fn build_router(state: AppState) -> Router {
    let routes: Router<AppState> = match state.served() {
        Served::Account(_) => Router::new().route("/v1/account/resolve", post(http::resolve_user)),
        Served::Price(_) => Router::new()
            .route("/v1/price/fetch", post(http::fetch_price))
            .route("/v1/price/watch", get(ws::watch_price)),
        Served::Wallet(_) => Router::new()
            .route("/v1/wallet/balance", post(http::fetch_balance))
            .route("/v1/wallet/watch", get(ws::watch_balance)),
    };

    routes
        .route("/metrics", get(http::metrics))
        .with_state(state)
}
