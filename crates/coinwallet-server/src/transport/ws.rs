//! WebSocket handlers for the watch calls.
//!
//! Membership is validated while the request is still plain HTTP, so a
//! rejected caller gets an ordinary error response and no upgrade. After the
//! upgrade each stream item becomes one text frame.

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};

use coinwallet_core::error::Result;
use coinwallet_core::protocol::{encode_frame, BalanceRequest, Envelope, PriceRequest, StreamFrame};

use crate::app_state::AppState;
use crate::context::{CallContext, CancelHandle};
use crate::realtime::WatchStream;
use crate::transport::codec::{error_response, metadata_from_headers, write_metadata};

#[derive(Debug, Default, Deserialize)]
pub struct WatchQuery {
    #[serde(default)]
    pub include_balance_per_address: bool,
}

pub async fn watch_price(
    State(app): State<AppState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let (ctx, call) = CallContext::new();
    let opened = async {
        let svc = app.price()?;
        svc.watch_price(&ctx, Envelope::with_metadata(PriceRequest {}, metadata_from_headers(&headers)))
            .await
    }
    .await;
    upgrade(ws, opened, call, app.hostname())
}

pub async fn watch_balance(
    State(app): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<WatchQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let (ctx, call) = CallContext::new();
    let req = BalanceRequest {
        include_balance_per_address: q.include_balance_per_address,
    };
    let opened = async {
        let svc = app.wallet()?;
        svc.watch_balance(&ctx, Envelope::with_metadata(req, metadata_from_headers(&headers)))
            .await
    }
    .await;
    upgrade(ws, opened, call, app.hostname())
}

fn upgrade<T>(
    ws: WebSocketUpgrade,
    opened: Result<Envelope<WatchStream<T>>>,
    call: CancelHandle,
    hostname: &str,
) -> Response
where
    T: Serialize + Send + 'static,
{
    match opened {
        Err(e) => {
            tracing::debug!(code = %e.code(), error = %e, "watch rejected");
            error_response(&e, hostname)
        }
        Ok(Envelope { payload, metadata }) => {
            // `call` rides along with the socket; if the upgrade never
            // happens it is dropped here, which cancels the stream.
            let mut resp = ws.on_upgrade(move |socket| pump(socket, payload, call));
            write_metadata(resp.headers_mut(), &metadata);
            resp
        }
    }
}

/// Forward stream items to the socket until either side ends.
async fn pump<T: Serialize>(socket: WebSocket, mut stream: WatchStream<T>, call: CancelHandle) {
    let (mut tx, mut rx) = socket.split();

    loop {
        tokio::select! {
            item = stream.recv() => {
                let Some(item) = item else {
                    let _ = tx.send(close(close_code::NORMAL, "")).await;
                    break;
                };
                let failed = item.is_err();
                let text = match encode_frame(&StreamFrame::from(item)) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(error = %e, "frame encode failed");
                        let _ = tx.send(close(close_code::ERROR, "encode failed")).await;
                        break;
                    }
                };
                if tx.send(Message::Text(text)).await.is_err() {
                    break;
                }
                if failed {
                    let _ = tx.send(close(close_code::NORMAL, "")).await;
                    break;
                }
            }

            incoming = rx.next() => match incoming {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!("watch socket closed");
    call.cancel();
}

fn close(code: u16, reason: &'static str) -> Message {
    Message::Close(Some(CloseFrame {
        code,
        reason: reason.into(),
    }))
}
