//! Remote clients for the three services.
//!
//! Unary calls go over `reqwest` with a bounded connect timeout; watch calls
//! dial a WebSocket with the same bound. Failing to reach the peer is
//! `Unavailable`; an error answered by the peer keeps its original code.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};

use coinwallet_core::error::{Result, WalletError};
use coinwallet_core::protocol::{
    decode_frame, BalanceRequest, BalanceResponse, Envelope, Metadata, PriceRequest,
    PriceResponse, ResolveUserRequest, UserInfo,
};

use crate::context::CallContext;
use crate::realtime::{StreamEnd, WatchStream};
use crate::services::{AccountApi, PriceApi, WalletApi};
use crate::transport::codec::{error_from_body, metadata_from_headers, write_metadata};

/// One remote service endpoint.
#[derive(Clone, Debug)]
pub struct Upstream {
    base: String,
    http: reqwest::Client,
    dial_timeout: Duration,
}

impl Upstream {
    /// `base` is `http://host:port` or `https://host:port`. No connection is
    /// made until the first call.
    pub fn new(base: &str, dial_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(dial_timeout)
            .build()
            .map_err(|e| WalletError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            http,
            dial_timeout,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    async fn unary<Req, Resp>(&self, ctx: &CallContext, path: &str, req: Envelope<Req>) -> Result<Envelope<Resp>>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base, path);
        let mut rb = self.http.post(&url).json(&req.payload);
        for (k, v) in req.metadata.iter() {
            rb = rb.header(k, v);
        }
        if let Some(left) = ctx.remaining() {
            rb = rb.timeout(left);
        }

        let resp = tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                return Err(WalletError::Unavailable(format!("{url}: call cancelled")));
            }
            resp = rb.send() => resp.map_err(|e| WalletError::Unavailable(format!("{url}: {e}")))?,
        };

        let status = resp.status();
        let metadata = metadata_from_headers(resp.headers());
        let body = resp
            .bytes()
            .await
            .map_err(|e| WalletError::Unavailable(format!("{url}: reading body: {e}")))?;
        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }
        let payload = serde_json::from_slice(&body)
            .map_err(|e| WalletError::Internal(format!("{url}: malformed response: {e}")))?;
        Ok(Envelope::with_metadata(payload, metadata))
    }

    async fn watch<T>(&self, ctx: &CallContext, path: &str, md: &Metadata) -> Result<Envelope<WatchStream<T>>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let url = format!("{}{}", ws_base(&self.base), path);
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| WalletError::InvalidArgument(format!("{url}: {e}")))?;
        write_metadata(request.headers_mut(), md);

        let dial = tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                return Err(WalletError::Unavailable(format!("{url}: call cancelled")));
            }
            dial = timeout(self.dial_timeout, tokio_tungstenite::connect_async(request)) => dial,
        };
        let (socket, response) = match dial {
            Err(_) => {
                return Err(WalletError::Unavailable(format!(
                    "{url}: dial timed out after {:?}",
                    self.dial_timeout
                )))
            }
            Ok(Err(WsError::Http(resp))) => {
                let body = resp.body().as_deref().unwrap_or_default();
                return Err(error_from_body(resp.status(), body));
            }
            Ok(Err(e)) => return Err(WalletError::Unavailable(format!("{url}: {e}"))),
            Ok(Ok(pair)) => pair,
        };
        let metadata = metadata_from_headers(response.headers());
        tracing::debug!(%url, "stream dialed");

        let stream = WatchStream::spawn(ctx, move |sink| async move {
            let (mut write, mut read) = socket.split();
            let end = loop {
                let msg = tokio::select! {
                    biased;
                    _ = sink.context().cancelled() => break StreamEnd::Cancelled,
                    msg = read.next() => msg,
                };
                let text = match msg {
                    None | Some(Ok(WsMessage::Close(_))) => break StreamEnd::Eof,
                    Some(Err(e)) => {
                        break sink
                            .fail(WalletError::Unavailable(format!("stream broken: {e}")))
                            .await
                    }
                    Some(Ok(WsMessage::Text(text))) => text,
                    Some(Ok(_)) => continue,
                };
                let item = match decode_frame::<T>(&text) {
                    Ok(frame) => frame.into_result(),
                    Err(e) => Err(e),
                };
                match item {
                    Ok(v) => {
                        if let Err(end) = sink.send(Ok(v)).await {
                            break end;
                        }
                    }
                    Err(e) => break sink.fail(e).await,
                }
            };
            // tell the server to stop producing; the socket is dropped either way
            let _ = timeout(Duration::from_secs(1), write.send(WsMessage::Close(None))).await;
            end
        });
        Ok(Envelope::with_metadata(stream, metadata))
    }
}

fn ws_base(base: &str) -> String {
    if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    }
}

#[derive(Clone, Debug)]
pub struct RemoteAccountClient {
    upstream: Upstream,
}

impl RemoteAccountClient {
    pub fn new(base: &str, dial_timeout: Duration) -> Result<Self> {
        Ok(Self {
            upstream: Upstream::new(base, dial_timeout)?,
        })
    }
}

#[async_trait]
impl AccountApi for RemoteAccountClient {
    async fn resolve_user(
        &self,
        ctx: &CallContext,
        req: Envelope<ResolveUserRequest>,
    ) -> Result<Envelope<UserInfo>> {
        self.upstream.unary(ctx, "/v1/account/resolve", req).await
    }
}

#[derive(Clone, Debug)]
pub struct RemotePriceClient {
    upstream: Upstream,
}

impl RemotePriceClient {
    pub fn new(base: &str, dial_timeout: Duration) -> Result<Self> {
        Ok(Self {
            upstream: Upstream::new(base, dial_timeout)?,
        })
    }
}

#[async_trait]
impl PriceApi for RemotePriceClient {
    async fn fetch_price(
        &self,
        ctx: &CallContext,
        req: Envelope<PriceRequest>,
    ) -> Result<Envelope<PriceResponse>> {
        self.upstream.unary(ctx, "/v1/price/fetch", req).await
    }

    async fn watch_price(
        &self,
        ctx: &CallContext,
        req: Envelope<PriceRequest>,
    ) -> Result<Envelope<WatchStream<PriceResponse>>> {
        self.upstream.watch(ctx, "/v1/price/watch", &req.metadata).await
    }
}

#[derive(Clone, Debug)]
pub struct RemoteWalletClient {
    upstream: Upstream,
}

impl RemoteWalletClient {
    pub fn new(base: &str, dial_timeout: Duration) -> Result<Self> {
        Ok(Self {
            upstream: Upstream::new(base, dial_timeout)?,
        })
    }
}

#[async_trait]
impl WalletApi for RemoteWalletClient {
    async fn fetch_balance(
        &self,
        ctx: &CallContext,
        req: Envelope<BalanceRequest>,
    ) -> Result<Envelope<BalanceResponse>> {
        self.upstream.unary(ctx, "/v1/wallet/balance", req).await
    }

    async fn watch_balance(
        &self,
        ctx: &CallContext,
        req: Envelope<BalanceRequest>,
    ) -> Result<Envelope<WatchStream<BalanceResponse>>> {
        let path = format!(
            "/v1/wallet/watch?include_balance_per_address={}",
            req.payload.include_balance_per_address
        );
        self.upstream.watch(ctx, &path, &req.metadata).await
    }
}
