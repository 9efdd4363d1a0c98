//! Single-buffered, cancellable server-push stream.
//!
//! A producer task writes into a one-slot channel; a slow consumer therefore
//! blocks the producer on `send` instead of growing a queue. Dropping the
//! `WatchStream` cancels the producer's context, and so does cancelling the
//! context the stream was opened under.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;

use coinwallet_core::error::{Result, WalletError};

use crate::context::{CallContext, CancelHandle};

/// Why a stream reached CLOSED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// Upstream finished normally.
    Eof,
    /// A terminal error was delivered as the last item.
    Failed,
    /// The caller (or an ancestor context) cancelled.
    Cancelled,
    /// The consumer went away without cancelling.
    ReceiverGone,
}

/// Consumer side.
pub struct WatchStream<T> {
    rx: mpsc::Receiver<Result<T>>,
    _cancel: CancelHandle,
}

/// Producer side.
pub struct StreamSink<T> {
    tx: mpsc::Sender<Result<T>>,
    ctx: CallContext,
}

impl<T: Send + 'static> WatchStream<T> {
    /// Spawn `producer` under a child of `parent` and return the consumer.
    pub fn spawn<F, Fut>(parent: &CallContext, producer: F) -> Self
    where
        F: FnOnce(StreamSink<T>) -> Fut,
        Fut: Future<Output = StreamEnd> + Send + 'static,
    {
        let (ctx, cancel) = parent.child();
        let (tx, rx) = mpsc::channel(1);
        let fut = producer(StreamSink { tx, ctx });
        tokio::spawn(async move {
            let end = fut.await;
            tracing::debug!(?end, "stream closed");
        });
        Self { rx, _cancel: cancel }
    }
}

impl<T> WatchStream<T> {
    /// Next item; `None` once the stream is closed.
    pub async fn recv(&mut self) -> Option<Result<T>> {
        self.rx.recv().await
    }
}

impl<T> Stream for WatchStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl<T> StreamSink<T> {
    pub fn context(&self) -> &CallContext {
        &self.ctx
    }

    /// Deliver one item, waiting for the consumer to take the previous one.
    pub async fn send(&self, item: Result<T>) -> std::result::Result<(), StreamEnd> {
        tokio::select! {
            biased;
            _ = self.ctx.cancelled() => Err(StreamEnd::Cancelled),
            sent = self.tx.send(item) => sent.map_err(|_| StreamEnd::ReceiverGone),
        }
    }

    /// Deliver a terminal error and close.
    pub async fn fail(&self, err: WalletError) -> StreamEnd {
        tracing::debug!(code = %err.code(), error = %err, "stream failed");
        match self.send(Err(err)).await {
            Ok(()) => StreamEnd::Failed,
            Err(end) => end,
        }
    }
}
