//! Per-call cancellation and deadline handle.
//!
//! A `CallContext` is cancelled when its `CancelHandle` is cancelled or
//! dropped, when any ancestor context is cancelled, or when its deadline
//! passes. Operations that may suspend take a `&CallContext` and race their
//! work against `cancelled()`.

use futures_util::future::select_all;
use tokio::sync::watch;
use tokio::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct CallContext {
    // own signal last; ancestors first
    signals: Vec<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Owner side of a context. Dropping it cancels the context.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl CallContext {
    /// Root context with no deadline.
    pub fn new() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                signals: vec![rx],
                deadline: None,
            },
            CancelHandle { tx },
        )
    }

    /// Child context: cancelled with this one, or on its own handle.
    pub fn child(&self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let mut signals = self.signals.clone();
        signals.push(rx);
        (
            Self {
                signals,
                deadline: self.deadline,
            },
            CancelHandle { tx },
        )
    }

    /// Tighten the deadline; a later deadline than the current one is ignored.
    pub fn with_deadline(mut self, at: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(cur) => cur.min(at),
            None => at,
        });
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, if one is set.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    pub fn is_cancelled(&self) -> bool {
        if let Some(at) = self.deadline {
            if Instant::now() >= at {
                return true;
            }
        }
        self.signals
            .iter()
            .any(|rx| *rx.borrow() || rx.has_changed().is_err())
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        let waits = self.signals.iter().cloned().map(|mut rx| {
            Box::pin(async move {
                // Err: the handle was dropped, which cancels too.
                let _ = rx.wait_for(|cancelled| *cancelled).await;
            })
        });
        let any = select_all(waits);

        match self.deadline {
            Some(at) => {
                tokio::select! {
                    _ = any => {}
                    _ = tokio::time::sleep_until(at) => {}
                }
            }
            None => {
                any.await;
            }
        }
    }
}
