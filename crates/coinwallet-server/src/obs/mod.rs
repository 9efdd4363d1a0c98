//! Observability helpers: in-process metrics and upstream host reporting.

pub mod metrics;

pub use metrics::{ServiceMetrics, StreamGuard};

/// Surface the `hostname` an upstream answered with. Operator log only.
pub fn log_upstream_host(upstream: &str, hostname: Option<&str>) {
    match hostname {
        Some(host) => tracing::info!(upstream, server_host = %host, "server host"),
        None => tracing::warn!(upstream, "server host: no hostname"),
    }
}
