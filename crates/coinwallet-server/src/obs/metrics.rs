//! In-process counters for the services, rendered as Prometheus text on
//! `/metrics`.
//!
//! Label sets are sorted before lookup so `[("a",..),("b",..)]` and
//! `[("b",..),("a",..)]` hit the same series.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut key: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn label_str(key: &[(String, String)]) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", name, label_str(r.key()), val);
        }
    }
}

#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<Vec<(String, String)>, AtomicI64>,
}

impl GaugeVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) { self.add(labels, 1); }
    /// Decrement by 1.
    pub fn dec(&self, labels: &[(&str, &str)]) { self.add(labels, -1); }

    /// Add an arbitrary signed delta.
    pub fn add(&self, labels: &[(&str, &str)], v: i64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0));
        gauge.fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> i64 {
        self.map
            .get(&label_key(labels))
            .map(|g| g.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} gauge", name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", name, label_str(r.key()), val);
        }
    }
}

#[derive(Default)]
pub struct ServiceMetrics {
    /// Membership validations by outcome.
    pub validations: CounterVec,
    /// Open streams by service.
    pub streams_active: GaugeVec,
    /// Items pushed into streams by service.
    pub stream_updates: CounterVec,
}

impl ServiceMetrics {
    pub fn active_streams(&self, svc: &str) -> i64 {
        self.streams_active.get(&[("svc", svc)])
    }

    /// Count a stream as open until the guard is dropped.
    pub fn stream_guard(self: &Arc<Self>, svc: &'static str) -> StreamGuard {
        self.streams_active.inc(&[("svc", svc)]);
        StreamGuard {
            metrics: Arc::clone(self),
            svc,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.validations.render("coinwallet_validations_total", &mut out);
        self.streams_active.render("coinwallet_streams_active", &mut out);
        self.stream_updates.render("coinwallet_stream_updates_total", &mut out);
        out
    }
}

pub struct StreamGuard {
    metrics: Arc<ServiceMetrics>,
    svc: &'static str,
}

impl StreamGuard {
    pub fn record_update(&self) {
        self.metrics.stream_updates.inc(&[("svc", self.svc)]);
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.metrics.streams_active.dec(&[("svc", self.svc)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_tracks_open_streams() {
        let m = Arc::new(ServiceMetrics::default());
        let g1 = m.stream_guard("price");
        let g2 = m.stream_guard("price");
        g1.record_update();
        assert_eq!(m.active_streams("price"), 2);
        drop(g1);
        drop(g2);
        assert_eq!(m.active_streams("price"), 0);
        assert_eq!(m.stream_updates.get(&[("svc", "price")]), 1);
    }

    #[test]
    fn render_is_prometheus_text() {
        let m = ServiceMetrics::default();
        m.validations.inc(&[("outcome", "authorized")]);
        let out = m.render();
        assert!(out.contains("# TYPE coinwallet_validations_total counter"));
        assert!(out.contains("coinwallet_validations_total{outcome=\"authorized\"} 1"));
    }
}
