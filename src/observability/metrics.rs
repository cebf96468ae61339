use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Per-node counters, shared between the node thread and the session
pub struct NodeMetrics {
    node: String,
    items_received: AtomicU64,
    items_sent: AtomicU64,
    items_discarded: AtomicU64,
    service_calls: AtomicU64,
    errors_count: AtomicU64,
    total_latency_us: AtomicU64,
}

/// Point-in-time copy of a node's counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub node: String,
    pub items_received: u64,
    pub items_sent: u64,
    pub items_discarded: u64,
    pub service_calls: u64,
    pub errors_count: u64,
    pub avg_latency_us: u64,
}

impl NodeMetrics {
    pub fn new(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            items_received: AtomicU64::new(0),
            items_sent: AtomicU64::new(0),
            items_discarded: AtomicU64::new(0),
            service_calls: AtomicU64::new(0),
            errors_count: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
        }
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn items_received(&self) -> u64 {
        self.items_received.load(Ordering::Relaxed)
    }

    pub fn items_sent(&self) -> u64 {
        self.items_sent.load(Ordering::Relaxed)
    }

    pub fn items_discarded(&self) -> u64 {
        self.items_discarded.load(Ordering::Relaxed)
    }

    pub fn service_calls(&self) -> u64 {
        self.service_calls.load(Ordering::Relaxed)
    }

    pub fn errors_count(&self) -> u64 {
        self.errors_count.load(Ordering::Relaxed)
    }

    pub fn record_item_received(&self) {
        self.items_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_item_sent(&self) {
        self.items_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discarded(&self) {
        self.items_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn start_service(&self) -> Instant {
        Instant::now()
    }

    pub fn finish_service(&self, start: Instant) {
        let latency_us = start.elapsed().as_micros() as u64;
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);
        self.service_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn avg_latency_us(&self) -> u64 {
        let calls = self.service_calls();
        if calls == 0 {
            return 0;
        }
        self.total_latency_us.load(Ordering::Relaxed) / calls
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            node: self.node.clone(),
            items_received: self.items_received(),
            items_sent: self.items_sent(),
            items_discarded: self.items_discarded(),
            service_calls: self.service_calls(),
            errors_count: self.errors_count(),
            avg_latency_us: self.avg_latency_us(),
        }
    }
}
