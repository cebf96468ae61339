use super::{MetricsSnapshot, NodeMetrics};
use crate::core::NodeId;
use std::sync::Arc;

/// Metrics of every node taking part in one run, in topology order
#[derive(Clone, Default)]
pub struct MetricsCollector {
    metrics: Vec<(NodeId, Arc<NodeMetrics>)>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, node: NodeId, metrics: Arc<NodeMetrics>) {
        self.metrics.push((node, metrics));
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn snapshot(&self) -> Vec<(NodeId, MetricsSnapshot)> {
        self.metrics
            .iter()
            .map(|(id, metrics)| (*id, metrics.snapshot()))
            .collect()
    }

    pub fn get_node_metrics(&self, node: NodeId) -> Option<Arc<NodeMetrics>> {
        self.metrics
            .iter()
            .find(|(id, _)| *id == node)
            .map(|(_, metrics)| metrics.clone())
    }

    /// Total items sent by every node of the run
    pub fn total_items_sent(&self) -> u64 {
        self.metrics.iter().map(|(_, m)| m.items_sent()).sum()
    }
}
