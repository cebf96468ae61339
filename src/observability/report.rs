use super::MetricsSnapshot;
use crate::core::NodeRef;
use crate::engine::NodeState;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of one node in a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeReport {
    pub node: NodeRef,
    pub state: NodeState,
    pub metrics: MetricsSnapshot,
}

/// What `run_and_wait_end` returns for a run where every node terminated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Zero-based index of the run on its topology
    pub run_index: u64,
    pub duration: Duration,
    pub nodes: Vec<NodeReport>,
}

impl RunReport {
    pub fn node(&self, name: &str) -> Option<&NodeReport> {
        self.nodes.iter().find(|report| report.node.name == name)
    }

    pub fn all_terminated(&self) -> bool {
        self.nodes
            .iter()
            .all(|report| report.state == NodeState::Terminated)
    }

    pub fn total_items_sent(&self) -> u64 {
        self.nodes.iter().map(|report| report.metrics.items_sent).sum()
    }
}
