use super::Session;
use crate::config::RuntimeConfig;
use crate::core::{Channel, NodeRef, NodeSpec};
use crate::errors::GraphError;
use crate::observability::RunReport;
use serde::{Deserialize, Serialize};

/// A node with the channel positions wired to it
pub(crate) struct NodeSlot<T> {
    pub spec: NodeSpec<T>,
    pub inputs: Vec<usize>,
    pub outputs: Vec<usize>,
    pub multi_input: bool,
    pub multi_output: bool,
}

/// Shape of a built graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologySummary {
    pub nodes: usize,
    pub channels: usize,
    pub sources: usize,
    pub sinks: usize,
}

/// A built graph: owns every node and channel, reusable across runs
pub struct Topology<T> {
    pub(crate) nodes: Vec<NodeSlot<T>>,
    pub(crate) channels: Vec<Channel<T>>,
    pub(crate) config: RuntimeConfig,
    pub(crate) runs: u64,
}

impl<T> Topology<T> {
    pub(crate) fn new(nodes: Vec<NodeSlot<T>>, channels: Vec<Channel<T>>, config: RuntimeConfig) -> Self {
        Self {
            nodes,
            channels,
            config,
            runs: 0,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Number of runs started on this topology
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Nodes in topology order, which is also the order of run reports
    pub fn node_refs(&self) -> Vec<NodeRef> {
        self.nodes.iter().map(|slot| slot.spec.node_ref()).collect()
    }

    /// Input and output channel counts of a node, by name
    pub fn degree(&self, name: &str) -> Option<(usize, usize)> {
        self.nodes
            .iter()
            .find(|slot| slot.spec.name() == name)
            .map(|slot| (slot.inputs.len(), slot.outputs.len()))
    }

    pub fn summary(&self) -> TopologySummary {
        TopologySummary {
            nodes: self.nodes.len(),
            channels: self.channels.len(),
            sources: self.nodes.iter().filter(|slot| slot.inputs.is_empty()).count(),
            sinks: self.nodes.iter().filter(|slot| slot.outputs.is_empty()).count(),
        }
    }
}

impl<T: Send + 'static> Topology<T> {
    pub fn session(&mut self) -> Session<'_, T> {
        Session::new(self)
    }

    /// Run the graph and block until every node has terminated
    pub fn run_and_wait_end(&mut self) -> Result<RunReport, GraphError> {
        self.session().run_and_wait_end()
    }
}

impl<T> std::fmt::Debug for Topology<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topology")
            .field("summary", &self.summary())
            .field("runs", &self.runs)
            .finish()
    }
}
