use super::stage::{GraphBuilder, Ports};
use super::{Pipeline, Topology};
use crate::config::RuntimeConfig;
use crate::core::NodeSpec;
use crate::errors::{GraphError, TopologyError};

/// Full bipartite mesh between a first set and a second set of nodes.
///
/// First-set node outputs are indexed like the second set, so
/// `send_to(item, j)` reaches the j-th second-set node. Second-set inputs are
/// indexed like the first set.
pub struct AllToAll<T> {
    first: Vec<NodeSpec<T>>,
    second: Vec<NodeSpec<T>>,
    channel_capacity: Option<usize>,
}

impl<T> Default for AllToAll<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AllToAll<T> {
    pub fn new() -> Self {
        Self {
            first: Vec::new(),
            second: Vec::new(),
            channel_capacity: None,
        }
    }

    pub fn add_firstset(mut self, nodes: impl IntoIterator<Item = NodeSpec<T>>) -> Self {
        self.first.extend(nodes);
        self
    }

    pub fn add_secondset(mut self, nodes: impl IntoIterator<Item = NodeSpec<T>>) -> Self {
        self.second.extend(nodes);
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    /// Number of channels in the mesh
    pub fn edge_count(&self) -> usize {
        self.first.len() * self.second.len()
    }
}

impl<T: Send + 'static> AllToAll<T> {
    /// Build the all-to-all alone, without an enclosing pipeline
    pub fn build(self, config: &RuntimeConfig) -> Result<Topology<T>, GraphError> {
        Pipeline::new().add_stage(self).build(config)
    }

    pub(crate) fn compile(
        self,
        builder: &mut GraphBuilder<T>,
        inherited_capacity: usize,
    ) -> Result<Ports, TopologyError> {
        if self.first.is_empty() {
            return Err(TopologyError::EmptyFirstSet);
        }
        if self.second.is_empty() {
            return Err(TopologyError::EmptySecondSet);
        }
        let capacity = self.channel_capacity.unwrap_or(inherited_capacity);

        let first: Vec<usize> = self
            .first
            .into_iter()
            .map(|spec| builder.add_node(spec, false, true))
            .collect();
        let second: Vec<usize> = self
            .second
            .into_iter()
            .map(|spec| builder.add_node(spec, true, false))
            .collect();

        for &from in &first {
            for &to in &second {
                builder.connect(from, to, capacity);
            }
        }

        Ok(Ports {
            inputs: first,
            outputs: second,
        })
    }
}
