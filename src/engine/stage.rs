use super::topology::{NodeSlot, Topology};
use super::{AllToAll, Farm, Pipeline};
use crate::config::RuntimeConfig;
use crate::core::{Channel, NodeSpec};
use crate::errors::TopologyError;

/// Anything that can sit in a pipeline
pub enum Stage<T> {
    Node(NodeSpec<T>),
    Farm(Farm<T>),
    AllToAll(AllToAll<T>),
    Pipeline(Pipeline<T>),
}

impl<T> From<NodeSpec<T>> for Stage<T> {
    fn from(node: NodeSpec<T>) -> Self {
        Stage::Node(node)
    }
}

impl<T> From<Farm<T>> for Stage<T> {
    fn from(farm: Farm<T>) -> Self {
        Stage::Farm(farm)
    }
}

impl<T> From<AllToAll<T>> for Stage<T> {
    fn from(a2a: AllToAll<T>) -> Self {
        Stage::AllToAll(a2a)
    }
}

impl<T> From<Pipeline<T>> for Stage<T> {
    fn from(pipeline: Pipeline<T>) -> Self {
        Stage::Pipeline(pipeline)
    }
}

impl<T: Send + 'static> Stage<T> {
    pub(crate) fn compile(
        self,
        builder: &mut GraphBuilder<T>,
        has_upstream: bool,
        capacity: usize,
    ) -> Result<Ports, TopologyError> {
        match self {
            Stage::Node(spec) => {
                let slot = builder.add_node(spec, false, false);
                Ok(Ports {
                    inputs: vec![slot],
                    outputs: vec![slot],
                })
            }
            Stage::Farm(farm) => farm.compile(builder, has_upstream, capacity),
            Stage::AllToAll(a2a) => a2a.compile(builder, capacity),
            Stage::Pipeline(pipeline) => pipeline.compile(builder, has_upstream, capacity),
        }
    }
}

/// Entry and exit nodes of a compiled stage, as slot positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Ports {
    pub inputs: Vec<usize>,
    pub outputs: Vec<usize>,
}

/// Flattens composers into node slots and channels
pub(crate) struct GraphBuilder<T> {
    nodes: Vec<NodeSlot<T>>,
    channels: Vec<Channel<T>>,
}

impl<T> GraphBuilder<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            channels: Vec::new(),
        }
    }

    /// Composers grant multi-input or multi-output on top of the declared arity
    pub fn add_node(&mut self, spec: NodeSpec<T>, multi_input: bool, multi_output: bool) -> usize {
        let arity = spec.arity();
        self.nodes.push(NodeSlot {
            multi_input: multi_input || arity.is_multi_input(),
            multi_output: multi_output || arity.is_multi_output(),
            spec,
            inputs: Vec::new(),
            outputs: Vec::new(),
        });
        self.nodes.len() - 1
    }

    /// Output indices of `from` follow the order of `connect` calls
    pub fn connect(&mut self, from: usize, to: usize, capacity: usize) {
        let channel = self.channels.len();
        self.channels.push(Channel::new(capacity));
        self.nodes[from].outputs.push(channel);
        self.nodes[to].inputs.push(channel);
    }

    /// Wire the exit nodes of one stage to the entry nodes of the next
    pub fn link(
        &mut self,
        upstream: &[usize],
        downstream: &[usize],
        capacity: usize,
    ) -> Result<(), TopologyError> {
        match (upstream, downstream) {
            ([from], [to]) => self.connect(*from, *to, capacity),
            ([from], many) => {
                if !self.nodes[*from].multi_output {
                    return Err(self.mismatch(upstream, downstream, "producer is not multi-output"));
                }
                for to in many {
                    self.connect(*from, *to, capacity);
                }
            }
            (many, [to]) => {
                if !self.nodes[*to].multi_input {
                    return Err(self.mismatch(upstream, downstream, "consumer is not multi-input"));
                }
                for from in many {
                    self.connect(*from, *to, capacity);
                }
            }
            (froms, tos) => {
                let mesh = froms.iter().all(|&from| self.nodes[from].multi_output)
                    && tos.iter().all(|&to| self.nodes[to].multi_input);
                if mesh {
                    for &from in froms {
                        for &to in tos {
                            self.connect(from, to, capacity);
                        }
                    }
                } else if froms.len() == tos.len() {
                    for (&from, &to) in froms.iter().zip(tos) {
                        self.connect(from, to, capacity);
                    }
                } else {
                    let reason = format!(
                        "{} outputs cannot be paired with {} inputs",
                        froms.len(),
                        tos.len()
                    );
                    return Err(self.mismatch(upstream, downstream, &reason));
                }
            }
        }
        Ok(())
    }

    pub fn finish(self, config: &RuntimeConfig) -> Result<Topology<T>, TopologyError> {
        for slot in &self.nodes {
            if let Some(declared) = slot.spec.fanout() {
                if declared != slot.outputs.len() {
                    return Err(TopologyError::FanoutMismatch {
                        node: slot.spec.name().to_string(),
                        declared,
                        wired: slot.outputs.len(),
                    });
                }
            }
        }
        Ok(Topology::new(self.nodes, self.channels, config.clone()))
    }

    fn mismatch(&self, upstream: &[usize], downstream: &[usize], reason: &str) -> TopologyError {
        TopologyError::ArityMismatch {
            upstream: self.describe(upstream),
            downstream: self.describe(downstream),
            reason: reason.to_string(),
        }
    }

    fn describe(&self, slots: &[usize]) -> String {
        let names: Vec<&str> = slots.iter().map(|&s| self.nodes[s].spec.name()).collect();
        match names.as_slice() {
            [single] => format!("node '{}'", single),
            many => format!("nodes [{}]", many.join(", ")),
        }
    }
}
