use super::stage::{GraphBuilder, Ports, Stage};
use super::Topology;
use crate::config::RuntimeConfig;
use crate::errors::{GraphError, TopologyError};

/// Linear chain of stages; stage k's outputs feed stage k+1's inputs
pub struct Pipeline<T> {
    stages: Vec<Stage<T>>,
    channel_capacity: Option<usize>,
}

impl<T> Default for Pipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pipeline<T> {
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            channel_capacity: None,
        }
    }

    pub fn add_stage(mut self, stage: impl Into<Stage<T>>) -> Self {
        self.stages.push(stage.into());
        self
    }

    /// Capacity of the channels created between this pipeline's stages
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl<T: Send + 'static> Pipeline<T> {
    /// Validate the wiring and produce a runnable topology
    pub fn build(self, config: &RuntimeConfig) -> Result<Topology<T>, GraphError> {
        let mut builder = GraphBuilder::new();
        self.compile(&mut builder, false, config.channel_capacity)?;
        let topology = builder.finish(config)?;
        tracing::debug!(
            nodes = topology.node_count(),
            channels = topology.channel_count(),
            "pipeline built"
        );
        Ok(topology)
    }

    pub(crate) fn compile(
        self,
        builder: &mut GraphBuilder<T>,
        has_upstream: bool,
        inherited_capacity: usize,
    ) -> Result<Ports, TopologyError> {
        if self.stages.is_empty() {
            return Err(TopologyError::EmptyPipeline);
        }
        let capacity = self.channel_capacity.unwrap_or(inherited_capacity);

        let mut ports: Option<Ports> = None;
        for stage in self.stages {
            let upstream = has_upstream || ports.is_some();
            let next = stage.compile(builder, upstream, capacity)?;
            ports = Some(match ports {
                None => next,
                Some(previous) => {
                    builder.link(&previous.outputs, &next.inputs, capacity)?;
                    Ports {
                        inputs: previous.inputs,
                        outputs: next.outputs,
                    }
                }
            });
        }
        ports.ok_or(TopologyError::EmptyPipeline)
    }
}
