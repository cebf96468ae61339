use super::stage::{GraphBuilder, Ports};
use super::{Pipeline, Topology};
use crate::config::RuntimeConfig;
use crate::core::NodeSpec;
use crate::errors::{GraphError, TopologyError};
use crate::nodes::Identity;

/// One emitter distributing to N workers, with an optional collector.
///
/// The emitter's `send` goes round-robin over the workers and `send_to(i)`
/// targets worker `i`. Without a collector the workers are the farm's outputs.
pub struct Farm<T> {
    emitter: Option<NodeSpec<T>>,
    workers: Vec<NodeSpec<T>>,
    collector: Option<NodeSpec<T>>,
    channel_capacity: Option<usize>,
}

impl<T> Default for Farm<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Farm<T> {
    pub fn new() -> Self {
        Self {
            emitter: None,
            workers: Vec::new(),
            collector: None,
            channel_capacity: None,
        }
    }

    pub fn add_emitter(mut self, emitter: NodeSpec<T>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn add_workers(mut self, workers: impl IntoIterator<Item = NodeSpec<T>>) -> Self {
        self.workers.extend(workers);
        self
    }

    pub fn add_collector(mut self, collector: Option<NodeSpec<T>>) -> Self {
        self.collector = collector;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl<T: Send + 'static> Farm<T> {
    /// Build the farm alone, without an enclosing pipeline
    pub fn build(self, config: &RuntimeConfig) -> Result<Topology<T>, GraphError> {
        Pipeline::new().add_stage(self).build(config)
    }

    pub(crate) fn compile(
        self,
        builder: &mut GraphBuilder<T>,
        has_upstream: bool,
        inherited_capacity: usize,
    ) -> Result<Ports, TopologyError> {
        if self.workers.is_empty() {
            return Err(TopologyError::EmptyFarm);
        }
        let capacity = self.channel_capacity.unwrap_or(inherited_capacity);

        // With nothing upstream and no emitter, the workers are the sources.
        let emitter = match self.emitter {
            Some(spec) => Some(builder.add_node(spec, false, true)),
            None if has_upstream => {
                Some(builder.add_node(NodeSpec::mimo("farm-emitter", Identity), false, true))
            }
            None => None,
        };

        let workers: Vec<usize> = self
            .workers
            .into_iter()
            .map(|worker| builder.add_node(worker, false, false))
            .collect();

        if let Some(emitter) = emitter {
            for &worker in &workers {
                builder.connect(emitter, worker, capacity);
            }
        }

        let collector = self
            .collector
            .map(|spec| builder.add_node(spec, true, false));
        if let Some(collector) = collector {
            for &worker in &workers {
                builder.connect(worker, collector, capacity);
            }
        }

        Ok(Ports {
            inputs: emitter.map(|e| vec![e]).unwrap_or_else(|| workers.clone()),
            outputs: collector.map(|c| vec![c]).unwrap_or(workers),
        })
    }
}
