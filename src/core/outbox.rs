use super::Channel;
use crate::errors::SendError;
use crate::observability::NodeMetrics;

/// A node's view of its output channels during one run.
///
/// `send` goes to the only output, or round-robin when there are several.
/// `send_to` selects an output by index and is reserved to multi-output nodes.
pub struct Outbox<'a, T> {
    node: &'a str,
    outputs: &'a [&'a Channel<T>],
    multi_output: bool,
    cursor: usize,
    metrics: &'a NodeMetrics,
}

impl<'a, T> Outbox<'a, T> {
    pub(crate) fn new(
        node: &'a str,
        outputs: &'a [&'a Channel<T>],
        multi_output: bool,
        metrics: &'a NodeMetrics,
    ) -> Self {
        Self {
            node,
            outputs,
            multi_output,
            cursor: 0,
            metrics,
        }
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_multi_output(&self) -> bool {
        self.multi_output
    }

    /// Items sent by a node with no output channel are discarded and counted
    pub fn send(&mut self, item: T) -> Result<(), SendError> {
        match self.outputs.len() {
            0 => {
                self.metrics.record_discarded();
                tracing::trace!(node = self.node, "no output channel, item discarded");
                Ok(())
            }
            1 => self.push(0, item),
            n => {
                let index = self.cursor;
                self.cursor = (index + 1) % n;
                self.push(index, item)
            }
        }
    }

    pub fn send_to(&mut self, item: T, index: usize) -> Result<(), SendError> {
        if !self.multi_output {
            return Err(SendError::NotMultiOutput {
                node: self.node.to_string(),
            });
        }
        if index >= self.outputs.len() {
            return Err(SendError::IndexOutOfRange {
                node: self.node.to_string(),
                index,
                outputs: self.outputs.len(),
            });
        }
        self.push(index, item)
    }

    /// Send a copy of `item` on every output channel
    pub fn broadcast(&mut self, item: T) -> Result<(), SendError>
    where
        T: Clone,
    {
        if self.outputs.is_empty() {
            return self.send(item);
        }
        let last = self.outputs.len() - 1;
        for index in 0..last {
            self.push(index, item.clone())?;
        }
        self.push(last, item)
    }

    fn push(&mut self, index: usize, item: T) -> Result<(), SendError> {
        self.outputs[index].push(item)?;
        self.metrics.record_item_sent();
        Ok(())
    }
}
