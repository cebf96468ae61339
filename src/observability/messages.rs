//! Structured log messages for the run lifecycle.
//!
//! Each message renders a human-readable line through `Display` and emits it
//! with its fields attached through [`StructuredLog::log`].

use crate::core::NodeRef;
use crate::errors::Hook;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub trait StructuredLog: Display {
    fn log(&self);
}

pub struct RunStarted {
    pub run_index: u64,
    pub node_count: usize,
    pub channel_count: usize,
}

impl Display for RunStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting run {}: {} nodes, {} channels",
            self.run_index, self.node_count, self.channel_count
        )
    }
}

impl StructuredLog for RunStarted {
    fn log(&self) {
        tracing::info!(
            run_index = self.run_index,
            node_count = self.node_count,
            channel_count = self.channel_count,
            "{}", self
        );
    }
}

pub struct RunCompleted {
    pub run_index: u64,
    pub node_count: usize,
    pub duration: Duration,
}

impl Display for RunCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Run {} completed: {} nodes terminated in {:?}",
            self.run_index, self.node_count, self.duration
        )
    }
}

impl StructuredLog for RunCompleted {
    fn log(&self) {
        tracing::info!(
            run_index = self.run_index,
            node_count = self.node_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

pub struct InitializationFailed<'a> {
    pub node: &'a NodeRef,
    pub error: &'a anyhow::Error,
}

impl Display for InitializationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node {} failed to initialize: {:#}", self.node, self.error)
    }
}

impl StructuredLog for InitializationFailed<'_> {
    fn log(&self) {
        tracing::error!(node = %self.node, error = %self.error, "{}", self);
    }
}

pub struct NodeFaulted<'a> {
    pub node: &'a NodeRef,
    pub hook: Hook,
    pub error: &'a anyhow::Error,
}

impl Display for NodeFaulted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node {} faulted in {}: {:#}", self.node, self.hook, self.error)
    }
}

impl StructuredLog for NodeFaulted<'_> {
    fn log(&self) {
        tracing::error!(
            node = %self.node,
            hook = %self.hook,
            error = %self.error,
            "{}", self
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NodeId;

    #[test]
    fn test_node_faulted_display() {
        let node = NodeRef {
            id: NodeId::next(),
            name: "router".to_string(),
        };
        let error = anyhow::anyhow!("bad item");
        let msg = NodeFaulted {
            node: &node,
            hook: Hook::Service,
            error: &error,
        };

        let text = msg.to_string();
        assert!(text.starts_with("Node router#"));
        assert!(text.ends_with("faulted in service: bad item"));
    }
}
