//! Error types of the runtime.
//!
//! Build-time problems surface as [`TopologyError`] from `build`; problems of a
//! running graph surface as [`GraphError`] from `run_and_wait_end`. Errors
//! raised by user hooks are carried as `anyhow::Error`.

use crate::core::NodeRef;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("channel is closed")]
    Closed,

    #[error("channel is disconnected")]
    Disconnected,
}

/// Errors raised by `Outbox` operations inside a hook
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("node '{node}' is not multi-output, send_to is not available")]
    NotMultiOutput { node: String },

    #[error("node '{node}' has {outputs} outputs, index {index} is out of range")]
    IndexOutOfRange {
        node: String,
        index: usize,
        outputs: usize,
    },

    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// Invalid graph shapes, detected while building
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("pipeline has no stages")]
    EmptyPipeline,

    #[error("farm has no workers")]
    EmptyFarm,

    #[error("all-to-all first set is empty")]
    EmptyFirstSet,

    #[error("all-to-all second set is empty")]
    EmptySecondSet,

    #[error("cannot connect {upstream} to {downstream}: {reason}")]
    ArityMismatch {
        upstream: String,
        downstream: String,
        reason: String,
    },

    #[error("node '{node}' declares {declared} outputs but is wired to {wired}")]
    FanoutMismatch {
        node: String,
        declared: usize,
        wired: usize,
    },
}

/// Where a fault happened: a lifecycle hook, or the node thread itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Service,
    EndOfStreamNotify,
    End,
    Runtime,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Hook::Service => "service",
            Hook::EndOfStreamNotify => "end_of_stream_notify",
            Hook::End => "end",
            Hook::Runtime => "runtime",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("invalid topology: {0}")]
    Topology(#[from] TopologyError),

    #[error("node {node} failed to initialize: {source}")]
    Initialization {
        node: NodeRef,
        #[source]
        source: anyhow::Error,
    },

    #[error("node {node} faulted in {hook}: {source}")]
    RuntimeFault {
        node: NodeRef,
        hook: Hook,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to spawn thread for node {node}: {source}")]
    Spawn {
        node: NodeRef,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid run state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl GraphError {
    /// The node the error originates from, when there is one
    pub fn node(&self) -> Option<&NodeRef> {
        match self {
            GraphError::Initialization { node, .. }
            | GraphError::RuntimeFault { node, .. }
            | GraphError::Spawn { node, .. } => Some(node),
            GraphError::Topology(_) | GraphError::InvalidTransition { .. } => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid runtime configuration: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error("cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),
}
