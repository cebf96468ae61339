//! Structured-parallel stream processing.
//!
//! Nodes connected by bounded channels are composed into pipelines, farms and
//! all-to-all meshes. A built [`Topology`] runs one thread per node and shuts
//! down by propagating end-of-stream markers downstream.

pub mod config;
pub mod core;
pub mod engine;
pub mod errors;
pub mod nodes;
pub mod observability;

pub use crate::config::RuntimeConfig;
pub use crate::core::{Arity, Node, NodeSpec, Outbox, Token};
pub use crate::engine::{AllToAll, Farm, Pipeline, Topology};
pub use crate::errors::{GraphError, TopologyError};
