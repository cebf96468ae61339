use super::Outbox;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(0);

/// Stable handle of a node, allocated when the node is constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a node as it appears in errors and reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: NodeId,
    pub name: String,
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.id)
    }
}

/// Shape of a node: how many input and output channels it may be wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arity {
    /// Single input, single output
    Siso,
    /// Single input, multiple outputs (routes with `send_to`)
    Simo,
    /// Multiple inputs merged into a single output
    Miso,
    /// Multiple inputs, multiple outputs
    Mimo,
}

impl Arity {
    pub fn is_multi_input(&self) -> bool {
        matches!(self, Arity::Miso | Arity::Mimo)
    }

    pub fn is_multi_output(&self) -> bool {
        matches!(self, Arity::Simo | Arity::Mimo)
    }
}

/// Control signal returned by every `service` step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    /// Keep the node running
    Continue,
    /// Stop producing and start draining
    EndOfStream,
}

/// Lifecycle hooks of a processing node.
///
/// Only `service` is mandatory. The other hooks default to no-ops, so a node
/// states the hooks it has by overriding them.
pub trait Node<T>: Send {
    /// Called once per run, before any `service` call. Resets per-run state.
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called with `None` on source nodes (no input channel) until they return
    /// `Token::EndOfStream`, otherwise once per incoming item.
    fn service(&mut self, input: Option<T>, out: &mut Outbox<'_, T>) -> Result<Token>;

    /// Called once when every input channel delivered its end marker.
    /// Items sent here reach downstream before this node's own end marker.
    fn end_of_stream_notify(&mut self, _out: &mut Outbox<'_, T>) -> Result<()> {
        Ok(())
    }

    /// Called once when the node terminates, after its outputs are closed
    fn end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A node ready to be placed in a graph: logic plus identity and shape
pub struct NodeSpec<T> {
    id: NodeId,
    name: String,
    arity: Arity,
    fanout: Option<usize>,
    logic: Box<dyn Node<T>>,
}

impl<T> NodeSpec<T> {
    pub fn new(name: impl Into<String>, arity: Arity, logic: impl Node<T> + 'static) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            arity,
            fanout: None,
            logic: Box::new(logic),
        }
    }

    pub fn siso(name: impl Into<String>, logic: impl Node<T> + 'static) -> Self {
        Self::new(name, Arity::Siso, logic)
    }

    pub fn simo(name: impl Into<String>, logic: impl Node<T> + 'static) -> Self {
        Self::new(name, Arity::Simo, logic)
    }

    pub fn miso(name: impl Into<String>, logic: impl Node<T> + 'static) -> Self {
        Self::new(name, Arity::Miso, logic)
    }

    pub fn mimo(name: impl Into<String>, logic: impl Node<T> + 'static) -> Self {
        Self::new(name, Arity::Mimo, logic)
    }

    /// Declare how many output channels this node routes over. Checked
    /// against the wiring when the graph is built.
    pub fn with_fanout(mut self, outputs: usize) -> Self {
        self.fanout = Some(outputs);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn fanout(&self) -> Option<usize> {
        self.fanout
    }

    pub fn node_ref(&self) -> NodeRef {
        NodeRef {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub(crate) fn logic_mut(&mut self) -> &mut dyn Node<T> {
        self.logic.as_mut()
    }
}

impl<T> fmt::Debug for NodeSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSpec")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("fanout", &self.fanout)
            .finish()
    }
}
