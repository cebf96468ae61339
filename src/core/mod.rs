pub mod channel;
pub mod node;
pub mod outbox;

pub use channel::{Channel, Message};
pub use node::{Arity, Node, NodeId, NodeRef, NodeSpec, Token};
pub use outbox::Outbox;
