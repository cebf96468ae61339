pub mod fn_node;
pub mod identity;
pub mod inspect;
pub mod map;
pub mod sink;
pub mod source;

pub use fn_node::FnNode;
pub use identity::Identity;
pub use inspect::Inspect;
pub use map::Map;
pub use sink::Collect;
pub use source::IterSource;
