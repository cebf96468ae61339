pub mod a2a;
pub mod farm;
pub mod pipeline;
mod runner;
pub mod session;
pub mod stage;
pub mod state;
pub mod topology;

pub use a2a::AllToAll;
pub use farm::Farm;
pub use pipeline::Pipeline;
pub use session::Session;
pub use stage::Stage;
pub use state::{NodeState, RunState};
pub use topology::{Topology, TopologySummary};
