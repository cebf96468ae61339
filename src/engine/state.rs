use serde::{Deserialize, Serialize};

/// Lifecycle of a single node within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    Created,
    Initialized,
    Running,
    Draining,
    Terminated,
    /// A hook faulted; the node still drained its inputs and closed its outputs
    Failed,
}

impl NodeState {
    /// Check if transition from current state to target state is valid
    pub fn can_transition_to(&self, target: &NodeState) -> bool {
        use NodeState::*;

        matches!(
            (self, target),
            (Created, Initialized)
                | (Created, Failed)
                | (Initialized, Running)
                | (Running, Draining)
                | (Running, Failed)
                | (Draining, Terminated)
                | (Draining, Failed)
        )
    }

    pub fn is_final(&self) -> bool {
        matches!(self, NodeState::Terminated | NodeState::Failed)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Created => "Created",
            Self::Initialized => "Initialized",
            Self::Running => "Running",
            Self::Draining => "Draining",
            Self::Terminated => "Terminated",
            Self::Failed => "Failed",
        }
    }
}

impl Default for NodeState {
    fn default() -> Self {
        Self::Created
    }
}

/// Lifecycle of a session (one run of a topology)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Idle,
    Initializing,
    Running,
    Completed,
    Failed { error_msg: String },
}

impl RunState {
    pub fn can_transition_to(&self, target: &RunState) -> bool {
        use RunState::*;

        matches!(
            (self, target),
            (Idle, Initializing)
                | (Initializing, Running)
                | (Initializing, Failed { .. })
                | (Running, Completed)
                | (Running, Failed { .. })
        )
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Initializing => "Initializing",
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Failed { .. } => "Failed",
        }
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::Idle
    }
}
