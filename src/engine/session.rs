use super::runner::{InitReport, NodeOutcome, NodeRunner};
use super::{RunState, Topology};
use crate::core::NodeRef;
use crate::errors::GraphError;
use crate::observability::messages::{
    InitializationFailed, NodeFaulted, RunCompleted, RunStarted, StructuredLog,
};
use crate::observability::{MetricsCollector, NodeMetrics, NodeReport, RunReport};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// One run of a topology.
///
/// Every node gets its own thread. All `init` hooks run first; the nodes only
/// start servicing once every one of them initialized successfully.
pub struct Session<'t, T> {
    topology: &'t mut Topology<T>,
    state: RunState,
    run_index: u64,
    collector: MetricsCollector,
}

impl<'t, T: Send + 'static> Session<'t, T> {
    pub(crate) fn new(topology: &'t mut Topology<T>) -> Self {
        let run_index = topology.runs;
        Self {
            topology,
            state: RunState::Idle,
            run_index,
            collector: MetricsCollector::new(),
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn run_index(&self) -> u64 {
        self.run_index
    }

    /// Metrics of the nodes of this run, filled in once the run has started
    pub fn metrics(&self) -> &MetricsCollector {
        &self.collector
    }

    fn transition_to(&mut self, new_state: RunState) -> Result<(), GraphError> {
        transition(&mut self.state, new_state)
    }

    /// Start every node and block until all of them have finished.
    ///
    /// The session is `Running` from the moment the start gate opens.
    pub fn run_and_wait_end(&mut self) -> Result<RunReport, GraphError> {
        self.transition_to(RunState::Initializing)?;
        self.topology.runs += 1;

        let node_refs = self.topology.node_refs();
        RunStarted {
            run_index: self.run_index,
            node_count: node_refs.len(),
            channel_count: self.topology.channels.len(),
        }
        .log();

        for channel in &self.topology.channels {
            let stale = channel.reset();
            if stale > 0 {
                tracing::warn!(stale, "dropped messages left over from a previous run");
            }
        }

        let metrics: Vec<Arc<NodeMetrics>> = node_refs
            .iter()
            .map(|node| {
                let metrics = Arc::new(NodeMetrics::new(node.name.clone()));
                self.collector.register(node.id, metrics.clone());
                metrics
            })
            .collect();

        let started = Instant::now();
        let outcomes = match launch(self.topology, &mut self.state, &node_refs, &metrics) {
            Ok(outcomes) => outcomes,
            Err(error) => {
                self.transition_to(RunState::Failed {
                    error_msg: error.to_string(),
                })?;
                return Err(error);
            }
        };
        let duration = started.elapsed();

        let mut first_fault = None;
        let mut nodes = Vec::with_capacity(outcomes.len());
        for ((node, outcome), metrics) in node_refs.into_iter().zip(outcomes).zip(&metrics) {
            if let Some((hook, error)) = outcome.fault {
                NodeFaulted {
                    node: &node,
                    hook,
                    error: &error,
                }
                .log();
                if first_fault.is_none() {
                    first_fault = Some(GraphError::RuntimeFault {
                        node: node.clone(),
                        hook,
                        source: error,
                    });
                }
            }
            nodes.push(NodeReport {
                node,
                state: outcome.state,
                metrics: metrics.snapshot(),
            });
        }

        if let Some(fault) = first_fault {
            self.transition_to(RunState::Failed {
                error_msg: fault.to_string(),
            })?;
            return Err(fault);
        }

        self.transition_to(RunState::Completed)?;
        RunCompleted {
            run_index: self.run_index,
            node_count: nodes.len(),
            duration,
        }
        .log();

        Ok(RunReport {
            run_index: self.run_index,
            duration,
            nodes,
        })
    }
}

/// Transition to a new state with validation
fn transition(state: &mut RunState, new_state: RunState) -> Result<(), GraphError> {
    if !state.can_transition_to(&new_state) {
        return Err(GraphError::InvalidTransition {
            from: state.name().to_string(),
            to: new_state.name().to_string(),
        });
    }
    *state = new_state;
    Ok(())
}

/// Spawn one scoped thread per node, gate them on the `init` outcomes and
/// join them all. `state` moves to `Running` when the gate opens.
fn launch<T: Send + 'static>(
    topology: &mut Topology<T>,
    state: &mut RunState,
    node_refs: &[NodeRef],
    metrics: &[Arc<NodeMetrics>],
) -> Result<Vec<NodeOutcome>, GraphError> {
    let Topology {
        nodes,
        channels,
        config,
        ..
    } = topology;
    let channels: &[_] = channels;
    let (init_tx, init_rx) = crossbeam_channel::unbounded::<InitReport>();
    let (gate_tx, gate_rx) = crossbeam_channel::unbounded::<bool>();

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(nodes.len());
        let mut failure = None;

        for (position, slot) in nodes.iter_mut().enumerate() {
            let runner = NodeRunner::new(position, slot, channels, metrics[position].clone());
            let init_tx = init_tx.clone();
            let gate_rx = gate_rx.clone();
            let spawned = thread::Builder::new()
                .name(config.thread_name(&node_refs[position].name))
                .spawn_scoped(scope, move || runner.run(init_tx, gate_rx));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    failure = Some(GraphError::Spawn {
                        node: node_refs[position].clone(),
                        source,
                    });
                    break;
                }
            }
        }
        drop(init_tx);

        if failure.is_none() {
            let mut reports: Vec<InitReport> = init_rx.iter().take(handles.len()).collect();
            reports.sort_by_key(|report| report.position);
            for report in reports {
                if let Err(source) = report.result {
                    let node = &node_refs[report.position];
                    InitializationFailed {
                        node,
                        error: &source,
                    }
                    .log();
                    if failure.is_none() {
                        failure = Some(GraphError::Initialization {
                            node: node.clone(),
                            source,
                        });
                    }
                }
            }
        }

        if failure.is_none() {
            failure = transition(state, RunState::Running).err();
        }
        if failure.is_none() {
            for _ in 0..handles.len() {
                let _ = gate_tx.send(true);
            }
        }
        // Threads still waiting at the gate see the disconnect and exit.
        drop(gate_tx);

        let outcomes: Vec<NodeOutcome> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|_| NodeOutcome::panicked()))
            .collect();

        match failure {
            Some(error) => Err(error),
            None => Ok(outcomes),
        }
    })
}
