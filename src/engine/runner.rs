use super::topology::NodeSlot;
use super::NodeState;
use crate::core::{Channel, Message, Node, Outbox, Token};
use crate::errors::Hook;
use crate::observability::NodeMetrics;
use anyhow::{anyhow, Result};
use crossbeam_channel::{Receiver, Select, Sender};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Result of a node's `init`, reported to the session before the start gate
pub(crate) struct InitReport {
    pub position: usize,
    pub result: Result<()>,
}

pub(crate) struct NodeOutcome {
    pub state: NodeState,
    pub fault: Option<(Hook, anyhow::Error)>,
}

impl NodeOutcome {
    pub fn panicked() -> Self {
        Self {
            state: NodeState::Failed,
            fault: Some((Hook::Runtime, anyhow!("node thread panicked"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    SelfTerminated,
    InputsExhausted,
}

/// Drives one node through its lifecycle on the current thread
pub(crate) struct NodeRunner<'s, T> {
    position: usize,
    slot: &'s mut NodeSlot<T>,
    inputs: Vec<&'s Channel<T>>,
    outputs: Vec<&'s Channel<T>>,
    metrics: Arc<NodeMetrics>,
    state: NodeState,
}

impl<'s, T: Send + 'static> NodeRunner<'s, T> {
    pub fn new(
        position: usize,
        slot: &'s mut NodeSlot<T>,
        channels: &'s [Channel<T>],
        metrics: Arc<NodeMetrics>,
    ) -> Self {
        let inputs = slot.inputs.iter().map(|&c| &channels[c]).collect();
        let outputs = slot.outputs.iter().map(|&c| &channels[c]).collect();
        Self {
            position,
            slot,
            inputs,
            outputs,
            metrics,
            state: NodeState::Created,
        }
    }

    pub fn run(self, init_tx: Sender<InitReport>, start_gate: Receiver<bool>) -> NodeOutcome {
        let NodeRunner {
            position,
            slot,
            inputs,
            outputs,
            metrics,
            mut state,
        } = self;
        let node = slot.spec.node_ref();
        let span = tracing::info_span!("node", node = %node);
        let _entered = span.enter();

        let multi_output = slot.multi_output;
        let logic = slot.spec.logic_mut();

        match guarded(|| logic.init()) {
            Ok(()) => {
                advance(&mut state, NodeState::Initialized);
                let _ = init_tx.send(InitReport {
                    position,
                    result: Ok(()),
                });
            }
            Err(error) => {
                metrics.record_error();
                advance(&mut state, NodeState::Failed);
                let _ = init_tx.send(InitReport {
                    position,
                    result: Err(error),
                });
                return NodeOutcome { state, fault: None };
            }
        }
        drop(init_tx);

        if !matches!(start_gate.recv(), Ok(true)) {
            tracing::debug!("run aborted before start");
            return NodeOutcome { state, fault: None };
        }
        advance(&mut state, NodeState::Running);

        let mut outbox = Outbox::new(&node.name, &outputs, multi_output, &metrics);
        let mut reader = InputReader::new(&inputs);
        let mut fault = None;

        let exit = match service_loop(logic, &mut reader, &mut outbox, &metrics) {
            Ok(exit) => Some(exit),
            Err(error) => {
                fault = Some((Hook::Service, error));
                None
            }
        };

        advance(&mut state, NodeState::Draining);
        let discarded = reader.drain();
        if discarded > 0 {
            tracing::debug!(discarded, "discarded input while draining");
        }

        if exit == Some(LoopExit::InputsExhausted) {
            if let Err(error) = guarded(|| logic.end_of_stream_notify(&mut outbox)) {
                fault = Some((Hook::EndOfStreamNotify, error));
            }
        }

        for channel in &outputs {
            if let Err(error) = channel.close() {
                tracing::warn!(%error, "failed to close output channel");
            }
        }

        if fault.is_none() {
            if let Err(error) = guarded(|| logic.end()) {
                fault = Some((Hook::End, error));
            }
        }

        if fault.is_some() {
            metrics.record_error();
            advance(&mut state, NodeState::Failed);
        } else {
            advance(&mut state, NodeState::Terminated);
        }
        tracing::trace!(state = state.name(), "node finished");

        NodeOutcome { state, fault }
    }
}

fn service_loop<T>(
    logic: &mut dyn Node<T>,
    reader: &mut InputReader<'_, T>,
    outbox: &mut Outbox<'_, T>,
    metrics: &NodeMetrics,
) -> Result<LoopExit> {
    if reader.is_source() {
        loop {
            if step(logic, None, outbox, metrics)? == Token::EndOfStream {
                return Ok(LoopExit::SelfTerminated);
            }
        }
    }

    while let Some(item) = reader.next() {
        metrics.record_item_received();
        if step(logic, Some(item), outbox, metrics)? == Token::EndOfStream {
            return Ok(LoopExit::SelfTerminated);
        }
    }
    Ok(LoopExit::InputsExhausted)
}

fn step<T>(
    logic: &mut dyn Node<T>,
    input: Option<T>,
    outbox: &mut Outbox<'_, T>,
    metrics: &NodeMetrics,
) -> Result<Token> {
    let start = metrics.start_service();
    let token = guarded(|| logic.service(input, outbox));
    metrics.finish_service(start);
    token
}

fn advance(state: &mut NodeState, next: NodeState) {
    debug_assert!(
        state.can_transition_to(&next),
        "invalid node transition {} -> {}",
        state.name(),
        next.name()
    );
    tracing::trace!(from = state.name(), to = next.name(), "node state");
    *state = next;
}

/// Run a user hook, turning a panic into an error
fn guarded<R>(hook: impl FnOnce() -> Result<R>) -> Result<R> {
    match panic::catch_unwind(AssertUnwindSafe(hook)) {
        Ok(result) => result,
        Err(payload) => Err(anyhow!("node panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Pops from a node's inputs until every one of them delivered its end marker
struct InputReader<'a, T> {
    inputs: &'a [&'a Channel<T>],
    live: Vec<usize>,
}

impl<'a, T> InputReader<'a, T> {
    fn new(inputs: &'a [&'a Channel<T>]) -> Self {
        Self {
            inputs,
            live: (0..inputs.len()).collect(),
        }
    }

    fn is_source(&self) -> bool {
        self.inputs.is_empty()
    }

    fn next(&mut self) -> Option<T> {
        loop {
            let (position, message) = match self.live.as_slice() {
                [] => return None,
                [only] => (0, self.inputs[*only].pop()),
                live => {
                    let mut select = Select::new();
                    for &input in live {
                        select.recv(self.inputs[input].receiver());
                    }
                    let oper = select.select();
                    let position = oper.index();
                    (position, self.inputs[live[position]].complete(oper))
                }
            };

            match message {
                Message::Data(item) => return Some(item),
                Message::EndOfStream => {
                    let input = self.live.remove(position);
                    tracing::trace!(input, remaining = self.live.len(), "end of stream received");
                }
            }
        }
    }

    fn drain(&mut self) -> usize {
        let mut discarded = 0;
        while self.next().is_some() {
            discarded += 1;
        }
        discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_merges_until_all_inputs_end() {
        let a = Channel::new(4);
        let b = Channel::new(4);
        a.push(1).unwrap();
        b.push(2).unwrap();
        a.close().unwrap();
        b.push(3).unwrap();
        b.close().unwrap();

        let inputs = [&a, &b];
        let mut reader = InputReader::new(&inputs);
        let mut items = Vec::new();
        while let Some(item) = reader.next() {
            items.push(item);
        }
        items.sort();

        assert_eq!(items, vec![1, 2, 3]);
        assert!(a.is_drained() && b.is_drained());
        assert_eq!(reader.next(), None);
    }

    #[test]
    fn test_guarded_catches_panics() {
        let result: Result<()> = guarded(|| panic!("boom"));
        let message = result.unwrap_err().to_string();
        assert_eq!(message, "node panicked: boom");
    }
}
