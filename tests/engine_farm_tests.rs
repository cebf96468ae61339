use skelflow::core::Token;
use skelflow::errors::{GraphError, TopologyError};
use skelflow::nodes::{Collect, FnNode, IterSource, Map};
use skelflow::{Farm, NodeSpec, Pipeline, RuntimeConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn numbers(count: u64) -> NodeSpec<u64> {
    NodeSpec::siso("numbers", IterSource::new(move || 0..count))
}

/// Worker that counts what it receives and forwards it
fn counting_worker(index: usize, counter: Arc<AtomicUsize>) -> NodeSpec<u64> {
    NodeSpec::siso(
        format!("worker-{}", index),
        FnNode::stateless(move |item: Option<u64>, out| {
            if let Some(item) = item {
                counter.fetch_add(1, Ordering::SeqCst);
                out.send(item)?;
            }
            Ok(Token::Continue)
        }),
    )
}

#[test]
fn test_round_robin_balance() {
    let counters: Vec<Arc<AtomicUsize>> = (0..3).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let workers = counters
        .iter()
        .enumerate()
        .map(|(i, counter)| counting_worker(i, counter.clone()));

    let mut topology = Pipeline::new()
        .add_stage(numbers(10))
        .add_stage(Farm::new().add_workers(workers))
        .build(&RuntimeConfig::default())
        .unwrap();
    topology.run_and_wait_end().unwrap();

    let counts: Vec<usize> = counters.iter().map(|c| c.load(Ordering::SeqCst)).collect();
    assert_eq!(counts, vec![4, 3, 3]);
}

#[test]
fn test_collector_receives_every_result() {
    let (collect, items) = Collect::shared();
    let farm = Farm::new()
        .add_workers((0..4).map(|i| NodeSpec::siso(format!("double-{}", i), Map::new(|x: u64| x * 2))))
        .add_collector(Some(NodeSpec::siso("collect", collect)));

    let mut topology = Pipeline::new()
        .add_stage(numbers(100))
        .add_stage(farm)
        .build(&RuntimeConfig::default())
        .unwrap();
    let report = topology.run_and_wait_end().unwrap();

    let mut results = items.lock().unwrap().clone();
    results.sort_unstable();
    assert_eq!(results, (0..100).map(|x| x * 2).collect::<Vec<_>>());
    assert_eq!(report.node("farm-emitter").unwrap().metrics.items_sent, 100);
    assert_eq!(report.node("collect").unwrap().metrics.items_received, 100);
}

#[test]
fn test_emitter_routes_with_send_to() {
    let received: Vec<Arc<Mutex<Vec<u64>>>> = (0..3).map(|_| Arc::default()).collect();
    let workers = received.iter().enumerate().map(|(i, items)| {
        NodeSpec::siso(format!("worker-{}", i), Collect::new(items.clone()))
    });
    let emitter = NodeSpec::siso(
        "by-remainder",
        FnNode::stateless(|item: Option<u64>, out| {
            if let Some(item) = item {
                out.send_to(item, (item % 3) as usize)?;
            }
            Ok(Token::Continue)
        }),
    )
    .with_fanout(3);

    let mut topology = Pipeline::new()
        .add_stage(numbers(30))
        .add_stage(Farm::new().add_emitter(emitter).add_workers(workers))
        .build(&RuntimeConfig::default())
        .unwrap();
    topology.run_and_wait_end().unwrap();

    for (worker, items) in received.iter().enumerate() {
        let items = items.lock().unwrap();
        assert_eq!(items.len(), 10);
        // Per-edge FIFO order is preserved
        assert!(items.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(items.iter().all(|item| (*item % 3) as usize == worker));
    }
}

#[test]
fn test_standalone_farm_workers_are_sources() {
    let (collect, items) = Collect::shared();
    let farm = Farm::new()
        .add_workers((0..4).map(|i| {
            NodeSpec::siso(format!("source-{}", i), IterSource::new(move || (0..5u64).map(move |x| x + i * 100)))
        }))
        .add_collector(Some(NodeSpec::siso("collect", collect)));

    let mut topology = farm.build(&RuntimeConfig::default()).unwrap();
    assert_eq!(topology.summary().sources, 4);

    topology.run_and_wait_end().unwrap();
    assert_eq!(items.lock().unwrap().len(), 20);
}

#[test]
fn test_farm_without_collector_needs_multi_input_consumer() {
    let farm = || {
        Farm::new().add_workers((0..2).map(|i| NodeSpec::siso(format!("w{}", i), Map::new(|x: u64| x + 1))))
    };

    let result = Pipeline::new()
        .add_stage(numbers(4))
        .add_stage(farm())
        .add_stage(NodeSpec::siso("sink", Collect::shared().0))
        .build(&RuntimeConfig::default());
    assert!(matches!(
        result,
        Err(GraphError::Topology(TopologyError::ArityMismatch { .. }))
    ));

    let (collect, items) = Collect::shared();
    let mut topology = Pipeline::new()
        .add_stage(numbers(4))
        .add_stage(farm())
        .add_stage(NodeSpec::miso("sink", collect))
        .build(&RuntimeConfig::default())
        .unwrap();
    topology.run_and_wait_end().unwrap();

    let mut results = items.lock().unwrap().clone();
    results.sort_unstable();
    assert_eq!(results, vec![1, 2, 3, 4]);
}

#[test]
fn test_empty_farm_is_rejected() {
    let result = Pipeline::new()
        .add_stage(numbers(1))
        .add_stage(Farm::new())
        .build(&RuntimeConfig::default());

    assert!(matches!(
        result,
        Err(GraphError::Topology(TopologyError::EmptyFarm))
    ));
}
