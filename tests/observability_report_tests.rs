use skelflow::engine::NodeState;
use skelflow::nodes::{Collect, IterSource, Map};
use skelflow::observability::{RunMonitor, RunReport};
use skelflow::{NodeSpec, Pipeline, RuntimeConfig};

fn run_once() -> RunReport {
    let mut topology = Pipeline::new()
        .add_stage(NodeSpec::siso("numbers", IterSource::new(|| 0..10u32)))
        .add_stage(NodeSpec::siso("square", Map::new(|x: u32| x * x)))
        .add_stage(NodeSpec::siso("collect", Collect::shared().0))
        .build(&RuntimeConfig::default())
        .unwrap();
    topology.run_and_wait_end().unwrap()
}

#[test]
fn test_report_counts_items() {
    let report = run_once();

    assert!(report.all_terminated());
    assert_eq!(report.nodes.len(), 3);

    let numbers = &report.node("numbers").unwrap().metrics;
    assert_eq!(numbers.items_sent, 10);
    assert_eq!(numbers.items_received, 0);
    // Ten items plus the call that ends the stream
    assert_eq!(numbers.service_calls, 11);

    let square = &report.node("square").unwrap().metrics;
    assert_eq!(square.items_received, 10);
    assert_eq!(square.items_sent, 10);
    assert_eq!(square.errors_count, 0);

    assert_eq!(report.node("collect").unwrap().metrics.items_received, 10);
    assert_eq!(report.total_items_sent(), 20);
}

#[test]
fn test_report_nodes_follow_topology_order() {
    let report = run_once();
    let names: Vec<&str> = report.nodes.iter().map(|n| n.node.name.as_str()).collect();

    assert_eq!(names, vec!["numbers", "square", "collect"]);
    assert!(report
        .nodes
        .iter()
        .all(|n| n.state == NodeState::Terminated));
}

#[test]
fn test_monitor_report() {
    let report = run_once();
    let text = RunMonitor::new(&report).generate_report();

    assert!(text.contains("=== Run 0"));
    assert!(text.contains("square"));
    assert!(text.contains("Terminated"));
    assert!(text.contains("10 in, 10 out"));
    assert!(text.contains("0 errors"));
}

#[test]
fn test_report_serializes_to_json() {
    let report = run_once();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["run_index"], 0);
    assert_eq!(json["nodes"][1]["node"]["name"], "square");
    assert_eq!(json["nodes"][1]["state"], "Terminated");
    assert_eq!(json["nodes"][2]["metrics"]["items_received"], 10);

    let back: RunReport = serde_json::from_value(json).unwrap();
    assert_eq!(back.nodes.len(), 3);
}

#[test]
fn test_session_metrics_match_report() {
    let mut topology = Pipeline::new()
        .add_stage(NodeSpec::siso("numbers", IterSource::new(|| 0..10u32)))
        .add_stage(NodeSpec::siso("square", Map::new(|x: u32| x * x)))
        .add_stage(NodeSpec::siso("collect", Collect::shared().0))
        .build(&RuntimeConfig::default())
        .unwrap();
    let mut session = topology.session();
    let report = session.run_and_wait_end().unwrap();

    let collector = session.metrics();
    assert_eq!(collector.len(), 3);
    assert_eq!(collector.total_items_sent(), report.total_items_sent());

    let square = report.node("square").unwrap();
    let live = collector.get_node_metrics(square.node.id).unwrap();
    assert_eq!(live.snapshot(), square.metrics);
    assert_eq!(live.items_received(), 10);
}
