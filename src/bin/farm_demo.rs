use anyhow::Result;
use skelflow::nodes::{Collect, Inspect, IterSource, Map};
use skelflow::observability::{init_tracing, RunMonitor};
use skelflow::{Farm, NodeSpec, Pipeline, RuntimeConfig};

fn main() -> Result<()> {
    init_tracing("skelflow=debug");

    println!("skelflow - farm demo");
    println!("====================\n");

    let config = RuntimeConfig::default().with_channel_capacity(4);
    let (collect, squares) = Collect::shared();

    let mut topology = Pipeline::new()
        .add_stage(NodeSpec::siso("numbers", IterSource::new(|| 0..20u64)))
        .add_stage(
            Farm::new()
                .add_workers(
                    (0..4).map(|i| NodeSpec::siso(format!("square-{}", i), Map::new(|x: u64| x * x))),
                )
                .add_collector(Some(NodeSpec::miso("merge", Inspect::new("merge")))),
        )
        .add_stage(NodeSpec::siso("collect", collect))
        .build(&config)?;

    let report = topology.run_and_wait_end()?;
    println!("{}", RunMonitor::new(&report).generate_report());

    let mut results = squares
        .lock()
        .map_err(|_| anyhow::anyhow!("results lock poisoned"))?
        .clone();
    results.sort_unstable();
    println!("squares: {:?}", results);

    Ok(())
}
