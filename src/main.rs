use anyhow::Result;
use skelflow::nodes::FnNode;
use skelflow::observability::{init_tracing, RunMonitor};
use skelflow::{AllToAll, NodeSpec, Pipeline, RuntimeConfig, Token};

const NUMBERS: [i64; 14] = [13, 17, 14, 27, 31, 6, 8, 4, 26, 31, 105, 238, 47, 48];

fn main() -> Result<()> {
    init_tracing("skelflow=info");

    println!("skelflow - parity all-to-all demo");
    println!("=================================\n");

    let config = RuntimeConfig::from_json(&serde_json::json!({
        "pipeline_config": { "channel_capacity": 16 }
    }))?;

    let generator = NodeSpec::simo(
        "generator",
        FnNode::stateless(|_, out| {
            for n in NUMBERS {
                out.send(n)?;
            }
            Ok(Token::EndOfStream)
        }),
    );

    // Even numbers go to the first reducer, odd ones to the second
    let routers = (0..3).map(|i| {
        NodeSpec::simo(
            format!("router-{}", i),
            FnNode::stateless(|item: Option<i64>, out| {
                if let Some(n) = item {
                    out.send_to(n, (n % 2) as usize)?;
                }
                Ok(Token::Continue)
            }),
        )
        .with_fanout(2)
    });

    let reducer = |name: &str| {
        NodeSpec::miso(
            name,
            FnNode::new(0i64, |sum, item: Option<i64>, _out| {
                *sum += item.unwrap_or_default();
                Ok(Token::Continue)
            })
            .on_init(|sum| {
                *sum = 0;
                Ok(())
            })
            .on_end_of_stream(|sum, out| {
                out.send(*sum)?;
                Ok(())
            }),
        )
    };

    let printer = NodeSpec::miso(
        "printer",
        FnNode::new(0i64, |total, item: Option<i64>, _out| {
            if let Some(partial) = item {
                println!("partial sum: {}", partial);
                *total += partial;
            }
            Ok(Token::Continue)
        })
        .on_init(|total| {
            *total = 0;
            Ok(())
        })
        .on_end(|total| {
            println!("total: {}", total);
            Ok(())
        }),
    );

    let mut topology = Pipeline::new()
        .add_stage(generator)
        .add_stage(
            AllToAll::new()
                .add_firstset(routers)
                .add_secondset([reducer("even"), reducer("odd")]),
        )
        .add_stage(printer)
        .build(&config)?;

    println!("{:?}\n", topology.summary());

    for run in 0..3 {
        println!("--- Run {} ---", run + 1);
        let report = topology.run_and_wait_end()?;
        println!("\n{}", RunMonitor::new(&report).generate_report());
    }

    Ok(())
}
