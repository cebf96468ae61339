pub mod collector;
pub mod messages;
pub mod metrics;
pub mod monitor;
pub mod report;

pub use collector::MetricsCollector;
pub use metrics::{MetricsSnapshot, NodeMetrics};
pub use monitor::RunMonitor;
pub use report::{NodeReport, RunReport};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter`. Does nothing if a global subscriber is already set.
pub fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_thread_names(true))
        .try_init();
}
