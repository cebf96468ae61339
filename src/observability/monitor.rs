use super::RunReport;

/// Renders a run report for humans
pub struct RunMonitor<'a> {
    report: &'a RunReport,
}

impl<'a> RunMonitor<'a> {
    pub fn new(report: &'a RunReport) -> Self {
        Self { report }
    }

    pub fn generate_report(&self) -> String {
        if self.report.nodes.is_empty() {
            return "No nodes registered".to_string();
        }

        let mut report = format!(
            "=== Run {} ({:?}) ===\n",
            self.report.run_index, self.report.duration
        );

        for node in &self.report.nodes {
            let metrics = &node.metrics;
            report.push_str(&format!(
                "\n[{}] {}\n  Items: {} in, {} out, {} discarded\n  Errors: {}\n  Avg Latency: {}μs\n",
                node.node,
                node.state.name(),
                metrics.items_received,
                metrics.items_sent,
                metrics.items_discarded,
                if metrics.errors_count > 0 {
                    format!(
                        "{} error{}",
                        metrics.errors_count,
                        if metrics.errors_count == 1 { "" } else { "s" }
                    )
                } else {
                    "0 errors".to_string()
                },
                metrics.avg_latency_us
            ));
        }

        report
    }

    pub fn report(&self) -> &RunReport {
        self.report
    }
}
