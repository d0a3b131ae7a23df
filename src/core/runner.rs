use crate::core::sink::FdSink;
use crate::core::{Demo, DemoOutcome};
use crate::utils::error::Result;
use crate::utils::monitor::ProcessMonitor;

pub struct DemoRunner<D: Demo> {
    demo: D,
    monitor: ProcessMonitor,
}

impl<D: Demo> DemoRunner<D> {
    pub fn new(demo: D) -> Self {
        Self::new_with_monitoring(demo, false)
    }

    pub fn new_with_monitoring(demo: D, monitor_enabled: bool) -> Self {
        Self {
            demo,
            monitor: ProcessMonitor::new(monitor_enabled),
        }
    }

    pub fn run(&mut self, out: &mut FdSink) -> Result<DemoOutcome> {
        let name = self.demo.name();
        tracing::info!("🚀 Starting {} at {}", name, chrono::Local::now().to_rfc3339());
        self.monitor.log_stats("before");

        let outcome = self.demo.run(out)?;

        self.monitor.log_stats("after");
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!("{} report: {}", name, serde_json::to_string(&outcome)?);
        }
        tracing::info!("✅ {} finished", name);

        Ok(outcome)
    }
}
