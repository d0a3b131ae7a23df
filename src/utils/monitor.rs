#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct ProcessStats {
    pub pid: u32,
    pub resident_kb: u64,
    pub virtual_kb: u64,
    pub elapsed_time: Duration,
}

/// Samples the calling process's memory through sysinfo.
///
/// The pid is resolved on every sample so that a forked child reports
/// its own figures rather than its parent's.
#[cfg(feature = "cli")]
pub struct ProcessMonitor {
    system: Mutex<System>,
    start_time: Instant,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl ProcessMonitor {
    pub fn new(enabled: bool) -> Self {
        Self {
            system: Mutex::new(System::new()),
            start_time: Instant::now(),
            enabled,
        }
    }

    pub fn get_stats(&self) -> Option<ProcessStats> {
        if !self.enabled {
            return None;
        }

        let pid = sysinfo::get_current_pid().ok()?;
        let mut system = self.system.lock().ok()?;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );

        let process = system.process(pid)?;
        Some(ProcessStats {
            pid: pid.as_u32(),
            resident_kb: process.memory() / 1024,
            virtual_kb: process.virtual_memory() / 1024,
            elapsed_time: self.start_time.elapsed(),
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 {} - pid {}: RSS {}KiB, virtual {}KiB, time {:?}",
                phase,
                stats.pid,
                stats.resident_kb,
                stats.virtual_kb,
                stats.elapsed_time
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for ProcessMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct ProcessMonitor;

#[cfg(not(feature = "cli"))]
impl ProcessMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_reports_nothing() {
        let monitor = ProcessMonitor::new(false);
        assert!(monitor.get_stats().is_none());
        assert!(!monitor.is_enabled());
    }

    #[test]
    fn test_enabled_monitor_sees_current_process() {
        let monitor = ProcessMonitor::new(true);
        let stats = monitor.get_stats().expect("current process should be visible");
        assert_eq!(stats.pid, std::process::id());
        assert!(stats.resident_kb > 0);
    }
}
