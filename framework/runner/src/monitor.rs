use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// CPU usage of the runner, relative to all cores, above which a warning is logged.
const HIGH_CPU_PERCENT: f32 = 10.0;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceUsage {
    /// CPU usage since the previous sample, relative to all cores, between 0 and 100.
    pub cpu_percent: f32,
    pub memory_bytes: u64,
}

/// Samples the resource usage of the runner process.
///
/// A high usage does not stop the run, it is logged so that a slow test can be attributed to an
/// overloaded runner.
pub struct ResourceMonitor {
    system: System,
    pid: Pid,
    cpu_count: usize,
}

impl ResourceMonitor {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        let cpu_count = system.cpus().len().max(1);

        let mut monitor = Self {
            system,
            pid: Pid::from_u32(std::process::id()),
            cpu_count,
        };
        // CPU usage is measured between two refreshes.
        monitor.refresh();
        monitor
    }

    fn refresh(&mut self) {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );
    }

    pub fn sample(&mut self) -> Option<ResourceUsage> {
        self.refresh();
        let process = self.system.process(self.pid)?;

        Some(ResourceUsage {
            cpu_percent: process.cpu_usage() / self.cpu_count as f32,
            memory_bytes: process.memory(),
        })
    }

    pub fn log_usage(&mut self) {
        let Some(usage) = self.sample() else {
            log::warn!("Failed to read runner resource usage");
            return;
        };

        log::info!(
            "Runner resource usage: cpu {:.2}%, memory {:.1} MiB",
            usage.cpu_percent,
            usage.memory_bytes as f64 / BYTES_PER_MIB
        );
        if usage.cpu_percent > HIGH_CPU_PERCENT {
            log::warn!(
                "High CPU usage detected. The runner is using {:.2}% of the CPU, with {} available cores",
                usage.cpu_percent,
                self.cpu_count
            );
        }
    }
}

impl Default for ResourceMonitor {
    fn default() -> Self {
        Self::new()
    }
}
