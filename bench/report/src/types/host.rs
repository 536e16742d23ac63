use serde::{Deserialize, Serialize};
use sysinfo::System;

/// Machine a suite ran on, written as `hardware.json` next to the result table. Every trial
/// of the suite shares this host, so its cores and load bound how many trials can run at once
/// without skewing latencies.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct HostSnapshot {
    pub identifier: Option<String>,
    pub cpu: String,
    pub logical_cores: usize,
    pub memory_mb: u64,
    pub available_memory_mb: u64,
    /// One minute load average when the suite started.
    pub load_average: f64,
    pub kernel: String,
}

impl HostSnapshot {
    pub fn capture(identifier: Option<String>) -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        sys.refresh_memory();

        Self {
            identifier,
            cpu: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().trim().to_owned())
                .unwrap_or_else(|| "unknown".to_owned()),
            logical_cores: sys.cpus().len(),
            memory_mb: sys.total_memory() / 1024 / 1024,
            available_memory_mb: sys.available_memory() / 1024 / 1024,
            load_average: System::load_average().one,
            kernel: System::kernel_version().unwrap_or_else(|| "unknown".to_owned()),
        }
    }

    /// Cores not already busy at capture time, shared among `parallelism` concurrent trials.
    pub fn idle_cores_per_trial(&self, parallelism: usize) -> f64 {
        let idle = (self.logical_cores as f64 - self.load_average).max(0.0);
        idle / parallelism.max(1) as f64
    }
}
