// Derived, user-facing sample produced once per collection cycle

use serde::{Deserialize, Serialize};

use super::{
    DiskSpace, HostMemory, IoCounters, KernelCounters, LoadAverage, MemoryPool, NetworkCounters,
    ProcessMemory, RawSnapshot,
};

/// CPU usage percentages. `None` means unknown for this cycle (no previous snapshot,
/// non-positive elapsed time, or a counter reset), never a stand-in zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuUsage {
    pub total: Option<f64>,
    pub user: Option<f64>,
    pub system: Option<f64>,
    pub nice: Option<f64>,
    pub io_wait: Option<f64>,
    pub idle: Option<f64>,
    pub irq: Option<f64>,
    pub soft_irq: Option<f64>,
    pub steal: Option<f64>,
}

impl CpuUsage {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Wall clock, ms since epoch.
    pub timestamp: i64,
    pub cpu: CpuUsage,
    pub load: Option<LoadAverage>,
    pub host_memory: Option<HostMemory>,
    pub process_memory: Option<ProcessMemory>,
    pub io: Option<IoCounters>,
    pub network: Option<NetworkCounters>,
    pub kernel: Option<KernelCounters>,
    pub disk_space: Option<DiskSpace>,
    pub uptime_secs: Option<u64>,
    pub threads: Option<u64>,
    pub file_descriptors: Option<u64>,
    #[serde(default)]
    pub memory_pools: Vec<MemoryPool>,
}

impl Sample {
    /// Builds a sample from the current snapshot's pass-through values and derived CPU usage.
    pub fn from_snapshot(snapshot: &RawSnapshot, cpu: CpuUsage) -> Self {
        Self {
            timestamp: snapshot.timestamp,
            cpu,
            load: snapshot.load,
            host_memory: snapshot.host_memory,
            process_memory: snapshot.process_memory,
            io: snapshot.io,
            network: snapshot.network,
            kernel: snapshot.kernel,
            disk_space: snapshot.disk_space,
            uptime_secs: snapshot.uptime_secs,
            threads: snapshot.threads,
            file_descriptors: snapshot.file_descriptors,
            memory_pools: snapshot.memory_pools.clone(),
        }
    }
}
