// Raw counter snapshot as returned by a counter source

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// CPU tick categories, in `/proc/stat` column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickKind {
    User,
    Nice,
    System,
    Idle,
    IoWait,
    Irq,
    SoftIrq,
    Steal,
}

impl TickKind {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Cumulative tick counters of one logical core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreTicks {
    pub ticks: [u64; 8],
}

impl CoreTicks {
    pub fn new(ticks: [u64; 8]) -> Self {
        Self { ticks }
    }

    pub fn get(&self, kind: TickKind) -> u64 {
        self.ticks[kind.index()]
    }

    /// Sum over all tick kinds; the core's elapsed time in ticks.
    pub fn total(&self) -> u64 {
        self.ticks.iter().fold(0u64, |acc, t| acc.saturating_add(*t))
    }
}

/// Cumulative CPU time consumed by a process, in nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuTime {
    pub user_nanos: u64,
    pub system_nanos: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostMemory {
    pub total: u64,
    pub used: u64,
    pub actually_used: u64,
    pub swap_total: u64,
    pub swap_used: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMemory {
    pub resident: u64,
    pub virtual_size: u64,
}

/// Cumulative disk I/O. Operation counts are only known for whole-host sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IoCounters {
    pub reads: Option<u64>,
    pub read_bytes: u64,
    pub writes: Option<u64>,
    pub write_bytes: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkCounters {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KernelCounters {
    pub interrupts: u64,
    pub context_switches: u64,
}

/// Space on mounted file systems, summed over all of them, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskSpace {
    pub total: u64,
    pub used: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryPoolKind {
    Allocated,
    Active,
    Resident,
    Mapped,
    Retained,
}

/// Point-in-time size of one memory pool, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryPool {
    pub kind: MemoryPoolKind,
    pub bytes: u64,
}

/// Everything a counter source captured at one instant.
///
/// `taken_at` is monotonic and is the only clock used for elapsed-time math;
/// `timestamp` (wall clock, ms since epoch) is for display and storage.
/// Sections a source does not know about stay `None` / empty.
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    pub taken_at: Instant,
    pub timestamp: i64,
    pub cpu_ticks: Vec<CoreTicks>,
    pub cpu_time: Option<CpuTime>,
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
    pub memory_pools: Vec<MemoryPool>,
}

impl RawSnapshot {
    /// Empty snapshot stamped with the current monotonic and wall clocks.
    pub fn now() -> Self {
        Self::at(Instant::now(), chrono::Utc::now().timestamp_millis())
    }

    pub fn at(taken_at: Instant, timestamp: i64) -> Self {
        Self {
            taken_at,
            timestamp,
            cpu_ticks: Vec::new(),
            cpu_time: None,
            load: None,
            host_memory: None,
            process_memory: None,
            io: None,
            network: None,
            kernel: None,
            disk_space: None,
            uptime_secs: None,
            threads: None,
            file_descriptors: None,
            memory_pools: Vec::new(),
        }
    }
}
