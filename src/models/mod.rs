// Data model: raw counter snapshots, derived samples, running statistics

mod sample;
mod snapshot;
mod statistics;

pub use sample::{CpuUsage, Sample};
pub use snapshot::{
    CoreTicks, CpuTime, DiskSpace, HostMemory, IoCounters, KernelCounters, LoadAverage, MemoryPool,
    MemoryPoolKind, NetworkCounters, ProcessMemory, RawSnapshot, TickKind,
};
pub use statistics::{Accumulator, SummaryStatistics};
