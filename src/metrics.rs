// Metric catalog: stable series names with display grouping and kind.

use serde::Serialize;

/// Whether a series holds point-in-time values or a cumulative counter.
/// Counters are rate-converted by the store before averaging; gauges are averaged as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Gauge,
    Counter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub name: &'static str,
    pub group: &'static str,
    pub display_name: &'static str,
    pub kind: MetricKind,
}

impl Metric {
    const fn gauge(name: &'static str, group: &'static str, display_name: &'static str) -> Self {
        Self {
            name,
            group,
            display_name,
            kind: MetricKind::Gauge,
        }
    }

    const fn counter(name: &'static str, group: &'static str, display_name: &'static str) -> Self {
        Self {
            name,
            group,
            display_name,
            kind: MetricKind::Counter,
        }
    }

    pub fn is_counter(&self) -> bool {
        self.kind == MetricKind::Counter
    }
}

/// Host-wide series (`server.*`).
pub mod server {
    use super::Metric;

    pub const MEMORY_MAX: Metric = Metric::gauge("server.memory.max", "Server / Memory", "Maximum");
    pub const MEMORY_USED: Metric = Metric::gauge("server.memory.used", "Server / Memory", "Used");
    pub const MEMORY_ACTUALLY_USED: Metric =
        Metric::gauge("server.memory.actually.used", "Server / Memory", "Actually Used");
    pub const SWAP_MAX: Metric = Metric::gauge("server.swap.max", "Server / Memory", "Swap Maximum");
    pub const SWAP_USED: Metric = Metric::gauge("server.swap.used", "Server / Memory", "Swap Used");

    pub const CPU_TOTAL: Metric = Metric::gauge("server.cpu.total", "CPU", "Total");
    pub const CPU_USER: Metric = Metric::gauge("server.cpu.user", "CPU", "User");
    pub const CPU_SYSTEM: Metric = Metric::gauge("server.cpu.system", "CPU", "System");
    pub const CPU_IO_WAIT: Metric = Metric::gauge("server.cpu.io_wait", "CPU", "I/O Wait");
    pub const CPU_NICE: Metric = Metric::gauge("server.cpu.nice", "CPU", "Nice");
    pub const CPU_IRQ: Metric = Metric::gauge("server.cpu.irq", "CPU", "IRQ");
    pub const CPU_SOFT_IRQ: Metric = Metric::gauge("server.cpu.soft_irq", "CPU", "Soft IRQ");
    pub const CPU_STEAL: Metric = Metric::gauge("server.cpu.steal", "CPU", "Steal");

    pub const LOAD_1: Metric = Metric::gauge("server.load.1", "Load", "1 Minute");
    pub const LOAD_5: Metric = Metric::gauge("server.load.5", "Load", "5 Minutes");
    pub const LOAD_15: Metric = Metric::gauge("server.load.15", "Load", "15 Minutes");

    pub const IO_READS: Metric = Metric::counter("server.io.reads", "I/O", "Reads");
    pub const IO_READ_BYTES: Metric = Metric::counter("server.io.read.bytes", "I/O", "Read Bytes");
    pub const IO_WRITES: Metric = Metric::counter("server.io.writes", "I/O", "Writes");
    pub const IO_WRITE_BYTES: Metric =
        Metric::counter("server.io.write.bytes", "I/O", "Write Bytes");

    pub const NETWORK_READ_BYTES: Metric =
        Metric::counter("server.network.read.bytes", "Network", "Read Bytes");
    pub const NETWORK_WRITE_BYTES: Metric =
        Metric::counter("server.network.write.bytes", "Network", "Write Bytes");

    pub const INTERRUPTS: Metric = Metric::counter("server.interrupts", "Kernel", "Interrupts");
    pub const CONTEXT_SWITCHES: Metric =
        Metric::counter("server.context.switches", "Kernel", "Context Switches");

    pub const DISK_TOTAL: Metric = Metric::gauge("server.disk.total", "Disk", "Total");
    pub const DISK_USED: Metric = Metric::gauge("server.disk.used", "Disk", "Used");

    pub const UPTIME: Metric = Metric::gauge("server.uptime", "Misc", "Uptime");

    /// Series fed into the collector's summary statistics.
    pub const TRACKED: [Metric; 3] = [CPU_TOTAL, LOAD_1, MEMORY_ACTUALLY_USED];
}

/// Single-process series (`process.*`).
pub mod process {
    use super::Metric;

    pub const MEMORY_RESIDENT: Metric = Metric::gauge("process.memory.resident", "Memory", "Resident");
    pub const MEMORY_VIRTUAL: Metric = Metric::gauge("process.memory.virtual", "Memory", "Virtual");

    pub const ALLOCATOR_ALLOCATED: Metric =
        Metric::gauge("process.allocator.allocated", "Allocator", "Allocated");
    pub const ALLOCATOR_ACTIVE: Metric =
        Metric::gauge("process.allocator.active", "Allocator", "Active");
    pub const ALLOCATOR_RESIDENT: Metric =
        Metric::gauge("process.allocator.resident", "Allocator", "Resident");
    pub const ALLOCATOR_MAPPED: Metric =
        Metric::gauge("process.allocator.mapped", "Allocator", "Mapped");
    pub const ALLOCATOR_RETAINED: Metric =
        Metric::gauge("process.allocator.retained", "Allocator", "Retained");

    pub const CPU_TOTAL: Metric = Metric::gauge("process.cpu.total", "CPU", "Total");
    pub const CPU_USER: Metric = Metric::gauge("process.cpu.user", "CPU", "User");
    pub const CPU_SYSTEM: Metric = Metric::gauge("process.cpu.system", "CPU", "System");

    pub const THREAD: Metric = Metric::gauge("process.thread", "Thread", "OS");
    pub const FILE_DESCRIPTORS: Metric =
        Metric::gauge("process.file.descriptors", "Thread", "File Descriptors");

    pub const IO_READ_BYTES: Metric = Metric::counter("process.io.read.bytes", "I/O", "Read Bytes");
    pub const IO_WRITE_BYTES: Metric =
        Metric::counter("process.io.write.bytes", "I/O", "Write Bytes");

    /// Series fed into the collector's summary statistics.
    pub const TRACKED: [Metric; 3] = [CPU_TOTAL, MEMORY_RESIDENT, MEMORY_VIRTUAL];
}

/// Looks up a catalog entry by series name.
pub fn find(name: &str) -> Option<Metric> {
    ALL.iter().copied().find(|m| m.name == name)
}

pub const ALL: [Metric; 41] = [
    server::MEMORY_MAX,
    server::MEMORY_USED,
    server::MEMORY_ACTUALLY_USED,
    server::SWAP_MAX,
    server::SWAP_USED,
    server::CPU_TOTAL,
    server::CPU_USER,
    server::CPU_SYSTEM,
    server::CPU_IO_WAIT,
    server::CPU_NICE,
    server::CPU_IRQ,
    server::CPU_SOFT_IRQ,
    server::CPU_STEAL,
    server::LOAD_1,
    server::LOAD_5,
    server::LOAD_15,
    server::IO_READS,
    server::IO_READ_BYTES,
    server::IO_WRITES,
    server::IO_WRITE_BYTES,
    server::NETWORK_READ_BYTES,
    server::NETWORK_WRITE_BYTES,
    server::INTERRUPTS,
    server::CONTEXT_SWITCHES,
    server::DISK_TOTAL,
    server::DISK_USED,
    server::UPTIME,
    process::MEMORY_RESIDENT,
    process::MEMORY_VIRTUAL,
    process::ALLOCATOR_ALLOCATED,
    process::ALLOCATOR_ACTIVE,
    process::ALLOCATOR_RESIDENT,
    process::ALLOCATOR_MAPPED,
    process::ALLOCATOR_RETAINED,
    process::CPU_TOTAL,
    process::CPU_USER,
    process::CPU_SYSTEM,
    process::THREAD,
    process::FILE_DESCRIPTORS,
    process::IO_READ_BYTES,
    process::IO_WRITE_BYTES,
];
