// Maps a Sample onto the catalog series of one collector kind.

use crate::metrics::{self, Metric};
use crate::models::{MemoryPoolKind, Sample};
use crate::store::Batch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Server,
    Process,
}

impl Profile {
    pub fn name(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Process => "process",
        }
    }

    /// Series that feed the collector's summary statistics.
    pub fn tracked(self) -> &'static [Metric] {
        match self {
            Self::Server => &metrics::server::TRACKED,
            Self::Process => &metrics::process::TRACKED,
        }
    }

    /// Known values of `sample` as store points. Unknown values are left out.
    pub fn batch(self, sample: &Sample) -> Batch {
        let mut batch = Batch::new(sample.timestamp);
        match self {
            Self::Server => server_points(sample, &mut batch),
            Self::Process => process_points(sample, &mut batch),
        }
        batch
    }
}

fn server_points(sample: &Sample, batch: &mut Batch) {
    use metrics::server::*;

    if let Some(m) = sample.host_memory {
        batch.push(MEMORY_MAX, m.total as f64);
        batch.push(MEMORY_USED, m.used as f64);
        batch.push(MEMORY_ACTUALLY_USED, m.actually_used as f64);
        batch.push(SWAP_MAX, m.swap_total as f64);
        batch.push(SWAP_USED, m.swap_used as f64);
    }

    let cpu = &sample.cpu;
    batch.push_opt(CPU_TOTAL, cpu.total);
    batch.push_opt(CPU_USER, cpu.user);
    batch.push_opt(CPU_SYSTEM, cpu.system);
    batch.push_opt(CPU_IO_WAIT, cpu.io_wait);
    batch.push_opt(CPU_NICE, cpu.nice);
    batch.push_opt(CPU_IRQ, cpu.irq);
    batch.push_opt(CPU_SOFT_IRQ, cpu.soft_irq);
    batch.push_opt(CPU_STEAL, cpu.steal);

    if let Some(load) = sample.load {
        batch.push(LOAD_1, load.one);
        batch.push(LOAD_5, load.five);
        batch.push(LOAD_15, load.fifteen);
    }

    if let Some(io) = sample.io {
        batch.push_opt(IO_READS, io.reads.map(|v| v as f64));
        batch.push(IO_READ_BYTES, io.read_bytes as f64);
        batch.push_opt(IO_WRITES, io.writes.map(|v| v as f64));
        batch.push(IO_WRITE_BYTES, io.write_bytes as f64);
    }

    if let Some(net) = sample.network {
        batch.push(NETWORK_READ_BYTES, net.read_bytes as f64);
        batch.push(NETWORK_WRITE_BYTES, net.write_bytes as f64);
    }

    if let Some(kernel) = sample.kernel {
        batch.push(INTERRUPTS, kernel.interrupts as f64);
        batch.push(CONTEXT_SWITCHES, kernel.context_switches as f64);
    }

    if let Some(disk) = sample.disk_space {
        batch.push(DISK_TOTAL, disk.total as f64);
        batch.push(DISK_USED, disk.used as f64);
    }

    batch.push_opt(UPTIME, sample.uptime_secs.map(|v| v as f64));
}

fn process_points(sample: &Sample, batch: &mut Batch) {
    use metrics::process::*;

    if let Some(m) = sample.process_memory {
        batch.push(MEMORY_RESIDENT, m.resident as f64);
        batch.push(MEMORY_VIRTUAL, m.virtual_size as f64);
    }

    for pool in &sample.memory_pools {
        let metric = match pool.kind {
            MemoryPoolKind::Allocated => ALLOCATOR_ALLOCATED,
            MemoryPoolKind::Active => ALLOCATOR_ACTIVE,
            MemoryPoolKind::Resident => ALLOCATOR_RESIDENT,
            MemoryPoolKind::Mapped => ALLOCATOR_MAPPED,
            MemoryPoolKind::Retained => ALLOCATOR_RETAINED,
        };
        batch.push(metric, pool.bytes as f64);
    }

    let cpu = &sample.cpu;
    batch.push_opt(CPU_TOTAL, cpu.total);
    batch.push_opt(CPU_USER, cpu.user);
    batch.push_opt(CPU_SYSTEM, cpu.system);

    batch.push_opt(THREAD, sample.threads.map(|v| v as f64));
    batch.push_opt(FILE_DESCRIPTORS, sample.file_descriptors.map(|v| v as f64));

    if let Some(io) = sample.io {
        batch.push(IO_READ_BYTES, io.read_bytes as f64);
        batch.push(IO_WRITE_BYTES, io.write_bytes as f64);
    }
}
