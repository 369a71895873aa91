// Host-wide counters via sysinfo plus /proc tick counters

use super::{CounterSource, SourceError, linux};
use crate::models::{
    DiskSpace, HostMemory, IoCounters, LoadAverage, NetworkCounters, RawSnapshot,
};
use std::sync::{Mutex, PoisonError};
use sysinfo::{Disks, Networks, System};
use tracing::instrument;

struct HostState {
    sys: System,
    disks: Disks,
    networks: Networks,
}

pub struct HostSource {
    state: Mutex<HostState>,
}

impl Default for HostSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HostSource {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        Self {
            state: Mutex::new(HostState {
                sys,
                disks: Disks::new_with_refreshed_list(),
                networks: Networks::new_with_refreshed_list(),
            }),
        }
    }
}

impl CounterSource for HostSource {
    fn name(&self) -> &str {
        "server"
    }

    #[instrument(skip(self), fields(source = "server", operation = "sample_now"))]
    fn sample_now(&self) -> Result<RawSnapshot, SourceError> {
        // Every field is refreshed before it is read, so state left by a panicked call is usable.
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let HostState {
            sys,
            disks,
            networks,
        } = &mut *state;

        let mut snapshot = RawSnapshot::now();

        if let Some(stat) = linux::read_proc_stat() {
            snapshot.cpu_ticks = stat.cores;
            snapshot.kernel = Some(stat.kernel);
        }

        let load = System::load_average();
        snapshot.load = Some(LoadAverage {
            one: load.one,
            five: load.five,
            fifteen: load.fifteen,
        });

        sys.refresh_memory();
        let total = sys.total_memory();
        snapshot.host_memory = Some(HostMemory {
            total,
            used: sys.used_memory(),
            actually_used: total.saturating_sub(sys.available_memory()),
            swap_total: sys.total_swap(),
            swap_used: sys.used_swap(),
        });

        disks.refresh(true);
        let (read_bytes, write_bytes) = disks.list().iter().fold((0u64, 0u64), |(r, w), d| {
            let usage = d.usage();
            (
                r.saturating_add(usage.total_read_bytes),
                w.saturating_add(usage.total_written_bytes),
            )
        });
        snapshot.disk_space = Some(disks.list().iter().fold(DiskSpace::default(), |acc, d| {
            let total = d.total_space();
            DiskSpace {
                total: acc.total.saturating_add(total),
                used: acc
                    .used
                    .saturating_add(total.saturating_sub(d.available_space())),
            }
        }));
        let operations = linux::read_disk_operations();
        snapshot.io = Some(IoCounters {
            reads: operations.map(|(reads, _)| reads),
            read_bytes,
            writes: operations.map(|(_, writes)| writes),
            write_bytes,
        });

        networks.refresh(true);
        let (received, transmitted) =
            networks
                .list()
                .values()
                .fold((0u64, 0u64), |(rx, tx), data| {
                    (
                        rx.saturating_add(data.total_received()),
                        tx.saturating_add(data.total_transmitted()),
                    )
                });
        snapshot.network = Some(NetworkCounters {
            read_bytes: received,
            write_bytes: transmitted,
        });

        snapshot.uptime_secs = Some(System::uptime());

        Ok(snapshot)
    }
}
