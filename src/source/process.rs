// Per-process counters for one pid (usually our own).

use super::{CounterSource, SourceError, allocator, linux};
use crate::models::{CpuTime, IoCounters, ProcessMemory, RawSnapshot};
use std::sync::{Mutex, PoisonError};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::instrument;

pub struct ProcessSource {
    pid: Pid,
    /// Allocator pools describe our own heap, so they are only reported for ourselves.
    is_self: bool,
    sys: Mutex<System>,
}

impl ProcessSource {
    /// Monitors the running process.
    pub fn current() -> Result<Self, SourceError> {
        let pid = sysinfo::get_current_pid().map_err(|e| SourceError::Unavailable(e.to_string()))?;
        Ok(Self::with_pid(pid, true))
    }

    /// Monitors an arbitrary pid. Sampling fails with `Unavailable` while it does not exist.
    pub fn for_pid(pid: u32) -> Self {
        let pid = Pid::from_u32(pid);
        let is_self = sysinfo::get_current_pid().is_ok_and(|own| own == pid);
        Self::with_pid(pid, is_self)
    }

    fn with_pid(pid: Pid, is_self: bool) -> Self {
        Self {
            pid,
            is_self,
            sys: Mutex::new(System::new()),
        }
    }

    fn refresh(&self, sys: &mut System) -> Result<(), SourceError> {
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::everything(),
        );
        if sys.process(self.pid).is_none() {
            return Err(SourceError::Unavailable(format!(
                "process {} not found",
                self.pid
            )));
        }
        Ok(())
    }
}

impl CounterSource for ProcessSource {
    fn name(&self) -> &str {
        "process"
    }

    fn check_available(&self) -> Result<(), SourceError> {
        let mut sys = self.sys.lock().unwrap_or_else(PoisonError::into_inner);
        self.refresh(&mut sys)
    }

    #[instrument(skip(self), fields(source = "process", pid = %self.pid, operation = "sample_now"))]
    fn sample_now(&self) -> Result<RawSnapshot, SourceError> {
        let mut sys = self.sys.lock().unwrap_or_else(PoisonError::into_inner);
        self.refresh(&mut sys)?;
        let mut snapshot = RawSnapshot::now();
        let process = sys
            .process(self.pid)
            .ok_or_else(|| SourceError::Unavailable(format!("process {} not found", self.pid)))?;

        let raw_pid = self.pid.as_u32();
        snapshot.cpu_time = Some(match linux::read_pid_cpu_ticks(raw_pid) {
            Some((utime, stime)) => CpuTime {
                user_nanos: linux::ticks_to_nanos(utime),
                system_nanos: linux::ticks_to_nanos(stime),
            },
            // No user/system split available: account everything as user time.
            None => CpuTime {
                user_nanos: process.accumulated_cpu_time().saturating_mul(1_000_000),
                system_nanos: 0,
            },
        });

        snapshot.process_memory = Some(ProcessMemory {
            resident: process.memory(),
            virtual_size: process.virtual_memory(),
        });

        snapshot.threads = process.tasks().map(|tasks| 1 + tasks.len() as u64);
        snapshot.file_descriptors = linux::count_open_files(raw_pid);

        let disk = process.disk_usage();
        snapshot.io = Some(IoCounters {
            reads: None,
            read_bytes: disk.total_read_bytes,
            writes: None,
            write_bytes: disk.total_written_bytes,
        });

        if self.is_self {
            snapshot.memory_pools = allocator::read_pools();
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_process_is_available() {
        let source = ProcessSource::current().unwrap();
        assert!(source.check_available().is_ok());
        let snapshot = source.sample_now().unwrap();
        assert!(snapshot.cpu_time.is_some());
        assert!(snapshot.process_memory.is_some());
    }

    #[test]
    fn missing_pid_is_unavailable() {
        let source = ProcessSource::for_pid(u32::MAX - 7);
        assert!(matches!(
            source.sample_now(),
            Err(SourceError::Unavailable(_))
        ));
    }
}
