// Linux-specific readers: /proc/stat, /proc/diskstats, /proc/<pid>/stat, /proc/<pid>/fd.
// Parsers take file contents so they can be tested on any platform.

use crate::models::{CoreTicks, KernelCounters};
use std::sync::OnceLock;

/// Clock ticks per second of the /proc tick counters (USER_HZ) when the kernel does not
/// report it. 100 on every mainstream Linux architecture.
const DEFAULT_USER_HZ: u64 = 100;

/// Auxiliary vector key carrying the kernel's USER_HZ.
const AT_CLKTCK: usize = 17;

/// Reads `AT_CLKTCK` from raw `/proc/self/auxv` contents: native-endian, word-sized
/// key/value pairs terminated by a zero key.
pub(super) fn parse_auxv_clock_ticks(auxv: &[u8]) -> Option<u64> {
    const WORD: usize = std::mem::size_of::<usize>();
    let word = |bytes: &[u8]| <[u8; WORD]>::try_from(bytes).ok().map(usize::from_ne_bytes);
    for pair in auxv.chunks_exact(2 * WORD) {
        let key = word(&pair[..WORD])?;
        match key {
            0 => return None,
            AT_CLKTCK => return word(&pair[WORD..]).map(|v| v as u64).filter(|&hz| hz > 0),
            _ => {}
        }
    }
    None
}

/// USER_HZ of the running kernel, read once.
pub(super) fn clock_ticks_per_sec() -> u64 {
    static HZ: OnceLock<u64> = OnceLock::new();
    *HZ.get_or_init(|| {
        #[cfg(target_os = "linux")]
        {
            std::fs::read("/proc/self/auxv")
                .ok()
                .and_then(|auxv| parse_auxv_clock_ticks(&auxv))
                .unwrap_or(DEFAULT_USER_HZ)
        }
        #[cfg(not(target_os = "linux"))]
        DEFAULT_USER_HZ
    })
}

/// Converts a /proc tick count to nanoseconds.
pub(super) fn ticks_to_nanos(ticks: u64) -> u64 {
    let hz = clock_ticks_per_sec();
    (u128::from(ticks) * 1_000_000_000 / u128::from(hz)).min(u128::from(u64::MAX)) as u64
}

#[derive(Debug, Default, PartialEq)]
pub(super) struct ProcStat {
    /// Indexed by cpu number; offline cores leave an all-zero entry.
    pub cores: Vec<CoreTicks>,
    pub kernel: KernelCounters,
}

pub(super) fn parse_proc_stat(content: &str) -> ProcStat {
    let mut stat = ProcStat::default();
    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let Some(key) = fields.next() else {
            continue;
        };
        if let Some(index) = key.strip_prefix("cpu") {
            // The aggregate "cpu" line has no index; per-core lines are "cpuN".
            let Ok(index) = index.parse::<usize>() else {
                continue;
            };
            let mut ticks = [0u64; 8];
            for (slot, value) in ticks.iter_mut().zip(fields) {
                *slot = value.parse().unwrap_or(0);
            }
            if stat.cores.len() <= index {
                stat.cores.resize(index + 1, CoreTicks::default());
            }
            stat.cores[index] = CoreTicks::new(ticks);
        } else if key == "intr" {
            stat.kernel.interrupts = fields.next().and_then(|v| v.parse().ok()).unwrap_or(0);
        } else if key == "ctxt" {
            stat.kernel.context_switches = fields.next().and_then(|v| v.parse().ok()).unwrap_or(0);
        }
    }
    stat
}

/// Sums completed read and write operations over whole disks accepted by `is_disk`.
pub(super) fn parse_diskstats(content: &str, is_disk: impl Fn(&str) -> bool) -> (u64, u64) {
    let mut reads = 0u64;
    let mut writes = 0u64;
    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 8 || !is_disk(fields[2]) {
            continue;
        }
        reads = reads.saturating_add(fields[3].parse().unwrap_or(0));
        writes = writes.saturating_add(fields[7].parse().unwrap_or(0));
    }
    (reads, writes)
}

/// User and system CPU time (in ticks) from a /proc/<pid>/stat line.
pub(super) fn parse_pid_stat(content: &str) -> Option<(u64, u64)> {
    // comm may contain spaces and parentheses; fields resume after the last ')'.
    let rest = &content[content.rfind(')')? + 1..];
    let fields: Vec<&str> = rest.split_whitespace().collect();
    let utime = fields.get(11)?.parse().ok()?;
    let stime = fields.get(12)?.parse().ok()?;
    Some((utime, stime))
}

pub(super) fn read_proc_stat() -> Option<ProcStat> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/stat").ok()?;
        Some(parse_proc_stat(&content))
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Disk operation counters for whole block devices (no partitions, loop or ram devices).
pub(super) fn read_disk_operations() -> Option<(u64, u64)> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/diskstats").ok()?;
        Some(parse_diskstats(&content, |name| {
            !name.starts_with("loop")
                && !name.starts_with("ram")
                && std::path::Path::new("/sys/block").join(name).exists()
        }))
    }
    #[cfg(not(target_os = "linux"))]
    None
}

pub(super) fn read_pid_cpu_ticks(pid: u32) -> Option<(u64, u64)> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string(format!("/proc/{}/stat", pid)).ok()?;
        parse_pid_stat(&content)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = pid;
        None
    }
}

pub(super) fn count_open_files(pid: u32) -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let entries = std::fs::read_dir(format!("/proc/{}/fd", pid)).ok()?;
        Some(entries.count() as u64)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = pid;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TickKind;

    const PROC_STAT: &str = "\
cpu  4705 356 584 3699 23 23 0 0 0 0
cpu0 1393280 32966 572056 13343292 6130 0 17875 0 23933 0
cpu2 1335887 35283 508130 13431405 5519 0 4766 7 0 0
intr 114930548 113199788 3 0 5 263 0 4 [... lots more numbers ...]
ctxt 1990473
btime 1062191376
processes 2915
";

    #[test]
    fn proc_stat_parses_per_core_ticks_by_index() {
        let stat = parse_proc_stat(PROC_STAT);
        assert_eq!(stat.cores.len(), 3);
        assert_eq!(stat.cores[0].get(TickKind::User), 1393280);
        assert_eq!(stat.cores[0].get(TickKind::SoftIrq), 17875);
        assert_eq!(stat.cores[2].get(TickKind::Steal), 7);
        assert_eq!(stat.cores[1], CoreTicks::default());
    }

    #[test]
    fn proc_stat_parses_kernel_counters() {
        let stat = parse_proc_stat(PROC_STAT);
        assert_eq!(stat.kernel.interrupts, 114930548);
        assert_eq!(stat.kernel.context_switches, 1990473);
    }

    #[test]
    fn diskstats_sums_whole_disks_only() {
        let content = "\
   8       0 sda 100 0 800 50 200 0 1600 90 0 0 0 0 0 0 0
   8       1 sda1 60 0 480 30 150 0 1200 60 0 0 0 0 0 0 0
   7       0 loop0 5 0 10 1 0 0 0 0 0 0 0 0 0 0 0
 259       0 nvme0n1 40 0 320 20 10 0 80 5 0 0 0 0 0 0 0
";
        let (reads, writes) =
            parse_diskstats(content, |name| name == "sda" || name == "nvme0n1");
        assert_eq!(reads, 140);
        assert_eq!(writes, 210);
    }

    #[test]
    fn pid_stat_handles_spaces_in_command_name() {
        let content = "4242 (my (odd) proc) S 1 4242 4242 0 -1 4194560 1500 0 3 0 250 75 0 0 20 0 9 0 100 0 0";
        assert_eq!(parse_pid_stat(content), Some((250, 75)));
    }

    #[test]
    fn pid_stat_rejects_truncated_line() {
        assert_eq!(parse_pid_stat("1 (init) S 0 1"), None);
    }

    fn auxv(pairs: &[(usize, usize)]) -> Vec<u8> {
        pairs
            .iter()
            .flat_map(|(k, v)| k.to_ne_bytes().into_iter().chain(v.to_ne_bytes()))
            .collect()
    }

    #[test]
    fn auxv_reports_clock_ticks() {
        let content = auxv(&[(6, 4096), (AT_CLKTCK, 250), (0, 0)]);
        assert_eq!(parse_auxv_clock_ticks(&content), Some(250));
    }

    #[test]
    fn auxv_without_clock_ticks_is_none() {
        assert_eq!(parse_auxv_clock_ticks(&auxv(&[(6, 4096), (0, 0)])), None);
        // Entries after the terminator are ignored.
        assert_eq!(parse_auxv_clock_ticks(&auxv(&[(0, 0), (AT_CLKTCK, 100)])), None);
        assert_eq!(parse_auxv_clock_ticks(&auxv(&[(AT_CLKTCK, 0)])), None);
        assert_eq!(parse_auxv_clock_ticks(&[1, 2, 3]), None);
    }

    #[test]
    fn one_second_of_ticks_is_one_second_of_nanos() {
        let hz = clock_ticks_per_sec();
        assert!(hz > 0);
        assert_eq!(ticks_to_nanos(hz), 1_000_000_000);
        assert_eq!(ticks_to_nanos(0), 0);
    }
}
