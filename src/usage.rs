// Delta math: turn two cumulative counter readings into percentages.
// Derived values are `None` ("unknown") whenever the delta is not trustworthy.

use crate::models::{CoreTicks, CpuTime, CpuUsage, RawSnapshot, TickKind};

/// Percentage of `elapsed_nanos` spent consuming `used_nanos`: `100 * used / elapsed`.
///
/// Returns `0.0` when `elapsed_nanos <= 0`; callers that need "unknown" must check the
/// elapsed time first. Not clamped: multi-core aggregates legitimately exceed 100.
pub fn compute_usage(elapsed_nanos: i64, used_nanos: i64) -> f64 {
    if elapsed_nanos <= 0 {
        return 0.0;
    }
    100.0 * used_nanos as f64 / elapsed_nanos as f64
}

/// Average usage of one tick kind over the cores present in both readings.
///
/// A core whose counters went backwards (reset, hot-plug renumbering) or did not advance
/// is left out of this cycle, and the average is taken over the cores that did contribute.
/// No contributing cores yields `0.0`.
pub fn compute_tick_usage(kind: TickKind, current: &[CoreTicks], previous: &[CoreTicks]) -> f64 {
    let mut sum = 0.0;
    let mut cores = 0usize;
    for delta in core_deltas(current, previous) {
        sum += compute_usage(delta.total() as i64, delta.get(kind) as i64);
        cores += 1;
    }
    if cores == 0 { 0.0 } else { sum / cores as f64 }
}

/// Per-kind breakdown of host CPU usage, or unknown when no core contributed.
/// `total` is busy time: every kind except idle and iowait.
pub fn tick_breakdown(current: &[CoreTicks], previous: &[CoreTicks]) -> CpuUsage {
    if core_deltas(current, previous).next().is_none() {
        return CpuUsage::unknown();
    }
    let usage = |kind| Some(compute_tick_usage(kind, current, previous));
    let user = usage(TickKind::User);
    let nice = usage(TickKind::Nice);
    let system = usage(TickKind::System);
    let irq = usage(TickKind::Irq);
    let soft_irq = usage(TickKind::SoftIrq);
    let steal = usage(TickKind::Steal);
    let total = [user, nice, system, irq, soft_irq, steal]
        .into_iter()
        .flatten()
        .sum::<f64>();
    CpuUsage {
        total: Some(total),
        user,
        system,
        nice,
        io_wait: usage(TickKind::IoWait),
        idle: usage(TickKind::Idle),
        irq,
        soft_irq,
        steal,
    }
}

/// Process CPU usage from cumulative CPU time over the elapsed wall interval.
/// User and system are derived independently; a reset in one leaves only that one unknown.
pub fn process_breakdown(elapsed_nanos: i64, current: CpuTime, previous: CpuTime) -> CpuUsage {
    if elapsed_nanos <= 0 {
        return CpuUsage::unknown();
    }
    let user = current
        .user_nanos
        .checked_sub(previous.user_nanos)
        .map(|d| compute_usage(elapsed_nanos, d as i64));
    let system = current
        .system_nanos
        .checked_sub(previous.system_nanos)
        .map(|d| compute_usage(elapsed_nanos, d as i64));
    let total = user.zip(system).map(|(u, s)| u + s);
    CpuUsage {
        total,
        user,
        system,
        ..CpuUsage::unknown()
    }
}

/// Derives CPU usage for `current` against the retained `previous` snapshot.
pub fn derive_cpu(previous: Option<&RawSnapshot>, current: &RawSnapshot) -> CpuUsage {
    let Some(previous) = previous else {
        return CpuUsage::unknown();
    };
    let elapsed_nanos = current
        .taken_at
        .checked_duration_since(previous.taken_at)
        .map(|d| d.as_nanos().min(i64::MAX as u128) as i64)
        .unwrap_or(0);
    if elapsed_nanos <= 0 {
        return CpuUsage::unknown();
    }
    if !current.cpu_ticks.is_empty() {
        return tick_breakdown(&current.cpu_ticks, &previous.cpu_ticks);
    }
    match (current.cpu_time, previous.cpu_time) {
        (Some(cur), Some(prev)) => process_breakdown(elapsed_nanos, cur, prev),
        _ => CpuUsage::unknown(),
    }
}

/// Deltas of cores present in both readings whose counters did not go backwards.
/// An all-zero entry marks an offline core and never contributes, and neither does a
/// core that accrued no ticks at all: it has no elapsed time to measure against.
fn core_deltas<'a>(
    current: &'a [CoreTicks],
    previous: &'a [CoreTicks],
) -> impl Iterator<Item = CoreTicks> + 'a {
    current.iter().zip(previous).filter_map(|(cur, prev)| {
        if cur.total() == 0 || prev.total() == 0 {
            return None;
        }
        let mut delta = [0u64; 8];
        for (i, d) in delta.iter_mut().enumerate() {
            *d = cur.ticks[i].checked_sub(prev.ticks[i])?;
        }
        let delta = CoreTicks::new(delta);
        (delta.total() > 0).then_some(delta)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(user: u64, system: u64, idle: u64) -> CoreTicks {
        CoreTicks::new([user, 0, system, idle, 0, 0, 0, 0])
    }

    #[test]
    fn core_deltas_skips_reset_cores() {
        let prev = [core(10, 10, 80), core(50, 50, 900)];
        let cur = [core(20, 20, 160), core(1, 1, 1)];
        let deltas: Vec<_> = core_deltas(&cur, &prev).collect();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].get(TickKind::User), 10);
        assert_eq!(deltas[0].total(), 100);
    }

    #[test]
    fn core_deltas_ignores_cores_missing_from_one_side() {
        let prev = [core(1, 0, 1)];
        let cur = [core(10, 0, 90), core(99, 0, 1)];
        assert_eq!(core_deltas(&cur, &prev).count(), 1);
    }

    #[test]
    fn breakdown_total_excludes_idle_and_io_wait() {
        let prev = [CoreTicks::new([1, 1, 1, 1, 1, 0, 0, 0])];
        let cur = [CoreTicks::new([11, 6, 16, 51, 21, 0, 0, 0])];
        let usage = tick_breakdown(&cur, &prev);
        assert_eq!(usage.total, Some(30.0));
        assert_eq!(usage.io_wait, Some(20.0));
        assert_eq!(usage.idle, Some(50.0));
    }

    #[test]
    fn offline_core_does_not_contribute() {
        let prev = [core(10, 10, 80), CoreTicks::default()];
        let cur = [core(20, 20, 160), core(500, 0, 0)];
        assert_eq!(core_deltas(&cur, &prev).count(), 1);
    }

    #[test]
    fn core_without_elapsed_ticks_does_not_contribute() {
        let prev = [core(10, 10, 80), core(40, 0, 60)];
        let cur = [core(20, 20, 160), core(40, 0, 60)];
        let deltas: Vec<_> = core_deltas(&cur, &prev).collect();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].total(), 100);
    }

    #[test]
    fn breakdown_with_no_common_core_is_unknown() {
        assert!(tick_breakdown(&[core(1, 1, 1)], &[]).is_unknown());
    }

    #[test]
    fn process_breakdown_marks_only_reset_field_unknown() {
        let prev = CpuTime {
            user_nanos: 500,
            system_nanos: 100,
        };
        let cur = CpuTime {
            user_nanos: 400,
            system_nanos: 200,
        };
        let usage = process_breakdown(1_000, cur, prev);
        assert!(usage.user.is_none());
        assert_eq!(usage.system, Some(10.0));
        assert!(usage.total.is_none());
    }
}
