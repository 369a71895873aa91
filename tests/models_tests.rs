// Model serialization tests (JSON camelCase, unknown values) and the metric catalog

use hoststat::metrics::{self, MetricKind};
use hoststat::models::*;
use std::time::Instant;

fn sample() -> Sample {
    let mut snapshot = RawSnapshot::at(Instant::now(), 1_700_000_000_000);
    snapshot.host_memory = Some(HostMemory {
        total: 1024,
        used: 900,
        actually_used: 512,
        swap_total: 0,
        swap_used: 0,
    });
    snapshot.memory_pools = vec![MemoryPool {
        kind: MemoryPoolKind::Allocated,
        bytes: 64,
    }];
    let cpu = CpuUsage {
        total: Some(12.5),
        io_wait: Some(1.0),
        ..CpuUsage::unknown()
    };
    Sample::from_snapshot(&snapshot, cpu)
}

#[test]
fn test_sample_serialization_camel_case() {
    let json = serde_json::to_string(&sample()).unwrap();
    assert!(json.contains("\"hostMemory\""));
    assert!(json.contains("\"actuallyUsed\""));
    assert!(json.contains("\"ioWait\""));
    assert!(json.contains("\"memoryPools\""));
    let back: Sample = serde_json::from_str(&json).unwrap();
    assert_eq!(back, sample());
}

#[test]
fn test_unknown_cpu_serializes_as_null_not_zero() {
    let json = serde_json::to_value(CpuUsage::unknown()).unwrap();
    assert!(json["total"].is_null());
    assert!(json["softIrq"].is_null());
}

#[test]
fn test_core_ticks_total_sums_every_kind() {
    let ticks = CoreTicks::new([1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(ticks.total(), 36);
    assert_eq!(ticks.get(TickKind::Steal), 8);
    assert_eq!(ticks.get(TickKind::IoWait), 5);
}

#[test]
fn test_summary_statistics_track_min_max_average() {
    let mut stats = SummaryStatistics::new();
    for v in [3.0, 1.0, 8.0] {
        stats.accept("server.cpu.total", v);
    }
    stats.accept("server.cpu.total", f64::NAN);
    let acc = stats.get("server.cpu.total").unwrap();
    assert_eq!(acc.count(), 3);
    assert_eq!(acc.min(), Some(1.0));
    assert_eq!(acc.max(), Some(8.0));
    assert_eq!(stats.average("server.cpu.total"), Some(4.0));
    assert_eq!(stats.average("server.load.1"), None);
    stats.clear();
    assert!(stats.is_empty());
}

#[test]
fn test_metric_catalog_names_are_unique_and_findable() {
    for metric in metrics::ALL {
        let found = metrics::find(metric.name).unwrap();
        assert_eq!(found, metric);
        assert_eq!(metrics::ALL.iter().filter(|m| m.name == metric.name).count(), 1);
    }
    assert_eq!(metrics::find("server.cpu.total").unwrap().kind, MetricKind::Gauge);
    assert!(metrics::find("server.io.read.bytes").unwrap().is_counter());
    assert!(metrics::find("jvm.gc.count").is_none());
}
