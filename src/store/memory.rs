// In-memory series, pruned to the retention window on every add.

use super::{Batch, Point};
use crate::metrics::MetricKind;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

struct Series {
    kind: MetricKind,
    points: VecDeque<Point>,
}

pub struct MemoryStore {
    retention_ms: i64,
    series: Mutex<BTreeMap<String, Series>>,
}

impl MemoryStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            retention_ms: i64::try_from(retention.as_millis()).unwrap_or(i64::MAX),
            series: Mutex::new(BTreeMap::new()),
        }
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, BTreeMap<String, Series>>> {
        self.series
            .lock()
            .map_err(|e| anyhow::anyhow!("memory store lock poisoned: {}", e))
    }

    pub fn add(&self, batch: &Batch) -> anyhow::Result<()> {
        let mut series = self.lock()?;
        for (metric, value) in &batch.points {
            let entry = series
                .entry(metric.name.to_string())
                .or_insert_with(|| Series {
                    kind: metric.kind,
                    points: VecDeque::new(),
                });
            entry.points.push_back(Point {
                timestamp: batch.timestamp,
                value: *value,
            });
        }
        let cutoff = batch.timestamp.saturating_sub(self.retention_ms);
        for entry in series.values_mut() {
            while entry.points.front().is_some_and(|p| p.timestamp < cutoff) {
                entry.points.pop_front();
            }
        }
        series.retain(|_, s| !s.points.is_empty());
        Ok(())
    }

    pub fn points_since(
        &self,
        metric: &str,
        since: i64,
    ) -> anyhow::Result<(Option<MetricKind>, Vec<Point>)> {
        let series = self.lock()?;
        let Some(entry) = series.get(metric) else {
            return Ok((None, Vec::new()));
        };
        let points = entry
            .points
            .iter()
            .filter(|p| p.timestamp >= since)
            .copied()
            .collect();
        Ok((Some(entry.kind), points))
    }

    pub fn metrics(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::server;

    fn batch(timestamp: i64, value: f64) -> Batch {
        let mut b = Batch::new(timestamp);
        b.push(server::CPU_TOTAL, value);
        b
    }

    fn stored(store: &MemoryStore) -> usize {
        store.points_since("server.cpu.total", i64::MIN).unwrap().1.len()
    }

    #[test]
    fn retention_prunes_old_points() {
        let store = MemoryStore::new(Duration::from_secs(10));
        store.add(&batch(0, 1.0)).unwrap();
        store.add(&batch(5_000, 2.0)).unwrap();
        store.add(&batch(12_000, 3.0)).unwrap();
        assert_eq!(stored(&store), 2);
        store.add(&batch(30_000, 4.0)).unwrap();
        assert_eq!(stored(&store), 1);
    }

    #[test]
    fn clear_forgets_every_series() {
        let store = MemoryStore::new(Duration::from_secs(60));
        store.add(&batch(0, 1.0)).unwrap();
        store.clear().unwrap();
        assert!(store.metrics().unwrap().is_empty());
    }
}
