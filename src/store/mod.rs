// Time-series store: batches of named points in, windowed averages out.
// Two backends behind one enum: in-memory (bounded by retention) and SQLite.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::metrics::{Metric, MetricKind};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// One stored value of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub timestamp: i64,
    pub value: f64,
}

/// Values of several series taken at the same wall-clock instant (ms since epoch).
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub timestamp: i64,
    pub points: Vec<(Metric, f64)>,
}

impl Batch {
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            points: Vec::new(),
        }
    }

    pub fn push(&mut self, metric: Metric, value: f64) {
        if value.is_finite() {
            self.points.push((metric, value));
        }
    }

    /// Pushes `value` only when it is known.
    pub fn push_opt(&mut self, metric: Metric, value: Option<f64>) {
        if let Some(v) = value {
            self.push(metric, v);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn value_of(&self, name: &str) -> Option<f64> {
        self.points
            .iter()
            .find(|(m, _)| m.name == name)
            .map(|(_, v)| *v)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreMode {
    #[default]
    Memory,
    Disk(PathBuf),
}

pub enum SeriesStore {
    Memory(MemoryStore),
    Disk(SqliteStore),
}

impl SeriesStore {
    pub async fn open(mode: &StoreMode, retention: Duration) -> anyhow::Result<Self> {
        Ok(match mode {
            StoreMode::Memory => Self::Memory(MemoryStore::new(retention)),
            StoreMode::Disk(path) => Self::Disk(SqliteStore::connect(path, retention).await?),
        })
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Disk(_) => "disk",
        }
    }

    pub async fn add(&self, batch: &Batch) -> anyhow::Result<()> {
        match self {
            Self::Memory(s) => s.add(batch),
            Self::Disk(s) => s.add(batch).await,
        }
    }

    /// Average of `metric` over the last `window`, or `None` without data.
    /// Counters are averaged as per-second rates.
    pub async fn average(&self, metric: &str, window: Duration) -> anyhow::Result<Option<f64>> {
        let since = window_start(window);
        let (kind, points) = match self {
            Self::Memory(s) => s.points_since(metric, since)?,
            Self::Disk(s) => s.points_since(metric, since).await?,
        };
        Ok(kind.and_then(|kind| average_points(kind, &points)))
    }

    /// Raw points of `metric` within the last `window`, oldest first.
    pub async fn points(&self, metric: &str, window: Duration) -> anyhow::Result<Vec<Point>> {
        let since = window_start(window);
        let (_, points) = match self {
            Self::Memory(s) => s.points_since(metric, since)?,
            Self::Disk(s) => s.points_since(metric, since).await?,
        };
        Ok(points)
    }

    /// Names of all series with stored data, sorted.
    pub async fn metrics(&self) -> anyhow::Result<Vec<String>> {
        match self {
            Self::Memory(s) => s.metrics(),
            Self::Disk(s) => s.metrics().await,
        }
    }

    pub async fn clear(&self) -> anyhow::Result<()> {
        match self {
            Self::Memory(s) => s.clear(),
            Self::Disk(s) => s.clear().await,
        }
    }
}

fn window_start(window: Duration) -> i64 {
    let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
    chrono::Utc::now()
        .timestamp_millis()
        .saturating_sub(window_ms)
}

/// Gauges: plain mean. Counters: mean of per-second rates between consecutive points,
/// skipping pairs where the counter went backwards or time did not advance.
pub fn average_points(kind: MetricKind, points: &[Point]) -> Option<f64> {
    match kind {
        MetricKind::Gauge => {
            if points.is_empty() {
                return None;
            }
            Some(points.iter().map(|p| p.value).sum::<f64>() / points.len() as f64)
        }
        MetricKind::Counter => {
            let rates: Vec<f64> = points
                .windows(2)
                .filter_map(|pair| {
                    let elapsed_ms = pair[1].timestamp - pair[0].timestamp;
                    let delta = pair[1].value - pair[0].value;
                    (elapsed_ms > 0 && delta >= 0.0).then(|| delta * 1000.0 / elapsed_ms as f64)
                })
                .collect();
            if rates.is_empty() {
                return None;
            }
            Some(rates.iter().sum::<f64>() / rates.len() as f64)
        }
    }
}
