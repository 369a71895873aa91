// SQLite-backed series: one row per point, pruned by retention every few batches.

use super::{Batch, Point};
use crate::metrics::MetricKind;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::instrument;

const PRUNE_EVERY_BATCHES: u64 = 100;

pub struct SqliteStore {
    pool: SqlitePool,
    retention_ms: i64,
    batches: AtomicU64,
}

impl SqliteStore {
    pub async fn connect(path: &Path, retention: Duration) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new().connect_with(opts).await?;
        let store = Self {
            pool,
            retention_ms: i64::try_from(retention.as_millis()).unwrap_or(i64::MAX),
            batches: AtomicU64::new(0),
        };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS series (name TEXT PRIMARY KEY, counter INTEGER NOT NULL)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS points (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                metric TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                value REAL NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_points_metric_created_at ON points(metric, created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self, batch), fields(store = "disk", operation = "add", points_count = batch.len()))]
    pub async fn add(&self, batch: &Batch) -> anyhow::Result<()> {
        if !batch.is_empty() {
            let mut tx = self.pool.begin().await?;
            for (metric, value) in &batch.points {
                sqlx::query("INSERT OR IGNORE INTO series (name, counter) VALUES ($1, $2)")
                    .bind(metric.name)
                    .bind(metric.is_counter())
                    .execute(&mut *tx)
                    .await?;
                sqlx::query("INSERT INTO points (metric, created_at, value) VALUES ($1, $2, $3)")
                    .bind(metric.name)
                    .bind(batch.timestamp)
                    .bind(*value)
                    .execute(&mut *tx)
                    .await?;
            }
            tx.commit().await?;
        }

        if self.batches.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY_BATCHES == 0 {
            self.prune_old_data(batch.timestamp).await?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(store = "disk", operation = "prune_old_data"))]
    async fn prune_old_data(&self, now_ms: i64) -> anyhow::Result<()> {
        let cutoff = now_ms.saturating_sub(self.retention_ms);
        sqlx::query("DELETE FROM points WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM series WHERE name NOT IN (SELECT DISTINCT metric FROM points)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(store = "disk", operation = "points_since"))]
    pub async fn points_since(
        &self,
        metric: &str,
        since: i64,
    ) -> anyhow::Result<(Option<MetricKind>, Vec<Point>)> {
        let kind = sqlx::query("SELECT counter FROM series WHERE name = $1")
            .bind(metric)
            .fetch_optional(&self.pool)
            .await?;
        let Some(kind) = kind else {
            return Ok((None, Vec::new()));
        };
        let counter: bool = kind.try_get("counter")?;
        let kind = if counter {
            MetricKind::Counter
        } else {
            MetricKind::Gauge
        };

        let rows = sqlx::query(
            "SELECT created_at, value FROM points WHERE metric = $1 AND created_at >= $2 ORDER BY created_at ASC, id ASC",
        )
        .bind(metric)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let mut points = Vec::with_capacity(rows.len());
        for row in rows {
            points.push(Point {
                timestamp: row.try_get("created_at")?,
                value: row.try_get("value")?,
            });
        }
        Ok((Some(kind), points))
    }

    pub async fn metrics(&self) -> anyhow::Result<Vec<String>> {
        let rows = sqlx::query("SELECT DISTINCT metric FROM points ORDER BY metric ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row.try_get("metric").map_err(anyhow::Error::from))
            .collect()
    }

    #[instrument(skip(self), fields(store = "disk", operation = "clear"))]
    pub async fn clear(&self) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM points").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM series").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }
}
