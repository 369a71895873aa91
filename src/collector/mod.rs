// Scheduled collector: lifecycle, recurring ticks on the shared tokio runtime, manual scrapes.
// One cycle (sample -> store -> statistics) at a time per collector, guarded by `cycle`.

mod profile;

pub use profile::Profile;

use crate::error::CollectorError;
use crate::models::{Sample, SummaryStatistics};
use crate::sampler::Sampler;
use crate::source::{CounterSource, HostSource, ProcessSource};
use crate::store::{SeriesStore, StoreMode};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::{OnceCell, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};
use tracing::Instrument;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

struct Ticker {
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

struct Lifecycle {
    interval: Duration,
    ticker: Option<Ticker>,
}

struct StoreConfig {
    mode: StoreMode,
    retention: Duration,
}

struct Inner {
    profile: Profile,
    source: Arc<dyn CounterSource>,
    sampler: Arc<Mutex<Sampler>>,
    cycle: tokio::sync::Mutex<()>,
    lifecycle: tokio::sync::Mutex<Lifecycle>,
    running: AtomicBool,
    store_config: Mutex<StoreConfig>,
    store: OnceCell<Arc<SeriesStore>>,
    statistics: Mutex<SummaryStatistics>,
    last: Mutex<Option<Sample>>,
    /// Deadline of the most recent scheduled tick; anchors interval changes.
    last_tick: Mutex<Option<Instant>>,
}

/// Cheap to clone; clones share the same collector.
#[derive(Clone)]
pub struct ScheduledCollector {
    inner: Arc<Inner>,
}

impl ScheduledCollector {
    pub fn new(profile: Profile, source: Arc<dyn CounterSource>) -> Self {
        Self {
            inner: Arc::new(Inner {
                profile,
                sampler: Arc::new(Mutex::new(Sampler::new(source.clone()))),
                source,
                cycle: tokio::sync::Mutex::new(()),
                lifecycle: tokio::sync::Mutex::new(Lifecycle {
                    interval: DEFAULT_INTERVAL,
                    ticker: None,
                }),
                running: AtomicBool::new(false),
                store_config: Mutex::new(StoreConfig {
                    mode: StoreMode::Memory,
                    retention: DEFAULT_RETENTION,
                }),
                store: OnceCell::new(),
                statistics: Mutex::new(SummaryStatistics::new()),
                last: Mutex::new(None),
                last_tick: Mutex::new(None),
            }),
        }
    }

    /// Host-wide collector (`server.*`).
    pub fn server() -> Self {
        Self::new(Profile::Server, Arc::new(HostSource::new()))
    }

    /// Collector for the running process (`process.*`).
    pub fn process() -> Result<Self, CollectorError> {
        Ok(Self::new(Profile::Process, Arc::new(ProcessSource::current()?)))
    }

    /// Collector for another process by pid.
    pub fn process_for_pid(pid: u32) -> Self {
        Self::new(Profile::Process, Arc::new(ProcessSource::for_pid(pid)))
    }

    pub fn name(&self) -> &'static str {
        self.inner.profile.name()
    }

    pub fn is_started(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    pub async fn interval(&self) -> Duration {
        self.inner.lifecycle.lock().await.interval
    }

    pub fn use_memory(&self) -> Result<(), CollectorError> {
        self.configure_store(|config| config.mode = StoreMode::Memory)
    }

    pub fn use_disk(&self, path: impl Into<PathBuf>) -> Result<(), CollectorError> {
        let path = path.into();
        self.configure_store(|config| config.mode = StoreMode::Disk(path))
    }

    /// How long the store keeps points.
    pub fn set_retention(&self, retention: Duration) -> Result<(), CollectorError> {
        self.configure_store(|config| config.retention = retention)
    }

    fn configure_store(&self, apply: impl FnOnce(&mut StoreConfig)) -> Result<(), CollectorError> {
        let mut config = self
            .inner
            .store_config
            .lock()
            .map_err(|e| CollectorError::Collection(format!("store config lock poisoned: {}", e)))?;
        if self.is_started() || self.inner.store.initialized() {
            return Err(CollectorError::AlreadyStarted(self.name().to_string()));
        }
        apply(&mut config);
        Ok(())
    }

    /// The collector's store, created on first use with the chosen mode.
    pub async fn store(&self) -> Result<Arc<SeriesStore>, CollectorError> {
        let store = self
            .inner
            .store
            .get_or_try_init(|| async {
                let (mode, retention) = {
                    let config = self
                        .inner
                        .store_config
                        .lock()
                        .map_err(|e| anyhow::anyhow!("store config lock poisoned: {}", e))?;
                    (config.mode.clone(), config.retention)
                };
                let store = SeriesStore::open(&mode, retention).await?;
                tracing::info!(
                    collector = self.name(),
                    store = store.mode_name(),
                    "Store created"
                );
                Ok::<_, anyhow::Error>(Arc::new(store))
            })
            .await?;
        Ok(store.clone())
    }

    /// Starts the recurring task. The first tick fires immediately. No-op when running.
    pub async fn start(&self) -> Result<(), CollectorError> {
        let mut lifecycle = self.inner.lifecycle.lock().await;
        if lifecycle.ticker.is_some() {
            return Ok(());
        }

        let source = self.inner.source.clone();
        tokio::task::spawn_blocking(move || source.check_available())
            .await
            .map_err(|e| CollectorError::Collection(format!("availability check join: {}", e)))??;
        self.store().await?;

        lifecycle.ticker = Some(self.spawn_ticker(Instant::now(), lifecycle.interval));
        self.inner.running.store(true, Ordering::SeqCst);
        tracing::info!(
            collector = self.name(),
            interval_ms = lifecycle.interval.as_millis() as u64,
            "Collector started"
        );
        Ok(())
    }

    /// Stops the recurring task. An in-flight cycle completes first; no tick fires after
    /// this returns. No-op when stopped.
    pub async fn stop(&self) {
        let mut lifecycle = self.inner.lifecycle.lock().await;
        let Some(ticker) = lifecycle.ticker.take() else {
            return;
        };
        self.inner.running.store(false, Ordering::SeqCst);
        self.shutdown_ticker(ticker).await;
        tracing::info!(collector = self.name(), "Collector stopped");
    }

    /// Changes the interval. While running, the ticker is replaced and its first tick lands
    /// one new interval after the last tick (or immediately if that is already past).
    pub async fn set_interval(&self, interval: Duration) -> Result<(), CollectorError> {
        if interval.is_zero() {
            return Err(CollectorError::InvalidInterval);
        }
        let mut lifecycle = self.inner.lifecycle.lock().await;
        lifecycle.interval = interval;
        let Some(ticker) = lifecycle.ticker.take() else {
            return Ok(());
        };
        self.shutdown_ticker(ticker).await;

        let now = Instant::now();
        let last_tick = self.inner.last_tick.lock().ok().and_then(|t| *t);
        let next = last_tick
            .map(|t| t + interval)
            .filter(|t| *t > now)
            .unwrap_or(now);
        lifecycle.ticker = Some(self.spawn_ticker(next, interval));
        tracing::info!(
            collector = self.name(),
            interval_ms = interval.as_millis() as u64,
            "Collector rescheduled"
        );
        Ok(())
    }

    /// Runs one collection cycle now, whether or not the collector is started,
    /// and returns once the sample is stored.
    pub async fn scrape(&self) -> Result<Sample, CollectorError> {
        self.collect().await
    }

    /// Resets summary statistics and purges stored history. Running state and the
    /// retained snapshot are untouched.
    pub async fn clear(&self) -> Result<(), CollectorError> {
        let _cycle = self.inner.cycle.lock().await;
        if let Ok(mut stats) = self.inner.statistics.lock() {
            stats.clear();
        }
        if let Some(store) = self.inner.store.get() {
            store.clear().await?;
        }
        tracing::debug!(collector = self.name(), operation = "clear", "Collector cleared");
        Ok(())
    }

    pub fn last(&self) -> Option<Sample> {
        self.inner.last.lock().ok().and_then(|l| l.clone())
    }

    pub fn statistics(&self) -> SummaryStatistics {
        self.inner
            .statistics
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Running average of a tracked metric since the last `clear`.
    pub fn average_of(&self, metric: &str) -> Option<f64> {
        self.inner
            .statistics
            .lock()
            .ok()
            .and_then(|s| s.average(metric))
    }

    async fn collect(&self) -> Result<Sample, CollectorError> {
        let inner = &self.inner;
        let store = self.store().await?;
        let _cycle = inner.cycle.lock().await;

        let sampler = inner.sampler.clone();
        let sample = tokio::task::spawn_blocking(move || {
            // A panic inside the source leaves `previous` untouched, so a poisoned guard is safe.
            let mut sampler = sampler.lock().unwrap_or_else(PoisonError::into_inner);
            sampler.sample().map_err(CollectorError::from)
        })
        .await
        .map_err(|e| CollectorError::Collection(format!("sampler task join: {}", e)))??;

        let batch = inner.profile.batch(&sample);
        store.add(&batch).await?;

        if let Ok(mut stats) = inner.statistics.lock() {
            for metric in inner.profile.tracked() {
                if let Some(value) = batch.value_of(metric.name) {
                    stats.accept(metric.name, value);
                }
            }
        }
        if let Ok(mut last) = inner.last.lock() {
            *last = Some(sample.clone());
        }
        Ok(sample)
    }

    fn spawn_ticker(&self, start: Instant, period: Duration) -> Ticker {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let weak = Arc::downgrade(&self.inner);
        let span = tracing::span!(
            tracing::Level::DEBUG,
            "collector",
            collector = self.name(),
            interval_ms = period.as_millis() as u64
        );
        let task = async move {
            let mut tick = interval_at(start, period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Ticker shutting down");
                        break;
                    }
                    deadline = tick.tick() => {
                        if !run_scheduled(&weak, deadline).await {
                            break;
                        }
                    }
                }
            }
        };
        let handle = tokio::spawn(task.instrument(span));
        Ticker {
            shutdown_tx,
            handle,
        }
    }

    async fn shutdown_ticker(&self, ticker: Ticker) {
        let _ = ticker.shutdown_tx.send(());
        if let Err(e) = ticker.handle.await {
            tracing::warn!(
                collector = self.name(),
                error = %e,
                "Ticker task ended abnormally"
            );
        }
    }
}

/// One scheduled cycle. Failures are logged and the tick skipped; the next tick retries.
/// Returns false once the collector itself is gone.
async fn run_scheduled(weak: &Weak<Inner>, deadline: Instant) -> bool {
    let Some(inner) = weak.upgrade() else {
        return false;
    };
    if let Ok(mut last_tick) = inner.last_tick.lock() {
        *last_tick = Some(deadline);
    }
    let collector = ScheduledCollector { inner };
    match collector.scrape().await {
        Ok(sample) => {
            tracing::debug!(
                operation = "collect",
                timestamp = sample.timestamp,
                "Sample collected"
            );
        }
        Err(e) if e.is_unavailable() => {
            tracing::warn!(error = %e, operation = "collect", "Counter source unavailable");
        }
        Err(e) => {
            tracing::warn!(error = %e, operation = "collect", "Collection cycle skipped");
        }
    }
    true
}
