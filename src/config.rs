use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub sampling: SamplingConfig,
    pub store: StoreConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Collect host-wide `server.*` series.
    #[serde(default = "default_true")]
    pub server: bool,
    /// Collect `process.*` series for this process.
    #[serde(default = "default_true")]
    pub process: bool,
}

fn default_interval_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Memory,
    Disk,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub mode: StoreKind,
    /// SQLite file for disk mode; each collector gets its own file next to it.
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
}

fn default_retention_secs() -> u64 {
    24 * 60 * 60
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log summary statistics at INFO level.
    pub stats_log_interval_secs: u64,
}

impl SamplingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl StoreConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    /// Database path for one collector: `data/hoststat.db` -> `data/hoststat-server.db`.
    pub fn path_for(&self, collector: &str) -> std::path::PathBuf {
        let path = std::path::Path::new(&self.path);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "hoststat".into());
        let file = match path.extension() {
            Some(ext) => format!("{}-{}.{}", stem, collector, ext.to_string_lossy()),
            None => format!("{}-{}", stem, collector),
        };
        path.with_file_name(file)
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.sampling.interval_ms > 0,
            "sampling.interval_ms must be > 0, got {}",
            self.sampling.interval_ms
        );
        anyhow::ensure!(
            self.sampling.server || self.sampling.process,
            "sampling must enable at least one of server, process"
        );
        anyhow::ensure!(
            self.store.mode != StoreKind::Disk || !self.store.path.is_empty(),
            "store.path must be non-empty when store.mode = \"disk\""
        );
        anyhow::ensure!(
            self.store.retention_secs > 0,
            "store.retention_secs must be > 0, got {}",
            self.store.retention_secs
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }
}
