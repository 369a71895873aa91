use anyhow::Result;
use hoststat::*;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

fn build_collectors(app_config: &config::AppConfig) -> Result<Vec<ScheduledCollector>> {
    let mut collectors = Vec::new();
    if app_config.sampling.server {
        collectors.push(ScheduledCollector::server());
    }
    if app_config.sampling.process {
        collectors.push(ScheduledCollector::process()?);
    }
    for collector in &collectors {
        match app_config.store.mode {
            config::StoreKind::Memory => collector.use_memory()?,
            config::StoreKind::Disk => {
                collector.use_disk(app_config.store.path_for(collector.name()))?
            }
        }
        collector.set_retention(app_config.store.retention())?;
    }
    Ok(collectors)
}

fn log_statistics(collectors: &[ScheduledCollector]) {
    for collector in collectors {
        let stats = collector.statistics();
        for (metric, acc) in stats.iter() {
            tracing::info!(
                collector = collector.name(),
                metric,
                samples = acc.count(),
                min = acc.min().unwrap_or_default(),
                max = acc.max().unwrap_or_default(),
                avg = acc.average().unwrap_or_default(),
                "summary statistics"
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let collectors = build_collectors(&app_config)?;

    for collector in &collectors {
        collector.set_interval(app_config.sampling.interval()).await?;
        collector.start().await?;
    }

    let mut stats_tick = tokio::time::interval(Duration::from_secs(
        app_config.monitoring.stats_log_interval_secs,
    ));
    stats_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // First tick completes immediately and there is nothing to report yet.
    stats_tick.tick().await;

    let shutdown = async {
        #[cfg(unix)]
        {
            let mut sigterm = match tokio::signal::unix::signal(
                tokio::signal::unix::SignalKind::terminate(),
            ) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
    };
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Received shutdown signal");
                break;
            }
            _ = stats_tick.tick() => log_statistics(&collectors),
        }
    }

    for collector in &collectors {
        collector.stop().await;
    }
    log_statistics(&collectors);
    Ok(())
}
