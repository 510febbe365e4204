// One fetch -> one StatsWindow.
// Each metric category is extracted independently; a missing category degrades to zeros.
// Derived series are already N long; `with_series` rejects anything else.

use std::future::Future;

use crate::config::AppConfig;
use crate::models::{
    HostStats, HostStatsResponse, Metric, StatsWindow, ThroughputUnit, WindowError, values,
};
use crate::series::{aggregate_mean, memory_used_percent, normalize};
use crate::xo_client::{FetchError, XoClient};

/// Anything that can produce a fresh window on demand.
pub trait StatsSource {
    fn collect(&self) -> impl Future<Output = Result<StatsWindow, FetchError>> + Send;
}

/// Window shape and interpretation settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct WindowSettings {
    /// N: samples per window.
    pub sample_count: usize,
    /// Used when the response carries no `interval`.
    pub fallback_interval_secs: i64,
    pub network_interface: String,
    pub network_unit: ThroughputUnit,
}

impl WindowSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            sample_count: config.sampling.samples_per_window(),
            fallback_interval_secs: config.sampling.sample_interval_secs as i64,
            network_interface: config.xo.network_interface.clone(),
            network_unit: config.sampling.network_unit,
        }
    }
}

pub struct MetricCollector {
    client: XoClient,
    settings: WindowSettings,
}

impl MetricCollector {
    pub fn new(client: XoClient, settings: WindowSettings) -> Self {
        Self { client, settings }
    }
}

impl StatsSource for MetricCollector {
    async fn collect(&self) -> Result<StatsWindow, FetchError> {
        tracing::debug!(url = self.client.stats_url(), "fetching host stats");
        let response = self.client.fetch_host_stats().await?;
        build_window(response, &self.settings, chrono::Utc::now().timestamp())
    }
}

/// Interprets one XO response. `now` stands in for a missing `endTimestamp`.
pub fn build_window(
    response: HostStatsResponse,
    settings: &WindowSettings,
    now: i64,
) -> Result<StatsWindow, FetchError> {
    let stats = response.stats.ok_or(FetchError::MissingStats)?;
    let n = settings.sample_count;
    let end_timestamp = response.end_timestamp.unwrap_or(now);
    let interval = response
        .interval
        .filter(|i| *i > 0)
        .unwrap_or(settings.fallback_interval_secs);

    let mut window = StatsWindow::new(n, end_timestamp, interval);

    window = match cpu_series(&stats, n) {
        Some(cpu) => window.with_series(Metric::Cpu, cpu)?,
        None => degrade(window, Metric::Cpu, "no per-core cpu series in response")?,
    };

    window = match memory_series(&stats, n) {
        Some(mem) => window.with_series(Metric::Memory, mem)?,
        None => degrade(window, Metric::Memory, "memory or memoryFree missing in response")?,
    };

    for (metric, pick) in [
        (Metric::NetworkTx, Direction::Tx),
        (Metric::NetworkRx, Direction::Rx),
    ] {
        window = match network_series(&stats, pick, settings) {
            Some(net) => window.with_series(metric, net)?,
            None => {
                tracing::warn!(
                    metric = %metric,
                    interface = %settings.network_interface,
                    "network interface not present in response; publishing zeros"
                );
                window.with_series(metric, vec![0.0; n])?.mark_degraded(metric)
            }
        };
    }

    Ok(window)
}

fn degrade(window: StatsWindow, metric: Metric, reason: &str) -> Result<StatsWindow, WindowError> {
    tracing::warn!(metric = %metric, reason, "metric missing; publishing zeros");
    let zeros = vec![0.0; window.len()];
    Ok(window.with_series(metric, zeros)?.mark_degraded(metric))
}

/// Mean across cores of each core's normalized series.
fn cpu_series(stats: &HostStats, n: usize) -> Option<Vec<f64>> {
    let cpus = stats.cpus.as_ref().filter(|c| !c.is_empty())?;
    let per_core: Vec<Vec<f64>> = cpus
        .values()
        .map(|raw| normalize(&values(raw), n))
        .collect();
    Some(aggregate_mean(&per_core, n))
}

/// Used percentage, computed after both series are normalized independently.
fn memory_series(stats: &HostStats, n: usize) -> Option<Vec<f64>> {
    let total = normalize(&values(stats.memory.as_ref()?), n);
    let free = normalize(&values(stats.memory_free.as_ref()?), n);
    Some(memory_used_percent(&total, &free))
}

#[derive(Clone, Copy)]
enum Direction {
    Tx,
    Rx,
}

/// Configured interface only, last N samples, converted to the display unit.
fn network_series(
    stats: &HostStats,
    direction: Direction,
    settings: &WindowSettings,
) -> Option<Vec<f64>> {
    let pifs = stats.pifs.as_ref()?;
    let by_pif = match direction {
        Direction::Tx => &pifs.tx,
        Direction::Rx => &pifs.rx,
    };
    let raw = by_pif.get(&settings.network_interface)?;
    let recent = normalize(&values(raw), settings.sample_count);
    Some(
        recent
            .into_iter()
            .map(|rate| settings.network_unit.from_bytes_per_sec(rate))
            .collect(),
    )
}
