// Xen Orchestra host stats response (GET /rest/v0/hosts/{uuid}/stats)

use std::collections::HashMap;

use serde::Deserialize;

/// Raw RRD series as sent by XO; gaps arrive as `null`.
pub type RawSeries = Vec<Option<f64>>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostStatsResponse {
    /// Unix seconds of the last sample in every series.
    #[serde(default)]
    pub end_timestamp: Option<i64>,
    /// Seconds between consecutive samples.
    #[serde(default)]
    pub interval: Option<i64>,
    #[serde(default)]
    pub stats: Option<HostStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostStats {
    /// Per-core load (0-100), keyed by core index.
    #[serde(default)]
    pub cpus: Option<HashMap<String, RawSeries>>,
    /// Total memory, bytes.
    #[serde(default)]
    pub memory: Option<RawSeries>,
    /// Free memory, bytes.
    #[serde(default)]
    pub memory_free: Option<RawSeries>,
    #[serde(default)]
    pub pifs: Option<PifStats>,
}

/// Physical interface throughput in bytes/sec, keyed by pif index.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PifStats {
    #[serde(default)]
    pub rx: HashMap<String, RawSeries>,
    #[serde(default)]
    pub tx: HashMap<String, RawSeries>,
}

/// Coerces RRD gaps to zero.
pub fn values(raw: &[Option<f64>]) -> Vec<f64> {
    raw.iter().map(|v| v.unwrap_or(0.0)).collect()
}
