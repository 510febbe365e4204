use serde::Deserialize;

use crate::models::ThroughputUnit;

/// Fallback for `sampling.update_interval_secs` when it is not a multiple of the sample interval.
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub xo: XoConfig,
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XoConfig {
    pub url: String,
    /// Opaque authentication token, sent as the `authenticationToken` cookie.
    pub token: String,
    pub host_uuid: String,
    /// Display name for discovery; defaults to the host uuid.
    #[serde(default)]
    pub host_name: Option<String>,
    #[serde(default = "default_true")]
    pub verify_tls: bool,
    /// Physical interface (pif) index whose throughput is relayed.
    #[serde(default = "default_network_interface")]
    pub network_interface: String,
    #[serde(default)]
    pub granularity: Granularity,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl XoConfig {
    pub fn display_name(&self) -> &str {
        self.host_name.as_deref().unwrap_or(&self.host_uuid)
    }
}

/// RRD resolution requested from XO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Seconds => "seconds",
            Granularity::Minutes => "minutes",
            Granularity::Hours => "hours",
            Granularity::Days => "days",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    pub host: String,
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_base_topic")]
    pub base_topic: String,
    #[serde(default = "default_discovery_prefix")]
    pub discovery_prefix: String,
    #[serde(default = "default_true")]
    pub discovery: bool,
    #[serde(default)]
    pub payload_mode: PayloadMode,
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

impl MqttConfig {
    /// Username and password, only when both are set and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some((u, p)),
            _ => None,
        }
    }
}

/// Shape of state messages on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadMode {
    /// One JSON object per sample on `{base_topic}/{host_uuid}`.
    #[default]
    Combined,
    /// One numeric message per metric on `{base_topic}/{host_uuid}/{metric}`.
    PerMetric,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    /// Seconds between fetches of a new window (slow interval).
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,
    /// Seconds between published samples (fast interval).
    #[serde(default = "default_sample_interval_secs")]
    pub sample_interval_secs: u64,
    #[serde(default)]
    pub network_unit: ThroughputUnit,
    /// Configured update interval when it had to be replaced at load time.
    #[serde(skip)]
    pub corrected_from: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: default_update_interval_secs(),
            sample_interval_secs: default_sample_interval_secs(),
            network_unit: ThroughputUnit::default(),
            corrected_from: None,
        }
    }
}

impl SamplingConfig {
    /// Samples per window: update interval / sample interval.
    pub fn samples_per_window(&self) -> usize {
        (self.update_interval_secs / self.sample_interval_secs.max(1)) as usize
    }

    /// Replaces an update interval that is not a whole multiple of the sample interval.
    /// Falls back to DEFAULT_UPDATE_INTERVAL_SECS when that divides evenly, else to one sample.
    fn correct_update_interval(&mut self) {
        let fast = self.sample_interval_secs;
        let slow = self.update_interval_secs;
        if slow >= fast && slow % fast == 0 {
            return;
        }
        let fallback = if DEFAULT_UPDATE_INTERVAL_SECS % fast == 0 {
            DEFAULT_UPDATE_INTERVAL_SECS
        } else {
            fast
        };
        self.corrected_from = Some(slow);
        self.update_interval_secs = fallback;
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub debug: bool,
}

fn default_true() -> bool {
    true
}

fn default_network_interface() -> String {
    "0".into()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_base_topic() -> String {
    "xo".into()
}

fn default_discovery_prefix() -> String {
    "homeassistant".into()
}

fn default_keep_alive_secs() -> u64 {
    30
}

fn default_update_interval_secs() -> u64 {
    DEFAULT_UPDATE_INTERVAL_SECS
}

fn default_sample_interval_secs() -> u64 {
    5
}

impl AppConfig {
    /// Loads from `path`; the CLI resolves it from `--config` / `CONFIG_FILE`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse, validate and correct config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let mut config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        config.sampling.correct_update_interval();
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.xo.url.is_empty(), "xo.url must be non-empty");
        anyhow::ensure!(!self.xo.token.is_empty(), "xo.token must be non-empty");
        anyhow::ensure!(
            !self.xo.host_uuid.is_empty(),
            "xo.host_uuid must be non-empty"
        );
        anyhow::ensure!(
            self.xo.request_timeout_secs > 0,
            "xo.request_timeout_secs must be > 0, got {}",
            self.xo.request_timeout_secs
        );
        anyhow::ensure!(!self.mqtt.host.is_empty(), "mqtt.host must be non-empty");
        anyhow::ensure!(
            self.mqtt.port > 0,
            "mqtt.port must be between 1 and 65535, got {}",
            self.mqtt.port
        );
        anyhow::ensure!(
            !self.mqtt.base_topic.is_empty(),
            "mqtt.base_topic must be non-empty"
        );
        anyhow::ensure!(
            self.sampling.sample_interval_secs > 0,
            "sampling.sample_interval_secs must be > 0, got {}",
            self.sampling.sample_interval_secs
        );
        anyhow::ensure!(
            self.sampling.update_interval_secs > 0,
            "sampling.update_interval_secs must be > 0, got {}",
            self.sampling.update_interval_secs
        );
        Ok(())
    }
}
