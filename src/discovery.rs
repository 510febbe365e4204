// Home Assistant MQTT discovery: one retained sensor config per metric, sent once at startup.

use serde::Serialize;

use crate::bus::MessageBus;
use crate::config::{AppConfig, PayloadMode};
use crate::models::Metric;
use crate::publisher::{host_topic, metric_topic};

#[derive(Debug, Clone, Serialize)]
pub struct SensorConfig {
    pub name: String,
    pub unique_id: String,
    pub state_topic: String,
    pub unit_of_measurement: String,
    pub icon: String,
    pub state_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_template: Option<String>,
    pub device: DeviceInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<String>,
    pub name: String,
    pub model: String,
    pub manufacturer: String,
}

pub fn unique_id(host_uuid: &str, metric: Metric) -> String {
    format!("xo_{}_{}", host_uuid, metric.key())
}

pub fn config_topic(discovery_prefix: &str, host_uuid: &str, metric: Metric) -> String {
    format!(
        "{}/sensor/{}/config",
        discovery_prefix.trim_end_matches('/'),
        unique_id(host_uuid, metric)
    )
}

/// Sensor config for one metric, pointing at the topic the publisher writes to.
pub fn sensor_config(config: &AppConfig, metric: Metric) -> SensorConfig {
    let host_uuid = &config.xo.host_uuid;
    let host_name = config.xo.display_name();
    let (state_topic, value_template) = match config.mqtt.payload_mode {
        PayloadMode::Combined => (
            host_topic(&config.mqtt.base_topic, host_uuid),
            Some(format!("{{{{ value_json.{} }}}}", metric.key())),
        ),
        PayloadMode::PerMetric => (metric_topic(&config.mqtt.base_topic, host_uuid, metric), None),
    };
    SensorConfig {
        name: format!("{} {}", host_name, metric.display_name()),
        unique_id: unique_id(host_uuid, metric),
        state_topic,
        unit_of_measurement: metric.unit(config.sampling.network_unit).to_string(),
        icon: metric.icon().to_string(),
        state_class: "measurement".into(),
        value_template,
        device: DeviceInfo {
            identifiers: vec![host_uuid.clone()],
            name: host_name.to_string(),
            model: "XCP-ng host".into(),
            manufacturer: "Vates".into(),
        },
    }
}

/// Publishes retained discovery configs for every metric. Returns the number that failed.
pub async fn announce<B: MessageBus>(bus: &B, config: &AppConfig) -> usize {
    let mut failures = 0;
    for metric in Metric::ALL {
        let topic = config_topic(&config.mqtt.discovery_prefix, &config.xo.host_uuid, metric);
        let payload = match serde_json::to_vec(&sensor_config(config, metric)) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, metric = %metric, "discovery payload not encodable");
                failures += 1;
                continue;
            }
        };
        match bus.publish(&topic, payload, true).await {
            Ok(()) => tracing::debug!(topic = %topic, "discovery published"),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    operation = "publish_discovery",
                    metric = %metric,
                    "discovery publish failed"
                );
                failures += 1;
            }
        }
    }
    failures
}
