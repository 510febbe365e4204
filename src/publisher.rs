// Publisher adapter: one drained sample -> state message(s) on the bus.

use crate::bus::MessageBus;
use crate::config::{AppConfig, PayloadMode};
use crate::models::{Metric, Sample};

/// State topic for the combined payload.
pub fn host_topic(base_topic: &str, host_uuid: &str) -> String {
    format!("{}/{}", base_topic.trim_end_matches('/'), host_uuid)
}

/// State topic for one metric in per-metric mode.
pub fn metric_topic(base_topic: &str, host_uuid: &str, metric: Metric) -> String {
    format!("{}/{}", host_topic(base_topic, host_uuid), metric.key())
}

pub struct SamplePublisher<B> {
    bus: B,
    mode: PayloadMode,
    base_topic: String,
    host_uuid: String,
}

impl<B: MessageBus> SamplePublisher<B> {
    pub fn new(bus: B, mode: PayloadMode, base_topic: &str, host_uuid: &str) -> Self {
        Self {
            bus,
            mode,
            base_topic: base_topic.to_string(),
            host_uuid: host_uuid.to_string(),
        }
    }

    pub fn from_config(bus: B, config: &AppConfig) -> Self {
        Self::new(
            bus,
            config.mqtt.payload_mode,
            &config.mqtt.base_topic,
            &config.xo.host_uuid,
        )
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn mode(&self) -> PayloadMode {
        self.mode
    }

    /// Sends one sample. Failures are logged per message and counted, never retried.
    pub async fn publish_sample(&self, sample: &Sample) -> usize {
        match self.mode {
            PayloadMode::Combined => {
                let topic = host_topic(&self.base_topic, &self.host_uuid);
                let payload = match serde_json::to_vec(sample) {
                    Ok(p) => p,
                    Err(e) => {
                        tracing::warn!(error = %e, operation = "encode_sample", "sample not encodable");
                        return 1;
                    }
                };
                match self.bus.publish(&topic, payload, false).await {
                    Ok(()) => 0,
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            operation = "publish_sample",
                            timestamp = sample.timestamp,
                            "sample publish failed"
                        );
                        1
                    }
                }
            }
            PayloadMode::PerMetric => {
                let mut failures = 0;
                for (metric, value) in &sample.values {
                    let topic = metric_topic(&self.base_topic, &self.host_uuid, *metric);
                    let payload = value.to_string().into_bytes();
                    if let Err(e) = self.bus.publish(&topic, payload, false).await {
                        tracing::warn!(
                            error = %e,
                            operation = "publish_metric",
                            metric = %metric,
                            timestamp = sample.timestamp,
                            "metric publish failed"
                        );
                        failures += 1;
                    }
                }
                failures
            }
        }
    }
}
