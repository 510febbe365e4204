// Shared test helpers: config fixture, in-memory bus, scripted stats source

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use xo_mqtt_relay::bus::{BusError, MessageBus};
use xo_mqtt_relay::collector::StatsSource;
use xo_mqtt_relay::config::AppConfig;
use xo_mqtt_relay::models::{Metric, StatsWindow};
use xo_mqtt_relay::xo_client::FetchError;

pub const VALID_CONFIG: &str = r#"
[xo]
url = "https://xo.lan"
token = "secret-token"
host_uuid = "b2f6c1e0-host"
host_name = "pve-01"
network_interface = "1"

[mqtt]
host = "broker.lan"
port = 1883
base_topic = "xo"

[sampling]
update_interval_secs = 30
sample_interval_secs = 5
"#;

pub fn test_config() -> AppConfig {
    AppConfig::load_from_str(VALID_CONFIG).unwrap()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

/// Records every publish; topics listed in `reject` fail.
#[derive(Default)]
pub struct RecordingBus {
    pub messages: Mutex<Vec<Published>>,
    pub reject: Vec<String>,
}

impl RecordingBus {
    pub fn rejecting(topics: &[&str]) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            reject: topics.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn published(&self) -> Vec<Published> {
        self.messages.lock().unwrap().clone()
    }
}

impl MessageBus for RecordingBus {
    async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<(), BusError> {
        if self.reject.iter().any(|t| t == topic) {
            return Err(BusError::Rejected {
                topic: topic.to_string(),
                reason: "test rejection".into(),
            });
        }
        self.messages.lock().unwrap().push(Published {
            topic: topic.to_string(),
            payload: String::from_utf8(payload).unwrap(),
            retain,
        });
        Ok(())
    }
}

/// Hands out queued results in order; an empty queue behaves like a timeout.
#[derive(Default)]
pub struct ScriptedSource {
    pub results: Mutex<VecDeque<Result<StatsWindow, FetchError>>>,
    pub calls: Mutex<usize>,
}

impl ScriptedSource {
    pub fn new(results: Vec<Result<StatsWindow, FetchError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl StatsSource for ScriptedSource {
    async fn collect(&self) -> Result<StatsWindow, FetchError> {
        *self.calls.lock().unwrap() += 1;
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(FetchError::EmptyBody))
    }
}

/// Window of `len` samples where cpu[i] = base + i and memory[i] = 50.
pub fn window(len: usize, base: f64, end_timestamp: i64, interval: i64) -> StatsWindow {
    let cpu: Vec<f64> = (0..len).map(|i| base + i as f64).collect();
    StatsWindow::new(len, end_timestamp, interval)
        .with_series(Metric::Cpu, cpu)
        .unwrap()
        .with_series(Metric::Memory, vec![50.0; len])
        .unwrap()
}
