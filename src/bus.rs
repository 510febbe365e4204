// Message bus boundary: the publish primitive and its MQTT implementation.

use std::future::Future;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};

use crate::config::MqttConfig;

/// Capacity of the rumqttc request channel between client and event loop.
pub const REQUEST_CHANNEL_CAPACITY: usize = 64;
/// Pause after an event loop error before polling again (rumqttc reconnects on next poll).
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("publish to {topic} rejected: {reason}")]
    Rejected { topic: String, reason: String },
}

/// Publish primitive the publisher and discovery write through.
pub trait MessageBus {
    fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        retain: bool,
    ) -> impl Future<Output = Result<(), BusError>> + Send;
}

pub struct MqttBus {
    client: AsyncClient,
}

impl MqttBus {
    /// Creates the client and spawns the task that drives its event loop for the process lifetime.
    pub fn connect(config: &MqttConfig, default_client_id: &str) -> (Self, tokio::task::JoinHandle<()>) {
        let client_id = config
            .client_id
            .clone()
            .unwrap_or_else(|| default_client_id.to_string());
        let mut options = MqttOptions::new(client_id, config.host.clone(), config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs.max(5)));
        if let Some((user, password)) = config.credentials() {
            options.set_credentials(user, password);
        }

        let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);
        let host = config.host.clone();
        let port = config.port;
        let handle = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        tracing::info!(host = %host, port, "connected to MQTT broker");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            operation = "mqtt_poll",
                            "MQTT connection error; retrying"
                        );
                        tokio::time::sleep(RECONNECT_BACKOFF).await;
                    }
                }
            }
        });
        (Self { client }, handle)
    }
}

impl MessageBus for MqttBus {
    /// Queues without waiting: a full request channel (broker down) is a rejection, not a stall.
    async fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<(), BusError> {
        self.client
            .try_publish(topic, QoS::AtLeastOnce, retain, payload)
            .map_err(|e| BusError::Rejected {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }
}
