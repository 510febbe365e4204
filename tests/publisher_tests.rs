// Publisher adapter tests: combined vs per-metric payloads, failure counting

mod common;

use common::RecordingBus;
use xo_mqtt_relay::config::PayloadMode;
use xo_mqtt_relay::models::Metric;
use xo_mqtt_relay::publisher::{SamplePublisher, host_topic, metric_topic};

#[test]
fn topics_are_derived_from_base_and_host() {
    assert_eq!(host_topic("xo", "h1"), "xo/h1");
    assert_eq!(host_topic("xo/", "h1"), "xo/h1");
    assert_eq!(metric_topic("xo", "h1", Metric::NetworkRx), "xo/h1/network_rx");
}

#[tokio::test]
async fn combined_mode_sends_one_json_object() {
    let publisher = SamplePublisher::new(RecordingBus::default(), PayloadMode::Combined, "xo", "h1");
    let sample = common::window(2, 40.0, 1_000, 5).sample_at(1).unwrap();

    let failures = publisher.publish_sample(&sample).await;
    assert_eq!(failures, 0);

    let published = publisher.bus().published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].topic, "xo/h1");
    assert!(!published[0].retain);
    let json: serde_json::Value = serde_json::from_str(&published[0].payload).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"timestamp": 1_000, "cpu": 41.0, "memory": 50.0})
    );
}

#[tokio::test]
async fn per_metric_mode_sends_scalar_per_metric() {
    let publisher = SamplePublisher::new(RecordingBus::default(), PayloadMode::PerMetric, "xo", "h1");
    let sample = common::window(2, 40.0, 1_000, 5).sample_at(0).unwrap();

    let failures = publisher.publish_sample(&sample).await;
    assert_eq!(failures, 0);

    let published = publisher.bus().published();
    let pairs: Vec<(&str, &str)> = published
        .iter()
        .map(|p| (p.topic.as_str(), p.payload.as_str()))
        .collect();
    assert_eq!(pairs, vec![("xo/h1/cpu", "40"), ("xo/h1/memory", "50")]);
}

#[tokio::test]
async fn per_metric_failures_are_counted_and_others_still_sent() {
    let bus = RecordingBus::rejecting(&["xo/h1/cpu"]);
    let publisher = SamplePublisher::new(bus, PayloadMode::PerMetric, "xo", "h1");
    let sample = common::window(1, 3.0, 1_000, 5).sample_at(0).unwrap();

    let failures = publisher.publish_sample(&sample).await;
    assert_eq!(failures, 1);
    let published = publisher.bus().published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].topic, "xo/h1/memory");
}

#[tokio::test]
async fn combined_failure_is_counted() {
    let bus = RecordingBus::rejecting(&["xo/h1"]);
    let publisher = SamplePublisher::new(bus, PayloadMode::Combined, "xo", "h1");
    let sample = common::window(1, 3.0, 1_000, 5).sample_at(0).unwrap();
    assert_eq!(publisher.publish_sample(&sample).await, 1);
    assert!(publisher.bus().published().is_empty());
}
