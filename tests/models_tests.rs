// StatsWindow / Sample tests: timestamp reconstruction, flattening, JSON shape

mod common;

use xo_mqtt_relay::models::{Metric, StatsWindow, WindowError};
use xo_mqtt_relay::xo_client::FetchError;

#[test]
fn with_series_rejects_wrong_length() {
    let err = StatsWindow::new(3, 0, 5)
        .with_series(Metric::Cpu, vec![1.0, 2.0])
        .unwrap_err();
    let WindowError::LengthMismatch {
        metric,
        expected,
        actual,
    } = err;
    assert_eq!(metric, Metric::Cpu);
    assert_eq!(expected, 3);
    assert_eq!(actual, 2);
}

#[test]
fn window_length_mismatch_is_a_fetch_error() {
    let err: FetchError = StatsWindow::new(2, 0, 5)
        .with_series(Metric::Memory, vec![1.0; 3])
        .unwrap_err()
        .into();
    assert!(matches!(err, FetchError::Window(_)));
    assert!(err.to_string().contains("memory"));
}

#[test]
fn timestamps_count_back_from_window_end() {
    let window = common::window(6, 0.0, 1_700_000_000, 5);
    assert_eq!(window.timestamp_at(5), 1_700_000_000);
    assert_eq!(window.timestamp_at(0), 1_700_000_000 - 25);
    assert_eq!(window.timestamp_at(3), 1_700_000_000 - 10);
}

#[test]
fn sample_at_flattens_every_metric() {
    let window = common::window(3, 10.0, 1_000, 5);
    let sample = window.sample_at(1).unwrap();
    assert_eq!(sample.timestamp, 995);
    assert_eq!(sample.get(Metric::Cpu), Some(11.0));
    assert_eq!(sample.get(Metric::Memory), Some(50.0));
    assert_eq!(sample.get(Metric::NetworkRx), None);
}

#[test]
fn sample_at_past_end_is_none() {
    let window = common::window(3, 0.0, 1_000, 5);
    assert!(window.sample_at(3).is_none());
}

#[test]
fn sample_at_is_idempotent() {
    let window = common::window(4, 2.5, 1_000, 5);
    assert_eq!(window.sample_at(2), window.sample_at(2));
}

#[test]
fn sample_values_are_rounded() {
    let window = StatsWindow::new(1, 0, 5)
        .with_series(Metric::Cpu, vec![33.333_333])
        .unwrap();
    assert_eq!(window.sample_at(0).unwrap().get(Metric::Cpu), Some(33.33));
}

#[test]
fn sample_serializes_flat() {
    let window = StatsWindow::new(1, 1_700_000_000, 5)
        .with_series(Metric::Cpu, vec![12.5])
        .unwrap()
        .with_series(Metric::NetworkTx, vec![8.0])
        .unwrap();
    let sample = window.sample_at(0).unwrap();
    let json: serde_json::Value = serde_json::to_value(&sample).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"timestamp": 1_700_000_000, "cpu": 12.5, "network_tx": 8.0})
    );
}

#[test]
fn metrics_iterate_in_catalogue_order() {
    let window = StatsWindow::new(1, 0, 5)
        .with_series(Metric::NetworkRx, vec![0.0])
        .unwrap()
        .with_series(Metric::Cpu, vec![0.0])
        .unwrap();
    let metrics: Vec<Metric> = window.metrics().collect();
    assert_eq!(metrics, vec![Metric::Cpu, Metric::NetworkRx]);
}
