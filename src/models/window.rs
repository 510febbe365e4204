// Fixed-length sample window and the flat samples drained from it

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::metric::{Metric, round2};

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("series for {metric} has {actual} samples, window holds {expected}")]
    LengthMismatch {
        metric: Metric,
        expected: usize,
        actual: usize,
    },
}

/// One fetch worth of samples: every series has exactly `len()` values,
/// oldest first. Built once per successful fetch and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsWindow {
    len: usize,
    series: BTreeMap<Metric, Vec<f64>>,
    degraded: BTreeSet<Metric>,
    end_timestamp: i64,
    source_interval_secs: i64,
}

impl StatsWindow {
    pub fn new(len: usize, end_timestamp: i64, source_interval_secs: i64) -> Self {
        Self {
            len,
            series: BTreeMap::new(),
            degraded: BTreeSet::new(),
            end_timestamp,
            source_interval_secs,
        }
    }

    /// Adds one metric's series; its length must match the window.
    pub fn with_series(mut self, metric: Metric, values: Vec<f64>) -> Result<Self, WindowError> {
        if values.len() != self.len {
            return Err(WindowError::LengthMismatch {
                metric,
                expected: self.len,
                actual: values.len(),
            });
        }
        self.series.insert(metric, values);
        Ok(self)
    }

    /// Marks a metric as zero-filled because the source omitted it.
    pub fn mark_degraded(mut self, metric: Metric) -> Self {
        self.degraded.insert(metric);
        self
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn end_timestamp(&self) -> i64 {
        self.end_timestamp
    }

    pub fn source_interval_secs(&self) -> i64 {
        self.source_interval_secs
    }

    pub fn series(&self, metric: Metric) -> Option<&[f64]> {
        self.series.get(&metric).map(Vec::as_slice)
    }

    pub fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        self.series.keys().copied()
    }

    pub fn degraded(&self) -> &BTreeSet<Metric> {
        &self.degraded
    }

    /// Capture time of the sample at `index`, counted back from the window end.
    pub fn timestamp_at(&self, index: usize) -> i64 {
        let steps_back = self.len.saturating_sub(1).saturating_sub(index) as i64;
        self.end_timestamp - steps_back * self.source_interval_secs
    }

    /// Flattens index `index` of every series into one sample.
    /// Returns None past the end of the window.
    pub fn sample_at(&self, index: usize) -> Option<Sample> {
        if index >= self.len {
            return None;
        }
        let values = self
            .series
            .iter()
            .map(|(metric, values)| (*metric, round2(values[index])))
            .collect();
        Some(Sample {
            timestamp: self.timestamp_at(index),
            values,
        })
    }
}

/// One drained sample: reconstructed capture time plus a value per metric.
/// Serializes flat, e.g. `{"timestamp":1700000000,"cpu":12.5,"memory":40.0}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: i64,
    #[serde(flatten)]
    pub values: BTreeMap<Metric, f64>,
}

impl Sample {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied()
    }
}
