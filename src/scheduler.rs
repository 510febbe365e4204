// Fetch-or-drain control loop.
// A window is fetched every update interval (or as soon as the previous one is drained)
// and then published one sample per sample interval.

use tokio::time::{Duration, interval};
use tracing::instrument;

use crate::bus::MessageBus;
use crate::collector::StatsSource;
use crate::config::AppConfig;
use crate::models::StatsWindow;
use crate::publisher::SamplePublisher;

/// Timing shared by the loop and the fetch guard.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// N: samples per window.
    pub sample_count: usize,
    pub sample_interval_secs: u64,
    pub update_interval_secs: u64,
}

impl SchedulerConfig {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            sample_count: config.sampling.samples_per_window(),
            sample_interval_secs: config.sampling.sample_interval_secs,
            update_interval_secs: config.sampling.update_interval_secs,
        }
    }
}

/// Current window and the cursor into it. Only a successful fetch replaces the window.
#[derive(Debug, Clone)]
pub struct SchedulerState {
    window: Option<StatsWindow>,
    cursor: usize,
    last_fetch: Option<i64>,
}

impl SchedulerState {
    /// Starts exhausted (cursor == N) so the first tick fetches.
    pub fn new(sample_count: usize) -> Self {
        Self {
            window: None,
            cursor: sample_count,
            last_fetch: None,
        }
    }

    pub fn window(&self) -> Option<&StatsWindow> {
        self.window.as_ref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn last_fetch(&self) -> Option<i64> {
        self.last_fetch
    }

    /// True when the window is exhausted/absent or the update interval has elapsed.
    pub fn needs_fetch(&self, now: i64, update_interval_secs: u64) -> bool {
        let Some(window) = &self.window else {
            return true;
        };
        if self.cursor >= window.len() {
            return true;
        }
        self.last_fetch
            .is_none_or(|t| now - t >= update_interval_secs as i64)
    }

    fn adopt(&mut self, window: StatsWindow, now: i64) {
        self.window = Some(window);
        self.cursor = 0;
        self.last_fetch = Some(now);
    }
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Sample `index` was handed to the publisher; `failures` messages were rejected.
    Drained {
        index: usize,
        timestamp: i64,
        failures: usize,
    },
    /// Fetch failed; state untouched, retried next tick.
    FetchFailed,
    /// Fresh window had no samples to drain.
    Idle,
}

pub struct SampleScheduler<S, B> {
    source: S,
    publisher: SamplePublisher<B>,
    config: SchedulerConfig,
    state: SchedulerState,
}

impl<S: StatsSource, B: MessageBus> SampleScheduler<S, B> {
    pub fn new(source: S, publisher: SamplePublisher<B>, config: SchedulerConfig) -> Self {
        let state = SchedulerState::new(config.sample_count);
        Self {
            source,
            publisher,
            config,
            state,
        }
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn publisher(&self) -> &SamplePublisher<B> {
        &self.publisher
    }

    /// One loop iteration at wall-clock `now` (unix seconds): fetch if due, then drain one sample.
    pub async fn tick(&mut self, now: i64) -> TickOutcome {
        if self.state.needs_fetch(now, self.config.update_interval_secs) {
            match self.source.collect().await {
                Ok(window) => {
                    if !window.degraded().is_empty() {
                        tracing::debug!(degraded = ?window.degraded(), "window has zero-filled metrics");
                    }
                    tracing::debug!(
                        samples = window.len(),
                        end_timestamp = window.end_timestamp(),
                        interval_secs = window.source_interval_secs(),
                        "new window"
                    );
                    self.state.adopt(window, now);
                }
                Err(e) => {
                    tracing::warn!(error = %e, operation = "collect", "fetch failed; keeping previous state");
                    return TickOutcome::FetchFailed;
                }
            }
        }
        self.drain_next().await
    }

    async fn drain_next(&mut self) -> TickOutcome {
        let Some(sample) = self
            .state
            .window
            .as_ref()
            .and_then(|w| w.sample_at(self.state.cursor))
        else {
            return TickOutcome::Idle;
        };
        let index = self.state.cursor;
        tracing::debug!(index, timestamp = sample.timestamp, values = ?sample.values, "draining sample");
        let failures = self.publisher.publish_sample(&sample).await;
        self.state.cursor += 1;
        TickOutcome::Drained {
            index,
            timestamp: sample.timestamp,
            failures,
        }
    }

    /// Ticks every sample interval until `shutdown_rx` fires.
    #[instrument(
        skip_all,
        fields(
            samples = self.config.sample_count,
            sample_interval_secs = self.config.sample_interval_secs
        )
    )]
    pub async fn run(mut self, mut shutdown_rx: tokio::sync::oneshot::Receiver<()>) {
        let mut tick = interval(Duration::from_secs(self.config.sample_interval_secs));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let now = chrono::Utc::now().timestamp();
                    self.tick(now).await;
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Scheduler shutting down");
                    break;
                }
            }
        }
    }
}
