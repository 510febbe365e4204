// Domain models: metric catalogue, XO response schema, sample windows

mod metric;
mod response;
mod window;

pub use metric::{Metric, ThroughputUnit, round2};
pub use response::{HostStats, HostStatsResponse, PifStats, RawSeries, values};
pub use window::{Sample, StatsWindow, WindowError};
