// Tracked metrics and their display metadata

use serde::{Deserialize, Serialize};

/// One metric relayed for the host. Order of variants is publication order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Cpu,
    Memory,
    NetworkTx,
    NetworkRx,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Cpu,
        Metric::Memory,
        Metric::NetworkTx,
        Metric::NetworkRx,
    ];

    /// Key used in topics, unique ids and combined JSON payloads.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Cpu => "cpu",
            Metric::Memory => "memory",
            Metric::NetworkTx => "network_tx",
            Metric::NetworkRx => "network_rx",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Metric::Cpu => "CPU Usage",
            Metric::Memory => "RAM Usage",
            Metric::NetworkTx => "Network TX",
            Metric::NetworkRx => "Network RX",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Metric::Cpu => "mdi:cpu-64-bit",
            Metric::Memory => "mdi:memory",
            Metric::NetworkTx => "mdi:upload-network",
            Metric::NetworkRx => "mdi:download-network",
        }
    }

    /// Unit label; network metrics depend on the configured throughput unit.
    pub fn unit(self, network_unit: ThroughputUnit) -> &'static str {
        match self {
            Metric::Cpu | Metric::Memory => "%",
            Metric::NetworkTx | Metric::NetworkRx => network_unit.label(),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Display unit for network throughput. The source reports bytes per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThroughputUnit {
    #[default]
    Kbps,
    Mbps,
}

impl ThroughputUnit {
    pub fn label(self) -> &'static str {
        match self {
            ThroughputUnit::Kbps => "kbit/s",
            ThroughputUnit::Mbps => "Mbit/s",
        }
    }

    /// Converts a bytes/sec rate into this unit, rounded to 2 decimals.
    pub fn from_bytes_per_sec(self, rate: f64) -> f64 {
        let bits = rate * 8.0;
        let converted = match self {
            ThroughputUnit::Kbps => bits / 1_000.0,
            ThroughputUnit::Mbps => bits / 1_000_000.0,
        };
        round2(converted)
    }
}

/// Rounds to 2 decimal places for transmission.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
