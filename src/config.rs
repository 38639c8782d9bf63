//! Compile-time sizing constants and runtime timing configuration.
//!
//! The size constants below size the fixed-capacity pools backing
//! [`crate::queue::PacketQueue`] and [`crate::routing::RoutingTable`]; they
//! play the role `bcp-config.h`'s `#define`s play in the original
//! implementation. `TimingConfig` holds the knobs that are legitimately
//! runtime-tunable (delays), loadable from a TOML file the way
//! the demonstration driver's scene configuration is.

use embassy_time::Duration;
use serde::Deserialize;

/// Maximum number of packets a connection's outgoing queue will hold.
pub const MAX_PACKET_QUEUE_SIZE: usize = 100;
/// Maximum number of one-hop neighbors tracked in the routing table.
pub const MAX_ROUTING_TABLE_SIZE: usize = 40;
/// Maximum application payload size carried by a data packet.
pub const MAX_USER_PACKET_SIZE: usize = 4;

/// Runtime-tunable timing and weighting knobs.
///
/// Durations are `embassy_time::Duration` rather than raw milliseconds so
/// they compose directly with [`crate::timer::OneshotTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TimingConfig {
    /// Interval between beacons sent while idle.
    #[serde(with = "duration_millis")]
    pub beacon_time: Duration,
    /// Delay before the first attempt to send a freshly queued or
    /// freshly-acked-and-dequeued packet.
    #[serde(with = "duration_millis")]
    pub send_time_delay: Duration,
    /// Base unit for the retransmission timeout; the armed timeout is
    /// `retx_time * tx_attempts`.
    #[serde(with = "duration_millis")]
    pub retx_time: Duration,
    /// Free-running reference window used to measure per-packet service
    /// time (not consumed by the default weight estimator).
    #[serde(with = "duration_millis")]
    pub delay_time: Duration,
    /// Decay parameter for an optional link-loss EWMA (90 == 90% weight
    /// on the previous estimate). Unused by [`crate::weight::DefaultWeightEstimator`].
    pub link_loss_alpha: u8,
    /// Lyapunov weighting constant for an optional link-aware estimator.
    /// Unused by [`crate::weight::DefaultWeightEstimator`].
    pub link_loss_v: u8,
    /// Decay parameter for an optional transmit-time EWMA. Unused by
    /// [`crate::weight::DefaultWeightEstimator`].
    pub link_est_alpha: u8,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            beacon_time: Duration::from_secs(5),
            send_time_delay: Duration::from_millis(50),
            retx_time: Duration::from_secs(2),
            delay_time: Duration::from_secs(120),
            link_loss_alpha: 90,
            link_loss_v: 2,
            link_est_alpha: 9,
        }
    }
}

impl TimingConfig {
    /// Load a `TimingConfig` from a TOML file, falling back to field-level
    /// defaults for anything the file omits.
    pub fn load(path: &std::path::Path) -> Result<Self, crate::error::BcpError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::BcpError::Config(e.to_string()))?;
        toml::from_str(&content).map_err(|e| crate::error::BcpError::Config(e.to_string()))
    }
}

mod duration_millis {
    use embassy_time::Duration;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = TimingConfig::default();
        assert_eq!(cfg.beacon_time, Duration::from_secs(5));
        assert_eq!(cfg.send_time_delay, Duration::from_millis(50));
        assert_eq!(cfg.retx_time, Duration::from_secs(2));
        assert_eq!(cfg.delay_time, Duration::from_secs(120));
    }

    #[test]
    fn loads_partial_override_from_toml() {
        let dir = std::env::temp_dir().join("bcp-timing-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("timing.toml");
        std::fs::write(
            &path,
            "beacon-time = 1000\nsend-time-delay = 10\nretx-time = 500\ndelay-time = 60000\nlink-loss-alpha = 90\nlink-loss-v = 2\nlink-est-alpha = 9\n",
        )
        .unwrap();
        let cfg = TimingConfig::load(&path).unwrap();
        assert_eq!(cfg.beacon_time, Duration::from_millis(1000));
        std::fs::remove_file(&path).ok();
    }
}
