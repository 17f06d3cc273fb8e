// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Runtime configuration of the monitor and the transfer protocol.
//!
//! Poll intervals are parameters rather than constants: the relaxed
//! consistency model bounds cross-component staleness by one poll interval,
//! so tests shrink the intervals to run the same loops in milliseconds.

use std::time::Duration;

/// Configuration shared by all components of a monitor instance.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of frames one run advances through.
    pub total_frames: u32,

    /// Cursor advance rate; the frame interval is `1/fps`.
    pub fps: u32,

    /// Frame at which the first scripted obstacle event fires.
    pub first_trigger_frame: u32,

    /// Frame at which the second (confirming) obstacle event fires.
    pub second_trigger_frame: u32,

    /// Poll interval of the detection engine.
    pub detection_poll: Duration,

    /// Poll interval of the sensor projector.
    pub sensor_poll: Duration,

    /// Interval of the processing pipeline stages.
    pub pipeline_interval: Duration,

    /// Observation interval of the watchdog.
    pub watchdog_interval: Duration,

    /// Delay between two chunk datagrams of the same frame. The transport has
    /// no flow control; pacing is the only congestion mitigation.
    pub chunk_pacing: Duration,

    /// Idle time after which an incomplete frame assembly is evicted.
    pub assembly_timeout: Duration,
}

impl Config {
    /// Duration of one frame at the configured rate.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.fps.max(1)))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            total_frames: 240,
            fps: 8,
            first_trigger_frame: 59,
            second_trigger_frame: 222,
            detection_poll: Duration::from_millis(10),
            sensor_poll: Duration::from_millis(100),
            pipeline_interval: Duration::from_secs(5),
            watchdog_interval: Duration::from_secs(5),
            chunk_pacing: Duration::from_millis(1),
            assembly_timeout: Duration::from_millis(30 * 125),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_interval_follows_fps() {
        let mut config = Config::default();
        assert_eq!(config.frame_interval(), Duration::from_millis(125));

        config.fps = 500;
        assert_eq!(config.frame_interval(), Duration::from_millis(2));
    }

    #[test]
    fn zero_fps_does_not_divide_by_zero() {
        let config = Config {
            fps: 0,
            ..Config::default()
        };
        assert_eq!(config.frame_interval(), Duration::from_secs(1));
    }
}
