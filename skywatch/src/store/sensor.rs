// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Synthetic per-frame sensor readings.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// One sensor reading attached to a frame.
///
/// Immutable once placed in the store's sensor table; every consumer works on
/// a copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    /// 1-based frame the reading belongs to.
    pub frame_number: u32,
    /// Altitude in meters.
    pub altitude: f64,
    /// Ground speed in km/h.
    pub speed: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Unix timestamp (seconds) of the projection into `current_sensor`.
    pub timestamp: u64,
    pub valid: bool,
}

impl SensorSample {
    /// Placeholder reading used before the cursor has advanced.
    pub const INVALID: SensorSample = SensorSample {
        frame_number: 0,
        altitude: 0.0,
        speed: 0.0,
        latitude: 0.0,
        longitude: 0.0,
        timestamp: 0,
        valid: false,
    };
}

/// Synthesize the sensor table for a simulated climb along a fixed flight
/// path, one reading per frame.
pub fn synthesize_table(total_frames: u32) -> Box<[SensorSample]> {
    let now = unix_now();
    (0..total_frames)
        .map(|i| SensorSample {
            frame_number: i + 1,
            altitude: 1000.0 + f64::from(i) * 5.2,
            speed: 250.0 + f64::from(i) * 1.04,
            latitude: 28.5 + f64::from(i) * 1e-4,
            longitude: 77.2 + f64::from(i) * 1e-4,
            timestamp: now,
            valid: true,
        })
        .collect()
}

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
