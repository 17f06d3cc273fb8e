// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Obstacle detection records.

use crate::store::SensorSample;

/// Result of one scripted obstacle event.
///
/// `sensor_snapshot` is a copy of the sensor reading taken at the moment of
/// detection, not a reference into the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionResult {
    /// Cursor value at which the event was observed.
    pub frame_number: u32,
    pub obstacle_detected: bool,
    pub label: &'static str,
    pub confidence: f32,
    pub sensor_snapshot: SensorSample,
}
