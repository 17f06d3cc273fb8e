// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! The obstacle detection engine.
//!
//! Real inference is out of scope; two scripted trigger frames stand in for
//! a detector. Each event fires exactly once.

use crate::config::Config;
use crate::store::{DetectionResult, TelemetryStore};
use log::{info, warn};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const FIRST_LABEL: &str = "first detection";
const CONFIRMED_LABEL: &str = "confirmed detection";
const FIRST_CONFIDENCE: f32 = 0.92;
const CONFIRMED_CONFIDENCE: f32 = 0.97;

/// Watches the cursor and fires the two scripted detection events.
pub struct DetectionEngine {
    store: Arc<TelemetryStore>,
    poll: Duration,
    first_trigger: u32,
    second_trigger: u32,
    first_fired: bool,
    second_fired: bool,
}

impl DetectionEngine {
    pub fn new(store: Arc<TelemetryStore>, config: &Config) -> Self {
        Self {
            store,
            poll: config.detection_poll,
            first_trigger: config.first_trigger_frame,
            second_trigger: config.second_trigger_frame,
            first_fired: false,
            second_fired: false,
        }
    }

    pub fn run(&mut self) {
        info!(
            "Detection engine started, trigger frames {} and {}",
            self.first_trigger, self.second_trigger
        );
        let mut last_checked = 0u32;

        while self.store.is_active() {
            let cursor = self.store.cursor();
            if cursor != last_checked && cursor > 0 {
                last_checked = cursor;
                self.check_triggers(cursor);
            }
            thread::sleep(self.poll);
        }

        info!("Detection engine stopped");
    }

    /// Threshold comparison: with coarse poll granularity the cursor can jump
    /// past a trigger between two observations, so an event fires the first
    /// time the cursor is seen at or beyond its frame. Equality-only matching
    /// would silently skip it.
    fn check_triggers(&mut self, cursor: u32) {
        if cursor >= self.first_trigger && !self.first_fired {
            self.first_fired = true;
            self.fire(cursor, FIRST_LABEL, FIRST_CONFIDENCE);
        }
        if cursor >= self.second_trigger && !self.second_fired {
            self.second_fired = true;
            self.fire(cursor, CONFIRMED_LABEL, CONFIRMED_CONFIDENCE);
            if self.first_fired {
                warn!(
                    "Double confirmation: obstacles at frames {} and {}, critical alert",
                    self.first_trigger, self.second_trigger
                );
            }
        }
    }

    fn fire(&self, cursor: u32, label: &'static str, confidence: f32) {
        // copy taken under the sensor lock, released before publishing
        let snapshot = self.store.current_sensor();
        self.store.record_detection(DetectionResult {
            frame_number: cursor,
            obstacle_detected: true,
            label,
            confidence,
            sensor_snapshot: snapshot,
        });
        warn!(
            "Obstacle at frame {cursor}: {label} ({:.0}%), altitude {:.0} m, speed {:.0} km/h",
            confidence * 100.0,
            snapshot.altitude,
            snapshot.speed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(first: u32, second: u32) -> (Arc<TelemetryStore>, DetectionEngine) {
        let store = Arc::new(TelemetryStore::new(16));
        let config = Config {
            total_frames: 16,
            first_trigger_frame: first,
            second_trigger_frame: second,
            detection_poll: Duration::from_millis(1),
            ..Config::default()
        };
        let engine = DetectionEngine::new(store.clone(), &config);
        (store, engine)
    }

    #[test]
    fn fires_on_exact_trigger_frame() {
        let (store, mut engine) = engine(3, 7);
        engine.check_triggers(3);

        let result = store.latest_detection().expect("no detection recorded");
        assert!(result.obstacle_detected);
        assert_eq!(result.frame_number, 3);
        assert_eq!(result.label, "first detection");
        assert_eq!(result.confidence, 0.92);
    }

    #[test]
    fn fires_when_cursor_jumps_past_trigger() {
        let (store, mut engine) = engine(3, 7);
        // cursor observed first at 5: trigger frame 3 was never seen exactly
        engine.check_triggers(5);

        let result = store.latest_detection().expect("no detection recorded");
        assert_eq!(result.frame_number, 5);
        assert_eq!(result.label, "first detection");
    }

    #[test]
    fn refires_nothing_on_redelivered_cursor() {
        let (store, mut engine) = engine(3, 7);
        engine.check_triggers(3);
        assert!(store.take_new_detection().is_some());

        engine.check_triggers(3);
        engine.check_triggers(4);
        assert!(store.take_new_detection().is_none());
    }

    #[test]
    fn second_trigger_escalates() {
        let (store, mut engine) = engine(3, 7);
        engine.check_triggers(4);
        engine.check_triggers(9);

        let result = store.latest_detection().expect("no detection recorded");
        assert_eq!(result.label, "confirmed detection");
        assert_eq!(result.confidence, 0.97);
        assert_eq!(result.frame_number, 9);
    }

    #[test]
    fn both_triggers_can_fire_from_one_observation() {
        let (store, mut engine) = engine(3, 7);
        // one coarse poll lands beyond both triggers
        engine.check_triggers(12);

        let result = store.latest_detection().expect("no detection recorded");
        assert_eq!(result.label, "confirmed detection");

        engine.check_triggers(13);
        assert_eq!(store.latest_detection().map(|d| d.frame_number), Some(12));
    }

    #[test]
    fn snapshot_is_copied_at_detection_time() {
        let (store, mut engine) = engine(3, 7);
        let mut sample = store.sample_for(3).expect("sample");
        sample.timestamp = 42;
        store.set_current_sensor(sample);

        engine.check_triggers(3);

        // later sensor updates do not retroactively change the record
        let mut later = store.sample_for(4).expect("sample");
        later.timestamp = 43;
        store.set_current_sensor(later);

        let result = store.latest_detection().expect("no detection recorded");
        assert_eq!(result.sensor_snapshot.frame_number, 3);
        assert_eq!(result.sensor_snapshot.timestamp, 42);
    }

    #[test]
    fn engine_loop_fires_and_shuts_down() {
        let (store, mut engine) = engine(3, 7);
        let handle = thread::spawn(move || engine.run());

        for _ in 0..3 {
            store.advance_cursor();
        }
        let mut waited = Duration::ZERO;
        while store.latest_detection().is_none() && waited < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(2));
            waited += Duration::from_millis(2);
        }
        assert_eq!(
            store.latest_detection().map(|d| d.label),
            Some("first detection")
        );

        store.shutdown();
        handle.join().expect("engine thread panicked");
    }
}
