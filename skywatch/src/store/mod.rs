// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! The shared telemetry store.
//!
//! One instance exists per run, wrapped in an `Arc` and handed to every
//! component at construction. Field groups are partitioned across three
//! locks (frame cursor, current sensor, detection) so unrelated readers do
//! not contend. Every accessor copies data in or out under the lock and
//! releases it before anything else happens; no I/O and no sleeping ever
//! occurs inside a critical section.

mod detection;
mod sensor;

pub use detection::DetectionResult;
pub use sensor::{synthesize_table, unix_now, SensorSample};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Frame-cursor field group, guarded by one lock.
#[derive(Debug, Default)]
struct FrameState {
    cursor: u32,
    total_processed: u32,
    processing_complete: bool,
}

/// Detection field group, guarded by one lock and paired with a condvar.
#[derive(Debug, Default)]
struct DetectionState {
    latest: Option<DetectionResult>,
    new_detection: bool,
}

/// Read-only dump of the store, for status requests and UI consumers.
#[derive(Debug, Clone, Copy)]
pub struct StatusSnapshot {
    pub cursor: u32,
    pub total_processed: u32,
    pub processing_complete: bool,
    pub current_sensor: SensorSample,
    pub latest_detection: Option<DetectionResult>,
}

/// Shared state of one monitor run.
pub struct TelemetryStore {
    total_frames: u32,
    /// Immutable after construction; reads need no lock.
    sensor_table: Box<[SensorSample]>,
    frame: Mutex<FrameState>,
    current_sensor: Mutex<SensorSample>,
    detection: Mutex<DetectionState>,
    detection_cond: Condvar,
    active: AtomicBool,
}

impl TelemetryStore {
    /// Create a store with a synthesized sensor table of `total_frames`
    /// entries. The store starts active with the cursor at zero.
    pub fn new(total_frames: u32) -> Self {
        Self::with_table(synthesize_table(total_frames))
    }

    /// Create a store around an existing sensor table.
    pub fn with_table(sensor_table: Box<[SensorSample]>) -> Self {
        Self {
            total_frames: sensor_table.len() as u32,
            sensor_table,
            frame: Mutex::new(FrameState::default()),
            current_sensor: Mutex::new(SensorSample::INVALID),
            detection: Mutex::new(DetectionState::default()),
            detection_cond: Condvar::new(),
            active: AtomicBool::new(true),
        }
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    // Frame cursor group

    /// Current frame cursor.
    pub fn cursor(&self) -> u32 {
        self.frame_state().cursor
    }

    /// Count of frames the driver has advanced past.
    pub fn total_processed(&self) -> u32 {
        self.frame_state().total_processed
    }

    /// Advance the cursor by one frame, capped at the total. Only the cursor
    /// driver calls this; returns the cursor after the advance.
    pub fn advance_cursor(&self) -> u32 {
        let mut frame = self.frame_state();
        if frame.cursor < self.total_frames {
            frame.cursor += 1;
            frame.total_processed = frame.cursor;
        }
        frame.cursor
    }

    pub fn processing_complete(&self) -> bool {
        self.frame_state().processing_complete
    }

    /// Set by the pipeline's terminal stage.
    pub fn mark_processing_complete(&self) {
        self.frame_state().processing_complete = true;
    }

    // Sensor group

    /// The immutable per-frame sensor table.
    pub fn sensor_table(&self) -> &[SensorSample] {
        &self.sensor_table
    }

    /// Table entry for a 1-based frame number, if in range.
    pub fn sample_for(&self, frame: u32) -> Option<SensorSample> {
        if frame == 0 {
            return None;
        }
        self.sensor_table.get(frame as usize - 1).copied()
    }

    /// Copy of the current sensor reading.
    pub fn current_sensor(&self) -> SensorSample {
        *self.sensor_state()
    }

    /// Replace the current sensor reading. Only the projector calls this.
    pub fn set_current_sensor(&self, sample: SensorSample) {
        *self.sensor_state() = sample;
    }

    // Detection group

    /// Copy of the latest detection, if any event has fired.
    pub fn latest_detection(&self) -> Option<DetectionResult> {
        self.detection_state().latest
    }

    /// Publish a detection record, raise the new-detection flag and wake any
    /// waiters on [wait_for_detection](Self::wait_for_detection).
    pub fn record_detection(&self, result: DetectionResult) {
        let mut detection = self.detection_state();
        detection.latest = Some(result);
        detection.new_detection = true;
        drop(detection);
        self.detection_cond.notify_all();
    }

    /// Consume the new-detection flag, returning the pending record if one
    /// was published since the last take.
    pub fn take_new_detection(&self) -> Option<DetectionResult> {
        let mut detection = self.detection_state();
        if detection.new_detection {
            detection.new_detection = false;
            detection.latest
        } else {
            None
        }
    }

    /// Block until a new detection is published, `timeout` elapses or the
    /// store shuts down.
    ///
    /// The condvar is an advisory low-latency path; consumers may also just
    /// poll [latest_detection](Self::latest_detection).
    pub fn wait_for_detection(&self, timeout: Duration) -> Option<DetectionResult> {
        let detection = self.detection_state();
        let (mut detection, _) = self
            .detection_cond
            .wait_timeout_while(detection, timeout, |d| {
                !d.new_detection && self.is_active()
            })
            .expect("detection lock poisoned");
        if detection.new_detection {
            detection.new_detection = false;
            detection.latest
        } else {
            None
        }
    }

    // Liveness

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Request cooperative shutdown. Every component loop observes the flag
    /// within one poll interval and exits.
    pub fn shutdown(&self) {
        self.active.store(false, Ordering::Relaxed);
        // take the lock before notifying: a waiter between its liveness check
        // and its park must not miss the wakeup
        drop(self.detection_state());
        self.detection_cond.notify_all();
    }

    /// Read-only snapshot of all field groups, taken one short lock at a
    /// time (never mutates).
    pub fn snapshot(&self) -> StatusSnapshot {
        let (cursor, total_processed, processing_complete) = {
            let frame = self.frame_state();
            (frame.cursor, frame.total_processed, frame.processing_complete)
        };
        StatusSnapshot {
            cursor,
            total_processed,
            processing_complete,
            current_sensor: self.current_sensor(),
            latest_detection: self.latest_detection(),
        }
    }

    fn frame_state(&self) -> MutexGuard<'_, FrameState> {
        self.frame.lock().expect("frame lock poisoned")
    }

    fn sensor_state(&self) -> MutexGuard<'_, SensorSample> {
        self.current_sensor.lock().expect("sensor lock poisoned")
    }

    fn detection_state(&self) -> MutexGuard<'_, DetectionState> {
        self.detection.lock().expect("detection lock poisoned")
    }
}
