// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! The sensor projector.

use crate::config::Config;
use crate::store::{unix_now, TelemetryStore};
use log::info;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Derives the current sensor reading from the frame cursor.
///
/// On each poll, copies the table entry for the cursor's frame into the
/// store's current reading, stamped with the projection time. Idempotent if
/// the cursor has not moved. Once the cursor reaches the last frame the
/// projector parks on a bounded timeout (no further table copies) until
/// shutdown.
pub struct SensorProjector {
    store: Arc<TelemetryStore>,
    poll: Duration,
}

impl SensorProjector {
    pub fn new(store: Arc<TelemetryStore>, config: &Config) -> Self {
        Self {
            store,
            poll: config.sensor_poll,
        }
    }

    pub fn run(&self) {
        info!("Sensor projector started");
        let total = self.store.total_frames();
        let mut last_seen = 0u32;

        while self.store.is_active() {
            let cursor = self.store.cursor();
            if cursor != last_seen {
                if let Some(mut sample) = self.store.sample_for(cursor) {
                    sample.timestamp = unix_now();
                    self.store.set_current_sensor(sample);
                }
                last_seen = cursor;
            }

            if cursor >= total {
                // table exhausted, keep only the liveness check ticking
                thread::park_timeout(self.poll);
            } else {
                thread::sleep(self.poll);
            }
        }

        info!("Sensor projector stopped");
    }
}
