// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! The frame cursor driver.

use crate::config::Config;
use crate::store::TelemetryStore;
use log::{debug, info};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Lifecycle of the driver loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    /// All frames reached; the cursor no longer advances but the loop keeps
    /// running so dependents keep observing liveness.
    Draining,
    Stopped,
}

/// Single authoritative advancer of the frame cursor.
///
/// Advances the cursor by one frame per interval under the frame lock. All
/// other components are readers of the cursor this driver owns.
pub struct FrameCursorDriver {
    store: Arc<TelemetryStore>,
    interval: Duration,
    state: DriverState,
}

impl FrameCursorDriver {
    pub fn new(store: Arc<TelemetryStore>, config: &Config) -> Self {
        Self {
            store,
            interval: config.frame_interval(),
            state: DriverState::Idle,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Run the driver loop until shutdown.
    ///
    /// If the liveness flag flips mid-interval the current sleep is not
    /// interrupted; the loop exits at the next wake-up.
    pub fn run(&mut self) {
        let total = self.store.total_frames();
        self.state = DriverState::Running;
        info!("Driver started, advancing {total} frames at {:?} per frame", self.interval);

        while self.store.is_active() {
            if self.state == DriverState::Running {
                let cursor = self.store.advance_cursor();
                if cursor % 30 == 0 {
                    debug!("Frame {cursor}/{total}");
                }
                if cursor >= total {
                    info!("All {total} frames reached, draining");
                    self.state = DriverState::Draining;
                }
            }
            thread::sleep(self.interval);
        }

        self.state = DriverState::Stopped;
        info!("Driver stopped");
    }
}
