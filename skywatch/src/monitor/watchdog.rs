// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! The progress watchdog.

use crate::config::Config;
use crate::store::TelemetryStore;
use log::{info, warn};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Consecutive unchanged observations that count as one stall event.
const STALL_THRESHOLD: u32 = 3;

/// Observes the cursor's progress rate and flags stalls.
///
/// Purely informational: a stall raises the counter and a warning but never
/// terminates anything.
pub struct WatchdogMonitor {
    store: Arc<TelemetryStore>,
    interval: Duration,
    stall_events: AtomicU32,
}

impl WatchdogMonitor {
    pub fn new(store: Arc<TelemetryStore>, config: &Config) -> Self {
        Self {
            store,
            interval: config.watchdog_interval,
            stall_events: AtomicU32::new(0),
        }
    }

    /// Number of stall events flagged so far.
    pub fn stall_events(&self) -> u32 {
        self.stall_events.load(Ordering::Relaxed)
    }

    pub fn run(&self) {
        info!("Watchdog started, checking every {:?}", self.interval);
        let mut last_processed = self.store.total_processed();
        let mut misses = 0u32;

        while self.store.is_active() {
            thread::sleep(self.interval);
            if !self.store.is_active() {
                break;
            }

            let processed = self.store.total_processed();
            if processed == last_processed {
                misses += 1;
                if misses >= STALL_THRESHOLD {
                    self.stall_events.fetch_add(1, Ordering::Relaxed);
                    warn!("No frame progress for {misses} intervals (stalled at {processed})");
                    misses = 0;
                }
            } else {
                misses = 0;
            }
            last_processed = processed;
        }

        info!("Watchdog stopped");
    }
}
