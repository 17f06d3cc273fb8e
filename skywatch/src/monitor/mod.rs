// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! The monitor runtime: one thread per component over the shared store.

mod detection;
mod driver;
mod pipeline;
mod projector;
mod watchdog;

pub use detection::DetectionEngine;
pub use driver::{DriverState, FrameCursorDriver};
pub use pipeline::{PipelineStages, STAGE_COUNT};
pub use projector::SensorProjector;
pub use watchdog::WatchdogMonitor;

use crate::config::Config;
use crate::store::TelemetryStore;
use log::info;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Handle over all running component threads.
///
/// Components receive the store as an explicit handle at construction; there
/// is no ambient global state. Shutdown is cooperative: the store's liveness
/// flag flips and every loop exits within its own poll interval, then the
/// owning thread joins all of them before the store is released.
pub struct Monitor {
    store: Arc<TelemetryStore>,
    watchdog: Arc<WatchdogMonitor>,
    threads: Vec<JoinHandle<()>>,
}

impl Monitor {
    /// Spawn every component on its own named thread.
    pub fn start(store: Arc<TelemetryStore>, config: &Config) -> Monitor {
        let mut threads = Vec::new();

        let mut driver = FrameCursorDriver::new(store.clone(), config);
        threads.push(spawn_named("sky-driver", move || driver.run()));

        let projector = SensorProjector::new(store.clone(), config);
        threads.push(spawn_named("sky-sensor", move || projector.run()));

        let mut engine = DetectionEngine::new(store.clone(), config);
        threads.push(spawn_named("sky-detect", move || engine.run()));

        threads.extend(PipelineStages::start(store.clone(), config));

        let watchdog = Arc::new(WatchdogMonitor::new(store.clone(), config));
        {
            let watchdog = watchdog.clone();
            threads.push(spawn_named("sky-watchdog", move || watchdog.run()));
        }

        info!("Monitor started ({} worker threads)", threads.len());
        Monitor {
            store,
            watchdog,
            threads,
        }
    }

    pub fn store(&self) -> &Arc<TelemetryStore> {
        &self.store
    }

    /// Stall events flagged by the watchdog so far.
    pub fn stall_events(&self) -> u32 {
        self.watchdog.stall_events()
    }

    /// Request shutdown and wait for every component to exit.
    pub fn shutdown(self) {
        self.store.shutdown();
        self.join();
    }

    /// Wait for all component threads. Call after the liveness flag has been
    /// cleared, otherwise this blocks for the lifetime of the run.
    pub fn join(self) {
        for handle in self.threads {
            handle.join().expect("worker thread panicked");
        }
        info!("Monitor stopped");
    }
}

fn spawn_named(name: &str, f: impl FnOnce() + Send + 'static) -> JoinHandle<()> {
    thread::Builder::new()
        .name(name.to_string())
        .spawn(f)
        .expect("could not spawn thread")
}
