// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! The processing pipeline stages.

use crate::config::Config;
use crate::store::TelemetryStore;
use log::{debug, info};
use std::sync::{Arc, Barrier};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Number of pipeline stages; the startup barrier is sized to match.
pub const STAGE_COUNT: usize = 3;

/// Barrier-gated group of pipeline stage threads.
///
/// The first two stages are placeholders for future processing slots; the
/// terminal stage periodically marks processing complete in the store. The
/// barrier is crossed exactly once as a "ready" gate before the pipeline
/// counts as started; afterwards the stages run independently.
pub struct PipelineStages;

impl PipelineStages {
    /// Spawn all stage threads and return their handles.
    pub fn start(store: Arc<TelemetryStore>, config: &Config) -> Vec<JoinHandle<()>> {
        let barrier = Arc::new(Barrier::new(STAGE_COUNT));
        let interval = config.pipeline_interval;

        (1..=STAGE_COUNT)
            .map(|stage| {
                let store = store.clone();
                let barrier = barrier.clone();
                let terminal = stage == STAGE_COUNT;
                thread::Builder::new()
                    .name(format!("sky-stage-{stage}"))
                    .spawn(move || stage_main(stage, store, barrier, interval, terminal))
                    .expect("could not spawn thread")
            })
            .collect()
    }
}

fn stage_main(
    stage: usize,
    store: Arc<TelemetryStore>,
    barrier: Arc<Barrier>,
    interval: Duration,
    terminal: bool,
) {
    barrier.wait();
    if terminal {
        info!("Pipeline started ({STAGE_COUNT} stages ready)");
    }

    while store.is_active() {
        thread::sleep(interval);
        if terminal && store.is_active() {
            store.mark_processing_complete();
        }
    }

    debug!("Pipeline stage {stage} stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_stage_marks_processing_complete() {
        let store = Arc::new(TelemetryStore::new(4));
        let config = Config {
            pipeline_interval: Duration::from_millis(1),
            ..Config::default()
        };
        let handles = PipelineStages::start(store.clone(), &config);
        assert_eq!(handles.len(), STAGE_COUNT);

        let mut waited = Duration::ZERO;
        while !store.processing_complete() && waited < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(2));
            waited += Duration::from_millis(2);
        }
        assert!(store.processing_complete());

        store.shutdown();
        for handle in handles {
            handle.join().expect("stage thread panicked");
        }
    }

    #[test]
    fn stages_exit_within_interval_after_shutdown() {
        let store = Arc::new(TelemetryStore::new(4));
        let config = Config {
            pipeline_interval: Duration::from_millis(5),
            ..Config::default()
        };
        let handles = PipelineStages::start(store.clone(), &config);

        thread::sleep(Duration::from_millis(10));
        store.shutdown();
        for handle in handles {
            handle.join().expect("stage thread panicked");
        }
    }
}
