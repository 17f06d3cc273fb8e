// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Skywatch is an in-flight telemetry and obstacle monitoring runtime.
//!
//! # Shared telemetry store
//!
//! All components operate on one [TelemetryStore](crate::store::TelemetryStore):
//! a frame cursor advanced by a single driver, the sensor reading projected for
//! the current frame, and the latest obstacle detection. Each field group is
//! protected by its own lock and every accessor copies data in or out while
//! holding it, so no component ever blocks another for longer than a copy.
//!
//! # Component loops
//!
//! [Monitor](crate::monitor::Monitor) runs one thread per component: the
//! cursor driver, the sensor projector, the detection engine, the processing
//! pipeline stages and the watchdog. All of them are blocking loops with
//! fixed-interval sleeps which observe the store's liveness flag within one
//! poll interval after shutdown is requested.
//!
//! # Frame transfer
//!
//! [transfer](crate::transfer) carries encoded frame images over an unreliable
//! datagram transport: the sender splits a frame into bounded chunks, the
//! receiver reassembles them per frame and tolerates loss, duplication and
//! reordering. Delivery is fire-and-forget; a frame that never completes is
//! eventually evicted.

pub mod config;
pub mod error;
pub mod monitor;
pub mod store;
pub mod transfer;

/// Re-export the public API
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::Error;
    pub use crate::monitor::Monitor;
    pub use crate::store::{DetectionResult, SensorSample, StatusSnapshot, TelemetryStore};
    pub use crate::transfer::{
        CompletedFrame, DatagramReceiver, DatagramSender, FrameChunk, FramePacket, FrameReceiver,
        FrameSender, FrameSource,
    };
}
