// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Avionics demo application for the skywatch runtime.
//!
//! Two binaries: `avionics_server` runs the monitor and streams frame chunks
//! plus per-frame telemetry packets over UDP; `avionics_viewer` receives
//! both streams, reassembles the frames and reports flight status.

pub mod config;
pub mod frames;
pub mod signals;
