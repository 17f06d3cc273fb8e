// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Deployment constants of the avionics demo.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Port carrying one telemetry packet per frame.
pub const TELEMETRY_PORT: u16 = 8888;

/// Port carrying the chunked frame image stream.
pub const FRAME_PORT: u16 = 8889;

/// Dimensions of the (synthetic) frame images.
pub const FRAME_WIDTH: u32 = 320;
pub const FRAME_HEIGHT: u32 = 240;

/// Directory the viewer writes completed frames into.
pub const RECEIVED_FRAMES_DIR: &str = "received_frames";

pub const DEFAULT_TARGET: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

pub fn telemetry_addr(host: IpAddr) -> SocketAddr {
    SocketAddr::new(host, TELEMETRY_PORT)
}

pub fn frame_addr(host: IpAddr) -> SocketAddr {
    SocketAddr::new(host, FRAME_PORT)
}
