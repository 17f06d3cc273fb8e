// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Telemetry packet codec.
//!
//! One postcard-encoded datagram per frame on the telemetry port, carrying
//! the frame's metadata and sensor reading alongside the chunked image
//! stream.

use crate::error::Error;
use crate::store::SensorSample;
use serde::{Deserialize, Serialize};

/// Upper bound for an encoded telemetry packet datagram.
pub const PACKET_MAX_SIZE: usize = 512;

/// Per-frame telemetry datagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePacket {
    /// 1-based frame number.
    pub frame_id: u32,
    /// Display-only origin of the frame image.
    pub frame_path: String,
    pub width: u32,
    pub height: u32,
    pub sensor: SensorSample,
}

impl FramePacket {
    /// Encode into `buf`; returns the datagram length.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, Error> {
        postcard::to_slice(self, buf)
            .map(|used| used.len())
            .map_err(|_| Error::Codec("failed to encode frame packet"))
    }

    pub fn decode(datagram: &[u8]) -> Result<FramePacket, Error> {
        postcard::from_bytes(datagram).map_err(|_| Error::Codec("failed to decode frame packet"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet() -> FramePacket {
        FramePacket {
            frame_id: 59,
            frame_path: "frames/frame_059.pgm".to_string(),
            width: 320,
            height: 240,
            sensor: SensorSample {
                frame_number: 59,
                altitude: 1301.6,
                speed: 310.32,
                latitude: 28.5058,
                longitude: 77.2058,
                timestamp: 1_700_000_000,
                valid: true,
            },
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        let packet = packet();
        let mut buf = [0u8; PACKET_MAX_SIZE];
        let len = packet.encode(&mut buf).expect("encode");
        assert!(len <= PACKET_MAX_SIZE);
        assert_eq!(FramePacket::decode(&buf[..len]).expect("decode"), packet);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(FramePacket::decode(&[0xFF; 7]).is_err());
    }

    #[test]
    fn encode_rejects_too_small_buffer() {
        let packet = packet();
        let mut buf = [0u8; 4];
        assert!(packet.encode(&mut buf).is_err());
    }
}
