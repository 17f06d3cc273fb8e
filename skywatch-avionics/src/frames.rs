// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Synthetic frame generation.
//!
//! Real video decoding is out of scope; this source produces deterministic
//! grayscale PGM images so the wire path still carries frame-sized payloads
//! and the viewer writes files that are actually viewable.

use crate::config::{FRAME_HEIGHT, FRAME_WIDTH};
use skywatch::transfer::FrameSource;

/// Deterministic stand-in for the video frame extractor.
pub struct SyntheticFrameSource {
    width: u32,
    height: u32,
}

impl SyntheticFrameSource {
    pub fn new() -> Self {
        Self {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
        }
    }
}

impl Default for SyntheticFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for SyntheticFrameSource {
    fn frame(&mut self, frame_id: u32) -> Option<Vec<u8>> {
        let header = format!("P5\n{} {}\n255\n", self.width, self.height);
        let pixels = self.width as usize * self.height as usize;
        let mut data = Vec::with_capacity(header.len() + pixels);
        data.extend_from_slice(header.as_bytes());
        // a moving diagonal gradient, unique per frame
        for i in 0..pixels {
            data.push((i as u32).wrapping_mul(7).wrapping_add(frame_id.wrapping_mul(31)) as u8);
        }
        Some(data)
    }

    fn path(&self, frame_id: u32) -> String {
        format!("synthetic/frame_{frame_id:03}.pgm")
    }
}
