// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Frame sources.
//!
//! Frames reach the transfer protocol as already-encoded byte buffers
//! addressed by 1-based frame number; how they were produced (decoding,
//! extraction) is a concern of the source.

use log::warn;
use std::path::PathBuf;

/// Provider of encoded frame bytes.
pub trait FrameSource {
    /// Frame bytes for `frame_id`, or `None` when the frame is unavailable.
    /// An unavailable frame is skipped upstream, not an error.
    fn frame(&mut self, frame_id: u32) -> Option<Vec<u8>>;

    /// Display-only origin of `frame_id`, reported in telemetry packets.
    fn path(&self, frame_id: u32) -> String {
        format!("frame_{frame_id:03}")
    }
}

/// Reads pre-extracted frame files `frame_NNN.jpg` from a directory.
pub struct DirectoryFrameSource {
    dir: PathBuf,
}

impl DirectoryFrameSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing `frame_id`.
    pub fn path_for(&self, frame_id: u32) -> PathBuf {
        self.dir.join(format!("frame_{frame_id:03}.jpg"))
    }
}

impl FrameSource for DirectoryFrameSource {
    fn frame(&mut self, frame_id: u32) -> Option<Vec<u8>> {
        let path = self.path_for(frame_id);
        match std::fs::read(&path) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("Cannot read {}: {e}", path.display());
                None
            }
        }
    }

    fn path(&self, frame_id: u32) -> String {
        self.path_for(frame_id).display().to_string()
    }
}
