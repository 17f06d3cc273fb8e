// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Sending side of the frame transfer protocol.

use crate::error::Error;
use crate::transfer::chunk::{FrameChunk, CHUNK_DATAGRAM_SIZE, CHUNK_SIZE, MAX_CHUNKS};
use crate::transfer::DatagramSender;
use log::{trace, warn};
use std::thread;
use std::time::Duration;

/// Splits encoded frames into chunk datagrams and emits them.
///
/// The transport has no flow control; a small pacing delay between chunks is
/// the only congestion mitigation. A failed send is logged and tolerated,
/// never retried: frame loss is a normal outcome.
pub struct FrameSender<S> {
    transport: S,
    pacing: Duration,
}

impl<S: DatagramSender> FrameSender<S> {
    pub fn new(transport: S, pacing: Duration) -> Self {
        Self { transport, pacing }
    }

    /// Send one frame. Returns `false` when the frame was skipped (empty or
    /// larger than `MAX_CHUNKS` chunks), `true` when all chunks were emitted.
    pub fn send_frame(&mut self, frame_id: u32, data: &[u8]) -> Result<bool, Error> {
        if data.is_empty() {
            warn!("Frame {frame_id} is empty, skipping");
            return Ok(false);
        }
        let chunk_count = data.len().div_ceil(CHUNK_SIZE);
        if chunk_count > MAX_CHUNKS {
            warn!("Frame {frame_id} needs {chunk_count} chunks (limit {MAX_CHUNKS}), skipping");
            return Ok(false);
        }

        let mut buf = [0u8; CHUNK_DATAGRAM_SIZE];
        for (index, piece) in data.chunks(CHUNK_SIZE).enumerate() {
            let chunk = FrameChunk::new(frame_id, index as u32, chunk_count as u32, piece)?;
            let len = chunk.encode(&mut buf)?;
            if let Err(e) = self.transport.send(&buf[..len]) {
                // fire-and-forget: the receiver treats the chunk as lost
                warn!("Chunk {index} of frame {frame_id} not sent: {e}");
            }
            thread::sleep(self.pacing);
        }

        trace!("Sent frame {frame_id} ({chunk_count} chunks, {} bytes)", data.len());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    /// Captures datagrams for inspection.
    struct CapturingSender(mpsc::Sender<Vec<u8>>);

    impl DatagramSender for CapturingSender {
        fn send(&mut self, datagram: &[u8]) -> Result<(), Error> {
            self.0
                .send(datagram.to_vec())
                .map_err(|_| Error::Channel("capture closed"))
        }
    }

    fn sender() -> (FrameSender<CapturingSender>, mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel();
        (FrameSender::new(CapturingSender(tx), Duration::ZERO), rx)
    }

    #[test]
    fn splits_frame_into_expected_chunks() {
        let (mut sender, rx) = sender();
        let data: Vec<u8> = (0..3000u32).map(|i| i as u8).collect();
        assert!(sender.send_frame(9, &data).expect("send"));

        let datagrams: Vec<Vec<u8>> = rx.try_iter().collect();
        assert_eq!(datagrams.len(), 3);

        let chunks: Vec<FrameChunk> = datagrams
            .iter()
            .map(|d| FrameChunk::decode(d).expect("decode"))
            .collect();
        assert_eq!(chunks[0].payload().len(), 1024);
        assert_eq!(chunks[1].payload().len(), 1024);
        assert_eq!(chunks[2].payload().len(), 952);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.frame_id, 9);
            assert_eq!(chunk.chunk_index, i as u32);
            assert_eq!(chunk.chunk_count, 3);
        }
    }

    #[test]
    fn skips_oversized_frames() {
        let (mut sender, rx) = sender();
        let data = vec![0u8; (MAX_CHUNKS + 1) * CHUNK_SIZE];
        assert!(!sender.send_frame(1, &data).expect("send"));
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn skips_empty_frames() {
        let (mut sender, rx) = sender();
        assert!(!sender.send_frame(1, &[]).expect("send"));
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn frame_at_the_chunk_limit_is_sent() {
        let (mut sender, rx) = sender();
        let data = vec![7u8; MAX_CHUNKS * CHUNK_SIZE];
        assert!(sender.send_frame(2, &data).expect("send"));
        assert_eq!(rx.try_iter().count(), MAX_CHUNKS);
    }
}
