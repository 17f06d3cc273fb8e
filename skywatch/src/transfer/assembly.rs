// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Receiving side: per-frame reassembly of chunk datagrams.

use crate::transfer::chunk::{FrameChunk, CHUNK_SIZE, MAX_CHUNKS};
use log::{debug, trace, warn};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A fully reassembled frame handed to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedFrame {
    pub frame_id: u32,
    pub data: Vec<u8>,
}

/// Accumulator reconstructing one frame from its chunks.
///
/// The chunk count is latched from the first chunk seen. A per-chunk bitmap
/// makes duplicate delivery idempotent: a chunk index is counted once no
/// matter how often it arrives.
struct FrameAssembly {
    data: Box<[u8]>,
    received: Box<[bool]>,
    chunks_received: u32,
    total_chunks: u32,
    tail_len: Option<usize>,
    last_chunk_at: Instant,
}

impl FrameAssembly {
    fn new(total_chunks: u32, now: Instant) -> Self {
        let capacity = total_chunks as usize * CHUNK_SIZE;
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            received: vec![false; total_chunks as usize].into_boxed_slice(),
            chunks_received: 0,
            total_chunks,
            tail_len: None,
            last_chunk_at: now,
        }
    }

    /// Write one chunk; returns the assembled frame bytes on completion.
    fn accept(&mut self, chunk: &FrameChunk, now: Instant) -> Option<Vec<u8>> {
        let index = chunk.chunk_index as usize;
        if self.received[index] {
            trace!(
                "Duplicate chunk {} of frame {}, ignoring",
                chunk.chunk_index,
                chunk.frame_id
            );
            return None;
        }

        let offset = index * CHUNK_SIZE;
        self.data[offset..offset + chunk.payload().len()].copy_from_slice(chunk.payload());
        self.received[index] = true;
        self.chunks_received += 1;
        self.last_chunk_at = now;
        if chunk.chunk_index == self.total_chunks - 1 {
            self.tail_len = Some(chunk.payload().len());
        }

        if self.chunks_received >= self.total_chunks {
            let tail_len = self.tail_len.unwrap_or(CHUNK_SIZE);
            let len = (self.total_chunks as usize - 1) * CHUNK_SIZE + tail_len;
            return Some(self.data[..len].to_vec());
        }
        None
    }
}

/// Reassembles frames from chunk datagrams.
///
/// Assemblies are keyed by frame id and created on the first chunk seen.
/// Every index is bounds-checked before any byte is written; out-of-range
/// datagrams are dropped at the boundary. Assemblies that stop making
/// progress (chunk loss) are evicted after a timeout instead of being held
/// forever.
pub struct FrameReceiver {
    total_frames: u32,
    timeout: Duration,
    assemblies: HashMap<u32, FrameAssembly>,
    finished: Box<[bool]>,
    completed: u32,
    evicted: u32,
}

impl FrameReceiver {
    pub fn new(total_frames: u32, assembly_timeout: Duration) -> Self {
        Self {
            total_frames,
            timeout: assembly_timeout,
            assemblies: HashMap::new(),
            finished: vec![false; total_frames as usize].into_boxed_slice(),
            completed: 0,
            evicted: 0,
        }
    }

    /// Decode and accept one datagram; returns a frame if it completed one.
    /// Malformed datagrams are dropped here and never written anywhere.
    pub fn handle_datagram(&mut self, datagram: &[u8]) -> Option<CompletedFrame> {
        match FrameChunk::decode(datagram) {
            Ok(chunk) => self.accept(&chunk),
            Err(e) => {
                debug!("Dropping malformed chunk datagram: {e}");
                None
            }
        }
    }

    /// Accept one decoded chunk; returns a frame if it completed one.
    pub fn accept(&mut self, chunk: &FrameChunk) -> Option<CompletedFrame> {
        if chunk.frame_id < 1 || chunk.frame_id > self.total_frames {
            debug!("Dropping chunk with frame id {} out of range", chunk.frame_id);
            return None;
        }
        if chunk.chunk_count == 0 || chunk.chunk_count as usize > MAX_CHUNKS {
            debug!(
                "Dropping chunk of frame {} with chunk count {} out of range",
                chunk.frame_id, chunk.chunk_count
            );
            return None;
        }
        if chunk.chunk_index >= chunk.chunk_count {
            debug!(
                "Dropping chunk index {} of frame {} beyond chunk count {}",
                chunk.chunk_index, chunk.frame_id, chunk.chunk_count
            );
            return None;
        }
        if self.finished[chunk.frame_id as usize - 1] {
            trace!("Late chunk for completed frame {}, ignoring", chunk.frame_id);
            return None;
        }

        let now = Instant::now();
        let assembly = self
            .assemblies
            .entry(chunk.frame_id)
            .or_insert_with(|| FrameAssembly::new(chunk.chunk_count, now));
        // the count is latched from the first chunk; disagreeing chunks are
        // dropped rather than trusted to resize anything
        if chunk.chunk_count != assembly.total_chunks {
            debug!(
                "Dropping chunk of frame {} with mismatched chunk count {} (latched {})",
                chunk.frame_id, chunk.chunk_count, assembly.total_chunks
            );
            return None;
        }

        let completed = assembly.accept(chunk, now);
        if let Some(data) = completed {
            // incomplete -> complete happens exactly once per frame
            self.assemblies.remove(&chunk.frame_id);
            self.finished[chunk.frame_id as usize - 1] = true;
            self.completed += 1;
            trace!("Frame {} complete ({} bytes)", chunk.frame_id, data.len());
            return Some(CompletedFrame {
                frame_id: chunk.frame_id,
                data,
            });
        }
        None
    }

    /// Evict assemblies whose last chunk is older than the timeout. Returns
    /// the number of frames given up on.
    pub fn evict_stale(&mut self) -> usize {
        let now = Instant::now();
        let timeout = self.timeout;
        let before = self.assemblies.len();
        self.assemblies.retain(|frame_id, assembly| {
            let keep = now.duration_since(assembly.last_chunk_at) <= timeout;
            if !keep {
                warn!(
                    "Giving up on frame {frame_id} ({}/{} chunks after {timeout:?})",
                    assembly.chunks_received, assembly.total_chunks
                );
            }
            keep
        });
        let evicted = before - self.assemblies.len();
        self.evicted += evicted as u32;
        evicted
    }

    /// Frames currently being reassembled.
    pub fn in_flight(&self) -> usize {
        self.assemblies.len()
    }

    /// Frames completed so far.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Frames evicted as incomplete so far.
    pub fn evicted(&self) -> u32 {
        self.evicted
    }
}

impl std::fmt::Debug for FrameReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("FrameReceiver")
            .field("total_frames", &self.total_frames)
            .field("in_flight", &self.assemblies.len())
            .field("completed", &self.completed)
            .field("evicted", &self.evicted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks_for(frame_id: u32, data: &[u8]) -> Vec<FrameChunk> {
        let count = data.len().div_ceil(CHUNK_SIZE) as u32;
        data.chunks(CHUNK_SIZE)
            .enumerate()
            .map(|(i, piece)| FrameChunk::new(frame_id, i as u32, count, piece).expect("chunk"))
            .collect()
    }

    fn patterned(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 251) as u8).collect()
    }

    #[test]
    fn reassembles_in_order() {
        let mut receiver = FrameReceiver::new(8, Duration::from_secs(1));
        let data = patterned(3000);
        let chunks = chunks_for(3, &data);

        assert!(receiver.accept(&chunks[0]).is_none());
        assert!(receiver.accept(&chunks[1]).is_none());
        let frame = receiver.accept(&chunks[2]).expect("complete");
        assert_eq!(frame.frame_id, 3);
        assert_eq!(frame.data, data);
        assert_eq!(receiver.completed(), 1);
        assert_eq!(receiver.in_flight(), 0);
    }

    #[test]
    fn reassembles_any_permutation() {
        let data = patterned(5 * CHUNK_SIZE - 72);
        let orders: &[&[usize]] = &[
            &[4, 3, 2, 1, 0],
            &[2, 0, 4, 1, 3],
            &[1, 4, 0, 3, 2],
        ];
        for order in orders {
            let mut receiver = FrameReceiver::new(8, Duration::from_secs(1));
            let chunks = chunks_for(1, &data);
            let mut complete = None;
            for &i in *order {
                complete = receiver.accept(&chunks[i]);
            }
            assert_eq!(complete.expect("complete").data, data);
        }
    }

    #[test]
    fn duplicates_do_not_double_count() {
        let mut receiver = FrameReceiver::new(8, Duration::from_secs(1));
        let data = patterned(3000);
        let chunks = chunks_for(2, &data);

        // first chunk delivered three times: still only one of three counted
        assert!(receiver.accept(&chunks[0]).is_none());
        assert!(receiver.accept(&chunks[0]).is_none());
        assert!(receiver.accept(&chunks[0]).is_none());
        assert!(receiver.accept(&chunks[2]).is_none());
        assert!(receiver.accept(&chunks[2]).is_none());
        // only the last missing index completes the frame
        let frame = receiver.accept(&chunks[1]).expect("complete");
        assert_eq!(frame.data, data);
    }

    #[test]
    fn rejects_out_of_range_ids_without_state_change() {
        let mut receiver = FrameReceiver::new(4, Duration::from_secs(1));

        let bad_frame = FrameChunk::new(5, 0, 1, &[1, 2, 3]).expect("chunk");
        assert!(receiver.accept(&bad_frame).is_none());

        let zero_frame = FrameChunk::new(0, 0, 1, &[1, 2, 3]).expect("chunk");
        assert!(receiver.accept(&zero_frame).is_none());

        let bad_count =
            FrameChunk::new(1, 0, MAX_CHUNKS as u32 + 1, &[1, 2, 3]).expect("chunk");
        assert!(receiver.accept(&bad_count).is_none());

        let bad_index = FrameChunk::new(1, 7, 2, &[1, 2, 3]).expect("chunk");
        assert!(receiver.accept(&bad_index).is_none());

        // none of the rejected chunks created an assembly or wrote a byte
        assert_eq!(receiver.in_flight(), 0);
        assert_eq!(receiver.completed(), 0);
    }

    #[test]
    fn mismatched_chunk_count_is_dropped() {
        let mut receiver = FrameReceiver::new(4, Duration::from_secs(1));
        let first = FrameChunk::new(1, 0, 3, &[0u8; CHUNK_SIZE]).expect("chunk");
        assert!(receiver.accept(&first).is_none());

        // same frame, different declared count: dropped, not trusted
        let liar = FrameChunk::new(1, 1, 2, &[0u8; CHUNK_SIZE]).expect("chunk");
        assert!(receiver.accept(&liar).is_none());
        assert_eq!(receiver.completed(), 0);
    }

    #[test]
    fn late_chunks_after_completion_are_ignored() {
        let mut receiver = FrameReceiver::new(4, Duration::from_secs(1));
        let data = patterned(100);
        let chunks = chunks_for(1, &data);
        assert!(receiver.accept(&chunks[0]).is_some());

        // redelivery cannot complete the frame a second time
        assert!(receiver.accept(&chunks[0]).is_none());
        assert_eq!(receiver.completed(), 1);
    }

    #[test]
    fn single_chunk_frame_completes_immediately() {
        let mut receiver = FrameReceiver::new(4, Duration::from_secs(1));
        let data = patterned(17);
        let frame = receiver
            .accept(&chunks_for(4, &data)[0])
            .expect("complete");
        assert_eq!(frame.data, data);
    }

    #[test]
    fn stale_assemblies_are_evicted() {
        let mut receiver = FrameReceiver::new(4, Duration::from_millis(10));
        let data = patterned(3000);
        let chunks = chunks_for(1, &data);
        assert!(receiver.accept(&chunks[0]).is_none());
        assert_eq!(receiver.in_flight(), 1);

        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(receiver.evict_stale(), 1);
        assert_eq!(receiver.in_flight(), 0);
        assert_eq!(receiver.evicted(), 1);

        // a fresh assembly is not evicted
        assert!(receiver.accept(&chunks[1]).is_none());
        assert_eq!(receiver.evict_stale(), 0);
        assert_eq!(receiver.in_flight(), 1);
    }

    #[test]
    fn malformed_datagrams_are_dropped() {
        let mut receiver = FrameReceiver::new(4, Duration::from_secs(1));
        assert!(receiver.handle_datagram(&[0u8; 10]).is_none());
        assert_eq!(receiver.in_flight(), 0);
    }

    #[test]
    fn datagram_round_trip() {
        let mut receiver = FrameReceiver::new(4, Duration::from_secs(1));
        let data = patterned(2500);
        let mut buf = [0u8; crate::transfer::CHUNK_DATAGRAM_SIZE];
        let mut frame = None;
        for chunk in chunks_for(2, &data) {
            let len = chunk.encode(&mut buf).expect("encode");
            frame = receiver.handle_datagram(&buf[..len]);
        }
        assert_eq!(frame.expect("complete").data, data);
    }
}
