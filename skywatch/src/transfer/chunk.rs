// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Wire codec for frame chunk datagrams.
//!
//! Fixed layout, one datagram per chunk:
//!
//! ```text
//! ┌────────────┬──────────────┬──────────────┬──────────────┬──────────────┐
//! │  frame_id  │  chunk_index │  chunk_count │  payload_len │   payload    │
//! │  (u32 be)  │   (u32 be)   │   (u32 be)   │   (u32 be)   │ (CHUNK_SIZE) │
//! └────────────┴──────────────┴──────────────┴──────────────┴──────────────┘
//! ```
//!
//! The payload area is always `CHUNK_SIZE` bytes; the final chunk of a frame
//! zero-pads past `payload_len`.

use crate::error::Error;

/// Payload bytes carried per chunk.
pub const CHUNK_SIZE: usize = 1024;

/// Upper bound of chunks per frame; the sender skips larger frames and the
/// receiver rejects indices at or beyond it before writing anything.
pub const MAX_CHUNKS: usize = 200;

const HEADER_SIZE: usize = 4 * size_of::<u32>();

/// Size of every chunk datagram on the wire.
pub const CHUNK_DATAGRAM_SIZE: usize = HEADER_SIZE + CHUNK_SIZE;

/// One bounded fragment of an encoded frame. Ephemeral wire entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameChunk {
    pub frame_id: u32,
    pub chunk_index: u32,
    pub chunk_count: u32,
    payload: Vec<u8>,
}

impl FrameChunk {
    pub fn new(
        frame_id: u32,
        chunk_index: u32,
        chunk_count: u32,
        payload: &[u8],
    ) -> Result<FrameChunk, Error> {
        if payload.is_empty() || payload.len() > CHUNK_SIZE {
            return Err(Error::Codec("chunk payload length out of range"));
        }
        Ok(FrameChunk {
            frame_id,
            chunk_index,
            chunk_count,
            payload: payload.to_vec(),
        })
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Encode into `buf`, which must hold [CHUNK_DATAGRAM_SIZE] bytes.
    /// Returns the datagram length.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, Error> {
        if buf.len() < CHUNK_DATAGRAM_SIZE {
            return Err(Error::Codec("datagram buffer too small"));
        }
        buf[0..4].copy_from_slice(&self.frame_id.to_be_bytes());
        buf[4..8].copy_from_slice(&self.chunk_index.to_be_bytes());
        buf[8..12].copy_from_slice(&self.chunk_count.to_be_bytes());
        buf[12..16].copy_from_slice(&(self.payload.len() as u32).to_be_bytes());

        let body = &mut buf[HEADER_SIZE..CHUNK_DATAGRAM_SIZE];
        body[..self.payload.len()].copy_from_slice(&self.payload);
        body[self.payload.len()..].fill(0);

        Ok(CHUNK_DATAGRAM_SIZE)
    }

    /// Decode one datagram. Length fields are validated before any payload
    /// byte is touched.
    pub fn decode(datagram: &[u8]) -> Result<FrameChunk, Error> {
        if datagram.len() < CHUNK_DATAGRAM_SIZE {
            return Err(Error::Codec("short chunk datagram"));
        }
        let frame_id = read_u32(datagram, 0);
        let chunk_index = read_u32(datagram, 4);
        let chunk_count = read_u32(datagram, 8);
        let payload_len = read_u32(datagram, 12) as usize;
        if payload_len == 0 || payload_len > CHUNK_SIZE {
            return Err(Error::Codec("chunk payload length out of range"));
        }

        Ok(FrameChunk {
            frame_id,
            chunk_index,
            chunk_count,
            payload: datagram[HEADER_SIZE..HEADER_SIZE + payload_len].to_vec(),
        })
    }
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes(buf[offset..offset + 4].try_into().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let chunk = FrameChunk::new(7, 2, 3, &[0xAB; 952]).expect("chunk");
        let mut buf = [0u8; CHUNK_DATAGRAM_SIZE];
        let len = chunk.encode(&mut buf).expect("encode");
        assert_eq!(len, CHUNK_DATAGRAM_SIZE);

        let decoded = FrameChunk::decode(&buf).expect("decode");
        assert_eq!(decoded, chunk);
        assert_eq!(decoded.payload().len(), 952);
    }

    #[test]
    fn encode_zero_pads_the_tail() {
        let chunk = FrameChunk::new(1, 0, 1, &[0xFF; 8]).expect("chunk");
        let mut buf = [0xEEu8; CHUNK_DATAGRAM_SIZE];
        chunk.encode(&mut buf).expect("encode");
        assert!(buf[HEADER_SIZE + 8..].iter().all(|b| *b == 0));
    }

    #[test]
    fn rejects_empty_and_oversized_payloads() {
        assert!(FrameChunk::new(1, 0, 1, &[]).is_err());
        assert!(FrameChunk::new(1, 0, 1, &[0u8; CHUNK_SIZE + 1]).is_err());
        assert!(FrameChunk::new(1, 0, 1, &[0u8; CHUNK_SIZE]).is_ok());
    }

    #[test]
    fn rejects_short_datagrams() {
        assert!(FrameChunk::decode(&[0u8; 16]).is_err());
        assert!(FrameChunk::decode(&[0u8; CHUNK_DATAGRAM_SIZE - 1]).is_err());
    }

    #[test]
    fn rejects_bad_payload_length_field() {
        let chunk = FrameChunk::new(1, 0, 1, &[1, 2, 3]).expect("chunk");
        let mut buf = [0u8; CHUNK_DATAGRAM_SIZE];
        chunk.encode(&mut buf).expect("encode");

        // declared length beyond the chunk size
        buf[12..16].copy_from_slice(&((CHUNK_SIZE as u32) + 1).to_be_bytes());
        assert!(FrameChunk::decode(&buf).is_err());

        // declared length zero
        buf[12..16].copy_from_slice(&0u32.to_be_bytes());
        assert!(FrameChunk::decode(&buf).is_err());
    }
}
