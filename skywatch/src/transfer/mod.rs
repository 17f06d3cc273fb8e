// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Chunked frame delivery over an unreliable datagram transport.
//!
//! The sender splits an encoded frame into bounded chunks, one datagram per
//! chunk, fire-and-forget: no acknowledgment, no retransmission. The receiver
//! reassembles frames per id, tolerating loss, duplication and reordering.
//! Transports are pluggable behind the [DatagramSender] / [DatagramReceiver]
//! seam; UDP and an in-process loopback are provided.

mod assembly;
mod chunk;
mod loopback;
mod packet;
mod sender;
mod source;
mod udp;

pub use assembly::{CompletedFrame, FrameReceiver};
pub use chunk::{FrameChunk, CHUNK_DATAGRAM_SIZE, CHUNK_SIZE, MAX_CHUNKS};
pub use loopback::{loopback, LoopbackReceiver, LoopbackSender};
pub use packet::{FramePacket, PACKET_MAX_SIZE};
pub use sender::FrameSender;
pub use source::{DirectoryFrameSource, FrameSource};
pub use udp::{UdpDatagramReceiver, UdpDatagramSender};

use crate::error::Error;
use std::time::Duration;

/// Outgoing side of an unreliable datagram channel.
pub trait DatagramSender: Send {
    /// Emit one datagram. Delivery is not guaranteed.
    fn send(&mut self, datagram: &[u8]) -> Result<(), Error>;
}

/// Incoming side of an unreliable datagram channel.
pub trait DatagramReceiver: Send {
    /// Wait up to `timeout` for one datagram into `buf`; `Ok(None)` on
    /// timeout. The bounded wait keeps receive loops cancellable.
    fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<Option<usize>, Error>;
}
