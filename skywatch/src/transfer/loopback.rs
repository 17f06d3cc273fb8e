// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! In-process loopback transport.
//!
//! Carries datagrams over an mpsc channel with the same interface as the
//! UDP transport; used by tests and single-process runs.

use crate::error::Error;
use crate::error::Error::Channel;
use crate::transfer::{DatagramReceiver, DatagramSender};
use std::sync::mpsc;
use std::time::Duration;

/// Create a connected loopback sender/receiver pair.
pub fn loopback() -> (LoopbackSender, LoopbackReceiver) {
    let (sender, receiver) = mpsc::channel();
    (LoopbackSender { sender }, LoopbackReceiver { receiver })
}

pub struct LoopbackSender {
    sender: mpsc::Sender<Vec<u8>>,
}

impl Clone for LoopbackSender {
    fn clone(&self) -> LoopbackSender {
        LoopbackSender {
            sender: self.sender.clone(),
        }
    }
}

impl DatagramSender for LoopbackSender {
    fn send(&mut self, datagram: &[u8]) -> Result<(), Error> {
        self.sender
            .send(datagram.to_vec())
            .map_err(|_| Channel("failed to send datagram"))
    }
}

pub struct LoopbackReceiver {
    receiver: mpsc::Receiver<Vec<u8>>,
}

impl DatagramReceiver for LoopbackReceiver {
    fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<Option<usize>, Error> {
        match self.receiver.recv_timeout(timeout) {
            Ok(datagram) => {
                if datagram.len() > buf.len() {
                    return Err(Channel("datagram exceeds receive buffer"));
                }
                buf[..datagram.len()].copy_from_slice(&datagram);
                Ok(Some(datagram.len()))
            }
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(Channel("datagram channel disconnected"))
            }
        }
    }
}
