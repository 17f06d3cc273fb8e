// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! UDP datagram transports built on mio's nonblocking sockets.

use crate::error::Error;
use crate::error::Error::Io;
use crate::transfer::{DatagramReceiver, DatagramSender};
use mio::net::UdpSocket;
use mio::{Events, Interest, Poll, Token};
use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Sends datagrams to one fixed peer.
pub struct UdpDatagramSender {
    socket: UdpSocket,
}

impl UdpDatagramSender {
    /// Bind an ephemeral local port and set the destination.
    pub fn connect(peer: SocketAddr) -> Result<Self, Error> {
        let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))
            .map_err(|e| Io((e, "failed to bind sender socket")))?;
        socket
            .connect(peer)
            .map_err(|e| Io((e, "failed to set datagram destination")))?;
        Ok(Self { socket })
    }
}

impl DatagramSender for UdpDatagramSender {
    fn send(&mut self, datagram: &[u8]) -> Result<(), Error> {
        match self.socket.send(datagram) {
            Ok(_) => Ok(()),
            // a datagram the local stack cannot take right now is lost, which
            // the protocol tolerates like any other loss
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(()),
            Err(e) => Err(Io((e, "failed to send datagram"))),
        }
    }
}

/// Receives datagrams on a bound port with bounded waits.
pub struct UdpDatagramReceiver {
    socket: UdpSocket,
    poll: Poll,
    events: Events,
}

impl UdpDatagramReceiver {
    pub fn bind(addr: SocketAddr) -> Result<Self, Error> {
        let mut socket =
            UdpSocket::bind(addr).map_err(|e| Io((e, "failed to bind receiver socket")))?;
        let poll = Poll::new().map_err(|e| Io((e, "failed to create poll instance")))?;
        poll.registry()
            .register(&mut socket, Token(0), Interest::READABLE)
            .map_err(|e| Io((e, "failed to register receiver socket")))?;
        Ok(Self {
            socket,
            poll,
            events: Events::with_capacity(16),
        })
    }

    /// Local address the receiver is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        self.socket
            .local_addr()
            .map_err(|e| Io((e, "failed to get local address")))
    }

    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>, Error> {
        match self.socket.recv_from(buf) {
            Ok((len, _)) => Ok(Some(len)),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(Io((e, "failed to receive datagram"))),
        }
    }
}

impl DatagramReceiver for UdpDatagramReceiver {
    fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<Option<usize>, Error> {
        if let Some(len) = self.try_recv(buf)? {
            return Ok(Some(len));
        }
        self.poll
            .poll(&mut self.events, Some(timeout))
            .map_err(|e| Io((e, "error while polling receiver socket")))?;
        self.try_recv(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn localhost_receiver() -> UdpDatagramReceiver {
        UdpDatagramReceiver::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .expect("bind receiver")
    }

    #[test]
    fn sends_and_receives_a_datagram() {
        let mut receiver = localhost_receiver();
        let addr = receiver.local_addr().expect("local addr");
        let mut sender = UdpDatagramSender::connect(addr).expect("connect");

        sender.send(b"skywatch").expect("send");

        let mut buf = [0u8; 64];
        let mut len = None;
        // the datagram may take a few poll rounds to surface
        for _ in 0..50 {
            len = receiver
                .recv(&mut buf, Duration::from_millis(20))
                .expect("recv");
            if len.is_some() {
                break;
            }
        }
        assert_eq!(len, Some(8));
        assert_eq!(&buf[..8], b"skywatch");
    }

    #[test]
    fn recv_times_out_when_nothing_arrives() {
        let mut receiver = localhost_receiver();
        let mut buf = [0u8; 64];
        let got = receiver
            .recv(&mut buf, Duration::from_millis(10))
            .expect("recv");
        assert!(got.is_none());
    }

    #[test]
    fn binding_the_same_port_twice_fails() {
        let receiver = localhost_receiver();
        let addr = receiver.local_addr().expect("local addr");
        assert!(UdpDatagramReceiver::bind(addr).is_err());
    }
}
