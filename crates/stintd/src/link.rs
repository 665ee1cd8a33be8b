//! The outbound point-to-point link.
//!
//! Best-effort, unacknowledged, blocking. `write` reports whether the
//! link accepted the bytes, not whether anyone received them; the caller
//! never retries — telemetry is latest-value-wins and a stale frame is
//! worthless by the next cycle.

use std::io;
use std::net::UdpSocket;

/// One-way frame submission over a fixed logical channel.
pub trait Link {
    fn write(&mut self, frame: &[u8]) -> bool;
}

/// UDP rendition of the radio link: one datagram per frame to a fixed
/// peer.
pub struct UdpLink {
    socket: UdpSocket,
    channel: u64,
}

impl UdpLink {
    /// Bind the local socket and fix the point-to-point peer.
    pub fn open(bind: &str, peer: &str, channel: u64) -> io::Result<Self> {
        let socket = UdpSocket::bind(bind)?;
        socket.connect(peer)?;
        tracing::info!(peer, channel = format_args!("{channel:#x}"), "link open");
        Ok(Self { socket, channel })
    }

    /// The logical channel identifier this link was opened on.
    pub fn channel(&self) -> u64 {
        self.channel
    }
}

impl Link for UdpLink {
    fn write(&mut self, frame: &[u8]) -> bool {
        match self.socket.send(frame) {
            Ok(n) if n == frame.len() => true,
            Ok(n) => {
                tracing::warn!(sent = n, frame_len = frame.len(), "link truncated the frame");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "link rejected the frame");
                false
            }
        }
    }
}
