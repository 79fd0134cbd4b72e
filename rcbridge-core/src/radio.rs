//! Radio substrate seam: short unicast/broadcast datagrams on a selectable
//! channel, with per-peer payload encryption handled below this interface.
//!
//! The substrate is an explicitly-constructed value moved into the endpoint
//! at startup; exactly one endpoint owns it for the process lifetime.

use std::fmt;

use crate::peer::KEY_LEN;

/// Hardware address length.
pub const ADDR_LEN: usize = 6;

/// 6-byte radio hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Addr(pub [u8; ADDR_LEN]);

/// All-ones address the substrate treats as broadcast. Used only pre-pair.
pub const BROADCAST: Addr = Addr([0xff; ADDR_LEN]);

impl Addr {
    pub fn is_broadcast(&self) -> bool {
        *self == BROADCAST
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, ":")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Outcome the substrate reports once a frame has left the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// The frame was sent; for unicast this means the peer acknowledged it.
    Delivered,
    /// The frame was not acknowledged (unicast) or not sent (broadcast).
    Failed,
}

impl SendStatus {
    pub fn is_ok(self) -> bool {
        self == SendStatus::Delivered
    }
}

/// One serialized upcall, drained through [`Radio::poll_event`]. The
/// substrate guarantees events are delivered in radio order and never
/// concurrently with each other or the main loop.
#[derive(Debug, Clone)]
pub enum RadioEvent {
    /// A prior [`Radio::send`] completed.
    SendComplete { addr: Addr, status: SendStatus },
    /// A frame arrived from `addr`.
    Received { addr: Addr, frame: Vec<u8> },
}

/// Substrate operation failure. The core wraps it into [`crate::BridgeError`]
/// where the failure is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RadioError(pub &'static str);

/// The radio datagram primitive.
pub trait Radio {
    /// Bring the radio up capable of both sending and receiving.
    fn init(&mut self) -> Result<(), RadioError>;

    /// Tune to `channel`.
    fn set_channel(&mut self, channel: u8) -> Result<(), RadioError>;

    /// Register the paired peer and its key, enabling encrypted unicast.
    fn add_peer(&mut self, addr: Addr, key: &[u8; KEY_LEN]) -> Result<(), RadioError>;

    /// Hand one frame (tag byte included, at most [`crate::wire::MTU`] bytes)
    /// to the radio. `Ok` means accepted for transmission, not delivered; the
    /// delivery outcome arrives later as [`RadioEvent::SendComplete`].
    fn send(&mut self, addr: Addr, frame: &[u8]) -> Result<(), RadioError>;

    /// Drain the next pending upcall, if any.
    fn poll_event(&mut self) -> Option<RadioEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_formatting() {
        let addr = Addr([0xaa, 0xbb, 0xcc, 0x01, 0x02, 0x03]);
        assert_eq!(addr.to_string(), "aa:bb:cc:01:02:03");
    }

    #[test]
    fn broadcast_detection() {
        assert!(BROADCAST.is_broadcast());
        assert!(!Addr([0xff, 0xff, 0xff, 0xff, 0xff, 0xfe]).is_broadcast());
    }
}
