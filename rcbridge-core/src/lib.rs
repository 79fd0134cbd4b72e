//! Point-to-point wireless bridge core: pairing, framing, and adaptive
//! channel hopping between a [`Sender`] and a [`Receiver`] endpoint.
//!
//! The crate is pure protocol logic. A host supplies the radio substrate,
//! the blob store, the clock, and the config surface through the seams in
//! [`radio`], [`store`], [`clock`], and [`config`], then drives exactly one
//! role per device from a single-threaded cooperative loop:
//!
//! - the host drains radio upcalls and periodic work via [`Endpoint::poll`]
//!   (or hands control to [`Endpoint::run`]),
//! - the roles handle discovery, persistence, and hopping internally,
//! - the application pushes payloads with [`Sender::send`] and observes them
//!   through [`ReceiverEvents::on_data`].
//!
//! Delivery is best effort: no retransmission, no ordering, no
//! fragmentation. One frame in, at most one frame out.

pub mod channel;
pub mod clock;
pub mod config;
pub mod core;
pub mod error;
pub mod link;
pub mod peer;
pub mod radio;
pub mod receiver;
pub mod sender;
pub mod store;
pub mod wire;

pub use crate::core::{Endpoint, PairingState};
pub use channel::{INIT_CHANNEL, MAX_CHANNEL, MIN_CHANNEL};
pub use clock::{Clock, StdClock};
pub use config::{ConfigCommand, ConfigSurface, NullConfig};
pub use error::BridgeError;
pub use link::{LinkQuality, HOP_THRESHOLD, QUALITY_WEIGHT};
pub use peer::{KeySource, OsKeys, Peer, TimeSeededKeys, KEY_LEN, PEER_BLOB, PEER_BLOB_LEN};
pub use radio::{Addr, Radio, RadioError, RadioEvent, SendStatus, ADDR_LEN, BROADCAST};
pub use receiver::{Receiver, ReceiverEvents};
pub use sender::{Sender, SenderEvents, SEARCH_INTERVAL_MICROS};
pub use store::{BlobStore, MemStore, StoreError};
pub use wire::{Frame, FrameDecodeError, FrameEncodeError, MAX_PAYLOAD, MTU};
