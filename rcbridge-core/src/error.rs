//! Error taxonomy. Startup failures are fatal and propagate to the entry
//! point; steady-state failures are logged and the link self-heals as the
//! radio recovers.

use crate::radio::{Addr, RadioError};
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("failed to initialize radio: {0}")]
    RadioInit(#[source] RadioError),

    #[error("failed to set channel {channel}: {source}")]
    ChannelSet {
        channel: u8,
        #[source]
        source: RadioError,
    },

    #[error("failed to register peer <{addr}>: {source}")]
    PeerRegister {
        addr: Addr,
        #[source]
        source: RadioError,
    },

    #[error("failed to read peer blob: {0}")]
    BlobRead(#[source] StoreError),

    #[error("failed to write peer blob: {0}")]
    BlobWrite(#[source] StoreError),

    /// The payload is empty or larger than 249 bytes.
    #[error("payload must be 1..=249 bytes")]
    PayloadTooLarge,

    #[error("radio rejected the frame: {0}")]
    SendRejected(#[source] RadioError),

    #[error("not paired with a peer yet")]
    NotPaired,
}
