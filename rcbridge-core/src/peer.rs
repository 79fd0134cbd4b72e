//! Peer record: the counterpart's hardware address and the link key,
//! persisted together as one fixed-name blob, plus the key sources the
//! receiver draws fresh keys from.

use std::fmt;

use rand::rngs::{OsRng, SmallRng};
use rand::{RngCore, SeedableRng};

use crate::radio::{Addr, ADDR_LEN};

/// Link key length.
pub const KEY_LEN: usize = 16;
/// Persisted peer record: `addr[6] || key[16]`.
pub const PEER_BLOB_LEN: usize = ADDR_LEN + KEY_LEN;
/// Fixed blob name the peer record persists under.
pub const PEER_BLOB: &str = "peer.info";

/// The paired counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peer {
    pub addr: Addr,
    pub key: [u8; KEY_LEN],
}

impl Peer {
    /// Serialize for persistence, address first.
    pub fn to_blob(&self) -> [u8; PEER_BLOB_LEN] {
        let mut out = [0u8; PEER_BLOB_LEN];
        out[..ADDR_LEN].copy_from_slice(&self.addr.0);
        out[ADDR_LEN..].copy_from_slice(&self.key);
        out
    }

    /// Parse a persisted record. Anything but exactly 22 bytes is ill-formed.
    pub fn from_blob(bytes: &[u8]) -> Result<Self, PeerBlobError> {
        if bytes.len() != PEER_BLOB_LEN {
            return Err(PeerBlobError::BadLength(bytes.len()));
        }
        let mut addr = [0u8; ADDR_LEN];
        addr.copy_from_slice(&bytes[..ADDR_LEN]);
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&bytes[ADDR_LEN..]);
        Ok(Peer {
            addr: Addr(addr),
            key,
        })
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MAC = {}, key = ", self.addr)?;
        for byte in &self.key {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PeerBlobError {
    #[error("peer blob must be 22 bytes, got {0}")]
    BadLength(usize),
}

/// Source of fresh link keys for the receiver's search replies.
pub trait KeySource {
    /// Produce a new 16-byte key. `entropy_hint` is the monotonic microsecond
    /// counter at call time; sources with real entropy ignore it.
    fn generate(&mut self, entropy_hint: u64) -> [u8; KEY_LEN];
}

/// Default key source: a small PRNG seeded from the microsecond counter at
/// the first generation. Weak, but it matches the entropy the target
/// hardware actually has; use [`OsKeys`] where an OS is available.
#[derive(Debug, Default)]
pub struct TimeSeededKeys {
    rng: Option<SmallRng>,
}

impl TimeSeededKeys {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeySource for TimeSeededKeys {
    fn generate(&mut self, entropy_hint: u64) -> [u8; KEY_LEN] {
        let rng = self
            .rng
            .get_or_insert_with(|| SmallRng::seed_from_u64(entropy_hint));
        let mut key = [0u8; KEY_LEN];
        rng.fill_bytes(&mut key);
        key
    }
}

/// Key source backed by operating-system entropy.
#[derive(Debug, Default)]
pub struct OsKeys;

impl KeySource for OsKeys {
    fn generate(&mut self, _entropy_hint: u64) -> [u8; KEY_LEN] {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        key
    }
}
