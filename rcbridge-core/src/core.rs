//! Shared endpoint substrate: startup, peer persistence, the pairing commit,
//! reset, and the cooperative loop both roles run.

use tracing::{debug, info, warn};

use crate::channel::INIT_CHANNEL;
use crate::clock::Clock;
use crate::config::{ConfigCommand, ConfigSurface};
use crate::error::BridgeError;
use crate::peer::{Peer, PEER_BLOB, PEER_BLOB_LEN};
use crate::radio::Radio;
use crate::store::{BlobStore, StoreError};

/// Pairing progress. Monotonic per boot: once `Paired` the endpoint never
/// goes back; reset only affects the next boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingState {
    Unpaired,
    Paired,
}

/// Substrate shared by both roles: the external seams plus pairing state.
/// One instance exists per device, owned by the role for its lifetime.
pub struct BridgeCore<R: Radio, S: BlobStore, C: Clock> {
    pub(crate) radio: R,
    pub(crate) store: S,
    pub(crate) clock: C,
    state: PairingState,
    peer: Option<Peer>,
}

impl<R: Radio, S: BlobStore, C: Clock> BridgeCore<R, S, C> {
    /// Bring the substrate up: radio in combo role, initial channel, then
    /// the persisted peer if a well-formed blob exists. An ill-formed blob
    /// is ignored and discovery will run; an unreadable one is fatal.
    pub(crate) fn start(radio: R, store: S, clock: C) -> Result<Self, BridgeError> {
        let mut core = BridgeCore {
            radio,
            store,
            clock,
            state: PairingState::Unpaired,
            peer: None,
        };
        core.radio.init().map_err(BridgeError::RadioInit)?;
        core.radio
            .set_channel(INIT_CHANNEL)
            .map_err(|source| BridgeError::ChannelSet {
                channel: INIT_CHANNEL,
                source,
            })?;
        if core.store.exists(PEER_BLOB) {
            let blob = core.store.read(PEER_BLOB).map_err(BridgeError::BlobRead)?;
            match Peer::from_blob(&blob) {
                Ok(peer) => {
                    info!("peer <{}> loaded from <{}>", peer.addr, PEER_BLOB);
                    core.register(peer)?;
                }
                Err(err) => {
                    warn!("ignoring peer blob: {err}");
                }
            }
        }
        Ok(core)
    }

    /// Commit a freshly discovered peer: persist it, register it with the
    /// radio, then mark the endpoint paired.
    pub(crate) fn pair(&mut self, peer: Peer) -> Result<(), BridgeError> {
        let blob = peer.to_blob();
        let wrote = self
            .store
            .write(PEER_BLOB, &blob)
            .map_err(BridgeError::BlobWrite)?;
        if wrote != PEER_BLOB_LEN {
            return Err(BridgeError::BlobWrite(StoreError::ShortWrite {
                wrote,
                expected: PEER_BLOB_LEN,
            }));
        }
        debug!("peer <{peer}> saved to <{}>", PEER_BLOB);
        self.register(peer)
    }

    fn register(&mut self, peer: Peer) -> Result<(), BridgeError> {
        self.radio
            .add_peer(peer.addr, &peer.key)
            .map_err(|source| BridgeError::PeerRegister {
                addr: peer.addr,
                source,
            })?;
        self.peer = Some(peer);
        self.state = PairingState::Paired;
        Ok(())
    }

    pub(crate) fn is_paired(&self) -> bool {
        self.state == PairingState::Paired
    }

    pub(crate) fn peer(&self) -> Option<&Peer> {
        self.peer.as_ref()
    }

    /// Delete the persisted pairing so the next boot rediscovers. The
    /// running session keeps its peer. Idempotent.
    pub(crate) fn reset(&mut self) -> Result<(), StoreError> {
        if self.store.exists(PEER_BLOB) {
            self.store.remove(PEER_BLOB)?;
        }
        Ok(())
    }
}

/// Capability set common to both roles.
pub trait Endpoint {
    /// One cooperative step of the protocol: drain pending radio upcalls,
    /// then do any role-specific periodic work. Never blocks.
    fn poll(&mut self) -> Result<(), BridgeError>;

    fn is_paired(&self) -> bool;

    /// Delete the persisted pairing; takes effect on the next boot.
    fn reset(&mut self) -> Result<(), StoreError>;

    /// One main-loop iteration: protocol poll, then service the config
    /// surface.
    fn step(&mut self, config: &mut dyn ConfigSurface) -> Result<(), BridgeError> {
        self.poll()?;
        if let Some(command) = config.poll() {
            match command {
                ConfigCommand::Reset => match self.reset() {
                    Ok(()) => info!("pairing removed; rediscovery on next boot"),
                    Err(err) => warn!("reset failed: {err}"),
                },
            }
        }
        Ok(())
    }

    /// Main loop: alternate protocol polling with config servicing forever.
    /// Returns only on a fatal error.
    fn run(&mut self, config: &mut dyn ConfigSurface) -> Result<(), BridgeError> {
        loop {
            self.step(config)?;
        }
    }
}
