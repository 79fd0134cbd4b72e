//! Receiver role: answer discovery beacons, deliver application payloads,
//! and grant the channel hops the sender asks for.

use tracing::{debug, info, trace, warn};

use crate::channel::ChannelPlan;
use crate::clock::Clock;
use crate::core::{BridgeCore, Endpoint};
use crate::error::BridgeError;
use crate::peer::{KeySource, Peer, TimeSeededKeys};
use crate::radio::{Addr, Radio, RadioEvent, SendStatus};
use crate::store::{BlobStore, StoreError};
use crate::wire::{self, Frame};

/// Hook points the application observes on the receiving endpoint.
pub trait ReceiverEvents {
    /// One application payload arrived (0..=249 bytes).
    fn on_data(&mut self, payload: &[u8]) {
        let _ = payload;
    }
}

impl ReceiverEvents for () {}

/// The receiving endpoint. Holds the only copy of the channel state; the
/// sender follows its decisions.
pub struct Receiver<R, S, C, K = TimeSeededKeys, E = ()>
where
    R: Radio,
    S: BlobStore,
    C: Clock,
    K: KeySource,
    E: ReceiverEvents,
{
    core: BridgeCore<R, S, C>,
    plan: ChannelPlan,
    /// Peer offered a key but the reply ack has not come back yet.
    pending_peer: Option<Peer>,
    /// Hop reply in flight; commit happens on its ack.
    pending_hop: Option<u8>,
    keys: K,
    events: E,
}

impl<R, S, C, K, E> Receiver<R, S, C, K, E>
where
    R: Radio,
    S: BlobStore,
    C: Clock,
    K: KeySource,
    E: ReceiverEvents,
{
    /// Bring the endpoint up. Paired immediately on a warm boot; otherwise
    /// it listens passively for beacons through [`Endpoint::poll`].
    pub fn start(radio: R, store: S, clock: C, keys: K, events: E) -> Result<Self, BridgeError> {
        let core = BridgeCore::start(radio, store, clock)?;
        if !core.is_paired() {
            info!("waiting for sender...");
        }
        Ok(Receiver {
            core,
            plan: ChannelPlan::new(),
            pending_peer: None,
            pending_hop: None,
            keys,
            events,
        })
    }

    /// Channel this endpoint currently occupies.
    pub fn channel(&self) -> u8 {
        self.plan.current()
    }

    pub fn peer(&self) -> Option<&Peer> {
        self.core.peer()
    }

    fn on_sent(&mut self, addr: Addr, status: SendStatus) -> Result<(), BridgeError> {
        if !self.core.is_paired() {
            // The outstanding frame is a search reply. A positive ack is the
            // pairing commit point: the sender has seen the key.
            if status.is_ok() {
                if let Some(peer) = self.pending_peer.take() {
                    info!("sender <{}> matched", peer.addr);
                    self.core.pair(peer)?;
                }
            } else if self.pending_peer.take().is_some() {
                debug!("search reply to <{addr}> not acked; staying unpaired");
            }
            return Ok(());
        }
        match self.pending_hop.take() {
            Some(_) if status.is_ok() => {
                // The reply has left the radio; only now is it safe to leave
                // the channel the sender heard it on.
                let next = self.plan.candidate();
                match self.core.radio.set_channel(next) {
                    Ok(()) => {
                        self.plan.commit(next);
                        info!("channel set to {next}");
                    }
                    Err(err) => warn!("failed to set channel {next}: {err}"),
                }
            }
            Some(next) => {
                debug!("hop reply for channel {next} not acked; staying on {}", self.plan.current());
            }
            None => {}
        }
        Ok(())
    }

    fn on_received(&mut self, addr: Addr, bytes: &[u8]) -> Result<(), BridgeError> {
        let frame = match wire::decode(bytes) {
            Ok(frame) => frame,
            Err(err) => {
                trace!("dropping frame from <{addr}>: {err}");
                return Ok(());
            }
        };
        if !self.core.is_paired() {
            if let Frame::Search = frame {
                debug!("beacon from <{addr}>");
                let key = self.keys.generate(self.core.clock.now_micros());
                let reply = Frame::SearchReply { key }.encode();
                match self.core.radio.send(addr, &reply) {
                    Ok(()) => self.pending_peer = Some(Peer { addr, key }),
                    Err(err) => {
                        warn!("failed to reply to beacon: {err}");
                        self.pending_peer = None;
                    }
                }
            } else {
                trace!("dropping frame from <{addr}> while unpaired");
            }
            return Ok(());
        }
        match frame {
            Frame::HopRequest => {
                let candidate = self.plan.candidate();
                debug!("hop requested; proposing channel {candidate}");
                let peer_addr = match self.core.peer() {
                    Some(peer) => peer.addr,
                    None => return Ok(()),
                };
                let reply = Frame::HopReply { channel: candidate }.encode();
                match self.core.radio.send(peer_addr, &reply) {
                    Ok(()) => self.pending_hop = Some(candidate),
                    Err(err) => {
                        warn!("failed to reply to hop request: {err}");
                        self.pending_hop = None;
                    }
                }
            }
            Frame::Data { payload } => self.events.on_data(payload),
            _ => trace!("dropping frame from <{addr}> in paired state"),
        }
        Ok(())
    }
}

impl<R, S, C, K, E> Endpoint for Receiver<R, S, C, K, E>
where
    R: Radio,
    S: BlobStore,
    C: Clock,
    K: KeySource,
    E: ReceiverEvents,
{
    fn poll(&mut self) -> Result<(), BridgeError> {
        while let Some(event) = self.core.radio.poll_event() {
            match event {
                RadioEvent::SendComplete { addr, status } => self.on_sent(addr, status)?,
                RadioEvent::Received { addr, frame } => self.on_received(addr, &frame)?,
            }
        }
        Ok(())
    }

    fn is_paired(&self) -> bool {
        self.core.is_paired()
    }

    fn reset(&mut self) -> Result<(), StoreError> {
        self.core.reset()
    }
}
