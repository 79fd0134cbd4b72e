//! Sender role: broadcast discovery, application payload push, and the
//! link-quality watchdog that asks the receiver for channel hops.

use tracing::{debug, info, trace, warn};

use crate::clock::Clock;
use crate::core::{BridgeCore, Endpoint};
use crate::error::BridgeError;
use crate::link::LinkQuality;
use crate::peer::Peer;
use crate::radio::{Addr, Radio, RadioEvent, SendStatus, BROADCAST};
use crate::store::{BlobStore, StoreError};
use crate::wire::{self, Frame};

/// Discovery broadcast cadence while unpaired.
pub const SEARCH_INTERVAL_MICROS: u64 = 500_000;

/// Hook points the application can observe on the sending endpoint.
pub trait SenderEvents {
    /// Link quality dropped below the hop threshold. Notification only; a
    /// hop request is already on its way. Keep this quick.
    fn on_low_quality(&mut self, quality: f32) {
        let _ = quality;
    }
}

impl SenderEvents for () {}

/// The transmitting endpoint.
pub struct Sender<R: Radio, S: BlobStore, C: Clock, E: SenderEvents = ()> {
    core: BridgeCore<R, S, C>,
    quality: LinkQuality,
    last_search_micros: Option<u64>,
    events: E,
}

impl<R: Radio, S: BlobStore, C: Clock, E: SenderEvents> Sender<R, S, C, E> {
    /// Bring the endpoint up. Paired immediately on a warm boot; otherwise
    /// discovery broadcasts run through [`Endpoint::poll`].
    pub fn start(radio: R, store: S, clock: C, events: E) -> Result<Self, BridgeError> {
        let core = BridgeCore::start(radio, store, clock)?;
        if !core.is_paired() {
            info!("searching for receiver...");
        }
        Ok(Sender {
            core,
            quality: LinkQuality::new(),
            last_search_micros: None,
            events,
        })
    }

    /// Push one application payload (1..=249 bytes) to the peer. `Ok` means
    /// the radio accepted the frame; the per-frame ack outcome arrives
    /// asynchronously and only feeds the quality estimator.
    pub fn send(&mut self, payload: &[u8]) -> Result<(), BridgeError> {
        let addr = match self.core.peer() {
            Some(peer) => peer.addr,
            None => return Err(BridgeError::NotPaired),
        };
        let frame = Frame::data(payload)
            .map_err(|_| BridgeError::PayloadTooLarge)?
            .encode();
        self.core.radio.send(addr, &frame).map_err(|err| {
            warn!("radio rejected data frame: {err}");
            BridgeError::SendRejected(err)
        })
    }

    /// Current smoothed link quality in [0, 1].
    pub fn quality(&self) -> f32 {
        self.quality.get()
    }

    /// Diagnostics: force every estimator sample to `sample` (e.g. 0.5 to
    /// exercise hopping on a healthy bench link). `None` restores real ack
    /// samples.
    pub fn set_quality_sample_override(&mut self, sample: Option<f32>) {
        self.quality.set_sample_override(sample);
    }

    pub fn peer(&self) -> Option<&Peer> {
        self.core.peer()
    }

    fn on_sent(&mut self, addr: Addr, status: SendStatus) {
        if addr.is_broadcast() {
            // The beacon has no confirmed recipient; the status only says
            // whether the frame left the radio.
            if !status.is_ok() {
                warn!("failed to broadcast beacon");
            }
            return;
        }
        if !self.core.is_paired() {
            return;
        }
        let quality = self.quality.record(status.is_ok());
        if self.quality.is_low() {
            info!("link quality {quality:.2}; requesting channel hop");
            self.events.on_low_quality(quality);
            match self.core.radio.send(addr, &Frame::HopRequest.encode()) {
                // Without the reset, every ack until the hop completes would
                // emit another request.
                Ok(()) => self.quality.reset(),
                Err(err) => warn!("failed to send hop request: {err}"),
            }
        }
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
            if let Frame::SearchReply { key } = frame {
                let peer = Peer { addr, key };
                info!("receiver <{}> matched", peer.addr);
                self.core.pair(peer)?;
            } else {
                trace!("dropping frame from <{addr}> while unpaired");
            }
            return Ok(());
        }
        match frame {
            Frame::HopReply { channel } => match self.core.radio.set_channel(channel) {
                Ok(()) => info!("channel hopped to {channel}"),
                Err(err) => warn!("failed to hop to channel {channel}: {err}"),
            },
            _ => trace!("dropping frame from <{addr}> in paired state"),
        }
        Ok(())
    }
}

impl<R: Radio, S: BlobStore, C: Clock, E: SenderEvents> Endpoint for Sender<R, S, C, E> {
    fn poll(&mut self) -> Result<(), BridgeError> {
        while let Some(event) = self.core.radio.poll_event() {
            match event {
                RadioEvent::SendComplete { addr, status } => self.on_sent(addr, status),
                RadioEvent::Received { addr, frame } => self.on_received(addr, &frame)?,
            }
        }
        if !self.core.is_paired() {
            let now = self.core.clock.now_micros();
            let due = self
                .last_search_micros
                .map_or(true, |last| now.saturating_sub(last) >= SEARCH_INTERVAL_MICROS);
            if due {
                debug!("searching for receiver...");
                if let Err(err) = self.core.radio.send(BROADCAST, &Frame::Search.encode()) {
                    warn!("failed to broadcast beacon: {err}");
                }
                self.last_search_micros = Some(now);
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
