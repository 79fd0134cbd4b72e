//! Test doubles shared by the scenario tests: a scriptable radio, a shared
//! clock, shared stores, and capturing event hooks.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use rcbridge_core::{
    Addr, BlobStore, Clock, ConfigCommand, ConfigSurface, MemStore, Radio, RadioError, RadioEvent,
    ReceiverEvents, SendStatus, SenderEvents, StoreError, KEY_LEN,
};

pub const SENDER_ADDR: Addr = Addr([0x0a, 0x1b, 0x2c, 0x3d, 0x4e, 0x5f]);
pub const RECEIVER_ADDR: Addr = Addr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);

#[derive(Default)]
pub struct RadioState {
    pub events: VecDeque<RadioEvent>,
    pub sent: Vec<(Addr, Vec<u8>)>,
    pub peers: Vec<(Addr, [u8; KEY_LEN])>,
    pub channel: u8,
    pub reject_sends: bool,
    pub fail_set_channel: bool,
}

/// Scriptable radio. Tests queue upcalls and inspect what the endpoint sent;
/// clones share one state so the handle survives being moved into a role.
#[derive(Clone, Default)]
pub struct FakeRadio(pub Rc<RefCell<RadioState>>);

impl FakeRadio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliver(&self, from: Addr, frame: Vec<u8>) {
        self.0
            .borrow_mut()
            .events
            .push_back(RadioEvent::Received { addr: from, frame });
    }

    pub fn complete_send(&self, addr: Addr, status: SendStatus) {
        self.0
            .borrow_mut()
            .events
            .push_back(RadioEvent::SendComplete { addr, status });
    }

    pub fn take_sent(&self) -> Vec<(Addr, Vec<u8>)> {
        std::mem::take(&mut self.0.borrow_mut().sent)
    }

    pub fn sent_count(&self) -> usize {
        self.0.borrow().sent.len()
    }

    pub fn channel(&self) -> u8 {
        self.0.borrow().channel
    }

    pub fn peers(&self) -> Vec<(Addr, [u8; KEY_LEN])> {
        self.0.borrow().peers.clone()
    }

    pub fn set_reject_sends(&self, reject: bool) {
        self.0.borrow_mut().reject_sends = reject;
    }

    pub fn set_fail_set_channel(&self, fail: bool) {
        self.0.borrow_mut().fail_set_channel = fail;
    }
}

impl Radio for FakeRadio {
    fn init(&mut self) -> Result<(), RadioError> {
        Ok(())
    }

    fn set_channel(&mut self, channel: u8) -> Result<(), RadioError> {
        let mut state = self.0.borrow_mut();
        if state.fail_set_channel {
            return Err(RadioError("channel change refused"));
        }
        state.channel = channel;
        Ok(())
    }

    fn add_peer(&mut self, addr: Addr, key: &[u8; KEY_LEN]) -> Result<(), RadioError> {
        self.0.borrow_mut().peers.push((addr, *key));
        Ok(())
    }

    fn send(&mut self, addr: Addr, frame: &[u8]) -> Result<(), RadioError> {
        let mut state = self.0.borrow_mut();
        if state.reject_sends {
            return Err(RadioError("tx queue full"));
        }
        state.sent.push((addr, frame.to_vec()));
        Ok(())
    }

    fn poll_event(&mut self) -> Option<RadioEvent> {
        self.0.borrow_mut().events.pop_front()
    }
}

/// Clone-shared in-memory store so tests keep a handle after the endpoint
/// takes ownership.
#[derive(Clone, Default)]
pub struct SharedStore(pub Rc<RefCell<MemStore>>);

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for SharedStore {
    fn exists(&self, name: &str) -> bool {
        self.0.borrow().exists(name)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        self.0.borrow().read(name)
    }

    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<usize, StoreError> {
        self.0.borrow_mut().write(name, bytes)
    }

    fn remove(&mut self, name: &str) -> Result<(), StoreError> {
        self.0.borrow_mut().remove(name)
    }
}

/// Store whose reads always fail.
pub struct BrokenStore;

impl BlobStore for BrokenStore {
    fn exists(&self, _name: &str) -> bool {
        true
    }

    fn read(&self, _name: &str) -> Result<Vec<u8>, StoreError> {
        Err(StoreError::Backend("read error".to_string()))
    }

    fn write(&mut self, _name: &str, _bytes: &[u8]) -> Result<usize, StoreError> {
        Err(StoreError::Backend("write error".to_string()))
    }

    fn remove(&mut self, _name: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend("remove error".to_string()))
    }
}

/// Store whose writes land short by one byte.
#[derive(Clone, Default)]
pub struct ShortStore(pub SharedStore);

impl BlobStore for ShortStore {
    fn exists(&self, name: &str) -> bool {
        self.0.exists(name)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        self.0.read(name)
    }

    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<usize, StoreError> {
        let truncated = &bytes[..bytes.len().saturating_sub(1)];
        self.0.write(name, truncated)
    }

    fn remove(&mut self, name: &str) -> Result<(), StoreError> {
        self.0.remove(name)
    }
}

/// Settable monotonic clock.
#[derive(Clone, Default)]
pub struct FakeClock(pub Rc<Cell<u64>>);

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, micros: u64) {
        self.0.set(self.0.get() + micros);
    }
}

impl Clock for FakeClock {
    fn now_micros(&self) -> u64 {
        self.0.get()
    }
}

/// Collects every delivered payload.
#[derive(Clone, Default)]
pub struct Inbox(pub Rc<RefCell<Vec<Vec<u8>>>>);

impl ReceiverEvents for Inbox {
    fn on_data(&mut self, payload: &[u8]) {
        self.0.borrow_mut().push(payload.to_vec());
    }
}

/// Collects every low-quality notification.
#[derive(Clone, Default)]
pub struct QualityAlerts(pub Rc<RefCell<Vec<f32>>>);

impl SenderEvents for QualityAlerts {
    fn on_low_quality(&mut self, quality: f32) {
        self.0.borrow_mut().push(quality);
    }
}

/// Config surface fed from a queue of commands.
#[derive(Clone, Default)]
pub struct QueueConfig(pub Rc<RefCell<VecDeque<ConfigCommand>>>);

impl QueueConfig {
    pub fn push(&self, command: ConfigCommand) {
        self.0.borrow_mut().push_back(command);
    }
}

impl ConfigSurface for QueueConfig {
    fn poll(&mut self) -> Option<ConfigCommand> {
        self.0.borrow_mut().pop_front()
    }
}
