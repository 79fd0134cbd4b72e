//! In-memory radio medium: every attached node has a tuned channel and an
//! upcall queue. Unicast is acknowledged end to end; broadcast is
//! fire-and-forget. Everything runs on one thread, so the medium is shared
//! through `Rc<RefCell<..>>` rather than locks.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use rcbridge_core::{Addr, Radio, RadioError, RadioEvent, SendStatus, KEY_LEN, MTU};

#[derive(Default)]
struct Node {
    channel: u8,
    queue: VecDeque<RadioEvent>,
    /// Registered peers; the key itself is the substrate's business and only
    /// recorded here.
    peers: HashMap<Addr, [u8; KEY_LEN]>,
}

#[derive(Default)]
struct EtherState {
    nodes: HashMap<Addr, Node>,
    /// Unicast deliveries left to fail; each failure is reported through the
    /// sender's ack.
    drop_unicast: u32,
}

/// Shared medium; one per simulation.
#[derive(Clone, Default)]
pub struct Ether(Rc<RefCell<EtherState>>);

impl Ether {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a node and hand back its radio endpoint.
    pub fn attach(&self, addr: Addr) -> SimRadio {
        self.0.borrow_mut().nodes.entry(addr).or_default();
        SimRadio {
            ether: self.clone(),
            addr,
        }
    }

    /// Fail the next `n` unicast deliveries.
    pub fn drop_next_unicast(&self, n: u32) {
        self.0.borrow_mut().drop_unicast = n;
    }

    /// Channel a node is currently tuned to.
    pub fn channel_of(&self, addr: Addr) -> Option<u8> {
        self.0.borrow().nodes.get(&addr).map(|node| node.channel)
    }
}

/// One node's radio endpoint on the shared ether.
pub struct SimRadio {
    ether: Ether,
    addr: Addr,
}

impl Radio for SimRadio {
    fn init(&mut self) -> Result<(), RadioError> {
        Ok(())
    }

    fn set_channel(&mut self, channel: u8) -> Result<(), RadioError> {
        let mut state = self.ether.0.borrow_mut();
        match state.nodes.get_mut(&self.addr) {
            Some(node) => {
                node.channel = channel;
                Ok(())
            }
            None => Err(RadioError("node detached")),
        }
    }

    fn add_peer(&mut self, addr: Addr, key: &[u8; KEY_LEN]) -> Result<(), RadioError> {
        let mut state = self.ether.0.borrow_mut();
        match state.nodes.get_mut(&self.addr) {
            Some(node) => {
                node.peers.insert(addr, *key);
                Ok(())
            }
            None => Err(RadioError("node detached")),
        }
    }

    fn send(&mut self, addr: Addr, frame: &[u8]) -> Result<(), RadioError> {
        if frame.is_empty() || frame.len() > MTU {
            return Err(RadioError("frame size out of range"));
        }
        let mut state = self.ether.0.borrow_mut();
        let channel = match state.nodes.get(&self.addr) {
            Some(node) => node.channel,
            None => return Err(RadioError("node detached")),
        };

        if addr.is_broadcast() {
            let targets: Vec<Addr> = state
                .nodes
                .iter()
                .filter(|(a, node)| **a != self.addr && node.channel == channel)
                .map(|(a, _)| *a)
                .collect();
            for target in targets {
                if let Some(node) = state.nodes.get_mut(&target) {
                    node.queue.push_back(RadioEvent::Received {
                        addr: self.addr,
                        frame: frame.to_vec(),
                    });
                }
            }
            // A broadcast completion only says the frame left the radio.
            if let Some(node) = state.nodes.get_mut(&self.addr) {
                node.queue.push_back(RadioEvent::SendComplete {
                    addr,
                    status: SendStatus::Delivered,
                });
            }
            return Ok(());
        }

        let dropped = if state.drop_unicast > 0 {
            state.drop_unicast -= 1;
            true
        } else {
            false
        };
        let delivered = !dropped
            && matches!(state.nodes.get(&addr), Some(node) if node.channel == channel);
        if delivered {
            if let Some(node) = state.nodes.get_mut(&addr) {
                node.queue.push_back(RadioEvent::Received {
                    addr: self.addr,
                    frame: frame.to_vec(),
                });
            }
        }
        let status = if delivered {
            SendStatus::Delivered
        } else {
            SendStatus::Failed
        };
        if let Some(node) = state.nodes.get_mut(&self.addr) {
            node.queue.push_back(RadioEvent::SendComplete { addr, status });
        }
        Ok(())
    }

    fn poll_event(&mut self) -> Option<RadioEvent> {
        self.ether
            .0
            .borrow_mut()
            .nodes
            .get_mut(&self.addr)?
            .queue
            .pop_front()
    }
}
