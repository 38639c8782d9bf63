//! The shared medium standing in for a real radio stack: every node's
//! [`EtherRadio`] fans outbound frames out to its scene-configured
//! neighbors' inboxes directly, skipping path-loss/collision modeling
//! entirely (that belongs to a real radio simulator, not this protocol
//! demonstration).

use bcp::{Address, Frame, FrameKind, RadioStack, SendStatus};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};

/// Depth of a node's inbound event queue. Generous relative to the
/// default beacon interval since a busy node can hear several neighbors'
/// beacons in quick succession.
pub const ETHER_INBOX_SIZE: usize = 32;

pub type EtherInbox = Channel<CriticalSectionRawMutex, EtherEvent, ETHER_INBOX_SIZE>;
pub type EtherInboxReceiver = Receiver<'static, CriticalSectionRawMutex, EtherEvent, ETHER_INBOX_SIZE>;
pub type EtherInboxSender = Sender<'static, CriticalSectionRawMutex, EtherEvent, ETHER_INBOX_SIZE>;

/// An event delivered into a node's inbox by the ether.
#[derive(Debug, Clone)]
pub enum EtherEvent {
    Broadcast { from: Address, frame: Frame },
    Unicast { from: Address },
    /// Self-addressed notice that a frame this node handed to
    /// [`EtherRadio`] has finished "transmitting", standing in for the
    /// asynchronous send-completion event a real radio delivers.
    SendCompleted { kind: FrameKind, status: SendStatus },
}

/// The [`bcp::RadioStack`] implementation every demonstration node is
/// opened with: fans broadcasts out to neighbors, routes unicasts (acks)
/// to the one neighbor addressed, and loops a completion notice back to
/// the sending node itself.
pub struct EtherRadio {
    local: Address,
    self_tx: EtherInboxSender,
    neighbors: Vec<(Address, EtherInboxSender)>,
}

impl EtherRadio {
    pub fn new(local: Address, self_tx: EtherInboxSender, neighbors: Vec<(Address, EtherInboxSender)>) -> Self {
        EtherRadio { local, self_tx, neighbors }
    }
}

impl RadioStack for EtherRadio {
    fn broadcast_send(&mut self, frame: &Frame) {
        for (addr, tx) in &self.neighbors {
            if tx
                .try_send(EtherEvent::Broadcast { from: self.local, frame: frame.clone() })
                .is_err()
            {
                log::warn!("{} -> {}: inbox full, frame dropped", self.local, addr);
            }
        }
        let completion = EtherEvent::SendCompleted { kind: frame.kind, status: SendStatus::Ok };
        if self.self_tx.try_send(completion).is_err() {
            log::warn!("{}: own inbox full, send-completion notice dropped", self.local);
        }
    }

    fn unicast_send(&mut self, dest: Address, _frame: &Frame) {
        match self.neighbors.iter().find(|(addr, _)| *addr == dest) {
            Some((_, tx)) => {
                if tx.try_send(EtherEvent::Unicast { from: self.local }).is_err() {
                    log::warn!("{} -> {}: inbox full, ack dropped", self.local, dest);
                }
            }
            None => log::warn!("{}: unicast to unknown neighbor {}", self.local, dest),
        }
    }
}

