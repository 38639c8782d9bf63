//! Radio stack contract (spec §6.1) — external collaborator.
//!
//! The real broadcast/unicast open/close/send primitives, the shared
//! packet buffer, and the monotonic clock live outside this crate's scope.
//! Instead of callbacks *into* a trait object (which has no clean
//! expression in Rust without the original's `offsetof` back-pointer
//! trick — see spec §9), completion and reception are delivered by the
//! host runtime calling `Connection::on_broadcast_receive`,
//! `on_broadcast_sent`, and `on_unicast_receive` directly.

use crate::address::Address;
use crate::packet::Frame;

/// The result of handing a frame to the radio for transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    Ok,
    Error,
}

/// What a connection needs from the underlying radio: broadcast on
/// channel `c`, unicast on channel `c + 1` (spec §4.4's channel pair).
pub trait RadioStack {
    /// Opens the broadcast/unicast channel pair. Default no-op for stacks
    /// that are already open by construction.
    fn open(&mut self) {}

    /// Closes the channel pair. Default no-op, mirroring `open`.
    fn close(&mut self) {}

    /// Broadcasts `frame` on the connection's broadcast channel.
    fn broadcast_send(&mut self, frame: &Frame);

    /// Unicasts `frame` (always [`crate::packet::FrameKind::Ack`] in
    /// practice) to `dest` on the connection's unicast channel.
    fn unicast_send(&mut self, dest: Address, frame: &Frame);
}
