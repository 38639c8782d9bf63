//! Extension observer hooks (spec §4.4, §6.3).
//!
//! Mirrors `bcp_extend.h`'s `struct bcp_extender`: pure observer callbacks
//! that may read/amend a queue entry's header but never control whether the
//! packet is sent.

use crate::queue::QueueEntry;

/// Optional observer attached to a [`crate::connection::Connection`].
///
/// All methods have no-op default bodies, so implementors only override the
/// hooks they care about.
pub trait Extension {
    /// Called immediately before a data packet is broadcast, after its
    /// header has been stamped with the current backpressure/delay but
    /// before it is handed to the radio. May amend the header.
    fn before_send(&mut self, entry: &mut QueueEntry) {
        let _ = entry;
    }

    /// Called immediately after a data packet has been handed to the radio.
    fn after_send(&mut self, entry: &QueueEntry) {
        let _ = entry;
    }

    /// Called after a forwarded data packet has been pushed into the local
    /// queue (non-sink receive path only).
    fn on_receive(&mut self, entry: &QueueEntry) {
        let _ = entry;
    }
}

/// An extension that observes nothing. The default when a connection is
/// opened without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExtension;

impl Extension for NoopExtension {}
