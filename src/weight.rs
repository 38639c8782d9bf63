//! Pluggable backpressure weight estimator (spec §4.3).
//!
//! The original expresses this as an extension point: a fixed set of
//! functions (`weight_estimator_init/record_init/getWeight/sent`) plus a
//! routing-table-item struct (`routingtable_item_bcp`) that extends the
//! base record with estimator-private fields. Here that becomes a trait
//! with an associated `EntryState` type, per the design note in spec §9.

use crate::queue::QueueEntry;
use crate::routing::RoutingEntry;

/// Computes the scalar weight of a neighbor and owns any per-neighbor
/// state it needs beyond `backpressure`.
///
/// Higher weight wins (see [`crate::routing::RoutingTable::select_best`]).
pub trait WeightEstimator {
    /// Per-routing-table-entry state owned by this estimator.
    type EntryState: Default;

    /// One-time pool/state setup for this estimator, called once when its
    /// owning [`crate::connection::Connection`] is opened. Estimators with
    /// no setup of their own (like [`DefaultWeightEstimator`]) leave this
    /// at its no-op default.
    fn init(&mut self) {}

    /// Called once when the routing table allocates a new entry for a
    /// newly-heard neighbor.
    fn record_init(&mut self, state: &mut Self::EntryState) {
        let _ = state;
    }

    /// Deterministic function of the local queue length and the entry's
    /// observed state. Returned as a signed integer so a neighbor can be
    /// preferred or penalized relative to the local node.
    fn weight(&self, local_queue_length: u16, entry: &RoutingEntry<Self::EntryState>) -> i32;

    /// Notification that a packet addressed to `entry`'s neighbor was just
    /// acknowledged after `attempts` transmissions.
    fn sent(&mut self, entry: &mut RoutingEntry<Self::EntryState>, packet: &QueueEntry, attempts: u16) {
        let _ = (entry, packet, attempts);
    }
}

/// The baseline estimator: `weight = local_queue_length − neighbor.backpressure`.
///
/// A neighbor with a shallower queue than the local node is preferred,
/// yielding gradient descent toward the sink (expected to have the
/// shallowest queue in the network). This keeps only the differential-queue
/// term; the richer link-loss/Lyapunov metric the original leaves room for
/// (`LINK_LOSS_ALPHA`, `LINK_LOSS_V`, `LINK_EST_ALPHA`) is not implemented —
/// see DESIGN.md.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultWeightEstimator;

impl WeightEstimator for DefaultWeightEstimator {
    type EntryState = ();

    fn weight(&self, local_queue_length: u16, entry: &RoutingEntry<Self::EntryState>) -> i32 {
        local_queue_length as i32 - entry.backpressure as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;

    fn entry(backpressure: u16) -> RoutingEntry<()> {
        RoutingEntry {
            neighbor: Address::new(1, 0),
            backpressure,
            state: (),
        }
    }

    #[test]
    fn weight_is_local_minus_neighbor_backpressure() {
        let est = DefaultWeightEstimator;
        assert_eq!(est.weight(7, &entry(5)), 2);
        assert_eq!(est.weight(7, &entry(3)), 4);
    }

    #[test]
    fn shallower_neighbor_yields_higher_weight() {
        let est = DefaultWeightEstimator;
        let shallow = entry(3);
        let deep = entry(5);
        assert!(est.weight(7, &shallow) > est.weight(7, &deep));
    }
}
