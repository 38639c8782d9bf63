//! One-hop routing table (spec §4.2).
//!
//! Entries are created lazily on first hearing from a neighbor and never
//! removed except by an explicit [`RoutingTable::clear`] (fired when a
//! beacon-request is emitted — spec §4.4).

use crate::address::Address;
use crate::error::BcpError;
use crate::weight::WeightEstimator;

/// A single neighbor record: last-heard queue depth plus whatever
/// per-neighbor state the active [`WeightEstimator`] attaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingEntry<S> {
    pub neighbor: Address,
    pub backpressure: u16,
    pub state: S,
}

/// Bounded one-hop neighbor set, capacity `CAP` (defaults to
/// [`crate::config::MAX_ROUTING_TABLE_SIZE`]).
///
/// Invariant: at most one entry per neighbor address.
pub struct RoutingTable<S, const CAP: usize = { crate::config::MAX_ROUTING_TABLE_SIZE }> {
    entries: Vec<RoutingEntry<S>>,
}

impl<S, const CAP: usize> Default for RoutingTable<S, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, const CAP: usize> RoutingTable<S, CAP> {
    pub fn new() -> Self {
        RoutingTable {
            entries: Vec::new(),
        }
    }

    pub fn find(&self, addr: Address) -> Option<&RoutingEntry<S>> {
        self.entries.iter().find(|e| e.neighbor == addr)
    }

    pub fn find_mut(&mut self, addr: Address) -> Option<&mut RoutingEntry<S>> {
        self.entries.iter_mut().find(|e| e.neighbor == addr)
    }

    /// Upsert a neighbor's queuelog. Allocates a new entry (via `W::record_init`)
    /// on first hearing; on repeat hearing only `backpressure` is overwritten.
    /// Fails with [`BcpError::TableFull`] if the pool has no room for a new
    /// neighbor — the update is then silently lost (spec §7).
    pub fn update_queuelog<W: WeightEstimator<EntryState = S>>(
        &mut self,
        estimator: &mut W,
        addr: Address,
        queuelog: u16,
    ) -> Result<(), BcpError> {
        if let Some(entry) = self.find_mut(addr) {
            entry.backpressure = queuelog;
            return Ok(());
        }
        if self.entries.len() >= CAP {
            return Err(BcpError::TableFull);
        }
        let mut state = S::default();
        estimator.record_init(&mut state);
        self.entries.push(RoutingEntry {
            neighbor: addr,
            backpressure: queuelog,
            state,
        });
        Ok(())
    }

    /// The neighbor with the maximum weight according to `estimator`, ties
    /// broken in favor of the later-scanned entry (`<=` comparison — this
    /// mirrors the original's scan order and is preserved as observed
    /// behavior, not "fixed" to first-wins).
    pub fn select_best<W: WeightEstimator<EntryState = S>>(
        &self,
        estimator: &W,
        local_queue_length: u16,
    ) -> Option<Address> {
        let mut best: Option<(Address, i32)> = None;
        for entry in &self.entries {
            let w = estimator.weight(local_queue_length, entry);
            match best {
                Some((_, best_w)) if best_w > w => {}
                _ => best = Some((entry.neighbor, w)),
            }
        }
        best.map(|(addr, _)| addr)
    }

    pub fn length(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empties the table.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<S> Default for RoutingEntry<S>
where
    S: Default,
{
    fn default() -> Self {
        RoutingEntry {
            neighbor: Address::BROADCAST,
            backpressure: 0,
            state: S::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weight::DefaultWeightEstimator;

    type Table = RoutingTable<(), 4>;

    #[test]
    fn update_queuelog_creates_entry_lazily() {
        let mut t: Table = RoutingTable::new();
        let mut est = DefaultWeightEstimator;
        t.update_queuelog(&mut est, Address::new(2, 0), 5).unwrap();
        assert_eq!(t.find(Address::new(2, 0)).unwrap().backpressure, 5);
        assert_eq!(t.length(), 1);
    }

    #[test]
    fn repeat_hearing_overwrites_only_backpressure() {
        let mut t: Table = RoutingTable::new();
        let mut est = DefaultWeightEstimator;
        t.update_queuelog(&mut est, Address::new(2, 0), 5).unwrap();
        t.update_queuelog(&mut est, Address::new(2, 0), 9).unwrap();
        assert_eq!(t.length(), 1);
        assert_eq!(t.find(Address::new(2, 0)).unwrap().backpressure, 9);
    }

    #[test]
    fn at_most_one_entry_per_neighbor() {
        let mut t: Table = RoutingTable::new();
        let mut est = DefaultWeightEstimator;
        for q in 0..10 {
            t.update_queuelog(&mut est, Address::new(2, 0), q).unwrap();
        }
        assert_eq!(t.length(), 1);
    }

    #[test]
    fn table_full_drops_new_neighbor_update() {
        let mut t: Table = RoutingTable::new();
        let mut est = DefaultWeightEstimator;
        for i in 0..4 {
            t.update_queuelog(&mut est, Address::new(i, 0), 1).unwrap();
        }
        let err = t.update_queuelog(&mut est, Address::new(9, 0), 1).unwrap_err();
        assert_eq!(err, BcpError::TableFull);
        assert_eq!(t.length(), 4);
    }

    #[test]
    fn select_best_on_empty_table_is_none() {
        let t: Table = RoutingTable::new();
        let est = DefaultWeightEstimator;
        assert_eq!(t.select_best(&est, 7), None);
    }

    #[test]
    fn select_best_prefers_shallower_neighbor() {
        let mut t: Table = RoutingTable::new();
        let mut est = DefaultWeightEstimator;
        t.update_queuelog(&mut est, Address::new(2, 0), 5).unwrap();
        t.update_queuelog(&mut est, Address::new(3, 0), 3).unwrap();
        // local queue depth 7: weights are 2 and 4 respectively.
        assert_eq!(t.select_best(&est, 7), Some(Address::new(3, 0)));
    }

    #[test]
    fn select_best_breaks_ties_toward_later_entry() {
        let mut t: Table = RoutingTable::new();
        let mut est = DefaultWeightEstimator;
        t.update_queuelog(&mut est, Address::new(2, 0), 5).unwrap();
        t.update_queuelog(&mut est, Address::new(3, 0), 5).unwrap();
        assert_eq!(t.select_best(&est, 7), Some(Address::new(3, 0)));
    }

    #[test]
    fn two_clears_are_equivalent_to_one() {
        let mut t: Table = RoutingTable::new();
        let mut est = DefaultWeightEstimator;
        t.update_queuelog(&mut est, Address::new(2, 0), 5).unwrap();
        t.clear();
        t.clear();
        assert_eq!(t.length(), 0);
    }
}
