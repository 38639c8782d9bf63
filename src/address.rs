//! Node addressing primitives.
//!
//! BCP addresses mirror the two-byte Rime addresses (`rimeaddr_t`) the
//! original implementation ran on: a short, cheap-to-compare identifier
//! rather than anything IP-shaped.

use core::fmt;
use serde::{Deserialize, Serialize};

/// A one-hop-network node address.
///
/// `Address::BROADCAST` is the all-zero sentinel used as the "explicit
/// receiver" address on beacon and beacon-request frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 2]);

impl Address {
    /// The all-zero broadcast sentinel.
    pub const BROADCAST: Address = Address([0, 0]);

    pub const fn new(a: u8, b: u8) -> Self {
        Address([a, b])
    }

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    pub fn to_bytes(self) -> [u8; 2] {
        self.0
    }

    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        Address(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_is_all_zero() {
        assert!(Address::BROADCAST.is_broadcast());
        assert!(!Address::new(1, 0).is_broadcast());
    }

    #[test]
    fn round_trips_through_bytes() {
        let a = Address::new(3, 7);
        assert_eq!(Address::from_bytes(a.to_bytes()), a);
    }

    #[test]
    fn display_matches_dotted_form() {
        assert_eq!(Address::new(1, 0).to_string(), "1.0");
    }
}
