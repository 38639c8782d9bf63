//! Error types for the BCP engine.
//!
//! None of these are fatal to the protocol — the engine is designed to
//! degrade by dropping or retransmitting (spec §7) — but internal
//! operations still need a typed way to report "this did not happen."

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BcpError {
    /// The packet queue is at `MAX_PACKET_QUEUE_SIZE`; the push was rejected.
    #[error("packet queue is full")]
    QueueFull,

    /// The routing table is at `MAX_ROUTING_TABLE_SIZE` and the neighbor is
    /// unknown; the queuelog update was dropped.
    #[error("routing table is full")]
    TableFull,

    /// `send` was called with a payload larger than `MAX_USER_PACKET_SIZE`.
    #[error("payload of {len} bytes exceeds maximum of {max} bytes")]
    OversizePayload { len: usize, max: usize },

    /// A send was attempted with no known neighbor in the routing table.
    #[error("no neighbor known to send to")]
    NoNeighbor,

    /// A received frame could not be decoded.
    #[error("malformed frame: {0}")]
    Malformed(&'static str),

    /// Timing configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}
