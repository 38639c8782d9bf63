//! Backpressure Collection Protocol (BCP) engine.
//!
//! A per-node link-layer collection protocol for multi-hop, low-power
//! wireless sensor networks: every node picks its best next hop by
//! comparing one-hop neighbors' advertised queue depth against its own,
//! so traffic drains toward whichever node (usually the sink) has the
//! shallowest queue, without maintaining a persistent routing tree.
//!
//! This crate is the protocol engine only. It owns a packet queue, a
//! one-hop routing table, protocol timers, and the beacon/data/ack state
//! machine (see [`connection::Connection`]); it does not own a radio, an
//! event loop, or a clock source. An embedding host runtime supplies a
//! [`radio::RadioStack`] and calls `Connection`'s handler methods when its
//! own timers and radio events fire.

pub mod address;
pub mod config;
pub mod connection;
pub mod error;
pub mod extension;
pub mod packet;
pub mod queue;
pub mod radio;
pub mod routing;
pub mod timer;
pub mod weight;

pub use address::Address;
pub use config::TimingConfig;
pub use connection::{Connection, ConnectionCallbacks, ConnectionStats, NoopCallbacks};
pub use error::BcpError;
pub use extension::{Extension, NoopExtension};
pub use packet::{BeaconPayload, DataHeader, Frame, FrameKind};
pub use queue::{PacketQueue, QueueEntry, QueueId};
pub use radio::{RadioStack, SendStatus};
pub use routing::{RoutingEntry, RoutingTable};
pub use weight::{DefaultWeightEstimator, WeightEstimator};
