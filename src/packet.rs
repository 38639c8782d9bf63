//! Wire format: the header carried by data frames, and the tiny beacon
//! payload carried by beacon / beacon-request frames.
//!
//! Ack frames have no payload at all; their meaning is carried entirely by
//! [`FrameKind::Ack`] (the Rust stand-in for the original's
//! `PACKETBUF_ATTR_PACKET_TYPE` attribute).
//!
//! Endianness is little-endian throughout. The spec leaves this
//! unspecified beyond "implementations must agree with peers"; little-endian
//! is picked because it is the native byte order on the microcontroller
//! targets this protocol is meant for (see DESIGN.md).

use crate::address::Address;
use crate::error::BcpError;
use embassy_time::Duration;

/// Size in bytes of an encoded [`DataHeader`]: 2 (backpressure) + 2 (origin)
/// + 4 (delay, milliseconds).
pub const DATA_HEADER_LEN: usize = 8;

/// The header every data packet carries, immediately followed by payload
/// bytes on the wire.
///
/// `last_process_time` (spec §3) is deliberately *not* part of this type:
/// it is a local bookkeeping instant, stamped fresh by whichever node last
/// enqueued the packet, and is meaningless on the wire since clocks are not
/// synchronized across nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataHeader {
    /// Sender's queue length at transmission time.
    pub backpressure: u16,
    /// Address of the node that originally produced the payload.
    pub origin: Address,
    /// Accumulated in-network forwarding delay since origin.
    pub delay: Duration,
}

impl DataHeader {
    pub fn encode(&self) -> [u8; DATA_HEADER_LEN] {
        let mut out = [0u8; DATA_HEADER_LEN];
        out[0..2].copy_from_slice(&self.backpressure.to_le_bytes());
        out[2..4].copy_from_slice(&self.origin.to_bytes());
        out[4..8].copy_from_slice(&(self.delay.as_millis() as u32).to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, BcpError> {
        if bytes.len() < DATA_HEADER_LEN {
            return Err(BcpError::Malformed("data header truncated"));
        }
        let backpressure = u16::from_le_bytes([bytes[0], bytes[1]]);
        let origin = Address::from_bytes([bytes[2], bytes[3]]);
        let delay_ms = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        Ok(DataHeader {
            backpressure,
            origin,
            delay: Duration::from_millis(delay_ms as u64),
        })
    }
}

/// The payload carried by beacon and beacon-request frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeaconPayload {
    pub queuelog: u16,
}

impl BeaconPayload {
    pub const LEN: usize = 2;

    pub fn encode(&self) -> [u8; Self::LEN] {
        self.queuelog.to_le_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, BcpError> {
        if bytes.len() < Self::LEN {
            return Err(BcpError::Malformed("beacon payload truncated"));
        }
        Ok(BeaconPayload {
            queuelog: u16::from_le_bytes([bytes[0], bytes[1]]),
        })
    }
}

/// The discriminator the original implementation carries out-of-band as a
/// `packetbuf` attribute (`PACKETBUF_ATTR_PACKET_TYPE`). Here it travels
/// alongside a [`Frame`] rather than inside its byte payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Data,
    Beacon,
    BeaconRequest,
    Ack,
}

/// A complete outbound/inbound broadcast frame: a kind tag, the "explicit
/// receiver" address attribute, and encoded payload bytes.
///
/// Frames are always broadcast on the shared channel even when `kind ==
/// Data` and `receiver` names one specific neighbor — see spec §4.4: the
/// address attribute lets the intended neighbor take ownership while
/// overhearing neighbors harvest the piggybacked queue depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub receiver: Address,
    pub bytes: Vec<u8>,
}

impl Frame {
    pub fn beacon(queuelog: u16) -> Self {
        Frame {
            kind: FrameKind::Beacon,
            receiver: Address::BROADCAST,
            bytes: BeaconPayload { queuelog }.encode().to_vec(),
        }
    }

    pub fn beacon_request(queuelog: u16) -> Self {
        Frame {
            kind: FrameKind::BeaconRequest,
            receiver: Address::BROADCAST,
            bytes: BeaconPayload { queuelog }.encode().to_vec(),
        }
    }

    pub fn data(receiver: Address, header: &DataHeader, payload: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(DATA_HEADER_LEN + payload.len());
        bytes.extend_from_slice(&header.encode());
        bytes.extend_from_slice(payload);
        Frame {
            kind: FrameKind::Data,
            receiver,
            bytes,
        }
    }

    /// Ack frames carry no body; the unicast destination is passed
    /// separately to [`crate::radio::RadioStack::unicast_send`].
    pub fn ack() -> Self {
        Frame {
            kind: FrameKind::Ack,
            receiver: Address::BROADCAST,
            bytes: Vec::new(),
        }
    }

    /// Split a decoded [`FrameKind::Data`] frame into its header and
    /// payload bytes.
    pub fn decode_data(&self) -> Result<(DataHeader, &[u8]), BcpError> {
        let header = DataHeader::decode(&self.bytes)?;
        Ok((header, &self.bytes[DATA_HEADER_LEN..]))
    }

    pub fn decode_beacon(&self) -> Result<BeaconPayload, BcpError> {
        BeaconPayload::decode(&self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_header_round_trips() {
        let hdr = DataHeader {
            backpressure: 7,
            origin: Address::new(2, 0),
            delay: Duration::from_millis(12345),
        };
        let encoded = hdr.encode();
        let decoded = DataHeader::decode(&encoded).unwrap();
        assert_eq!(hdr, decoded);
    }

    #[test]
    fn beacon_payload_round_trips() {
        let b = BeaconPayload { queuelog: 42 };
        assert_eq!(BeaconPayload::decode(&b.encode()).unwrap(), b);
    }

    #[test]
    fn truncated_header_is_malformed() {
        assert!(DataHeader::decode(&[1, 2, 3]).is_err());
    }

    #[test]
    fn data_frame_carries_payload_after_header() {
        let hdr = DataHeader {
            backpressure: 1,
            origin: Address::new(1, 0),
            delay: Duration::from_millis(0),
        };
        let frame = Frame::data(Address::new(3, 0), &hdr, b"HI");
        let (decoded_hdr, payload) = frame.decode_data().unwrap();
        assert_eq!(decoded_hdr, hdr);
        assert_eq!(payload, b"HI");
    }
}
