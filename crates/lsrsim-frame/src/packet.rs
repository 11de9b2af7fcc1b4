use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};

/// Width of the zero-padded destination field.
pub const ADDRESS_WIDTH: usize = 5;

/// Packet header: priority (1) + destination (5) = 6 bytes.
pub const PACKET_HEADER_SIZE: usize = 1 + ADDRESS_WIDTH;

/// Highest priority that fits the single-digit priority field.
pub const MAX_PRIORITY: u8 = 9;

/// Destination address of a packet.
///
/// Addresses are normalized on construction: leading zeros are stripped and an
/// all-zero address becomes `"0"`. Because the wire format strips the zero padding
/// on decode, only normalized addresses survive a round-trip unchanged, so
/// `Address::new("00042") == Address::new("42")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and normalize an address. Accepts `[0-9A-Za-z]`, at most 5 significant characters.
    pub fn new(raw: &str) -> Result<Self> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(FrameError::InvalidAddress(raw.to_string()));
        }

        let trimmed = raw.trim_start_matches('0');
        let normalized = if trimmed.is_empty() { "0" } else { trimmed };
        if normalized.len() > ADDRESS_WIDTH {
            return Err(FrameError::AddressTooLong {
                address: raw.to_string(),
                max: ADDRESS_WIDTH,
            });
        }

        Ok(Self(normalized.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn put_padded(&self, dst: &mut BytesMut) {
        for _ in self.0.len()..ADDRESS_WIDTH {
            dst.put_u8(b'0');
        }
        dst.put_slice(self.0.as_bytes());
    }
}

impl From<u16> for Address {
    fn from(value: u16) -> Self {
        // u16::MAX has five digits, so every value fits the field.
        Self(value.to_string())
    }
}

impl FromStr for Address {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Address {
    type Error = FrameError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Single-digit packet priority (0-9).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub fn new(value: u8) -> Result<Self> {
        if value > MAX_PRIORITY {
            return Err(FrameError::PriorityOutOfRange(u32::from(value)));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Parse an ASCII digit as it appears on the wire.
    pub fn from_ascii(byte: u8) -> Result<Self> {
        if byte.is_ascii_digit() {
            Ok(Self(byte - b'0'))
        } else {
            Err(FrameError::InvalidPriority(byte))
        }
    }

    pub fn to_ascii(self) -> u8 {
        b'0' + self.0
    }
}

impl TryFrom<u8> for Priority {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(value: Priority) -> Self {
        value.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An unlabeled network-layer data packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub destination: Address,
    pub payload: Bytes,
    pub priority: Priority,
}

impl Packet {
    pub fn new(destination: Address, payload: impl Into<Bytes>, priority: Priority) -> Self {
        Self {
            destination,
            payload: payload.into(),
            priority,
        }
    }

    /// The total wire size of this packet (header + payload).
    pub fn wire_size(&self) -> usize {
        PACKET_HEADER_SIZE + self.payload.len()
    }

    /// Encode into a freshly allocated buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        encode_packet(self, &mut buf);
        buf.freeze()
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:0>width$}{}",
            self.priority,
            self.destination,
            String::from_utf8_lossy(&self.payload),
            width = ADDRESS_WIDTH
        )
    }
}

/// Encode a packet into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬─────────────────────┬─────────────┐
/// │ Priority │ Destination         │ Payload     │
/// │ (1 digit)│ (5 chars, 0-padded) │ (remainder) │
/// └──────────┴─────────────────────┴─────────────┘
/// ```
///
/// Field widths are enforced by [`Priority`] and [`Address`], so encoding
/// itself cannot fail.
pub fn encode_packet(packet: &Packet, dst: &mut BytesMut) {
    dst.reserve(packet.wire_size());
    dst.put_u8(packet.priority.to_ascii());
    packet.destination.put_padded(dst);
    dst.put_slice(&packet.payload);
}

/// Decode a packet from its wire format.
///
/// Input shorter than [`PACKET_HEADER_SIZE`] is rejected rather than sliced short.
pub fn decode_packet(src: &[u8]) -> Result<Packet> {
    if src.len() < PACKET_HEADER_SIZE {
        return Err(FrameError::Truncated {
            what: "packet",
            len: src.len(),
            min: PACKET_HEADER_SIZE,
        });
    }

    let priority = Priority::from_ascii(src[0])?;
    let field = &src[1..PACKET_HEADER_SIZE];
    let destination = std::str::from_utf8(field)
        .map_err(|_| FrameError::InvalidAddress(String::from_utf8_lossy(field).into_owned()))
        .and_then(Address::new)?;
    let payload = Bytes::copy_from_slice(&src[PACKET_HEADER_SIZE..]);

    Ok(Packet {
        destination,
        payload,
        priority,
    })
}
