use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};
use crate::packet::{decode_packet, Packet, Priority};

/// Width of the zero-padded label prefix.
pub const LABEL_WIDTH: usize = 2;

/// Highest label representable in [`LABEL_WIDTH`] digits.
pub const MAX_LABEL: u8 = 99;

/// A switching label (0-99).
///
/// The 2-digit wire field bounds the label space; values above 99 are rejected
/// instead of being truncated.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct Label(u8);

impl Label {
    pub fn new(value: u32) -> Result<Self> {
        if value > u32::from(MAX_LABEL) {
            return Err(FrameError::LabelOutOfRange(value));
        }
        Ok(Self(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<Priority> for Label {
    fn from(priority: Priority) -> Self {
        Self(priority.value())
    }
}

impl TryFrom<u32> for Label {
    type Error = FrameError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Label> for u32 {
    fn from(label: Label) -> Self {
        u32::from(label.0)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// A label-switched frame: a label plus the encapsulated packet bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFrame {
    pub label: Label,
    /// Encoded inner packet, carried verbatim.
    pub packet: Bytes,
}

impl LabelFrame {
    pub fn new(label: Label, packet: impl Into<Bytes>) -> Self {
        Self {
            label,
            packet: packet.into(),
        }
    }

    /// Encapsulate an already-decoded packet.
    pub fn encapsulate(label: Label, packet: &Packet) -> Self {
        Self::new(label, packet.to_bytes())
    }

    /// Decode the inner packet with the packet codec.
    pub fn inner_packet(&self) -> Result<Packet> {
        decode_packet(&self.packet)
    }

    pub fn wire_size(&self) -> usize {
        LABEL_WIDTH + self.packet.len()
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        encode_label_frame(self.label, &self.packet, &mut buf);
        buf.freeze()
    }
}

/// Encode a label frame.
///
/// Wire format:
/// ```text
/// ┌──────────────────┬───────────────────────┐
/// │ Label            │ Packet bytes          │
/// │ (2 digits, 0-pad)│ (verbatim)            │
/// └──────────────────┴───────────────────────┘
/// ```
pub fn encode_label_frame(label: Label, packet: &[u8], dst: &mut BytesMut) {
    dst.reserve(LABEL_WIDTH + packet.len());
    dst.put_u8(b'0' + label.0 / 10);
    dst.put_u8(b'0' + label.0 % 10);
    dst.put_slice(packet);
}

/// Decode a label frame.
///
/// The remainder after the label is returned untouched; it is not run through
/// the packet codec. Use [`LabelFrame::inner_packet`] for that.
pub fn decode_label_frame(src: &[u8]) -> Result<LabelFrame> {
    if src.len() < LABEL_WIDTH {
        return Err(FrameError::Truncated {
            what: "label frame",
            len: src.len(),
            min: LABEL_WIDTH,
        });
    }

    let prefix = &src[..LABEL_WIDTH];
    if !prefix.iter().all(u8::is_ascii_digit) {
        return Err(FrameError::InvalidLabel(
            String::from_utf8_lossy(prefix).into_owned(),
        ));
    }
    let label = Label((prefix[0] - b'0') * 10 + (prefix[1] - b'0'));

    Ok(LabelFrame {
        label,
        packet: Bytes::copy_from_slice(&src[LABEL_WIDTH..]),
    })
}
