use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::label::{decode_label_frame, LabelFrame};
use crate::packet::{decode_packet, Packet};

/// Link header: a single tag byte.
pub const LINK_HEADER_SIZE: usize = 1;

/// Tag byte for frames carrying a plain network packet.
pub const TAG_NETWORK: u8 = b'N';

/// Tag byte for frames carrying a label frame.
pub const TAG_MPLS: u8 = b'M';

/// What a link frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Unlabeled network packet.
    Network,
    /// Label-switched frame.
    Mpls,
}

impl FrameKind {
    pub fn tag(self) -> u8 {
        match self {
            FrameKind::Network => TAG_NETWORK,
            FrameKind::Mpls => TAG_MPLS,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            TAG_NETWORK => Ok(FrameKind::Network),
            TAG_MPLS => Ok(FrameKind::Mpls),
            other => Err(FrameError::UnknownKind(other)),
        }
    }

    /// Human-readable name, as used in logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            FrameKind::Network => "Network",
            FrameKind::Mpls => "MPLS",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A tagged frame as it sits on an interface queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFrame {
    pub kind: FrameKind,
    pub data: Bytes,
}

impl LinkFrame {
    pub fn new(kind: FrameKind, data: impl Into<Bytes>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    /// Wrap a network packet.
    pub fn network(packet: &Packet) -> Self {
        Self::new(FrameKind::Network, packet.to_bytes())
    }

    /// Wrap a label frame.
    pub fn mpls(frame: &LabelFrame) -> Self {
        Self::new(FrameKind::Mpls, frame.to_bytes())
    }

    /// The total wire size of this frame (tag + data).
    pub fn wire_size(&self) -> usize {
        LINK_HEADER_SIZE + self.data.len()
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        encode_link_frame(self.kind, &self.data, &mut buf);
        buf.freeze()
    }

    /// Decode the data as a network packet.
    pub fn packet(&self) -> Result<Packet> {
        decode_packet(&self.data)
    }

    /// Decode the data as a label frame.
    pub fn label_frame(&self) -> Result<LabelFrame> {
        decode_label_frame(&self.data)
    }
}

/// Encode a link frame.
///
/// Wire format:
/// ```text
/// ┌─────────────┬──────────────────────────────┐
/// │ Tag (1B)    │ Data                         │
/// │ 'N' or 'M'  │ packet or label frame bytes  │
/// └─────────────┴──────────────────────────────┘
/// ```
pub fn encode_link_frame(kind: FrameKind, data: &[u8], dst: &mut BytesMut) {
    dst.reserve(LINK_HEADER_SIZE + data.len());
    dst.put_u8(kind.tag());
    dst.put_slice(data);
}

/// Decode a link frame.
///
/// A tag other than `N` or `M` is a protocol violation and is reported as
/// [`FrameError::UnknownKind`].
pub fn decode_link_frame(src: &Bytes) -> Result<LinkFrame> {
    let Some(&tag) = src.first() else {
        return Err(FrameError::Truncated {
            what: "link frame",
            len: 0,
            min: LINK_HEADER_SIZE,
        });
    };

    let kind = FrameKind::from_tag(tag)?;
    Ok(LinkFrame {
        kind,
        data: src.slice(LINK_HEADER_SIZE..),
    })
}
