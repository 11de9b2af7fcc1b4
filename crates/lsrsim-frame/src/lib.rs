//! Fixed-field wire codecs for label-switching simulation.
//!
//! Three textual layers, innermost first:
//! - [`packet`]: 1-digit priority, 5-character zero-padded destination, payload
//! - [`label`]: 2-digit zero-padded label, then the encoded packet verbatim
//! - [`codec`]: link frame, a 1-byte `N`/`M` tag in front of either of the above
//!
//! Decoders never slice short input: undersized or malformed bytes are a
//! [`FrameError`].

pub mod codec;
pub mod error;
pub mod label;
pub mod packet;

pub use codec::{
    decode_link_frame, encode_link_frame, FrameKind, LinkFrame, LINK_HEADER_SIZE, TAG_MPLS,
    TAG_NETWORK,
};
pub use error::{FrameError, Result};
pub use label::{decode_label_frame, encode_label_frame, Label, LabelFrame, LABEL_WIDTH, MAX_LABEL};
pub use packet::{
    decode_packet, encode_packet, Address, Packet, Priority, ADDRESS_WIDTH, MAX_PRIORITY,
    PACKET_HEADER_SIZE,
};
