/// Errors that can occur during packet, label or link frame encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The input is shorter than the fixed header of the format being decoded.
    #[error("{what} truncated ({len} bytes, need at least {min})")]
    Truncated {
        what: &'static str,
        len: usize,
        min: usize,
    },

    /// Priority does not fit the single-digit priority field.
    #[error("priority {0} out of range (max 9)")]
    PriorityOutOfRange(u32),

    /// The priority byte is not an ASCII digit.
    #[error("invalid priority byte 0x{0:02x}")]
    InvalidPriority(u8),

    /// Destination does not fit the fixed-width destination field.
    #[error("destination {address:?} longer than {max} characters")]
    AddressTooLong { address: String, max: usize },

    /// Destination contains a byte outside `[0-9A-Za-z]`.
    #[error("destination {0:?} contains characters outside [0-9A-Za-z]")]
    InvalidAddress(String),

    /// Label does not fit the 2-digit label field.
    #[error("label {0} out of range (max 99)")]
    LabelOutOfRange(u32),

    /// The label prefix is not two ASCII digits.
    #[error("invalid label prefix {0:?}")]
    InvalidLabel(String),

    /// The link frame carries a tag other than `N` or `M`.
    #[error("unknown link frame tag 0x{0:02x}")]
    UnknownKind(u8),
}

pub type Result<T> = std::result::Result<T, FrameError>;
