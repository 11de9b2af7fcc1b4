use crate::interface::Direction;

/// Errors that can occur in interface queue operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// The queue is at its configured depth and the frame was not accepted.
    #[error("{direction} queue full ({max} frames)")]
    QueueFull { direction: Direction, max: usize },
}

pub type Result<T> = std::result::Result<T, LinkError>;
