//! Interface queues and the simulated link layer.
//!
//! This is the lowest layer of lsrsim. Every router and host owns a list of
//! [`Interface`]s, each a pair of bounded FIFO queues of encoded frames. The
//! [`LinkLayer`] moves frames from one interface's outbound queue to the peer
//! interface's inbound queue. Queues are the only state shared between threads.

pub mod error;
pub mod interface;
pub mod link;
pub mod stop;

pub use error::{LinkError, Result};
pub use interface::{Direction, Interface, InterfaceConfig, DEFAULT_CAPACITY_BPS};
pub use link::{Link, LinkLayer, TransferOutcome, TransferStats};
pub use stop::StopSignal;
