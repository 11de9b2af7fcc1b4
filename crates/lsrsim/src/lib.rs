//! Multi-threaded label-switching network simulator.
//!
//! Hosts send packets into a network of routers that label them at ingress,
//! switch them by label and pop the label at egress. Every node runs on its
//! own thread and interfaces are the only shared state.
//!
//! # Crate Structure
//!
//! - [`link`]: interface queues, links and the stop signal
//! - [`frame`]: packet, label-frame and link-frame wire codecs
//! - [`router`]: forwarding engine, hosts, topology loading and the runner

/// Re-export interface and link types.
pub mod link {
    pub use lsrsim_link::*;
}

/// Re-export wire codec types.
pub mod frame {
    pub use lsrsim_frame::*;
}

/// Re-export router, host and topology types.
pub mod router {
    pub use lsrsim_router::*;
}
