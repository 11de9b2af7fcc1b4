//! Label-switching routers, hosts and the topology runner.
//!
//! A [`Router`] drains its inbound interface queues one frame per interface
//! per cycle, labels network packets at ingress, switches label frames by
//! label and pops the label at egress. [`Host`]s originate and terminate
//! packets. A [`Topology`] document wires routers and hosts together into a
//! [`Network`] that runs every node on its own thread.

pub mod config;
pub mod error;
pub mod heuristic;
pub mod host;
pub mod network;
pub mod router;
pub mod tables;
pub mod topology;

pub use config::{RouterConfig, StopCheck, DEFAULT_ENQUEUE_TIMEOUT, DEFAULT_IDLE_SLEEP};
pub use error::{HostError, NetworkError, Result, RouteMiss, RouterError};
pub use heuristic::{frame_priority, tally, HeuristicMode, LabelSource, PriorityTally};
pub use host::Host;
pub use lsrsim_link::StopSignal;
pub use network::{
    HostReport, LinkReport, Network, ReceivedPacket, RouterReport, SimulationReport, Traffic,
};
pub use router::{Router, RouterStats};
pub use tables::ForwardingTables;
pub use topology::{EngineSpec, Endpoint, HostSpec, LinkSpec, RouterSpec, Topology, TrafficSpec};
