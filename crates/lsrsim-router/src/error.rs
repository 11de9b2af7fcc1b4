use std::fmt;

use lsrsim_frame::{Address, Label};

/// A forwarding-table lookup that found no entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMiss {
    Encap {
        interface: usize,
        destination: Address,
    },
    Forward {
        label: Label,
    },
    Decap {
        interface: usize,
        label: Label,
    },
}

impl fmt::Display for RouteMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteMiss::Encap {
                interface,
                destination,
            } => write!(
                f,
                "no encapsulation entry for destination {destination} on interface {interface}"
            ),
            RouteMiss::Forward { label } => write!(f, "no forwarding entry for label {label}"),
            RouteMiss::Decap { interface, label } => write!(
                f,
                "no decapsulation entry for label {label} on interface {interface}"
            ),
        }
    }
}

/// Errors that can occur in router construction or a processing cycle.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// A queued frame could not be decoded. Aborts the current cycle.
    #[error("frame error: {0}")]
    Frame(#[from] lsrsim_frame::FrameError),

    /// A forwarding table has no entry for the frame. Aborts the current cycle.
    #[error("no route: {0}")]
    NoRoute(RouteMiss),

    /// A table references an interface the router does not have.
    #[error("{table} table references interface {interface}, router has {count}")]
    InterfaceOutOfRange {
        table: &'static str,
        interface: usize,
        count: usize,
    },

    /// A router needs at least one interface.
    #[error("router {0} has no interfaces")]
    NoInterfaces(String),
}

/// Errors that can occur in host operations.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] lsrsim_frame::FrameError),

    /// Queue-level error.
    #[error("link error: {0}")]
    Link(#[from] lsrsim_link::LinkError),

    /// Hosts only accept network frames.
    #[error("host {host} received a {kind} frame")]
    UnexpectedKind {
        host: Address,
        kind: lsrsim_frame::FrameKind,
    },
}

/// Errors that can occur while loading, building or running a topology.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Router construction failed.
    #[error("router {name}: {source}")]
    Router { name: String, source: RouterError },

    /// Host operation failed.
    #[error("host {name}: {source}")]
    Host { name: String, source: HostError },

    /// The topology document is not valid JSON or does not match the schema.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading the topology file failed.
    #[error("topology I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Two nodes share a name.
    #[error("duplicate node name {0}")]
    DuplicateNode(String),

    /// A link or traffic entry names a node that does not exist.
    #[error("unknown node {0}")]
    UnknownNode(String),

    /// Traffic must originate at a host.
    #[error("node {0} is not a host")]
    NotAHost(String),

    /// A link names an interface past the node's interface list.
    #[error("node {node} has no interface {interface}")]
    UnknownInterface { node: String, interface: usize },

    /// A simulation thread panicked.
    #[error("simulation thread {0} panicked")]
    ThreadPanicked(String),
}

pub type Result<T> = std::result::Result<T, RouterError>;
