//! JSON topology documents.
//!
//! A topology names hosts and routers, wires their interfaces together with
//! full-duplex links, and lists the traffic hosts send once the simulation
//! starts:
//!
//! ```json
//! {
//!   "hosts": [{ "name": "H1", "address": "1" }, { "name": "H2", "address": "2" }],
//!   "routers": [{
//!     "name": "RA",
//!     "interfaces": [500, 500],
//!     "max_queue_size": 16,
//!     "tables": {
//!       "encap": { "0": { "2": 10 } },
//!       "decap": { "0": { "10": 1 } }
//!     }
//!   }],
//!   "links": [
//!     { "a": { "node": "H1" }, "b": { "node": "RA", "interface": 0 } },
//!     { "a": { "node": "RA", "interface": 1 }, "b": { "node": "H2" } }
//!   ],
//!   "traffic": [{ "from": "H1", "destination": "2", "payload": "hello", "priority": 0 }]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use lsrsim_frame::{Address, Priority};
use lsrsim_link::{Interface, LinkLayer};
use serde::{Deserialize, Serialize};

use crate::config::{RouterConfig, StopCheck, DEFAULT_ENQUEUE_TIMEOUT};
use crate::error::NetworkError;
use crate::heuristic::HeuristicMode;
use crate::host::Host;
use crate::network::{Network, Traffic};
use crate::router::Router;
use crate::tables::ForwardingTables;

/// Top-level topology document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Topology {
    #[serde(default)]
    pub hosts: Vec<HostSpec>,
    #[serde(default)]
    pub routers: Vec<RouterSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    #[serde(default)]
    pub traffic: Vec<TrafficSpec>,
    #[serde(default)]
    pub engine: EngineSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostSpec {
    pub name: String,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterSpec {
    pub name: String,
    /// Link rate of each interface in bps.
    pub interfaces: Vec<u64>,
    /// Queue depth per interface queue. 0 means unbounded.
    #[serde(default)]
    pub max_queue_size: usize,
    #[serde(default)]
    pub tables: ForwardingTables,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Endpoint {
    pub node: String,
    /// Interface index on the node. Hosts only have interface 0.
    #[serde(default)]
    pub interface: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkSpec {
    pub a: Endpoint,
    pub b: Endpoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrafficSpec {
    pub from: String,
    pub destination: Address,
    pub payload: String,
    #[serde(default)]
    pub priority: Priority,
}

/// Engine options shared by every router in the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EngineSpec {
    pub enqueue_timeout_ms: u64,
    pub heuristic: HeuristicMode,
    pub stop_check: StopCheck,
}

impl Default for EngineSpec {
    fn default() -> Self {
        Self {
            enqueue_timeout_ms: DEFAULT_ENQUEUE_TIMEOUT.as_millis() as u64,
            heuristic: HeuristicMode::default(),
            stop_check: StopCheck::default(),
        }
    }
}

impl EngineSpec {
    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            enqueue_timeout: Duration::from_millis(self.enqueue_timeout_ms),
            heuristic: self.heuristic,
            stop_check: self.stop_check,
            ..RouterConfig::default()
        }
    }
}

enum NodeRef {
    Host(usize),
    Router(usize),
}

impl Topology {
    pub fn from_json(json: &str) -> Result<Self, NetworkError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, NetworkError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Validate every reference and construct the nodes, links and traffic.
    pub fn build(&self) -> Result<Network, NetworkError> {
        let mut nodes: HashMap<&str, NodeRef> = HashMap::new();

        let hosts: Vec<Host> = self
            .hosts
            .iter()
            .map(|spec| Host::new(spec.address.clone()))
            .collect();
        for (index, spec) in self.hosts.iter().enumerate() {
            if nodes.insert(&spec.name, NodeRef::Host(index)).is_some() {
                return Err(NetworkError::DuplicateNode(spec.name.clone()));
            }
        }

        let config = self.engine.router_config();
        let mut routers = Vec::with_capacity(self.routers.len());
        for (index, spec) in self.routers.iter().enumerate() {
            if nodes.insert(&spec.name, NodeRef::Router(index)).is_some() {
                return Err(NetworkError::DuplicateNode(spec.name.clone()));
            }
            let router = Router::new(
                spec.name.clone(),
                &spec.interfaces,
                spec.tables.clone(),
                spec.max_queue_size,
            )
            .map_err(|source| NetworkError::Router {
                name: spec.name.clone(),
                source,
            })?;
            routers.push(router.with_config(config));
        }

        let resolve = |endpoint: &Endpoint| -> Result<Arc<Interface>, NetworkError> {
            let node = nodes
                .get(endpoint.node.as_str())
                .ok_or_else(|| NetworkError::UnknownNode(endpoint.node.clone()))?;
            let interface = match node {
                NodeRef::Host(i) if endpoint.interface == 0 => Some(hosts[*i].interface()),
                NodeRef::Host(_) => None,
                NodeRef::Router(i) => routers[*i].interface(endpoint.interface),
            };
            interface
                .map(Arc::clone)
                .ok_or_else(|| NetworkError::UnknownInterface {
                    node: endpoint.node.clone(),
                    interface: endpoint.interface,
                })
        };

        let mut links = LinkLayer::new();
        for spec in &self.links {
            let a = resolve(&spec.a)?;
            let b = resolve(&spec.b)?;
            let name = format!(
                "{}:{}-{}:{}",
                spec.a.node, spec.a.interface, spec.b.node, spec.b.interface
            );
            links.add_duplex(&name, &a, &b);
        }

        let mut traffic = Vec::with_capacity(self.traffic.len());
        for spec in &self.traffic {
            match nodes.get(spec.from.as_str()) {
                Some(NodeRef::Host(index)) => traffic.push(Traffic {
                    host: *index,
                    destination: spec.destination.clone(),
                    payload: spec.payload.clone().into(),
                    priority: spec.priority,
                }),
                Some(NodeRef::Router(_)) => return Err(NetworkError::NotAHost(spec.from.clone())),
                None => return Err(NetworkError::UnknownNode(spec.from.clone())),
            }
        }

        let hosts = self
            .hosts
            .iter()
            .map(|spec| spec.name.clone())
            .zip(hosts)
            .collect();
        Ok(Network::new(hosts, routers, links, traffic))
    }
}
