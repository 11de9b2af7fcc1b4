//! Threaded simulation of a whole topology.
//!
//! Each router, each host and the link layer run on their own named thread
//! and share nothing but interface queues and a [`StopSignal`].

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bytes::Bytes;
use lsrsim_frame::{Address, Packet, Priority};
use lsrsim_link::{LinkLayer, StopSignal, TransferStats};
use serde::Serialize;

use crate::error::NetworkError;
use crate::host::Host;
use crate::router::{Router, RouterStats};

/// How often the supervising thread checks for an external stop.
const SUPERVISE_INTERVAL: Duration = Duration::from_millis(5);

/// A packet a host sends when the simulation starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traffic {
    /// Index into [`Network::hosts`].
    pub host: usize,
    pub destination: Address,
    pub payload: Bytes,
    pub priority: Priority,
}

/// A packet as seen by the receiving host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivedPacket {
    pub destination: Address,
    pub priority: Priority,
    pub payload: String,
}

impl From<&Packet> for ReceivedPacket {
    fn from(packet: &Packet) -> Self {
        Self {
            destination: packet.destination.clone(),
            priority: packet.priority,
            payload: String::from_utf8_lossy(&packet.payload).into_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostReport {
    pub name: String,
    pub address: Address,
    pub received: Vec<ReceivedPacket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouterReport {
    pub name: String,
    #[serde(flatten)]
    pub stats: RouterStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub links: usize,
    pub delivered: u64,
    pub dropped: u64,
}

/// Outcome of [`Network::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub elapsed_ms: u64,
    pub hosts: Vec<HostReport>,
    pub routers: Vec<RouterReport>,
    pub links: LinkReport,
}

impl SimulationReport {
    /// Total packets delivered to hosts.
    pub fn delivered(&self) -> usize {
        self.hosts.iter().map(|h| h.received.len()).sum()
    }
}

/// A fully wired network ready to run.
#[derive(Debug)]
pub struct Network {
    hosts: Vec<(String, Host)>,
    routers: Vec<Router>,
    links: LinkLayer,
    traffic: Vec<Traffic>,
}

impl Network {
    pub fn new(
        hosts: Vec<(String, Host)>,
        routers: Vec<Router>,
        links: LinkLayer,
        traffic: Vec<Traffic>,
    ) -> Self {
        Self {
            hosts,
            routers,
            links,
            traffic,
        }
    }

    pub fn hosts(&self) -> &[(String, Host)] {
        &self.hosts
    }

    pub fn routers(&self) -> &[Router] {
        &self.routers
    }

    pub fn links(&self) -> &LinkLayer {
        &self.links
    }

    pub fn traffic(&self) -> &[Traffic] {
        &self.traffic
    }

    /// Send the configured traffic, run every node for `duration`, then stop and
    /// collect a report.
    pub fn run(self, duration: Duration) -> Result<SimulationReport, NetworkError> {
        self.run_until(duration, &StopSignal::new())
    }

    /// Like [`Network::run`], but also returns early once `stop` is raised from
    /// elsewhere (for example a signal handler).
    pub fn run_until(
        self,
        duration: Duration,
        stop: &StopSignal,
    ) -> Result<SimulationReport, NetworkError> {
        let Network {
            hosts,
            routers,
            links,
            traffic,
        } = self;

        for item in &traffic {
            if let Some((name, host)) = hosts.get(item.host) {
                host.udt_send(item.destination.clone(), item.payload.clone(), item.priority)
                    .map_err(|source| NetworkError::Host {
                        name: name.clone(),
                        source,
                    })?;
            }
        }

        tracing::info!(
            hosts = hosts.len(),
            routers = routers.len(),
            links = links.links().len(),
            packets = traffic.len(),
            duration_ms = duration.as_millis() as u64,
            "simulation starting"
        );

        let started = Instant::now();
        let host_stop = StopSignal::new();
        let pending = Threads {
            signals: [stop.clone(), host_stop.clone()],
        };

        let link_count = links.links().len();
        let link_thread = pending.spawn("links".to_string(), stop, move |stop| links.run(&stop))?;

        let mut router_threads = Vec::with_capacity(routers.len());
        for mut router in routers {
            let name = router.name().to_string();
            let handle = pending.spawn(format!("router-{name}"), stop, move |stop| {
                let stats = router.run(&stop);
                RouterReport {
                    name: router.name().to_string(),
                    stats,
                }
            })?;
            router_threads.push(handle);
        }

        let mut host_threads = Vec::with_capacity(hosts.len());
        for (name, host) in hosts {
            let handle = pending.spawn(format!("host-{name}"), &host_stop, move |stop| {
                let received = host.run(&stop);
                HostReport {
                    name,
                    address: host.address().clone(),
                    received: received.iter().map(ReceivedPacket::from).collect(),
                }
            })?;
            host_threads.push(handle);
        }

        while started.elapsed() < duration && !stop.is_stopped() {
            thread::sleep(SUPERVISE_INTERVAL.min(duration.saturating_sub(started.elapsed())));
        }
        stop.stop();

        // Hosts keep receiving until routers and links have wound down.
        let routers = router_threads
            .into_iter()
            .map(join)
            .collect::<Result<Vec<_>, _>>();
        let link_stats = join(link_thread);
        host_stop.stop();
        let hosts = host_threads
            .into_iter()
            .map(join)
            .collect::<Result<Vec<_>, _>>()?;
        let routers = routers?;
        let TransferStats { delivered, dropped } = link_stats?;

        let report = SimulationReport {
            elapsed_ms: started.elapsed().as_millis() as u64,
            hosts,
            routers,
            links: LinkReport {
                links: link_count,
                delivered,
                dropped,
            },
        };
        tracing::info!(
            delivered = report.delivered(),
            elapsed_ms = report.elapsed_ms,
            "simulation finished"
        );
        Ok(report)
    }
}

/// A spawned node thread and its name.
struct Named<T> {
    name: String,
    handle: JoinHandle<T>,
}

fn join<T>(thread: Named<T>) -> Result<T, NetworkError> {
    thread
        .handle
        .join()
        .map_err(|_| NetworkError::ThreadPanicked(thread.name))
}

/// Spawns node threads; raises every stop signal if a spawn fails so the
/// threads already running wind down.
struct Threads {
    signals: [StopSignal; 2],
}

impl Threads {
    fn spawn<T, F>(
        &self,
        name: String,
        signal: &StopSignal,
        body: F,
    ) -> Result<Named<T>, NetworkError>
    where
        T: Send + 'static,
        F: FnOnce(StopSignal) -> T + Send + 'static,
    {
        let signal = signal.clone();
        match thread::Builder::new()
            .name(name.clone())
            .spawn(move || body(signal))
        {
            Ok(handle) => Ok(Named { name, handle }),
            Err(err) => {
                self.signals.iter().for_each(StopSignal::stop);
                Err(NetworkError::Io(err))
            }
        }
    }
}
