use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use lsrsim_frame::{decode_link_frame, Address, FrameKind, LinkFrame, Packet, Priority};
use lsrsim_link::{Direction, Interface, InterfaceConfig, StopSignal};

use crate::error::HostError;

/// Sleep between polls of an empty inbound queue.
const IDLE_SLEEP: Duration = Duration::from_millis(1);

/// A network endpoint with a single unbounded interface.
pub struct Host {
    address: Address,
    interface: Arc<Interface>,
}

impl Host {
    pub fn new(address: Address) -> Self {
        Self::with_interface_config(address, InterfaceConfig::default())
    }

    pub fn with_interface_config(address: Address, config: InterfaceConfig) -> Self {
        Self {
            address,
            interface: Arc::new(Interface::new(config)),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn interface(&self) -> &Arc<Interface> {
        &self.interface
    }

    /// Build a packet, wrap it in a network link frame and queue it for the link.
    pub fn udt_send(
        &self,
        destination: Address,
        payload: impl Into<Bytes>,
        priority: Priority,
    ) -> Result<(), HostError> {
        let packet = Packet::new(destination, payload, priority);
        tracing::debug!(host = %self.address, packet = %packet, "sending packet");
        let frame = LinkFrame::network(&packet);
        self.interface
            .enqueue(frame.to_bytes(), Direction::Out, false)?;
        Ok(())
    }

    /// Take one frame off the inbound queue and decode the packet it carries.
    ///
    /// `Ok(None)` when nothing is waiting. Hosts only ever receive network
    /// frames; an MPLS frame reaching a host is an error.
    pub fn udt_receive(&self) -> Result<Option<Packet>, HostError> {
        let Some(raw) = self.interface.try_receive(Direction::In) else {
            return Ok(None);
        };

        let frame = decode_link_frame(&raw)?;
        if frame.kind != FrameKind::Network {
            return Err(HostError::UnexpectedKind {
                host: self.address.clone(),
                kind: frame.kind,
            });
        }

        let packet = frame.packet()?;
        tracing::info!(
            host = %self.address,
            destination = %packet.destination,
            priority = %packet.priority,
            payload = %String::from_utf8_lossy(&packet.payload),
            "host received packet"
        );
        Ok(Some(packet))
    }

    /// Receive until `stop` is raised, returning every packet delivered.
    ///
    /// Frames that fail to decode are logged and skipped.
    pub fn run(&self, stop: &StopSignal) -> Vec<Packet> {
        let mut received = Vec::new();

        while !stop.is_stopped() {
            match self.udt_receive() {
                Ok(Some(packet)) => received.push(packet),
                Ok(None) => thread::sleep(IDLE_SLEEP),
                Err(err) => {
                    tracing::warn!(host = %self.address, error = %err, "discarding frame");
                }
            }
        }

        // Pick up anything that arrived before the stop was observed.
        loop {
            match self.udt_receive() {
                Ok(Some(packet)) => received.push(packet),
                Ok(None) => break,
                Err(err) => {
                    tracing::warn!(host = %self.address, error = %err, "discarding frame");
                }
            }
        }

        received
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("address", &self.address)
            .field("interface", &self.interface)
            .finish()
    }
}
