use std::fmt;
use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use lsrsim_frame::{decode_link_frame, FrameKind, Label, LabelFrame, LinkFrame, Packet};
use lsrsim_link::{Direction, Interface, InterfaceConfig, LinkError, StopSignal};
use serde::Serialize;

use crate::config::{RouterConfig, StopCheck};
use crate::error::{Result, RouterError};
use crate::heuristic::{tally, LabelSource, PriorityTally};
use crate::tables::ForwardingTables;

/// Per-router forwarding counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouterStats {
    /// Frames drained from inbound queues.
    pub received: u64,
    /// Network packets given a label at this router.
    pub encapsulated: u64,
    /// Label frames forwarded unchanged.
    pub switched: u64,
    /// Label frames turned back into network packets.
    pub decapsulated: u64,
    /// Frames lost to a full outbound queue.
    pub dropped: u64,
    /// Cycles aborted by a decode error or missing route.
    pub faults: u64,
}

/// A multi-interface label-switching router.
pub struct Router {
    name: String,
    interfaces: Vec<Arc<Interface>>,
    tables: ForwardingTables,
    config: RouterConfig,
    stats: RouterStats,
}

impl Router {
    /// Build a router with one interface per entry of `capacities` (bps), each
    /// queue bounded at `max_queue_size` frames (0 for unbounded).
    ///
    /// Fails when a table names an interface the router does not have.
    pub fn new(
        name: impl Into<String>,
        capacities: &[u64],
        tables: ForwardingTables,
        max_queue_size: usize,
    ) -> Result<Self> {
        let name = name.into();
        if capacities.is_empty() {
            return Err(RouterError::NoInterfaces(name));
        }
        tables.validate(capacities.len())?;

        let interfaces = capacities
            .iter()
            .map(|&capacity| {
                Arc::new(Interface::new(InterfaceConfig::new(
                    max_queue_size,
                    capacity,
                )))
            })
            .collect();

        Ok(Self {
            name,
            interfaces,
            tables,
            config: RouterConfig::default(),
            stats: RouterStats::default(),
        })
    }

    /// Override engine behavior config.
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interfaces(&self) -> &[Arc<Interface>] {
        &self.interfaces
    }

    pub fn interface(&self, index: usize) -> Option<&Arc<Interface>> {
        self.interfaces.get(index)
    }

    pub fn tables(&self) -> &ForwardingTables {
        &self.tables
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn stats(&self) -> RouterStats {
        self.stats
    }

    /// Tally the priority digits of every frame resident in every inbound queue.
    pub fn queue_priorities(&self) -> PriorityTally {
        let resident: Vec<Bytes> = self
            .interfaces
            .iter()
            .flat_map(|intf| intf.snapshot(Direction::In))
            .collect();
        let counts = tally(resident.iter().map(|f| &f[..]), self.config.heuristic);

        if counts.p0 != 0 || counts.p1 != 0 {
            tracing::debug!(
                router = %self.name,
                p0 = counts.p0,
                p1 = counts.p1,
                elements = counts.elements,
                "queued priority tally"
            );
        }
        counts
    }

    /// One processing cycle: drain at most one frame from each inbound queue, in
    /// interface order, and forward it.
    ///
    /// Returns the number of frames drained. A decode error or a missing table
    /// entry aborts the rest of the cycle; the offending frame is consumed.
    pub fn process_queues(&mut self) -> Result<usize> {
        self.sweep(None)
    }

    fn sweep(&mut self, stop: Option<&StopSignal>) -> Result<usize> {
        let source = self.queue_priorities().label_source();
        let mut drained = 0;

        for i in 0..self.interfaces.len() {
            if stop.is_some_and(StopSignal::is_stopped) {
                break;
            }
            let Some(raw) = self.interfaces[i].try_receive(Direction::In) else {
                continue;
            };
            drained += 1;
            self.stats.received += 1;

            let frame = decode_link_frame(&raw)?;
            match frame.kind {
                FrameKind::Network => {
                    let packet = frame.packet()?;
                    self.process_network_packet(&packet, i, source)?;
                }
                FrameKind::Mpls => {
                    let label_frame = frame.label_frame()?;
                    self.process_mpls_frame(&label_frame, i)?;
                }
            }
        }

        Ok(drained)
    }

    /// Label a network packet that arrived on interface `i` and switch it.
    pub fn process_network_packet(
        &mut self,
        packet: &Packet,
        i: usize,
        source: LabelSource,
    ) -> Result<()> {
        let label = match source {
            LabelSource::Table => self.tables.encap_label(i, &packet.destination)?,
            LabelSource::Priority => Label::from(packet.priority),
        };
        tracing::debug!(
            router = %self.name,
            interface = i,
            destination = %packet.destination,
            priority = %packet.priority,
            %label,
            ?source,
            "encapsulating packet"
        );
        self.stats.encapsulated += 1;

        let label_frame = LabelFrame::encapsulate(label, packet);
        self.process_mpls_frame(&label_frame, i)
    }

    /// Switch a label frame that arrived on interface `i`: decapsulate when `i`
    /// is an egress interface, otherwise forward it unchanged.
    pub fn process_mpls_frame(&mut self, frame: &LabelFrame, i: usize) -> Result<()> {
        let (out, link_frame) = if self.tables.is_egress(i) {
            let out = self.tables.decap_interface(i, frame.label)?;
            let packet = frame.inner_packet()?;
            tracing::debug!(
                router = %self.name,
                interface = i,
                label = %frame.label,
                out,
                destination = %packet.destination,
                "decapsulating frame"
            );
            (out, LinkFrame::network(&packet))
        } else {
            let out = self.tables.forward_interface(frame.label)?;
            tracing::debug!(
                router = %self.name,
                interface = i,
                label = %frame.label,
                out,
                "forwarding frame"
            );
            (out, LinkFrame::mpls(frame))
        };

        let kind = link_frame.kind;
        match self.emit(out, link_frame.to_bytes()) {
            Ok(()) => {
                match kind {
                    FrameKind::Network => self.stats.decapsulated += 1,
                    FrameKind::Mpls => self.stats.switched += 1,
                }
                Ok(())
            }
            Err(err) => {
                self.stats.dropped += 1;
                tracing::debug!(
                    router = %self.name,
                    interface = i,
                    out,
                    label = %frame.label,
                    error = %err,
                    "frame lost"
                );
                Ok(())
            }
        }
    }

    fn emit(&self, out: usize, bytes: Bytes) -> std::result::Result<(), LinkError> {
        // `validate` at construction guarantees `out` is in range.
        match self.interfaces.get(out) {
            Some(intf) => intf.enqueue_timeout(bytes, Direction::Out, self.config.enqueue_timeout),
            None => Ok(()),
        }
    }

    /// Run processing cycles until `stop` is raised.
    ///
    /// A cycle that aborts is logged and counted in [`RouterStats::faults`];
    /// the loop carries on with the next cycle.
    pub fn run(&mut self, stop: &StopSignal) -> RouterStats {
        tracing::info!(
            router = %self.name,
            interfaces = self.interfaces.len(),
            "router started"
        );

        let fine_grained = matches!(self.config.stop_check, StopCheck::PerInterface);
        while !stop.is_stopped() {
            let result = if fine_grained {
                self.sweep(Some(stop))
            } else {
                self.process_queues()
            };

            match result {
                Ok(0) => match self.config.idle_sleep {
                    Some(pause) => thread::sleep(pause),
                    None => thread::yield_now(),
                },
                Ok(_) => {}
                Err(err) => {
                    self.stats.faults += 1;
                    tracing::warn!(router = %self.name, error = %err, "cycle aborted");
                }
            }
        }

        tracing::info!(router = %self.name, stats = ?self.stats, "router stopped");
        self.stats
    }
}

impl fmt::Display for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("name", &self.name)
            .field("interfaces", &self.interfaces.len())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use lsrsim_frame::{Address, FrameError, Priority};

    use super::*;
    use crate::error::RouteMiss;
    use crate::heuristic::HeuristicMode;

    fn label(v: u32) -> Label {
        Label::new(v).unwrap()
    }

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    fn router(interfaces: usize, tables: ForwardingTables) -> Router {
        Router::new("RA", &vec![500; interfaces], tables, 0).unwrap()
    }

    fn push_in(router: &Router, i: usize, frame: &'static [u8]) {
        router.interfaces()[i]
            .enqueue(Bytes::from_static(frame), Direction::In, false)
            .unwrap();
    }

    fn pop_out(router: &Router, i: usize) -> Option<Bytes> {
        router.interfaces()[i].try_receive(Direction::Out)
    }

    #[test]
    fn transit_forwards_label_frame_unchanged() {
        let mut r = router(3, ForwardingTables::new().with_forward(label(7), 2));
        push_in(&r, 0, b"M07100042HELLO");

        assert_eq!(r.process_queues().unwrap(), 1);
        assert_eq!(pop_out(&r, 2).unwrap().as_ref(), b"M07100042HELLO");
        assert!(pop_out(&r, 0).is_none());
        assert_eq!(r.stats().switched, 1);
    }

    #[test]
    fn egress_decapsulates_to_network_frame() {
        let mut r = router(2, ForwardingTables::new().with_decap(0, label(7), 1));
        push_in(&r, 0, b"M07100042HELLO");

        r.process_queues().unwrap();
        let out = pop_out(&r, 1).unwrap();
        assert_eq!(out.as_ref(), b"N100042HELLO");

        let packet = decode_link_frame(&out).unwrap().packet().unwrap();
        assert_eq!(packet.destination, addr("42"));
        assert_eq!(packet.payload.as_ref(), b"HELLO");
        assert_eq!(r.stats().decapsulated, 1);
    }

    #[test]
    fn ingress_encapsulates_with_table_label() {
        let tables = ForwardingTables::new()
            .with_encap(0, addr("00042"), label(5))
            .with_forward(label(5), 1);
        let mut r = router(2, tables);
        push_in(&r, 0, b"N100042HELLO");

        r.process_queues().unwrap();
        assert_eq!(pop_out(&r, 1).unwrap().as_ref(), b"M05100042HELLO");
        assert_eq!(r.stats().encapsulated, 1);
        assert_eq!(r.stats().switched, 1);
    }

    #[test]
    fn ingress_and_egress_on_one_router() {
        // Packet enters on 0, is labeled 5, and 0 is also an egress interface,
        // so the fresh label frame is decapsulated straight away.
        let tables = ForwardingTables::new()
            .with_encap(0, addr("42"), label(5))
            .with_decap(0, label(5), 1);
        let mut r = router(2, tables);
        push_in(&r, 0, b"N100042HELLO");

        r.process_queues().unwrap();
        assert_eq!(pop_out(&r, 1).unwrap().as_ref(), b"N100042HELLO");
    }

    #[test]
    fn decapsulation_keeps_full_destination_width() {
        // A 4-character destination slice would yield destination "4" and
        // payload "2HELLO" here.
        let mut r = router(2, ForwardingTables::new().with_decap(0, label(5), 1));
        push_in(&r, 0, b"M05100042HELLO");

        r.process_queues().unwrap();
        let out = pop_out(&r, 1).unwrap();
        let packet = decode_link_frame(&out).unwrap().packet().unwrap();
        assert_eq!(packet.destination.as_str(), "42");
        assert_eq!(packet.payload.as_ref(), b"HELLO");
        assert_ne!(packet.payload.as_ref(), b"2HELLO");
    }

    #[test]
    fn unclassified_priorities_switch_to_priority_labels() {
        // Priority 5 is neither class 0 nor 1, so the tally falls short and the
        // packet's priority becomes its label. No encap entry is needed.
        let mut r = router(2, ForwardingTables::new().with_forward(label(5), 1));
        push_in(&r, 0, b"N500042HELLO");

        assert_eq!(r.queue_priorities().label_source(), LabelSource::Priority);
        r.process_queues().unwrap();
        assert_eq!(pop_out(&r, 1).unwrap().as_ref(), b"M05500042HELLO");
    }

    #[test]
    fn compat_heuristic_uses_priority_with_two_queued_frames() {
        let config = RouterConfig {
            heuristic: HeuristicMode::Compat,
            ..RouterConfig::default()
        };
        let tables = ForwardingTables::new().with_forward(label(1), 2);
        let mut r = router(3, tables).with_config(config);
        push_in(&r, 0, b"N100001a");
        push_in(&r, 1, b"N100002b");

        let tally = r.queue_priorities();
        assert_eq!(tally.elements, 3);
        assert_eq!(tally.label_source(), LabelSource::Priority);

        assert_eq!(r.process_queues().unwrap(), 2);
        assert_eq!(pop_out(&r, 2).unwrap().as_ref(), b"M01100001a");
        assert_eq!(pop_out(&r, 2).unwrap().as_ref(), b"M01100002b");
    }

    #[test]
    fn per_element_heuristic_uses_table_with_two_queued_frames() {
        let tables = ForwardingTables::new()
            .with_encap(0, addr("1"), label(20))
            .with_encap(1, addr("2"), label(21))
            .with_forward(label(20), 2)
            .with_forward(label(21), 2);
        let mut r = router(3, tables);
        push_in(&r, 0, b"N100001a");
        push_in(&r, 1, b"N000002b");

        r.process_queues().unwrap();
        assert_eq!(pop_out(&r, 2).unwrap().as_ref(), b"M20100001a");
        assert_eq!(pop_out(&r, 2).unwrap().as_ref(), b"M21000002b");
    }

    #[test]
    fn one_frame_per_interface_per_cycle() {
        let mut r = router(2, ForwardingTables::new().with_forward(label(7), 1));
        push_in(&r, 0, b"M07100001first");
        push_in(&r, 0, b"M07100001second");

        assert_eq!(r.process_queues().unwrap(), 1);
        assert_eq!(r.interfaces()[0].len(Direction::In), 1);
        assert_eq!(r.process_queues().unwrap(), 1);
        assert_eq!(r.process_queues().unwrap(), 0);

        assert_eq!(pop_out(&r, 1).unwrap().as_ref(), b"M07100001first");
        assert_eq!(pop_out(&r, 1).unwrap().as_ref(), b"M07100001second");
    }

    #[test]
    fn unknown_tag_aborts_cycle() {
        let mut r = router(2, ForwardingTables::new().with_forward(label(7), 0));
        push_in(&r, 0, b"X07100042HELLO");
        push_in(&r, 1, b"M07100042HELLO");

        let err = r.process_queues().unwrap_err();
        assert!(matches!(
            err,
            RouterError::Frame(FrameError::UnknownKind(b'X'))
        ));
        // Interface 1 was not reached this cycle.
        assert_eq!(r.interfaces()[1].len(Direction::In), 1);

        assert_eq!(r.process_queues().unwrap(), 1);
        assert!(pop_out(&r, 0).is_some());
    }

    #[test]
    fn undersized_packet_is_a_decode_error() {
        let mut r = router(2, ForwardingTables::new().with_forward(label(7), 1));
        push_in(&r, 0, b"N1000");

        assert!(matches!(
            r.process_queues(),
            Err(RouterError::Frame(FrameError::Truncated { .. }))
        ));
    }

    #[test]
    fn missing_forward_entry_is_reported() {
        let mut r = router(2, ForwardingTables::new());
        push_in(&r, 0, b"M09100042HELLO");

        assert!(matches!(
            r.process_queues(),
            Err(RouterError::NoRoute(RouteMiss::Forward { .. }))
        ));
        assert!(pop_out(&r, 1).is_none());
    }

    #[test]
    fn missing_encap_entry_is_reported() {
        let mut r = router(2, ForwardingTables::new().with_forward(label(5), 1));
        push_in(&r, 0, b"N000099HELLO");

        assert!(matches!(
            r.process_queues(),
            Err(RouterError::NoRoute(RouteMiss::Encap { interface: 0, .. }))
        ));
    }

    #[test]
    fn full_outbound_queue_drops_frame() {
        let config = RouterConfig {
            enqueue_timeout: Duration::ZERO,
            ..RouterConfig::default()
        };
        let mut r = Router::new(
            "RB",
            &[500, 500],
            ForwardingTables::new().with_forward(label(7), 1),
            1,
        )
        .unwrap()
        .with_config(config);

        r.interfaces()[1]
            .enqueue(Bytes::from_static(b"Mheld"), Direction::Out, false)
            .unwrap();
        push_in(&r, 0, b"M07100042HELLO");

        assert_eq!(r.process_queues().unwrap(), 1);
        assert_eq!(r.stats().dropped, 1);
        assert_eq!(
            r.interfaces()[1].snapshot(Direction::Out),
            vec![Bytes::from_static(b"Mheld")]
        );
    }

    #[test]
    fn construction_validates_tables() {
        assert!(matches!(
            Router::new("R", &[], ForwardingTables::new(), 0),
            Err(RouterError::NoInterfaces(_))
        ));
        assert!(matches!(
            Router::new(
                "R",
                &[500],
                ForwardingTables::new().with_forward(label(1), 3),
                0
            ),
            Err(RouterError::InterfaceOutOfRange { interface: 3, .. })
        ));
    }

    #[test]
    fn interfaces_carry_configured_capacity() {
        let r = Router::new("R", &[500, 1_000], ForwardingTables::new(), 8).unwrap();
        assert_eq!(r.interfaces()[1].capacity_bps(), 1_000);
        assert_eq!(r.interfaces()[0].max_queue_size(), 8);
        assert_eq!(r.to_string(), "R");
    }

    #[test]
    fn run_forwards_until_stopped() {
        let mut r = router(2, ForwardingTables::new().with_forward(label(7), 1));
        let inbound = Arc::clone(&r.interfaces()[0]);
        let outbound = Arc::clone(&r.interfaces()[1]);
        let stop = StopSignal::new();

        let handle = {
            let stop = stop.clone();
            thread::spawn(move || r.run(&stop))
        };

        inbound
            .enqueue(Bytes::from_static(b"X"), Direction::In, false)
            .unwrap();
        inbound
            .enqueue(Bytes::from_static(b"M07100042HELLO"), Direction::In, false)
            .unwrap();

        let mut forwarded = None;
        for _ in 0..5_000 {
            if let Some(frame) = outbound.try_receive(Direction::Out) {
                forwarded = Some(frame);
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        stop.stop();
        let stats = handle.join().unwrap();

        assert_eq!(forwarded.unwrap().as_ref(), b"M07100042HELLO");
        assert_eq!(stats.faults, 1);
        assert_eq!(stats.switched, 1);
    }

    #[test]
    fn per_interface_stop_check_halts_mid_sweep() {
        let config = RouterConfig {
            stop_check: StopCheck::PerInterface,
            ..RouterConfig::default()
        };
        let mut r = router(2, ForwardingTables::new().with_forward(label(7), 1))
            .with_config(config);
        push_in(&r, 0, b"M07100042HELLO");

        let stop = StopSignal::new();
        stop.stop();
        assert_eq!(r.sweep(Some(&stop)).unwrap(), 0);
        assert_eq!(r.interfaces()[0].len(Direction::In), 1);

        let stats = r.run(&stop);
        assert_eq!(stats.received, 0);
    }

    #[test]
    fn scenario_example_packet_encapsulates_with_label_5() {
        let packet = Packet::new(addr("00042"), "HELLO", Priority::new(1).unwrap());
        let tables = ForwardingTables::new()
            .with_encap(0, addr("00042"), label(5))
            .with_forward(label(5), 1);
        let mut r = router(2, tables);

        r.process_network_packet(&packet, 0, LabelSource::Table)
            .unwrap();
        let out = pop_out(&r, 1).unwrap();
        assert_eq!(&out[..], b"M05100042HELLO");
    }
}
