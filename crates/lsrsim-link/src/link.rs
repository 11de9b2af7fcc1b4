use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::interface::{Direction, Interface};
use crate::stop::StopSignal;

/// How long [`LinkLayer::run`] sleeps after a pass that moved nothing.
pub const DEFAULT_IDLE_SLEEP: Duration = Duration::from_millis(1);

/// A one-way link from one interface's outbound queue to another's inbound queue.
#[derive(Debug, Clone)]
pub struct Link {
    name: String,
    from: Arc<Interface>,
    to: Arc<Interface>,
}

/// Result of moving at most one frame across a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Nothing waiting on the sending side.
    Idle,
    /// One frame delivered.
    Delivered,
    /// The receiving inbound queue was full; the frame was lost.
    Dropped,
}

impl Link {
    pub fn new(name: impl Into<String>, from: Arc<Interface>, to: Arc<Interface>) -> Self {
        Self {
            name: name.into(),
            from,
            to,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Move the oldest outbound frame, if any, to the far end.
    ///
    /// Never blocks: a full receiving queue loses the frame.
    pub fn transfer(&self) -> TransferOutcome {
        let Some(frame) = self.from.try_receive(Direction::Out) else {
            return TransferOutcome::Idle;
        };

        let size = frame.len();
        match self.to.enqueue(frame, Direction::In, false) {
            Ok(()) => {
                tracing::trace!(link = %self.name, size, "frame delivered");
                TransferOutcome::Delivered
            }
            Err(err) => {
                tracing::debug!(link = %self.name, size, error = %err, "frame lost on link");
                TransferOutcome::Dropped
            }
        }
    }
}

/// Counters accumulated by [`LinkLayer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    pub delivered: u64,
    pub dropped: u64,
}

impl TransferStats {
    fn record(&mut self, outcome: TransferOutcome) {
        match outcome {
            TransferOutcome::Idle => {}
            TransferOutcome::Delivered => self.delivered += 1,
            TransferOutcome::Dropped => self.dropped += 1,
        }
    }

    fn moved_any(&self) -> bool {
        self.delivered > 0 || self.dropped > 0
    }
}

/// The set of links in a simulated network.
#[derive(Debug, Clone)]
pub struct LinkLayer {
    links: Vec<Link>,
    idle_sleep: Option<Duration>,
}

impl LinkLayer {
    pub fn new() -> Self {
        Self {
            links: Vec::new(),
            idle_sleep: Some(DEFAULT_IDLE_SLEEP),
        }
    }

    /// Override the sleep after an idle pass. `None` spins.
    pub fn with_idle_sleep(mut self, idle_sleep: Option<Duration>) -> Self {
        self.idle_sleep = idle_sleep;
        self
    }

    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    /// Add both directions between two interfaces.
    pub fn add_duplex(&mut self, name: &str, a: &Arc<Interface>, b: &Arc<Interface>) {
        self.add_link(Link::new(format!("{name}>"), Arc::clone(a), Arc::clone(b)));
        self.add_link(Link::new(format!("{name}<"), Arc::clone(b), Arc::clone(a)));
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// One pass over every link, moving at most one frame per link.
    pub fn transfer(&self) -> TransferStats {
        let mut stats = TransferStats::default();
        for link in &self.links {
            stats.record(link.transfer());
        }
        stats
    }

    /// Transfer until `stop` is raised, returning the accumulated counters.
    pub fn run(&self, stop: &StopSignal) -> TransferStats {
        tracing::info!(links = self.links.len(), "link layer started");
        let mut total = TransferStats::default();

        while !stop.is_stopped() {
            let pass = self.transfer();
            total.delivered += pass.delivered;
            total.dropped += pass.dropped;

            if !pass.moved_any() {
                match self.idle_sleep {
                    Some(pause) => thread::sleep(pause),
                    None => thread::yield_now(),
                }
            }
        }

        tracing::info!(
            delivered = total.delivered,
            dropped = total.dropped,
            "link layer stopped"
        );
        total
    }
}

impl Default for LinkLayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::interface::InterfaceConfig;

    fn pair(max: usize) -> (Arc<Interface>, Arc<Interface>) {
        let config = InterfaceConfig::new(max, 500);
        (
            Arc::new(Interface::new(config)),
            Arc::new(Interface::new(config)),
        )
    }

    #[test]
    fn transfer_moves_outbound_to_peer_inbound() {
        let (a, b) = pair(0);
        let link = Link::new("a-b", Arc::clone(&a), Arc::clone(&b));

        assert_eq!(link.transfer(), TransferOutcome::Idle);

        a.enqueue(Bytes::from_static(b"N100001hi"), Direction::Out, false)
            .unwrap();
        assert_eq!(link.transfer(), TransferOutcome::Delivered);
        assert!(a.is_empty(Direction::Out));
        assert_eq!(
            b.try_receive(Direction::In).unwrap().as_ref(),
            b"N100001hi"
        );
    }

    #[test]
    fn full_receiver_drops_frame() {
        let (a, b) = pair(1);
        let link = Link::new("a-b", Arc::clone(&a), Arc::clone(&b));
        b.enqueue(Bytes::from_static(b"held"), Direction::In, false)
            .unwrap();
        a.enqueue(Bytes::from_static(b"lost"), Direction::Out, false)
            .unwrap();

        assert_eq!(link.transfer(), TransferOutcome::Dropped);
        assert!(a.is_empty(Direction::Out));
        assert_eq!(b.snapshot(Direction::In), vec![Bytes::from_static(b"held")]);
    }

    #[test]
    fn duplex_moves_both_ways() {
        let (a, b) = pair(0);
        let mut layer = LinkLayer::new();
        layer.add_duplex("ab", &a, &b);
        assert_eq!(layer.links().len(), 2);

        a.enqueue(Bytes::from_static(b"to-b"), Direction::Out, false)
            .unwrap();
        b.enqueue(Bytes::from_static(b"to-a"), Direction::Out, false)
            .unwrap();

        let stats = layer.transfer();
        assert_eq!(
            stats,
            TransferStats {
                delivered: 2,
                dropped: 0
            }
        );
        assert_eq!(b.try_receive(Direction::In).unwrap().as_ref(), b"to-b");
        assert_eq!(a.try_receive(Direction::In).unwrap().as_ref(), b"to-a");
    }

    #[test]
    fn run_returns_once_stopped() {
        let (a, b) = pair(0);
        let mut layer = LinkLayer::new();
        layer.add_duplex("ab", &a, &b);
        a.enqueue(Bytes::from_static(b"x"), Direction::Out, false)
            .unwrap();

        let stop = StopSignal::new();
        let handle = {
            let stop = stop.clone();
            thread::spawn(move || layer.run(&stop))
        };

        while b.is_empty(Direction::In) {
            thread::sleep(Duration::from_millis(1));
        }
        stop.stop();
        let stats = handle.join().unwrap();
        assert_eq!(stats.delivered, 1);
    }
}
