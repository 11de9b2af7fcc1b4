use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use bytes::Bytes;

use crate::error::{LinkError, Result};

/// Default link rate in bits per second.
pub const DEFAULT_CAPACITY_BPS: u64 = 500;

/// Which of the two queues of an interface to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Frames arriving from the link, waiting to be processed.
    In,
    /// Frames waiting to be put on the link.
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => f.write_str("inbound"),
            Direction::Out => f.write_str("outbound"),
        }
    }
}

/// Configuration for one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceConfig {
    /// Maximum frames per queue. 0 means unbounded.
    pub max_queue_size: usize,
    /// Link rate in bits per second. Stored and reported, never enforced.
    pub capacity_bps: u64,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 0,
            capacity_bps: DEFAULT_CAPACITY_BPS,
        }
    }
}

impl InterfaceConfig {
    pub fn new(max_queue_size: usize, capacity_bps: u64) -> Self {
        Self {
            max_queue_size,
            capacity_bps,
        }
    }
}

enum Wait {
    Never,
    Forever,
    For(Duration),
}

struct FrameQueue {
    frames: Mutex<VecDeque<Bytes>>,
    space: Condvar,
    max_len: usize,
}

impl FrameQueue {
    fn new(max_len: usize) -> Self {
        Self {
            frames: Mutex::new(VecDeque::new()),
            space: Condvar::new(),
            max_len,
        }
    }

    // A panic while holding the lock cannot leave the deque half-updated, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Bytes>> {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_full(&self, frames: &VecDeque<Bytes>) -> bool {
        self.max_len != 0 && frames.len() >= self.max_len
    }

    fn pop(&self) -> Option<Bytes> {
        let frame = self.lock().pop_front();
        if frame.is_some() {
            self.space.notify_one();
        }
        frame
    }

    fn push(&self, frame: Bytes, wait: Wait, direction: Direction) -> Result<()> {
        let mut frames = self.lock();

        if self.is_full(&frames) {
            frames = match wait {
                Wait::Never => frames,
                Wait::Forever => self
                    .space
                    .wait_while(frames, |q| self.is_full(q))
                    .unwrap_or_else(PoisonError::into_inner),
                Wait::For(timeout) => {
                    let deadline = Instant::now() + timeout;
                    let mut frames = frames;
                    while self.is_full(&frames) {
                        let remaining = deadline.saturating_duration_since(Instant::now());
                        if remaining.is_zero() {
                            break;
                        }
                        frames = self
                            .space
                            .wait_timeout(frames, remaining)
                            .unwrap_or_else(PoisonError::into_inner)
                            .0;
                    }
                    frames
                }
            };
        }

        if self.is_full(&frames) {
            return Err(LinkError::QueueFull {
                direction,
                max: self.max_len,
            });
        }

        frames.push_back(frame);
        Ok(())
    }

    fn snapshot(&self) -> Vec<Bytes> {
        self.lock().iter().cloned().collect()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// A simulated network interface: an inbound and an outbound FIFO of encoded frames.
///
/// Shared as `Arc<Interface>` between the owning node's processing loop and the
/// link layer. All methods take `&self`.
pub struct Interface {
    inbound: FrameQueue,
    outbound: FrameQueue,
    capacity_bps: u64,
    next_avail_time: AtomicU64,
}

impl Interface {
    pub fn new(config: InterfaceConfig) -> Self {
        Self {
            inbound: FrameQueue::new(config.max_queue_size),
            outbound: FrameQueue::new(config.max_queue_size),
            capacity_bps: config.capacity_bps,
            next_avail_time: AtomicU64::new(0),
        }
    }

    fn queue(&self, direction: Direction) -> &FrameQueue {
        match direction {
            Direction::In => &self.inbound,
            Direction::Out => &self.outbound,
        }
    }

    /// Pop the oldest frame without blocking. `None` when the queue is empty.
    pub fn try_receive(&self, direction: Direction) -> Option<Bytes> {
        self.queue(direction).pop()
    }

    /// Push a frame.
    ///
    /// Non-blocking on a full queue returns [`LinkError::QueueFull`]. Blocking
    /// waits on a condition variable until a frame is popped.
    pub fn enqueue(&self, frame: Bytes, direction: Direction, blocking: bool) -> Result<()> {
        let wait = if blocking { Wait::Forever } else { Wait::Never };
        self.queue(direction).push(frame, wait, direction)
    }

    /// Push a frame, waiting at most `timeout` for space.
    pub fn enqueue_timeout(
        &self,
        frame: Bytes,
        direction: Direction,
        timeout: Duration,
    ) -> Result<()> {
        self.queue(direction)
            .push(frame, Wait::For(timeout), direction)
    }

    /// Copy of the resident frames, oldest first.
    pub fn snapshot(&self, direction: Direction) -> Vec<Bytes> {
        self.queue(direction).snapshot()
    }

    pub fn len(&self, direction: Direction) -> usize {
        self.queue(direction).len()
    }

    pub fn is_empty(&self, direction: Direction) -> bool {
        self.len(direction) == 0
    }

    /// Configured queue depth, 0 when unbounded.
    pub fn max_queue_size(&self) -> usize {
        self.inbound.max_len
    }

    /// Configured link rate in bits per second.
    pub fn capacity_bps(&self) -> u64 {
        self.capacity_bps
    }

    /// Next time the interface may transmit. Reserved for rate limiting.
    pub fn next_avail_time(&self) -> u64 {
        self.next_avail_time.load(Ordering::Relaxed)
    }

    pub fn set_next_avail_time(&self, time: u64) {
        self.next_avail_time.store(time, Ordering::Relaxed);
    }
}

impl Default for Interface {
    fn default() -> Self {
        Self::new(InterfaceConfig::default())
    }
}

impl fmt::Debug for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interface")
            .field("inbound", &self.inbound.len())
            .field("outbound", &self.outbound.len())
            .field("max_queue_size", &self.inbound.max_len)
            .field("capacity_bps", &self.capacity_bps)
            .finish()
    }
}
