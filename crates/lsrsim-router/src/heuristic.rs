//! Queue-inspection policy deciding where an ingress label comes from.
//!
//! Before each sweep the router looks at every frame resident in its inbound
//! queues, reads the priority digit of each, and counts classes 0 and 1. When
//! the tally accounts for every inspected frame, ingress labels come from the
//! encapsulation table; otherwise the packet's own priority is used as its label.

use lsrsim_frame::TAG_MPLS;
use serde::{Deserialize, Serialize};

/// Priority digit offset in a network link frame: tag, then priority.
const NETWORK_PRIORITY_OFFSET: usize = 1;

/// Priority digit offset in an MPLS link frame: tag, 2-digit label, then priority.
const MPLS_PRIORITY_OFFSET: usize = 3;

/// How the element counter advances per inspected frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeuristicMode {
    /// One increment per frame.
    #[default]
    PerElement,
    /// Legacy doubling counter, `elements = 2 * elements + 1` per frame.
    /// With two or more queued frames the tally can never match, so priorities win.
    Compat,
}

/// Where the label of an ingress network packet comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    /// `encap[interface][destination]`
    Table,
    /// The packet's priority digit.
    Priority,
}

/// Counts gathered from one inspection of the inbound queues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriorityTally {
    pub p0: u64,
    pub p1: u64,
    pub elements: u64,
}

impl PriorityTally {
    /// Whether classes 0 and 1 account for every counted element.
    pub fn all_classified(&self) -> bool {
        self.p0 + self.p1 == self.elements
    }

    pub fn label_source(&self) -> LabelSource {
        if self.all_classified() {
            LabelSource::Table
        } else {
            LabelSource::Priority
        }
    }
}

/// Read the priority digit of an encoded link frame, if it has one.
pub fn frame_priority(frame: &[u8]) -> Option<u8> {
    let offset = if frame.first() == Some(&TAG_MPLS) {
        MPLS_PRIORITY_OFFSET
    } else {
        NETWORK_PRIORITY_OFFSET
    };
    frame
        .get(offset)
        .filter(|b| b.is_ascii_digit())
        .map(|b| b - b'0')
}

/// Tally priorities over a set of encoded link frames.
pub fn tally<'a, I>(frames: I, mode: HeuristicMode) -> PriorityTally
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut tally = PriorityTally::default();
    for frame in frames {
        match frame_priority(frame) {
            Some(0) => tally.p0 += 1,
            Some(1) => tally.p1 += 1,
            _ => {}
        }
        tally.elements = match mode {
            HeuristicMode::PerElement => tally.elements + 1,
            HeuristicMode::Compat => tally.elements.saturating_mul(2).saturating_add(1),
        };
    }
    tally
}
