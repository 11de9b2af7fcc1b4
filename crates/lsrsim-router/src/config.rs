use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::heuristic::HeuristicMode;

/// Default bound on how long a forwarding write waits for outbound space.
pub const DEFAULT_ENQUEUE_TIMEOUT: Duration = Duration::from_millis(10);

/// Default sleep after a sweep that found every inbound queue empty.
pub const DEFAULT_IDLE_SLEEP: Duration = Duration::from_millis(1);

/// When the run loop polls its stop signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopCheck {
    /// Once per full sweep over the interfaces.
    #[default]
    PerSweep,
    /// Before every interface; a stop may leave a sweep half done.
    PerInterface,
}

/// Controls forwarding-engine behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// How long a forwarding write blocks on a full outbound queue before the
    /// frame is dropped. Zero drops immediately.
    pub enqueue_timeout: Duration,
    /// Element counting used by the priority heuristic.
    pub heuristic: HeuristicMode,
    /// Stop signal granularity in [`crate::Router::run`].
    pub stop_check: StopCheck,
    /// Sleep after an idle sweep. `None` yields instead.
    pub idle_sleep: Option<Duration>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            enqueue_timeout: DEFAULT_ENQUEUE_TIMEOUT,
            heuristic: HeuristicMode::default(),
            stop_check: StopCheck::default(),
            idle_sleep: Some(DEFAULT_IDLE_SLEEP),
        }
    }
}
