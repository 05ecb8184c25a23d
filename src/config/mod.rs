use std::time::Duration;

/// Tunable parameters governing the sync driver and the fork-choice view.
/// None of these affect correctness; they are latency/memory knobs the spec
/// leaves to the implementation, given sane defaults here.
#[derive(Debug, Clone)]
pub struct Config {
    /// How many trailing headers to fetch from the engine during resume
    /// when insertion progress is ahead of the persisted canonical head, so
    /// the fork-choice view can see any non-canonical tips already on disk.
    pub resume_lookback: u64,
    /// The fork-choice view prunes entries whose number falls this far
    /// below the confirmed head.
    pub fork_choice_window: u64,
    /// Size of the bootstrap header window handed to the exchange via
    /// `initial_state` at startup.
    pub initial_state_window: u64,
    /// How long the driver waits on the result queue for a batch before
    /// checking the stop flag again.
    pub queue_poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resume_lookback: 128,
            fork_choice_window: 128,
            initial_state_window: 65_536,
            queue_poll_interval: Duration::from_millis(100),
        }
    }
}
