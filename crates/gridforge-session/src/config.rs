//! Lifecycle configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing and sizing for session actors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// How long a disconnected participant has to reconnect before the
    /// session is forfeited.
    pub grace_window: Duration,

    /// How long the synthetic opponent "thinks" before replying.
    pub synthetic_think_delay: Duration,

    /// Capacity of each session actor's command channel. Senders wait
    /// when it is full.
    pub command_channel_size: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            grace_window: Duration::from_secs(30),
            synthetic_think_delay: Duration::from_millis(750),
            command_channel_size: 64,
        }
    }
}

impl LifecycleConfig {
    /// Fixes values that would make the actor unusable.
    ///
    /// A zero `command_channel_size` becomes 1 (tokio rejects empty
    /// bounded channels). Zero durations are allowed.
    pub fn validated(mut self) -> Self {
        if self.command_channel_size == 0 {
            tracing::warn!("command_channel_size of 0 is invalid, using 1");
            self.command_channel_size = 1;
        }
        self
    }
}
