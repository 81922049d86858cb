//! Matchmaking configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the [`Matchmaker`](crate::Matchmaker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchmakingConfig {
    /// How long a queued identity waits for a human opponent before it
    /// gets the synthetic one.
    pub wait_window: Duration,
}

impl Default for MatchmakingConfig {
    fn default() -> Self {
        Self {
            wait_window: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matchmaking_config_default_wait_window() {
        assert_eq!(
            MatchmakingConfig::default().wait_window,
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_matchmaking_config_deserializes_duration() {
        let config: MatchmakingConfig =
            serde_json::from_str(r#"{"wait_window":{"secs":3,"nanos":0}}"#).unwrap();
        assert_eq!(config.wait_window, Duration::from_secs(3));
    }
}
