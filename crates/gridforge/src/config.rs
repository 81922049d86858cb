//! Server configuration.

use gridforge_matchmaking::MatchmakingConfig;
use gridforge_session::LifecycleConfig;
use serde::{Deserialize, Serialize};

/// Everything a [`GameServer`](crate::GameServer) needs to start.
///
/// Missing fields fall back to their defaults when deserializing, so a
/// config file only has to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub matchmaking: MatchmakingConfig,
    pub lifecycle: LifecycleConfig,
    /// How many forfeited sessions to remember so a late reconnect gets
    /// `GRACE_WINDOW_EXPIRED` rather than `SESSION_NOT_FOUND`. 0 disables.
    pub forfeit_retention: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            matchmaking: MatchmakingConfig::default(),
            lifecycle: LifecycleConfig::default(),
            forfeit_retention: 1024,
        }
    }
}

impl ServerConfig {
    /// Fixes out-of-range values. See [`LifecycleConfig::validated`].
    pub fn validated(mut self) -> Self {
        self.lifecycle = self.lifecycle.validated();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.matchmaking.wait_window, Duration::from_secs(10));
        assert_eq!(config.lifecycle.grace_window, Duration::from_secs(30));
        assert_eq!(config.forfeit_retention, 1024);
    }

    #[test]
    fn test_server_config_partial_json_uses_defaults() {
        let config: ServerConfig = serde_json::from_str(r#"{"forfeit_retention":0}"#).unwrap();
        assert_eq!(config.forfeit_retention, 0);
        assert_eq!(config.lifecycle, LifecycleConfig::default());
    }

    #[test]
    fn test_validated_fixes_zero_channel_size() {
        let mut config = ServerConfig::default();
        config.lifecycle.command_channel_size = 0;
        assert_eq!(config.validated().lifecycle.command_channel_size, 1);
    }
}
