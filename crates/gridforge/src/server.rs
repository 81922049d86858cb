//! `GameServer` builder and operations.
//!
//! This is the entry point for embedding Gridforge. It ties the layers
//! together: protocol → matchmaking → session registry → session actors.

use std::time::Duration;

use gridforge_matchmaking::{JoinOutcome, Matchmaker};
use gridforge_protocol::{Identity, SessionId, SessionSnapshot};
use gridforge_session::{MoveOutcome, OutboundReceiver, PlayerSender, SessionRegistry};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::{GridforgeError, ServerConfig};

/// Builder for configuring a [`GameServer`].
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use gridforge::GameServer;
///
/// let (server, outbound) = GameServer::builder()
///     .wait_window(Duration::from_secs(5))
///     .grace_window(Duration::from_secs(20))
///     .build();
/// # drop((server, outbound));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GameServerBuilder {
    config: ServerConfig,
}

impl GameServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// How long a queued identity waits before getting the synthetic
    /// opponent.
    pub fn wait_window(mut self, window: Duration) -> Self {
        self.config.matchmaking.wait_window = window;
        self
    }

    /// How long a dropped participant has to reconnect.
    pub fn grace_window(mut self, window: Duration) -> Self {
        self.config.lifecycle.grace_window = window;
        self
    }

    /// How long the synthetic opponent waits before replying.
    pub fn synthetic_think_delay(mut self, delay: Duration) -> Self {
        self.config.lifecycle.synthetic_think_delay = delay;
        self
    }

    /// How many forfeited sessions to remember for late reconnects.
    pub fn forfeit_retention(mut self, count: usize) -> Self {
        self.config.forfeit_retention = count;
        self
    }

    /// Builds the server.
    ///
    /// Returns the server and the receiving end of its outbound stream.
    /// Sessions keep running if the receiver is dropped; their
    /// notifications and archive records are then discarded.
    pub fn build(self) -> (GameServer, OutboundReceiver) {
        GameServer::new(self.config)
    }
}

/// Point-in-time counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServerStats {
    /// Identities waiting in the queue.
    pub queued: usize,
    /// Sessions still being played.
    pub live_sessions: usize,
}

/// The Gridforge core: matchmaking plus every live session.
///
/// Cheap to clone; clones share all state. Every method is safe to call
/// concurrently from any number of tasks.
#[derive(Clone)]
pub struct GameServer {
    matchmaker: Matchmaker,
    registry: SessionRegistry,
}

impl GameServer {
    /// Creates a new builder.
    pub fn builder() -> GameServerBuilder {
        GameServerBuilder::new()
    }

    /// Creates a server from `config`.
    pub fn new(config: ServerConfig) -> (Self, OutboundReceiver) {
        let config = config.validated();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let registry = SessionRegistry::new(
            config.lifecycle.clone(),
            outbound_tx,
            config.forfeit_retention,
        );
        let matchmaker = Matchmaker::new(config.matchmaking.clone(), registry.clone());

        tracing::info!(
            wait_ms = config.matchmaking.wait_window.as_millis() as u64,
            grace_ms = config.lifecycle.grace_window.as_millis() as u64,
            think_ms = config.lifecycle.synthetic_think_delay.as_millis() as u64,
            "Gridforge server ready"
        );

        (
            Self {
                matchmaker,
                registry,
            },
            outbound_rx,
        )
    }

    /// Pairs `identity` with a waiting participant or queues it.
    ///
    /// `sender`, if given, receives every notification about the session
    /// the identity ends up in.
    pub async fn join(
        &self,
        identity: Identity,
        sender: Option<PlayerSender>,
    ) -> Result<JoinOutcome, GridforgeError> {
        Ok(self.matchmaker.join(identity, sender).await?)
    }

    /// Takes `identity` out of the wait queue.
    pub async fn leave_queue(&self, identity: &Identity) -> Result<(), GridforgeError> {
        Ok(self.matchmaker.leave(identity).await?)
    }

    /// Drops `identity`'s mark into `column`.
    pub async fn submit_move(
        &self,
        session_id: &SessionId,
        identity: &Identity,
        column: usize,
    ) -> Result<MoveOutcome, GridforgeError> {
        Ok(self.registry.submit_move(session_id, identity, column).await?)
    }

    /// Reports a dropped connection and starts the grace window.
    pub async fn disconnect(
        &self,
        session_id: &SessionId,
        identity: &Identity,
    ) -> Result<(), GridforgeError> {
        Ok(self.registry.disconnect(session_id, identity).await?)
    }

    /// Resumes `identity` inside its grace window and returns the full
    /// session state. `sender` replaces the participant's channel.
    pub async fn reconnect(
        &self,
        session_id: &SessionId,
        identity: &Identity,
        sender: Option<PlayerSender>,
    ) -> Result<SessionSnapshot, GridforgeError> {
        Ok(self.registry.reconnect(session_id, identity, sender).await?)
    }

    /// Reads a live session's state.
    pub async fn snapshot(&self, session_id: &SessionId) -> Result<SessionSnapshot, GridforgeError> {
        Ok(self.registry.snapshot(session_id).await?)
    }

    /// The live session `identity` is playing in, if any.
    pub async fn session_of(&self, identity: &Identity) -> Option<SessionId> {
        self.registry.session_of(identity).await
    }

    /// Current queue and session counts.
    pub async fn stats(&self) -> ServerStats {
        ServerStats {
            queued: self.matchmaker.queued_count().await,
            live_sessions: self.registry.live_count().await,
        }
    }
}
