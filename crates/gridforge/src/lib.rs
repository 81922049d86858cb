//! # Gridforge
//!
//! Session lifecycle and rule engine for a connect-four game with timing
//! guarantees: every participant is paired (or handed the synthetic
//! opponent) within a bounded wait window, and a participant who drops
//! has a bounded grace window to come back before the game is forfeited.
//!
//! [`GameServer`] ties the layers together:
//!
//! ```text
//! Request → GameServer ─┬→ Matchmaker (wait queue) ─→ SessionRegistry
//!                       └→ SessionRegistry ─→ session actor (board, seats, timers)
//!                                                    │
//!                      OutboundReceiver ←────────────┘ notifications + archive records
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gridforge::prelude::*;
//!
//! # async fn run() -> Result<(), GridforgeError> {
//! let (server, _outbound) = GameServer::builder().build();
//!
//! match server.join(Identity::new("alice"), None).await? {
//!     JoinOutcome::Queued => { /* SessionStarted arrives on the outbound stream */ }
//!     JoinOutcome::Paired { session_id, .. } => {
//!         server.submit_move(&session_id, &Identity::new("alice"), 3).await?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::GridforgeError;
pub use server::{GameServer, GameServerBuilder, ServerStats};

/// Common imports for embedding a Gridforge server.
pub mod prelude {
    pub use crate::{GameServer, GameServerBuilder, GridforgeError, ServerConfig, ServerStats};
    pub use gridforge_matchmaking::{JoinOutcome, MatchmakingConfig};
    pub use gridforge_protocol::{
        Codec, Event, Identity, JsonCodec, Notification, Reply, Request, ResultTag, SessionId,
        SessionSnapshot,
    };
    pub use gridforge_rules::{Board, Grid, Mark};
    pub use gridforge_session::{
        LifecycleConfig, MoveOutcome, Outbound, OutboundReceiver, PlayerSender,
    };
}

/// Installs a `tracing` subscriber that honours `RUST_LOG` (default
/// `info`). Does nothing if a subscriber is already installed.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .try_init();
}
