//! Session actors and the connection lifecycle for Gridforge.
//!
//! Each live session runs as an isolated Tokio task (actor model) that
//! owns its board, both seats, and every timer guarding them. Moves,
//! synthetic replies, disconnects, reconnects and grace expiries all
//! arrive as commands on the actor's channel, so they are applied one at
//! a time in arrival order.
//!
//! # Key types
//!
//! - [`SessionRegistry`]: creates sessions, maps session ids and
//!   identities to live actors, remembers recent forfeits
//! - [`SessionHandle`]: send commands to a running session actor
//! - [`LifecycleConfig`]: grace window, think delay, channel sizing
//! - [`Outbound`]: notifications and archive records for external
//!   collaborators
//!
//! ```text
//! Connected ──(disconnect)──→ Disconnected(deadline) ──(grace expiry)──→ Forfeited
//!     ↑                              │
//!     └─────────(reconnect)──────────┘
//! ```

mod config;
mod error;
mod outbound;
mod participant;
mod registry;
mod session;

pub use config::LifecycleConfig;
pub use error::SessionError;
pub use outbound::{Outbound, OutboundReceiver, OutboundSender, PlayerSender};
pub use registry::{Opponent, SessionRegistry};
pub use session::{MoveOutcome, SessionHandle};
