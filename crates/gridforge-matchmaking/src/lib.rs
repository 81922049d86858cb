//! Matchmaking for Gridforge.
//!
//! The [`Matchmaker`] owns the wait queue. A joining identity is paired
//! with the longest-waiting entry if there is one; otherwise it waits, and
//! when its wait window runs out it is seated against the synthetic
//! opponent.
//!
//! ```text
//! IDLE ──join──→ QUEUED ──(another join)──→ PAIRED
//!                  │
//!                  ├──(wait window)──→ SYNTHETIC_ASSIGNED
//!                  └──(leave)──→ IDLE
//! ```
//!
//! Pairing and wait-window expiry both run under the queue lock and both
//! remove the entry they act on, so exactly one of them wins for any
//! given identity.

mod config;
mod error;
mod matchmaker;
mod queue;

pub use config::MatchmakingConfig;
pub use error::MatchError;
pub use matchmaker::{JoinOutcome, Matchmaker};
