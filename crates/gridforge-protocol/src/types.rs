//! Identity and snapshot types shared by every layer.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use gridforge_rules::{Board, Mark};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A participant's identity (their username).
///
/// Newtype wrapper so an identity can't be confused with a session id,
/// even though both are strings underneath. `#[serde(transparent)]`
/// serializes it as the bare string: `"alice"`, not `{"0":"alice"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub String);

impl Identity {
    /// The identity the synthetic opponent plays under.
    pub const SYNTHETIC: &'static str = "synthetic-opponent";

    /// Wraps a username.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The synthetic opponent's identity.
    pub fn synthetic() -> Self {
        Self::new(Self::SYNTHETIC)
    }

    /// The username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A unique identifier for a session (one game instance).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Result / status
// ---------------------------------------------------------------------------

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultTag {
    /// Four in a row.
    Win,
    /// Board filled with no winner.
    Draw,
    /// A participant failed to reconnect within the grace window.
    Forfeit,
}

impl fmt::Display for ResultTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Win => write!(f, "win"),
            Self::Draw => write!(f, "draw"),
            Self::Forfeit => write!(f, "forfeit"),
        }
    }
}

/// Whether a session is still being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Ended,
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// One seat at the board, as seen from outside the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    pub identity: Identity,
    pub mark: Mark,
    /// `true` for the synthetic opponent.
    pub synthetic: bool,
    /// `false` while the participant is inside their grace window.
    pub connected: bool,
}

/// Everything a client needs to restore a session after reconnecting:
/// the board (grid + move log), whose turn it is, and who is seated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    /// Seat A first, seat B second.
    pub participants: [ParticipantInfo; 2],
    pub board: Board,
    pub turn: Mark,
    pub status: SessionStatus,
    /// `true` while the synthetic opponent's reply is pending.
    pub awaiting_synthetic: bool,
}

/// Milliseconds since the Unix epoch, for notification and archive
/// timestamps. A clock set before 1970 reads as 0.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
