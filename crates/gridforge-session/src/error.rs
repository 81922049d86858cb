//! Error types for the session layer.

use gridforge_protocol::{Identity, SessionId};
use gridforge_rules::RuleError;

/// Errors returned synchronously by session operations.
///
/// None of these change the session: a rejected move leaves the board
/// untouched and a rejected reconnect leaves the grace timer running.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The move itself is illegal (column out of range or full).
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// It's the other participant's turn, or the synthetic opponent's
    /// reply is still pending.
    #[error("not your turn")]
    NotYourTurn,

    /// No live session has this id. Also returned once a session has
    /// ended and its actor has stopped.
    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    /// The identity isn't a human participant of this session.
    #[error("{identity} is not a participant of session {session_id}")]
    IdentityMismatch {
        identity: Identity,
        session_id: SessionId,
    },

    /// The reconnect arrived after the grace deadline.
    #[error("grace window expired for {identity} in session {session_id}")]
    GraceWindowExpired {
        identity: Identity,
        session_id: SessionId,
    },
}

impl SessionError {
    /// `true` for errors about the move itself rather than session state.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Rule(_))
    }
}
