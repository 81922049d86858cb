//! Unified error type for Gridforge.

use gridforge_matchmaking::MatchError;
use gridforge_protocol::ProtocolError;
use gridforge_rules::RuleError;
use gridforge_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GridforgeError {
    /// The request couldn't be decoded or is malformed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A move, disconnect, or reconnect was refused by its session.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A join or leave was refused by the matchmaker.
    #[error(transparent)]
    Match(#[from] MatchError),
}

impl GridforgeError {
    /// Stable machine-readable code, as sent in [`Reply::Error`].
    ///
    /// [`Reply::Error`]: gridforge_protocol::Reply::Error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Protocol(_) => "PROTOCOL",
            Self::Session(err) => match err {
                SessionError::Rule(RuleError::ColumnOutOfRange { .. }) => "COLUMN_OUT_OF_RANGE",
                SessionError::Rule(RuleError::ColumnFull { .. }) => "COLUMN_FULL",
                SessionError::NotYourTurn => "NOT_YOUR_TURN",
                SessionError::SessionNotFound(_) => "SESSION_NOT_FOUND",
                SessionError::IdentityMismatch { .. } => "IDENTITY_MISMATCH",
                SessionError::GraceWindowExpired { .. } => "GRACE_WINDOW_EXPIRED",
            },
            Self::Match(err) => match err {
                MatchError::DuplicateIdentity(_) => "DUPLICATE_IDENTITY",
                MatchError::NotQueued(_) => "NOT_QUEUED",
            },
        }
    }

    /// `true` for an illegal move (the board was not touched), `false`
    /// for errors about session or queue state.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Session(err) if err.is_validation())
    }
}
