//! Error types for the matchmaking layer.

use gridforge_protocol::Identity;

/// Errors returned by [`Matchmaker`](crate::Matchmaker) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// The identity is already queued, already seated in a live
    /// session, or reserved for the synthetic opponent.
    #[error("{0} is already queued or playing")]
    DuplicateIdentity(Identity),

    /// `leave` for an identity that isn't in the wait queue.
    #[error("{0} is not in the wait queue")]
    NotQueued(Identity),
}
