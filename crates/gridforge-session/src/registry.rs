//! Session registry: creates sessions and routes requests to them.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Weak};

use gridforge_protocol::{Identity, SessionId, SessionSnapshot};
use gridforge_rules::Mark;
use rand::Rng;
use tokio::sync::Mutex;

use crate::participant::Seat;
use crate::session::spawn_session;
use crate::{LifecycleConfig, MoveOutcome, OutboundSender, PlayerSender, SessionError, SessionHandle};

/// Who sits in seat B of a new session.
#[derive(Debug)]
pub enum Opponent {
    /// A second human, paired from the wait queue.
    Human {
        identity: Identity,
        sender: Option<PlayerSender>,
    },
    /// The synthetic opponent.
    Synthetic,
}

/// A session that ended by forfeit, kept so a late reconnect can be told
/// why the session is gone.
#[derive(Debug)]
struct Tombstone {
    session_id: SessionId,
    participants: [Identity; 2],
    forfeiter: Identity,
}

#[derive(Debug, Default)]
struct RegistryState {
    /// Live sessions, keyed by session id.
    sessions: HashMap<SessionId, SessionHandle>,
    /// Each human identity's live session. At most one per identity.
    by_identity: HashMap<Identity, SessionId>,
    /// Recent forfeits, oldest first.
    forfeits: VecDeque<Tombstone>,
}

struct Shared {
    state: Mutex<RegistryState>,
    config: LifecycleConfig,
    outbound: OutboundSender,
    forfeit_retention: usize,
}

/// Maps session ids and participant identities to live session actors.
///
/// Cheap to clone; every clone sees the same sessions. The lock is never
/// held while waiting on a session actor, since actors take it themselves
/// when they retire.
///
/// The registry owns the only long-lived command senders. Once the last
/// clone is dropped, every live actor's channel closes and the actor stops.
#[derive(Clone)]
pub struct SessionRegistry {
    shared: Arc<Shared>,
}

/// A session actor's back-reference to its registry.
#[derive(Clone)]
pub(crate) struct WeakRegistry {
    shared: Weak<Shared>,
}

impl WeakRegistry {
    pub(crate) fn upgrade(&self) -> Option<SessionRegistry> {
        self.shared.upgrade().map(|shared| SessionRegistry { shared })
    }
}

impl SessionRegistry {
    /// Creates an empty registry.
    ///
    /// Every session it spawns uses `config` and publishes to `outbound`.
    /// Up to `forfeit_retention` forfeited sessions are remembered; 0
    /// disables that.
    pub fn new(config: LifecycleConfig, outbound: OutboundSender, forfeit_retention: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(RegistryState::default()),
                config: config.validated(),
                outbound,
                forfeit_retention,
            }),
        }
    }

    /// The lifecycle config sessions are spawned with.
    pub fn config(&self) -> &LifecycleConfig {
        &self.shared.config
    }

    /// Starts a session with `first` in seat A (moving first) and
    /// `opponent` in seat B. Returns the new session's id.
    ///
    /// Callers are responsible for checking that neither identity already
    /// has a live session.
    pub async fn create(
        &self,
        first: Identity,
        first_sender: Option<PlayerSender>,
        opponent: Opponent,
    ) -> SessionId {
        let seat_a = Seat::human(first, Mark::A, first_sender);
        let seat_b = match opponent {
            Opponent::Human { identity, sender } => Seat::human(identity, Mark::B, sender),
            Opponent::Synthetic => Seat::synthetic(Mark::B),
        };
        let humans: Vec<Identity> = [&seat_a, &seat_b]
            .into_iter()
            .filter(|seat| !seat.synthetic)
            .map(|seat| seat.identity.clone())
            .collect();

        let mut state = self.shared.state.lock().await;
        let session_id = loop {
            let candidate = SessionId::new(generate_session_id());
            if !state.sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        for identity in humans {
            state.by_identity.insert(identity, session_id.clone());
        }

        let handle = spawn_session(
            session_id.clone(),
            [seat_a, seat_b],
            self.shared.config.clone(),
            WeakRegistry {
                shared: Arc::downgrade(&self.shared),
            },
            self.shared.outbound.clone(),
        );
        state.sessions.insert(session_id.clone(), handle);

        tracing::info!(%session_id, live = state.sessions.len(), "session created");
        session_id
    }

    /// Returns `true` if `identity` is seated in a live session.
    pub async fn contains_identity(&self, identity: &Identity) -> bool {
        self.shared.state.lock().await.by_identity.contains_key(identity)
    }

    /// The live session `identity` is seated in, if any.
    pub async fn session_of(&self, identity: &Identity) -> Option<SessionId> {
        self.shared.state.lock().await.by_identity.get(identity).cloned()
    }

    /// Number of live sessions.
    pub async fn live_count(&self) -> usize {
        self.shared.state.lock().await.sessions.len()
    }

    /// Returns a handle to a live session.
    ///
    /// # Errors
    /// [`SessionError::SessionNotFound`] if no live session has this id.
    pub async fn handle(&self, session_id: &SessionId) -> Result<SessionHandle, SessionError> {
        self.shared
            .state
            .lock()
            .await
            .sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::SessionNotFound(session_id.clone()))
    }

    /// Routes a move to its session.
    pub async fn submit_move(
        &self,
        session_id: &SessionId,
        identity: &Identity,
        column: usize,
    ) -> Result<MoveOutcome, SessionError> {
        self.handle(session_id)
            .await?
            .submit_move(identity.clone(), column)
            .await
    }

    /// Routes a disconnect to its session.
    pub async fn disconnect(
        &self,
        session_id: &SessionId,
        identity: &Identity,
    ) -> Result<(), SessionError> {
        self.handle(session_id)
            .await?
            .disconnect(identity.clone())
            .await
    }

    /// Routes a reconnect to its session.
    ///
    /// If the session is gone because `identity` forfeited it, the error
    /// is [`SessionError::GraceWindowExpired`] rather than
    /// [`SessionError::SessionNotFound`].
    pub async fn reconnect(
        &self,
        session_id: &SessionId,
        identity: &Identity,
        sender: Option<PlayerSender>,
    ) -> Result<SessionSnapshot, SessionError> {
        let result = match self.handle(session_id).await {
            Ok(handle) => handle.reconnect(identity.clone(), sender).await,
            Err(err) => Err(err),
        };

        match result {
            Err(SessionError::SessionNotFound(_)) => Err(self.explain_missing(session_id, identity).await),
            other => other,
        }
    }

    /// Reads a live session's state.
    pub async fn snapshot(&self, session_id: &SessionId) -> Result<SessionSnapshot, SessionError> {
        self.handle(session_id).await?.snapshot().await
    }

    /// Called by a session actor once its session has ended.
    pub(crate) async fn retire(
        &self,
        session_id: &SessionId,
        participants: &[Identity; 2],
        forfeiter: Option<Identity>,
    ) {
        let mut state = self.shared.state.lock().await;
        state.sessions.remove(session_id);
        for identity in participants {
            if state.by_identity.get(identity) == Some(session_id) {
                state.by_identity.remove(identity);
            }
        }

        if let Some(forfeiter) = forfeiter {
            if self.shared.forfeit_retention > 0 {
                while state.forfeits.len() >= self.shared.forfeit_retention {
                    state.forfeits.pop_front();
                }
                state.forfeits.push_back(Tombstone {
                    session_id: session_id.clone(),
                    participants: participants.clone(),
                    forfeiter,
                });
            }
        }

        tracing::debug!(%session_id, live = state.sessions.len(), "session retired");
    }

    async fn explain_missing(&self, session_id: &SessionId, identity: &Identity) -> SessionError {
        let state = self.shared.state.lock().await;
        match state.forfeits.iter().find(|t| &t.session_id == session_id) {
            Some(t) if &t.forfeiter == identity => SessionError::GraceWindowExpired {
                identity: identity.clone(),
                session_id: session_id.clone(),
            },
            Some(t) if !t.participants.contains(identity) => SessionError::IdentityMismatch {
                identity: identity.clone(),
                session_id: session_id.clone(),
            },
            _ => SessionError::SessionNotFound(session_id.clone()),
        }
    }
}

/// Generates a random 32-character hex session id (128 bits).
fn generate_session_id() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_session_id_is_32_hex_chars() {
        let id = generate_session_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_session_id_is_unique() {
        assert_ne!(generate_session_id(), generate_session_id());
    }
}
