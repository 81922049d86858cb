//! The matchmaking coordinator.

use std::sync::Arc;

use gridforge_protocol::{Identity, SessionId};
use gridforge_session::{Opponent, PlayerSender, SessionRegistry};
use gridforge_timer::TimerId;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::queue::{QueueEntry, WaitQueue};
use crate::{MatchError, MatchmakingConfig};

/// What happened to a join request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Nobody was waiting; the wait window has started.
    Queued,

    /// Paired with `opponent`, who had been waiting and takes seat A.
    Paired {
        session_id: SessionId,
        opponent: Identity,
    },
}

struct Shared {
    queue: Mutex<WaitQueue>,
    registry: SessionRegistry,
    config: MatchmakingConfig,
}

/// Owns the wait queue and creates sessions through the registry.
///
/// Cheap to clone. Lock order is always queue, then registry; the session
/// actors only ever take the registry lock, so this can't deadlock.
#[derive(Clone)]
pub struct Matchmaker {
    shared: Arc<Shared>,
}

impl Matchmaker {
    /// Creates a matchmaker that seats paired identities via `registry`.
    pub fn new(config: MatchmakingConfig, registry: SessionRegistry) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(WaitQueue::default()),
                registry,
                config,
            }),
        }
    }

    /// The registry sessions are created in.
    pub fn registry(&self) -> &SessionRegistry {
        &self.shared.registry
    }

    /// Pairs `identity` with the longest-waiting entry, or queues it.
    ///
    /// `sender` receives notifications about the eventual session.
    ///
    /// # Errors
    /// [`MatchError::DuplicateIdentity`] if the identity is already
    /// queued, already playing, or is the synthetic opponent's name.
    pub async fn join(
        &self,
        identity: Identity,
        sender: Option<PlayerSender>,
    ) -> Result<JoinOutcome, MatchError> {
        if identity.as_str() == Identity::SYNTHETIC {
            return Err(MatchError::DuplicateIdentity(identity));
        }

        let mut queue = self.shared.queue.lock().await;
        if queue.contains(&identity) || self.shared.registry.contains_identity(&identity).await {
            debug!(%identity, "join rejected: duplicate identity");
            return Err(MatchError::DuplicateIdentity(identity));
        }

        if let Some(waiting) = queue.pop_front() {
            waiting.timer.cancel();
            let opponent = waiting.identity.clone();
            let waited_ms = waiting.joined_at.elapsed().as_millis() as u64;
            let session_id = self
                .shared
                .registry
                .create(
                    waiting.identity,
                    waiting.sender,
                    Opponent::Human {
                        identity: identity.clone(),
                        sender,
                    },
                )
                .await;

            info!(%session_id, first = %opponent, second = %identity, waited_ms, "paired");
            return Ok(JoinOutcome::Paired {
                session_id,
                opponent,
            });
        }

        let shared = Arc::downgrade(&self.shared);
        let expiring = identity.clone();
        let timer = gridforge_timer::schedule(self.shared.config.wait_window, move |timer| async move {
            if let Some(shared) = shared.upgrade() {
                Matchmaker { shared }.expire(expiring, timer).await;
            }
        });

        queue.push(QueueEntry {
            identity: identity.clone(),
            sender,
            joined_at: Instant::now(),
            timer,
        });
        info!(
            %identity,
            queued = queue.len(),
            wait_ms = self.shared.config.wait_window.as_millis() as u64,
            "queued"
        );
        Ok(JoinOutcome::Queued)
    }

    /// Takes `identity` out of the wait queue.
    ///
    /// # Errors
    /// [`MatchError::NotQueued`] if it isn't queued (including when it was
    /// already paired or given the synthetic opponent).
    pub async fn leave(&self, identity: &Identity) -> Result<(), MatchError> {
        let mut queue = self.shared.queue.lock().await;
        let entry = queue
            .remove(identity)
            .ok_or_else(|| MatchError::NotQueued(identity.clone()))?;
        entry.timer.cancel();

        info!(%identity, queued = queue.len(), "left queue");
        Ok(())
    }

    /// Number of identities currently waiting.
    pub async fn queued_count(&self) -> usize {
        self.shared.queue.lock().await.len()
    }

    /// Whether `identity` is currently waiting.
    pub async fn is_queued(&self, identity: &Identity) -> bool {
        self.shared.queue.lock().await.contains(identity)
    }

    /// Wait-window expiry for `identity`. No-op unless the entry is still
    /// guarded by `timer`.
    async fn expire(&self, identity: Identity, timer: TimerId) {
        let mut queue = self.shared.queue.lock().await;
        let Some(entry) = queue.take_if_current(&identity, timer) else {
            debug!(%identity, %timer, "wait timer pre-empted");
            return;
        };

        let waited_ms = entry.joined_at.elapsed().as_millis() as u64;
        let session_id = self
            .shared
            .registry
            .create(entry.identity, entry.sender, Opponent::Synthetic)
            .await;
        info!(
            %session_id,
            %identity,
            waited_ms,
            "wait window expired, synthetic opponent assigned"
        );
    }
}
