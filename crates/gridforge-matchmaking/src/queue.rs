//! The wait queue.

use std::collections::VecDeque;

use gridforge_protocol::Identity;
use gridforge_session::PlayerSender;
use gridforge_timer::{TimerHandle, TimerId};
use tokio::time::Instant;

/// One identity waiting for an opponent.
#[derive(Debug)]
pub(crate) struct QueueEntry {
    pub(crate) identity: Identity,
    pub(crate) sender: Option<PlayerSender>,
    pub(crate) joined_at: Instant,
    /// Fires when the wait window runs out.
    pub(crate) timer: TimerHandle,
}

/// Identities waiting for an opponent, in join order. At most one entry
/// per identity.
#[derive(Debug, Default)]
pub(crate) struct WaitQueue {
    entries: VecDeque<QueueEntry>,
}

impl WaitQueue {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn contains(&self, identity: &Identity) -> bool {
        self.entries.iter().any(|entry| &entry.identity == identity)
    }

    pub(crate) fn push(&mut self, entry: QueueEntry) {
        debug_assert!(!self.contains(&entry.identity));
        self.entries.push_back(entry);
    }

    /// Takes the longest-waiting entry.
    pub(crate) fn pop_front(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    pub(crate) fn remove(&mut self, identity: &Identity) -> Option<QueueEntry> {
        let idx = self.entries.iter().position(|entry| &entry.identity == identity)?;
        self.entries.remove(idx)
    }

    /// Removes `identity`'s entry only if it is still guarded by `timer`.
    /// `None` means the timer was pre-empted (paired, left, or re-queued).
    pub(crate) fn take_if_current(&mut self, identity: &Identity, timer: TimerId) -> Option<QueueEntry> {
        let idx = self
            .entries
            .iter()
            .position(|entry| &entry.identity == identity && entry.timer.id() == timer)?;
        self.entries.remove(idx)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn entry(name: &str) -> QueueEntry {
        QueueEntry {
            identity: Identity::new(name),
            sender: None,
            joined_at: Instant::now(),
            timer: gridforge_timer::schedule(Duration::from_secs(60), |_| async {}),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pop_front_returns_join_order() {
        let mut queue = WaitQueue::default();
        queue.push(entry("alice"));
        queue.push(entry("bob"));

        assert_eq!(queue.pop_front().unwrap().identity, Identity::new("alice"));
        assert_eq!(queue.pop_front().unwrap().identity, Identity::new("bob"));
        assert!(queue.pop_front().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_missing_identity_returns_none() {
        let mut queue = WaitQueue::default();
        queue.push(entry("alice"));

        assert!(queue.remove(&Identity::new("bob")).is_none());
        assert!(queue.remove(&Identity::new("alice")).is_some());
        assert_eq!(queue.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_if_current_ignores_stale_timer() {
        let mut queue = WaitQueue::default();
        let first = entry("alice");
        let stale = first.timer.id();
        queue.push(first);
        let replaced = queue.remove(&Identity::new("alice")).unwrap();
        replaced.timer.cancel();
        queue.push(entry("alice"));

        assert!(queue.take_if_current(&Identity::new("alice"), stale).is_none());
        assert!(queue.contains(&Identity::new("alice")));
    }
}
