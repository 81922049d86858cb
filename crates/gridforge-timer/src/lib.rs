//! Cancellable one-shot timers for Gridforge.
//!
//! Every suspension point in the core (the matchmaking wait window, the
//! reconnection grace window, the synthetic opponent's "thinking" delay)
//! is a [`TimerHandle`] stored next to the entity it guards.
//!
//! A timer does not mutate anything itself. When it fires it runs a small
//! future that *delivers an event* to the owner (a command on an actor
//! channel, or a call that takes the owner's lock). The event carries the
//! timer's [`TimerId`], and the owner ignores it unless the id still
//! matches the handle it holds. That gives two guarantees:
//!
//! - cancelling an already-fired timer is a no-op;
//! - a fired timer whose effect was pre-empted (the participant reconnected,
//!   the queue entry was paired) is a no-op.
//!
//! # Integration
//!
//! ```ignore
//! let weak = self_tx.downgrade();
//! let timer = gridforge_timer::schedule(grace, move |id| async move {
//!     if let Some(tx) = weak.upgrade() {
//!         let _ = tx.send(Command::GraceExpired { timer: id }).await;
//!     }
//! });
//! ```
//!
//! Deadlines use [`tokio::time::Instant`], so tests can drive timers with
//! a paused clock.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

/// Counter for generating unique timer IDs.
static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

// ---------------------------------------------------------------------------
// TimerId
// ---------------------------------------------------------------------------

/// Identifies one scheduled timer. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    fn next() -> Self {
        Self(NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TimerHandle
// ---------------------------------------------------------------------------

/// Handle to a scheduled timer.
///
/// Dropping the handle does **not** cancel the timer; call
/// [`cancel`](Self::cancel). Owners always compare ids on delivery, so a
/// leaked timer can only produce an ignored event.
#[derive(Debug)]
pub struct TimerHandle {
    id: TimerId,
    deadline: Instant,
    task: AbortHandle,
}

impl TimerHandle {
    /// This timer's id, as passed to the on-fire callback.
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// When the timer fires (or fired).
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Cancels the timer if it hasn't fired yet.
    ///
    /// Idempotent. Cancelling after the callback has already started has
    /// no effect on the delivered event; the owner's id check covers that.
    pub fn cancel(&self) {
        if !self.task.is_finished() {
            self.task.abort();
            debug!(timer = %self.id, "timer cancelled");
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

/// Schedules `on_fire` to run once after `delay`.
///
/// Must be called from inside a Tokio runtime. A zero delay fires on the
/// next poll of the timer task.
pub fn schedule<F, Fut>(delay: Duration, on_fire: F) -> TimerHandle
where
    F: FnOnce(TimerId) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let id = TimerId::next();
    let deadline = Instant::now() + delay;
    let task = tokio::spawn(async move {
        time::sleep_until(deadline).await;
        trace!(timer = %id, "timer fired");
        on_fire(id).await;
    });

    trace!(timer = %id, in_ms = delay.as_millis() as u64, "timer scheduled");

    TimerHandle {
        id,
        deadline,
        task: task.abort_handle(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_id_display_is_prefixed() {
        let id = TimerId(7);
        assert_eq!(id.to_string(), "T-7");
    }

    #[test]
    fn test_timer_id_next_is_monotonic() {
        let a = TimerId::next();
        let b = TimerId::next();
        assert!(b > a);
    }
}
