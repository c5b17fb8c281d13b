//! Single-slot timers for coalescing bursts of UI input.
//!
//! A [`TimerSlot`] holds at most one pending task. The host's event loop owns
//! the clock: it passes `now` into [`TimerSlot::schedule`] and
//! [`TimerSlot::poll`], so there is no ambient timer and tests can run on a
//! virtual clock.

use std::time::{Duration, Instant};

/// What happens when a task is scheduled while another is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RearmPolicy {
    /// Cancel the pending task and arm the new one (debounce).
    Restart,
    /// Keep the pending task and drop the new request.
    KeepPending,
}

/// Identifies one arming of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct PendingTimer<T> {
    handle: TimerHandle,
    deadline: Instant,
    task: T,
}

/// A timer slot with room for exactly one pending task.
#[derive(Debug)]
pub struct TimerSlot<T> {
    delay: Duration,
    policy: RearmPolicy,
    pending: Option<PendingTimer<T>>,
    armed: u64,
}

impl<T> TimerSlot<T> {
    pub const fn new(delay: Duration, policy: RearmPolicy) -> Self {
        Self {
            delay,
            policy,
            pending: None,
            armed: 0,
        }
    }

    /// A slot where every request restarts the quiet period.
    pub const fn debounce(delay: Duration) -> Self {
        Self::new(delay, RearmPolicy::Restart)
    }

    /// A slot that fires once per window, measured from the first request.
    pub const fn deferred(delay: Duration) -> Self {
        Self::new(delay, RearmPolicy::KeepPending)
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    pub const fn policy(&self) -> RearmPolicy {
        self.policy
    }

    /// Schedules `task` to fire `delay` after `now`.
    ///
    /// Returns the handle of whichever task is pending afterwards.
    pub fn schedule(&mut self, now: Instant, task: T) -> TimerHandle {
        if let (RearmPolicy::KeepPending, Some(pending)) = (self.policy, &self.pending) {
            tracing::trace!(handle = pending.handle.0, "timer already pending, request dropped");
            return pending.handle;
        }

        if let Some(superseded) = self.cancel() {
            tracing::trace!(handle = superseded.0, "pending timer superseded");
        }

        self.armed += 1;
        let handle = TimerHandle(self.armed);
        self.pending = Some(PendingTimer {
            handle,
            deadline: now + self.delay,
            task,
        });
        tracing::trace!(handle = handle.0, delay = ?self.delay, "timer armed");
        handle
    }

    /// Drops the pending task, if any. A cancelled task never fires.
    pub fn cancel(&mut self) -> Option<TimerHandle> {
        self.pending.take().map(|pending| pending.handle)
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_handle(&self) -> Option<TimerHandle> {
        self.pending.as_ref().map(|pending| pending.handle)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    /// Takes the pending task once its deadline has been reached.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.deadline().is_some_and(|deadline| now >= deadline) {
            self.pending.take().map(|pending| pending.task)
        } else {
            None
        }
    }
}
