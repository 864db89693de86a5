//! Deterministic repeating-timer queue.
//!
//! The host event loop (or a test) owns time: it calls
//! [`TimerQueue::pop_due`] with the instant it has advanced to, and gets
//! back the timers that fired, one at a time, in due order. Repeating
//! timers are re-armed before they are returned, so a handler may cancel
//! its own timer while it runs.

use std::collections::BTreeMap;
use std::time::Duration;

/// Opaque handle to an armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// `due_at` is `None` once the next firing would fall past the end of the
/// clock.
#[derive(Debug, Clone)]
struct Timer {
    due_at: Option<u64>,
    period: u64,
}

impl Timer {
    fn due_by(&self, until_ms: u64) -> bool {
        self.due_at.is_some_and(|due| due <= until_ms)
    }
}

/// Repeating timers on a virtual millisecond clock.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now_ms: u64,
    next_id: u64,
    timers: BTreeMap<TimerId, Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Arm a timer that first fires one `period` from now, then every
    /// `period` after that. A zero period is treated as one millisecond.
    pub fn arm(&mut self, period: Duration) -> TimerId {
        let period = u64::try_from(period.as_millis()).unwrap_or(u64::MAX).max(1);
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.insert(
            id,
            Timer {
                due_at: self.now_ms.checked_add(period),
                period,
            },
        );
        id
    }

    /// Cancel a timer. Returns whether it was armed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    pub fn armed_count(&self) -> usize {
        self.timers.len()
    }

    /// Fire the earliest timer due at or before `until_ms`.
    ///
    /// Moves the clock to that timer's due time, re-arms it for its next
    /// period, and returns its id. Returns `None` once nothing is due, after
    /// moving the clock to `until_ms`. Ties fire in arming order.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TimerId> {
        let next = self
            .timers
            .iter()
            .filter(|(_, t)| t.due_by(until_ms))
            .min_by_key(|(id, t)| (t.due_at, **id))
            .map(|(id, _)| *id);

        match next {
            Some(id) => {
                if let Some(timer) = self.timers.get_mut(&id)
                    && let Some(due) = timer.due_at
                {
                    self.now_ms = self.now_ms.max(due);
                    timer.due_at = due.checked_add(timer.period);
                }
                Some(id)
            }
            None => {
                self.now_ms = self.now_ms.max(until_ms);
                None
            }
        }
    }

    /// How many times timer `id` fires between now and `until_ms`.
    pub fn due_count(&self, id: TimerId, until_ms: u64) -> u64 {
        match self.timers.get(&id).and_then(|t| Some((t.due_at?, t.period))) {
            Some((due, period)) if due <= until_ms => (until_ms - due) / period + 1,
            _ => 0,
        }
    }

    /// Push timer `id` forward by `periods` whole periods without firing it.
    pub fn skip(&mut self, id: TimerId, periods: u64) {
        if let Some(timer) = self.timers.get_mut(&id) {
            timer.due_at = timer
                .due_at
                .and_then(|due| due.checked_add(periods.checked_mul(timer.period)?));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(queue: &mut TimerQueue, until: u64) -> Vec<(TimerId, u64)> {
        let mut fired = Vec::new();
        while let Some(id) = queue.pop_due(until) {
            fired.push((id, queue.now_ms()));
        }
        fired
    }

    #[test]
    fn timer_fires_every_period() {
        let mut q = TimerQueue::new();
        let id = q.arm(Duration::from_millis(100));
        let fired = drain(&mut q, 350);
        assert_eq!(fired, vec![(id, 100), (id, 200), (id, 300)]);
        assert_eq!(q.now_ms(), 350);
    }

    #[test]
    fn nothing_due_before_first_period() {
        let mut q = TimerQueue::new();
        q.arm(Duration::from_millis(100));
        assert!(drain(&mut q, 99).is_empty());
        assert_eq!(q.now_ms(), 99);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut q = TimerQueue::new();
        let id = q.arm(Duration::from_millis(10));
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert!(drain(&mut q, 1000).is_empty());
    }

    #[test]
    fn timers_interleave_in_due_order() {
        let mut q = TimerQueue::new();
        let a = q.arm(Duration::from_millis(30));
        let b = q.arm(Duration::from_millis(20));
        let order: Vec<TimerId> = drain(&mut q, 60).into_iter().map(|(id, _)| id).collect();
        // b@20, a@30, b@40, a@60 and b@60 tie -> arming order (a first)
        assert_eq!(order, vec![b, a, b, a, b]);
    }

    #[test]
    fn timer_armed_later_starts_from_current_time() {
        let mut q = TimerQueue::new();
        drain(&mut q, 500);
        let id = q.arm(Duration::from_millis(100));
        assert_eq!(drain(&mut q, 600), vec![(id, 600)]);
    }

    #[test]
    fn skipped_periods_do_not_fire() {
        let mut q = TimerQueue::new();
        let id = q.arm(Duration::from_millis(100));
        assert_eq!(q.due_count(id, 1_050), 10);
        q.skip(id, 8);
        assert_eq!(drain(&mut q, 1_050), vec![(id, 900), (id, 1_000)]);
    }

    #[test]
    fn clock_saturates_at_the_end_of_time() {
        let mut q = TimerQueue::new();
        let id = q.arm(Duration::from_millis(100));
        q.skip(id, u64::MAX / 100 - 1);
        let fired = drain(&mut q, u64::MAX);
        assert_eq!(fired.len(), 1);
        assert_eq!(q.now_ms(), u64::MAX);
        assert!(q.is_armed(id));
        assert_eq!(q.due_count(id, u64::MAX), 0);

        let late = q.arm(Duration::from_millis(100));
        assert!(drain(&mut q, u64::MAX).is_empty());
        assert!(q.is_armed(late));
    }

    #[test]
    fn handler_can_cancel_its_own_timer() {
        let mut q = TimerQueue::new();
        let id = q.arm(Duration::from_millis(10));
        assert_eq!(q.pop_due(100), Some(id));
        q.cancel(id);
        assert_eq!(q.pop_due(100), None);
    }
}
