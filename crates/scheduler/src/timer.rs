//! Typed deadline queue
//!
//! Holds payloads until their deadline passes, then hands them back to the
//! caller in order. The queue never runs anything itself; the host pumps it
//! with [`TimerQueue::advance`] whenever its notion of "now" moves. Entries
//! carry a [`CancellationToken`]; cancelled entries are dropped silently when
//! they come due.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Instant;

use crate::cancel::CancellationToken;

/// One queued payload with its deadline.
struct Entry<T> {
    due: Instant,
    /// Insertion sequence; breaks ties so same-deadline entries keep FIFO order.
    seq: u64,
    token: CancellationToken,
    payload: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due.cmp(&other.due).then(self.seq.cmp(&other.seq))
    }
}

/// Deadline queue of typed payloads
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
/// use overmark_scheduler::TimerQueue;
///
/// let mut timers: TimerQueue<u32> = TimerQueue::new();
/// let start = Instant::now();
///
/// timers.schedule(start + Duration::from_millis(5), 1);
/// let token = timers.schedule(start + Duration::from_millis(5), 2);
/// token.cancel();
///
/// // Only the live entry comes back once the deadline has passed.
/// assert_eq!(timers.advance(start + Duration::from_millis(5)), vec![1]);
/// ```
pub struct TimerQueue<T> {
    entries: BinaryHeap<Reverse<Entry<T>>>,
    next_seq: u64,
}

impl<T> TimerQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            entries: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Queue `payload` to come due at `due`.
    ///
    /// Returns a token; cancelling it prevents the payload from ever being
    /// returned by [`advance`](Self::advance).
    pub fn schedule(&mut self, due: Instant, payload: T) -> CancellationToken {
        let token = CancellationToken::new();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Reverse(Entry {
            due,
            seq,
            token: token.clone(),
            payload,
        }));
        token
    }

    /// Drain every entry due at or before `now`.
    ///
    /// Due entries are returned in deadline order (insertion order within a
    /// deadline); cancelled entries are discarded.
    pub fn advance(&mut self, now: Instant) -> Vec<T> {
        let mut due = Vec::new();
        while self
            .entries
            .peek()
            .is_some_and(|Reverse(entry)| entry.due <= now)
        {
            if let Some(Reverse(entry)) = self.entries.pop() {
                if !entry.token.is_cancelled() {
                    due.push(entry.payload);
                }
            }
        }
        due
    }

    /// Deadline of the earliest queued entry, if any.
    ///
    /// Cancelled entries still occupy the queue until their deadline passes,
    /// so this can report a deadline whose `advance` yields nothing.
    pub fn next_due(&self) -> Option<Instant> {
        self.entries.peek().map(|Reverse(entry)| entry.due)
    }

    /// Number of queued entries, including not-yet-reaped cancelled ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every queued entry without returning it.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base() -> Instant {
        Instant::now()
    }

    #[test]
    fn test_nothing_due_before_deadline() {
        let start = base();
        let mut timers = TimerQueue::new();
        timers.schedule(start + Duration::from_millis(10), "a");

        assert!(timers.advance(start).is_empty());
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_due_at_exact_deadline() {
        let start = base();
        let mut timers = TimerQueue::new();
        timers.schedule(start + Duration::from_millis(10), "a");

        assert_eq!(timers.advance(start + Duration::from_millis(10)), vec!["a"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_deadline_then_fifo_order() {
        let start = base();
        let mut timers = TimerQueue::new();
        timers.schedule(start + Duration::from_millis(20), "late");
        timers.schedule(start + Duration::from_millis(10), "early-1");
        timers.schedule(start + Duration::from_millis(10), "early-2");

        let due = timers.advance(start + Duration::from_millis(30));
        assert_eq!(due, vec!["early-1", "early-2", "late"]);
    }

    #[test]
    fn test_cancelled_entry_is_skipped() {
        let start = base();
        let mut timers = TimerQueue::new();
        timers.schedule(start + Duration::from_millis(10), 1);
        let token = timers.schedule(start + Duration::from_millis(10), 2);
        timers.schedule(start + Duration::from_millis(10), 3);

        token.cancel();

        assert_eq!(timers.advance(start + Duration::from_millis(10)), vec![1, 3]);
    }

    #[test]
    fn test_partial_drain_keeps_future_entries() {
        let start = base();
        let mut timers = TimerQueue::new();
        timers.schedule(start + Duration::from_millis(10), "now");
        timers.schedule(start + Duration::from_millis(50), "later");

        assert_eq!(timers.advance(start + Duration::from_millis(10)), vec!["now"]);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.next_due(), Some(start + Duration::from_millis(50)));
    }

    #[test]
    fn test_clear() {
        let start = base();
        let mut timers = TimerQueue::new();
        timers.schedule(start, "a");
        timers.schedule(start, "b");

        timers.clear();
        assert!(timers.is_empty());
        assert!(timers.advance(start + Duration::from_secs(1)).is_empty());
    }
}
