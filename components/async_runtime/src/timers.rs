//! Host timer queue backing `setTimeout` and `setInterval`.
//!
//! The queue only orders deadlines; it never sleeps or runs callbacks. The
//! caller passes the current instant and invokes whatever comes back due,
//! which keeps the queue deterministic under test.

use std::time::{Duration, Instant};

/// Identifier returned to JavaScript by `setTimeout`/`setInterval`.
pub type TimerId = u32;

/// Shortest repeat period of an interval timer.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug)]
struct Timer<T> {
    id: TimerId,
    due: Instant,
    seq: u64,
    interval: Option<Duration>,
    payload: T,
}

/// A timer whose deadline has passed.
#[derive(Debug, Clone, PartialEq)]
pub struct DueTimer<T> {
    /// The timer's id
    pub id: TimerId,
    /// What was scheduled
    pub payload: T,
}

/// Pending timers ordered by deadline, ties broken by scheduling order.
///
/// # Examples
///
/// ```
/// use async_runtime::TimerQueue;
/// use std::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let mut timers = TimerQueue::new();
/// let late = timers.set_timeout("late", Duration::from_millis(20), start);
/// timers.set_timeout("early", Duration::from_millis(10), start);
///
/// assert!(timers.pop_due(start).is_none());
/// let later = start + Duration::from_millis(25);
/// assert_eq!(timers.pop_due(later).unwrap().payload, "early");
/// assert_eq!(timers.pop_due(later).unwrap().id, late);
/// assert!(timers.is_empty());
/// ```
#[derive(Debug)]
pub struct TimerQueue<T> {
    timers: Vec<Timer<T>>,
    next_id: TimerId,
    next_seq: u64,
}

impl<T> TimerQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 1,
            next_seq: 0,
        }
    }

    /// Schedules a one-shot timer.
    pub fn set_timeout(&mut self, payload: T, delay: Duration, now: Instant) -> TimerId {
        self.schedule(payload, delay, None, now)
    }

    /// Schedules a repeating timer.
    pub fn set_interval(&mut self, payload: T, period: Duration, now: Instant) -> TimerId {
        let period = period.max(MIN_INTERVAL);
        self.schedule(payload, period, Some(period), now)
    }

    fn schedule(&mut self, payload: T, delay: Duration, interval: Option<Duration>, now: Instant) -> TimerId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Timer {
            id,
            due: now + delay,
            seq,
            interval,
            payload,
        });
        id
    }

    /// Cancels a timer. Unknown ids are ignored, as in JavaScript.
    pub fn clear(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    /// Drops every pending timer.
    pub fn clear_all(&mut self) {
        self.timers.clear();
    }

    /// The earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|timer| timer.due).min()
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Returns true if no timer is pending.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    fn earliest_due(&self, now: Instant) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= now)
            .min_by_key(|(_, timer)| (timer.due, timer.seq))
            .map(|(index, _)| index)
    }
}

impl<T: Clone> TimerQueue<T> {
    /// Takes the earliest timer due at `now`.
    ///
    /// Intervals are rescheduled one period later before being returned, so
    /// clearing an interval from its own callback works.
    pub fn pop_due(&mut self, now: Instant) -> Option<DueTimer<T>> {
        let index = self.earliest_due(now)?;
        match self.timers[index].interval {
            Some(period) => {
                let seq = self.next_seq;
                self.next_seq += 1;
                let timer = &mut self.timers[index];
                timer.due = now.max(timer.due) + period;
                timer.seq = seq;
                Some(DueTimer {
                    id: timer.id,
                    payload: timer.payload.clone(),
                })
            }
            None => {
                let timer = self.timers.swap_remove(index);
                Some(DueTimer {
                    id: timer.id,
                    payload: timer.payload,
                })
            }
        }
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
