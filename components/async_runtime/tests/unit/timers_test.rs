//! Unit tests for TimerQueue

use async_runtime::TimerQueue;
use std::time::{Duration, Instant};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn new_queue_is_empty() {
    let timers: TimerQueue<()> = TimerQueue::new();
    assert!(timers.is_empty());
    assert_eq!(timers.next_deadline(), None);
}

#[test]
fn timeouts_fire_in_deadline_order() {
    let start = Instant::now();
    let mut timers = TimerQueue::new();
    timers.set_timeout("c", ms(30), start);
    timers.set_timeout("a", ms(10), start);
    timers.set_timeout("b", ms(20), start);

    let mut fired = Vec::new();
    while let Some(due) = timers.pop_due(start + ms(30)) {
        fired.push(due.payload);
    }
    assert_eq!(fired, vec!["a", "b", "c"]);
}

#[test]
fn timeout_not_due_stays_pending() {
    let start = Instant::now();
    let mut timers = TimerQueue::new();
    timers.set_timeout((), ms(50), start);
    assert!(timers.pop_due(start + ms(49)).is_none());
    assert_eq!(timers.len(), 1);
    assert_eq!(timers.next_deadline(), Some(start + ms(50)));
}

#[test]
fn cleared_timeout_never_fires() {
    let start = Instant::now();
    let mut timers = TimerQueue::new();
    let id = timers.set_timeout((), ms(5), start);
    assert!(timers.clear(id));
    assert!(timers.pop_due(start + ms(10)).is_none());
}

#[test]
fn interval_interleaves_with_timeouts() {
    let start = Instant::now();
    let mut timers = TimerQueue::new();
    timers.set_interval("tick", ms(10), start);
    timers.set_timeout("once", ms(15), start);

    let mut fired = Vec::new();
    for step in [10, 15, 20] {
        while let Some(due) = timers.pop_due(start + ms(step)) {
            fired.push(due.payload);
        }
    }
    assert_eq!(fired, vec!["tick", "once", "tick"]);
    assert_eq!(timers.len(), 1);
}

#[test]
fn clear_all_drops_everything() {
    let start = Instant::now();
    let mut timers = TimerQueue::new();
    timers.set_interval((), ms(1), start);
    timers.set_timeout((), ms(1), start);
    timers.clear_all();
    assert!(timers.is_empty());
}
