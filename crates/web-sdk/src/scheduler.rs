//! Single-threaded timer queue with virtual time.
//!
//! Tasks are scheduled relative to the queue's own clock and only run when
//! the owner advances it, so delayed work is deterministic in tests.

use std::time::Duration;

#[derive(Debug)]
struct Timer<T> {
    due: Duration,
    seq: u64,
    task: T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    now: Duration,
    next_seq: u64,
    timers: Vec<Timer<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            timers: Vec::new(),
        }
    }

    /// Virtual time elapsed since the queue was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule_after(&mut self, delay: Duration, task: T) {
        let timer = Timer {
            due: self.now + delay,
            seq: self.next_seq,
            task,
        };
        self.next_seq += 1;
        self.timers.push(timer);
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Move time forward and return the tasks that became due, ordered by
    /// due time then scheduling order.
    pub fn advance(&mut self, by: Duration) -> Vec<T> {
        self.now += by;
        let now = self.now;

        let (mut due, waiting): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.timers)
                .into_iter()
                .partition(|timer| timer.due <= now);
        self.timers = waiting;

        due.sort_by_key(|timer| (timer.due, timer.seq));
        due.into_iter().map(|timer| timer.task).collect()
    }
}
