//! Virtual-time timer queue. Nothing fires on its own: the owner asks for due
//! entries up to a point in time, so tests can step the clock deterministically
//! and the GUI can feed it a monotonic clock once per frame.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<T> {
    id: TimerId,
    due: Duration,
    /// Scheduling order, used to break ties between entries due at the same instant.
    seq: u64,
    period: Option<Duration>,
    payload: T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    next_seq: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            next_seq: 0,
            entries: Vec::new(),
        }
    }
}

impl<T: Clone> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fire `payload` once, `delay` after the current time.
    pub fn schedule_once(&mut self, delay: Duration, payload: T) -> TimerId {
        self.push(delay, None, payload)
    }

    /// Fire `payload` every `period`, first at `now + period`. A zero period is
    /// bumped to one millisecond so the queue always makes progress.
    pub fn schedule_repeating(&mut self, period: Duration, payload: T) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.push(period, Some(period), payload)
    }

    /// Returns false when the timer already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Pops the earliest entry due at or before `until`, moving the clock to its
    /// due time. Repeating entries are re-armed one period later.
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= until)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(idx, _)| idx)?;

        self.now = self.now.max(self.entries[idx].due);
        match self.entries[idx].period {
            Some(period) => {
                let seq = self.bump_seq();
                let entry = &mut self.entries[idx];
                entry.due += period;
                entry.seq = seq;
                Some(entry.payload.clone())
            }
            None => Some(self.entries.swap_remove(idx).payload),
        }
    }

    /// Moves the clock forward without firing anything. Call after draining
    /// [`pop_due`](Self::pop_due).
    pub fn advance_clock(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    fn push(&mut self, delay: Duration, period: Option<Duration>, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let seq = self.bump_seq();
        self.entries.push(Entry {
            id,
            due: self.now + delay,
            seq,
            period,
            payload,
        });
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
