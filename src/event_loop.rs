//! Single-threaded cooperative timer loop on a virtual millisecond clock.
//!
//! Timers run to completion one at a time on whichever thread owns the loop.
//! Callbacks receive the page `Document` mutably, which is the only state a
//! deferred page action can touch.

use crate::dom::Document;
use crate::{Error, Result};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;

/// Deferred action scheduled against a page
pub type TimerCallback = Box<dyn FnOnce(&mut Document) + Send>;

/// Handle returned by `set_timeout`; ids are never reused within a loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

pub struct EventLoop {
    now_ms: u64,
    next_id: u64,
    // (deadline, id): ids grow with scheduling order, so equal deadlines pop FIFO
    queue: BinaryHeap<Reverse<(u64, u64)>>,
    callbacks: HashMap<u64, TimerCallback>,
    iteration_limit: u64,
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("now_ms", &self.now_ms)
            .field("pending", &self.callbacks.len())
            .finish()
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl EventLoop {
    /// `iteration_limit` caps how many callbacks `run_until_idle` may run (0 => unlimited)
    pub fn new(iteration_limit: u64) -> Self {
        Self {
            now_ms: 0,
            next_id: 1,
            queue: BinaryHeap::new(),
            callbacks: HashMap::new(),
            iteration_limit,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `callback` to run once, `delay_ms` after the current time
    pub fn set_timeout<F>(&mut self, delay_ms: u64, callback: F) -> TimerId
    where
        F: FnOnce(&mut Document) + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        let deadline = self.now_ms.saturating_add(delay_ms);
        self.queue.push(Reverse((deadline, id)));
        self.callbacks.insert(id, Box::new(callback));
        TimerId(id)
    }

    /// Cancel a pending timer. Returns false when it already ran or was cleared.
    pub fn clear_timeout(&mut self, id: TimerId) -> bool {
        self.callbacks.remove(&id.0).is_some()
    }

    /// Number of timers still waiting to run
    pub fn pending(&self) -> usize {
        self.callbacks.len()
    }

    /// Deadline of the earliest live timer
    pub fn next_deadline(&mut self) -> Option<u64> {
        self.discard_cleared();
        self.queue.peek().map(|Reverse((deadline, _))| *deadline)
    }

    fn discard_cleared(&mut self) {
        while let Some(Reverse((_, id))) = self.queue.peek() {
            if self.callbacks.contains_key(id) {
                break;
            }
            self.queue.pop();
        }
    }

    // Pop the next live timer due at or before `limit`.
    fn pop_due(&mut self, limit: u64) -> Option<(u64, TimerCallback)> {
        loop {
            let Reverse((deadline, id)) = *self.queue.peek()?;
            if deadline > limit {
                return None;
            }
            self.queue.pop();
            if let Some(cb) = self.callbacks.remove(&id) {
                return Some((deadline, cb));
            }
        }
    }

    /// Run every timer due at or before `target_ms`, then set the clock to
    /// `target_ms`. Returns the number of callbacks run. The clock never
    /// moves backwards.
    pub fn advance_to(&mut self, target_ms: u64, document: &mut Document) -> usize {
        let target_ms = target_ms.max(self.now_ms);
        let mut ran = 0;
        while let Some((deadline, cb)) = self.pop_due(target_ms) {
            self.now_ms = self.now_ms.max(deadline);
            cb(document);
            ran += 1;
        }
        self.now_ms = target_ms;
        ran
    }

    /// Advance the clock by `delta_ms`
    pub fn tick(&mut self, delta_ms: u64, document: &mut Document) -> usize {
        let target = self.now_ms.saturating_add(delta_ms);
        self.advance_to(target, document)
    }

    /// Run every pending timer, moving the clock forward to each deadline.
    pub fn run_until_idle(&mut self, document: &mut Document) -> Result<u64> {
        let mut ran = 0u64;
        loop {
            self.discard_cleared();
            if self.queue.is_empty() {
                return Ok(ran);
            }
            if self.iteration_limit > 0 && ran >= self.iteration_limit {
                return Err(Error::TimerLimit(ran));
            }
            if let Some((deadline, cb)) = self.pop_due(u64::MAX) {
                self.now_ms = self.now_ms.max(deadline);
                cb(document);
                ran += 1;
            }
        }
    }
}
