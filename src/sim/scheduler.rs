//! Deterministic task scheduler
//!
//! A manually-advanced timeline of delayed tasks. Nothing here reads the
//! wall clock: the host advances time explicitly, which keeps stagger
//! timing exact and tests reproducible.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Identifier returned when a task is scheduled, used for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

struct Entry<T> {
    due_ms: f64,
    id: TaskId,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // Reversed so the max-heap pops the earliest task; equal due times pop
    // in scheduling order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.id.0.cmp(&self.id.0))
    }
}

/// Timeline of pending tasks
pub struct Scheduler<T> {
    now_ms: f64,
    next_id: u64,
    queue: BinaryHeap<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_id: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Current scheduler time
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Schedule `task` to run `delay_ms` from now
    pub fn schedule_in(&mut self, delay_ms: f64, task: T) -> TaskId {
        debug_assert!(delay_ms >= 0.0, "negative delay {delay_ms}");
        self.schedule_at(self.now_ms + delay_ms.max(0.0), task)
    }

    /// Schedule `task` at an absolute time (clamped to now)
    pub fn schedule_at(&mut self, due_ms: f64, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.queue.push(Entry {
            due_ms: due_ms.max(self.now_ms),
            id,
            task,
        });
        id
    }

    /// Remove a pending task. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|entry| entry.id != id);
        self.queue.len() != before
    }

    /// Remove every pending task matching `predicate`
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.queue.len();
        self.queue.retain(|entry| !predicate(&entry.task));
        before - self.queue.len()
    }

    /// Pop the next task due at or before `until_ms`, moving the clock to its
    /// due time. Returns `None` once nothing else is due.
    ///
    /// Callers loop on this and then call [`Scheduler::advance_to`] so tasks
    /// scheduled while handling a task are still picked up in order.
    pub fn pop_due(&mut self, until_ms: f64) -> Option<(f64, T)> {
        if self.queue.peek()?.due_ms > until_ms {
            return None;
        }
        let entry = self.queue.pop()?;
        self.now_ms = self.now_ms.max(entry.due_ms);
        log::trace!("scheduler: task {} due at {:.1}ms", entry.id.0, entry.due_ms);
        Some((entry.due_ms, entry.task))
    }

    /// Move the clock forward to `until_ms` (never backward)
    pub fn advance_to(&mut self, until_ms: f64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Due time of the earliest pending task
    pub fn next_due(&self) -> Option<f64> {
        self.queue.peek().map(|entry| entry.due_ms)
    }
}
