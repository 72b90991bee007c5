//! Deferred task queue keyed by owner
//!
//! Emission bursts, reset polls, grace-period destroys and pointer
//! repulsion restores are all "run this later" work. Each task is tagged
//! with the owner whose lifetime it is tied to, so removing a particle or
//! faulting an emitter cancels exactly its own pending work, and closing the
//! queue on teardown cancels everything at once.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct Entry<K, T> {
    due: f64,
    seq: u64,
    owner: K,
    task: T,
}

impl<K, T> PartialEq for Entry<K, T> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl<K, T> Eq for Entry<K, T> {}

impl<K, T> PartialOrd for Entry<K, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K, T> Ord for Entry<K, T> {
    // BinaryHeap is a max-heap; invert so the earliest due (then oldest) pops first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A time-ordered queue of deferred tasks.
pub struct TaskQueue<K, T> {
    pending: BinaryHeap<Entry<K, T>>,
    next_seq: u64,
    closed: bool,
}

impl<K: PartialEq, T> Default for TaskQueue<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialEq, T> TaskQueue<K, T> {
    pub fn new() -> Self {
        Self {
            pending: BinaryHeap::new(),
            next_seq: 0,
            closed: false,
        }
    }

    /// Queue `task` to run `delay` seconds after `now`.
    /// Returns false (and drops the task) once the queue is closed.
    pub fn schedule(&mut self, now: f64, delay: f64, owner: K, task: T) -> bool {
        if self.closed {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Entry {
            due: now + delay.max(0.0),
            seq,
            owner,
            task,
        });
        true
    }

    /// Remove every pending task belonging to `owner`. Returns how many were dropped.
    pub fn cancel_owner(&mut self, owner: &K) -> usize {
        let before = self.pending.len();
        self.pending.retain(|e| e.owner != *owner);
        before - self.pending.len()
    }

    /// Remove and return `owner`'s pending tasks that match `pred`, earliest
    /// first. Other tasks stay queued.
    pub fn take_where<F>(&mut self, owner: &K, mut pred: F) -> Vec<T>
    where
        F: FnMut(&T) -> bool,
    {
        let (mut taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_vec()
            .into_iter()
            .partition(|e| e.owner == *owner && pred(&e.task));
        self.pending = kept.into();
        // Entry's ordering is reversed for the max-heap
        taken.sort_by(|a, b| b.cmp(a));
        taken.into_iter().map(|e| e.task).collect()
    }

    /// Drop all pending tasks and refuse new ones.
    pub fn close(&mut self) {
        self.pending.clear();
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Due time of the earliest pending task
    pub fn next_due(&self) -> Option<f64> {
        self.pending.peek().map(|e| e.due)
    }

    /// Whether `owner` has anything pending
    pub fn has_pending(&self, owner: &K) -> bool {
        self.pending.iter().any(|e| e.owner == *owner)
    }

    /// Pop every task due at or before `now`, earliest first.
    ///
    /// The batch is taken before any of it runs, so work scheduled while the
    /// caller handles the batch waits for the next drain.
    pub fn drain_due(&mut self, now: f64) -> Vec<(K, T)> {
        let mut due = Vec::new();
        while self.pending.peek().is_some_and(|e| e.due <= now) {
            if let Some(entry) = self.pending.pop() {
                due.push((entry.owner, entry.task));
            }
        }
        due
    }
}
