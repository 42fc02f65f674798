//! Bounded FIFO of pending work and queue statistics.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{JobId, QueueFull};

/// A job ID paired with the input it will be processed with.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry<T> {
    pub job_id: JobId,
    pub payload: T,
}

/// Fixed-capacity FIFO of queue entries.
///
/// Unlike the job store, a full queue rejects new entries instead of
/// dropping old ones.
#[derive(Debug, Clone)]
pub struct WorkQueue<T> {
    entries: VecDeque<QueueEntry<T>>,
    capacity: usize,
}

impl<T> WorkQueue<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Append an entry at the back.
    pub fn enqueue(&mut self, job_id: JobId, payload: T) -> Result<(), QueueFull> {
        if self.is_full() {
            return Err(QueueFull {
                capacity: self.capacity,
            });
        }
        self.entries.push_back(QueueEntry { job_id, payload });
        Ok(())
    }

    /// Take the oldest entry.
    pub fn dequeue(&mut self) -> Option<QueueEntry<T>> {
        self.entries.pop_front()
    }

    pub fn contains(&self, job_id: &JobId) -> bool {
        self.entries.iter().any(|entry| &entry.job_id == job_id)
    }
}

/// Snapshot of the job system's load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueStats {
    /// Entries waiting in the work queue.
    pub queued: usize,
    /// Records still pending in the store (queued or in flight).
    pub pending: usize,
    /// Records held by the store.
    pub stored: usize,
    /// Whether a drain episode is running.
    pub drain_active: bool,
    /// Jobs completed since startup.
    pub completed: u64,
    /// Jobs failed since startup.
    pub failed: u64,
}

impl QueueStats {
    /// Total processed jobs.
    pub fn processed(&self) -> u64 {
        self.completed + self.failed
    }

    /// Success rate as a percentage.
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.processed();
        if total == 0 {
            None
        } else {
            Some((self.completed as f64 / total as f64) * 100.0)
        }
    }
}
