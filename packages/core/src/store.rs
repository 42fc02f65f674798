//! Bounded job record store with oldest-first eviction.

use indexmap::IndexMap;

use crate::{JobId, JobRecord, JobStatus, WeatherSummary};

/// In-memory job records keyed by ID, in insertion order.
///
/// Holds at most `capacity` records. Eviction always removes the oldest
/// inserted record, whatever its status, so a job that is still queued can
/// lose its record. Callers treat a missing record as "never existed".
#[derive(Debug, Clone)]
pub struct JobStore {
    records: IndexMap<JobId, JobRecord>,
    capacity: usize,
}

impl JobStore {
    /// Create an empty store holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: IndexMap::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    /// Evict the oldest record if the store is at capacity.
    pub fn evict_oldest_if_full(&mut self) -> Option<JobRecord> {
        if !self.is_full() {
            return None;
        }
        self.records.shift_remove_index(0).map(|(_, record)| record)
    }

    /// Insert a new pending record for `id`.
    ///
    /// Returns the record evicted to make room, if any.
    pub fn create(&mut self, id: JobId) -> Option<JobRecord> {
        let evicted = self.evict_oldest_if_full();
        self.records.insert(id, JobRecord::new(id));
        evicted
    }

    pub fn get(&self, id: &JobId) -> Option<&JobRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &JobId) -> bool {
        self.records.contains_key(id)
    }

    /// Mark a job done. Returns `false` if the record is gone or already
    /// settled.
    pub fn set_result(&mut self, id: &JobId, result: WeatherSummary) -> bool {
        self.settle(id, JobStatus::Done { result })
    }

    /// Mark a job failed. Returns `false` if the record is gone or already
    /// settled.
    pub fn set_error(&mut self, id: &JobId, error: impl Into<String>) -> bool {
        self.settle(
            id,
            JobStatus::Error {
                error: error.into(),
            },
        )
    }

    /// Drop a record without touching the order of the others.
    pub fn remove(&mut self, id: &JobId) -> Option<JobRecord> {
        self.records.shift_remove(id)
    }

    /// Number of records still pending.
    pub fn pending_count(&self) -> usize {
        self.records
            .values()
            .filter(|record| record.status.is_pending())
            .count()
    }

    /// IDs of pending records, oldest first.
    pub fn pending_ids(&self) -> impl Iterator<Item = &JobId> {
        self.records
            .values()
            .filter(|record| record.status.is_pending())
            .map(|record| &record.id)
    }

    fn settle(&mut self, id: &JobId, status: JobStatus) -> bool {
        self.records
            .get_mut(id)
            .is_some_and(|record| record.settle(status))
    }
}
