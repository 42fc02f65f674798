//! Admission gate deciding whether a submission fits.

use serde::{Deserialize, Serialize};

use crate::{JobStore, WorkQueue};

/// How the backlog is measured against `max_queue`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionGate {
    /// Queue length plus every pending record in the store.
    ///
    /// Queued jobs are pending records too, so they count twice. Kept as the
    /// default for compatibility with the original service.
    #[default]
    QueuedPlusPending,
    /// Each job that is queued or pending counts once.
    DistinctBacklog,
}

impl AdmissionGate {
    /// Backlog measure compared against the queue cap.
    pub fn backlog<T>(&self, queue: &WorkQueue<T>, store: &JobStore) -> usize {
        match self {
            AdmissionGate::QueuedPlusPending => queue.len() + store.pending_count(),
            AdmissionGate::DistinctBacklog => {
                let in_flight = store
                    .pending_ids()
                    .filter(|id| !queue.contains(id))
                    .count();
                queue.len() + in_flight
            }
        }
    }

    /// Whether one more job may be admitted under `max_queue`.
    pub fn admits<T>(&self, queue: &WorkQueue<T>, store: &JobStore, max_queue: usize) -> bool {
        self.backlog(queue, store) < max_queue
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdmissionGate::QueuedPlusPending => "queued_plus_pending",
            AdmissionGate::DistinctBacklog => "distinct_backlog",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "queued_plus_pending" => Some(AdmissionGate::QueuedPlusPending),
            "distinct_backlog" => Some(AdmissionGate::DistinctBacklog),
            _ => None,
        }
    }
}

impl std::fmt::Display for AdmissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
