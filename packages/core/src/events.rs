//! Event types for observing the job system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::JobId;

/// Events emitted as jobs move through admission, the queue and the drainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    // Admission events
    /// A job was admitted and queued.
    JobSubmitted {
        job_id: JobId,
        timestamp: DateTime<Utc>,
    },
    /// A submission was turned away by the admission gate.
    JobRejected {
        backlog: usize,
        max_queue: usize,
        timestamp: DateTime<Utc>,
    },
    /// A record was dropped to make room in the store.
    JobEvicted {
        job_id: JobId,
        was_pending: bool,
        timestamp: DateTime<Utc>,
    },

    // Processing events
    /// The drainer took a job off the queue.
    JobStarted {
        job_id: JobId,
        timestamp: DateTime<Utc>,
    },
    /// A job produced a summary.
    JobCompleted {
        job_id: JobId,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    /// A job failed.
    JobFailed {
        job_id: JobId,
        error: String,
        timestamp: DateTime<Utc>,
    },

    // Drainer events
    /// The drainer went from idle to active.
    DrainStarted { timestamp: DateTime<Utc> },
    /// The queue ran dry and the drainer went idle.
    DrainFinished {
        processed: u64,
        timestamp: DateTime<Utc>,
    },
}

impl JobEvent {
    /// Get the job ID associated with this event, if any.
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            JobEvent::JobSubmitted { job_id, .. } => Some(*job_id),
            JobEvent::JobEvicted { job_id, .. } => Some(*job_id),
            JobEvent::JobStarted { job_id, .. } => Some(*job_id),
            JobEvent::JobCompleted { job_id, .. } => Some(*job_id),
            JobEvent::JobFailed { job_id, .. } => Some(*job_id),
            _ => None,
        }
    }

    /// Whether the event settles a job.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobEvent::JobCompleted { .. } | JobEvent::JobFailed { .. }
        )
    }

    /// Get a short description of this event for logging.
    pub fn description(&self) -> String {
        match self {
            JobEvent::JobSubmitted { job_id, .. } => format!("Job {} submitted", job_id),
            JobEvent::JobRejected {
                backlog, max_queue, ..
            } => format!("Submission rejected: backlog {}/{}", backlog, max_queue),
            JobEvent::JobEvicted {
                job_id,
                was_pending,
                ..
            } => {
                let state = if *was_pending { " while pending" } else { "" };
                format!("Job {} evicted{}", job_id, state)
            }
            JobEvent::JobStarted { job_id, .. } => format!("Job {} started", job_id),
            JobEvent::JobCompleted {
                job_id,
                duration_ms,
                ..
            } => format!("Job {} completed in {}ms", job_id, duration_ms),
            JobEvent::JobFailed { job_id, error, .. } => {
                format!("Job {} failed: {}", job_id, error)
            }
            JobEvent::DrainStarted { .. } => "Drain started".to_string(),
            JobEvent::DrainFinished { processed, .. } => {
                format!("Drain finished after {} jobs", processed)
            }
        }
    }
}
