//! Job domain types for submitted summary work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::WeatherSummary;

/// Unique identifier for a job, using ULID for chronological sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Ulid);

impl JobId {
    /// Create a new unique job ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current status of a job in its lifecycle.
///
/// Serializes to the poll payload clients see:
/// `{"status":"pending"}`, `{"status":"done","result":{..}}` or
/// `{"status":"error","error":".."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is queued or being processed.
    #[default]
    Pending,
    /// Job produced a valid summary.
    Done { result: WeatherSummary },
    /// Job failed; the message describes why.
    Error { error: String },
}

impl JobStatus {
    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, JobStatus::Pending)
    }

    /// Get a simple status string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Done { .. } => "done",
            JobStatus::Error { .. } => "error",
        }
    }
}

/// A job record as held by the job store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Unique identifier for this job.
    pub id: JobId,
    /// Current status, including the result or error once settled.
    #[serde(flatten)]
    pub status: JobStatus,
    /// When the job was admitted.
    pub created_at: DateTime<Utc>,
    /// When the status last changed.
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    /// Create a new pending record.
    pub fn new(id: JobId) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Client-visible view of this record.
    pub fn view(&self) -> JobStatus {
        self.status.clone()
    }

    /// Move a pending record to `status`.
    ///
    /// A settled record keeps its first outcome; returns `false` and leaves
    /// the record untouched.
    pub(crate) fn settle(&mut self, status: JobStatus) -> bool {
        if !self.status.is_pending() {
            return false;
        }
        self.status = status;
        self.updated_at = Utc::now();
        true
    }
}

/// Response to a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub job_id: JobId,
}
