//! Message types for actor communication.

use nimbus_core::{
    JobId, JobStatus, PollError, ProcessingError, QueueEntry, QueueStats, SubmitError,
    WeatherRequest, WeatherSummary,
};
use ractor::RpcReplyPort;

/// Messages for the JobQueueActor.
#[derive(Debug)]
pub enum JobQueueMessage {
    /// Admit a new job.
    Submit {
        request: Box<WeatherRequest>,
        reply: RpcReplyPort<Result<JobId, SubmitError>>,
    },

    /// Read a job's status.
    Poll {
        job_id: JobId,
        reply: RpcReplyPort<Result<JobStatus, PollError>>,
    },

    /// Get queue stats.
    GetStats { reply: RpcReplyPort<QueueStats> },

    /// Hand the drainer the next entry. `None` ends the drain episode.
    NextJob {
        reply: RpcReplyPort<Option<QueueEntry<WeatherRequest>>>,
    },

    /// Report the outcome of a processed job.
    RecordOutcome {
        job_id: JobId,
        outcome: Result<WeatherSummary, ProcessingError>,
        duration_ms: u64,
    },

    /// Shutdown the queue and its drainer.
    Shutdown,
}

/// Messages for the DrainerActor.
#[derive(Debug)]
pub enum DrainerMessage {
    /// Run one drain episode until the queue is empty.
    Drain,
}

/// Error type for job system operations.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("Failed to spawn actor: {0}")]
    Spawn(#[from] ractor::SpawnErr),

    #[error("Actor error: {0}")]
    Actor(String),

    #[error("Failed to receive response")]
    NoReply,
}
