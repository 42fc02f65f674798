//! Error types shared by the queue core and the actor layer.

use thiserror::Error;

use crate::{JobId, MAX_SUMMARY_CHARS, MAX_SUMMARY_WORDS};

/// Rejection returned to a submitter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Job queue is full. Please try again later.")]
    CapacityExceeded,

    #[error("Job queue unavailable: {0}")]
    Unavailable(String),
}

/// Failure returned to a poller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("Job not found")]
    NotFound(JobId),

    #[error("Job queue unavailable: {0}")]
    Unavailable(String),
}

/// Failure while turning a job's input into a summary.
///
/// Recorded into the job's `error` field; never returned to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    #[error("Model backend failed: {0}")]
    Backend(String),

    #[error("Invalid model output: {0}")]
    InvalidOutput(String),

    #[error("Invalid model output: summary is {chars} characters, limit is {limit}", limit = MAX_SUMMARY_CHARS)]
    SummaryTooLong { chars: usize },

    #[error("Invalid model output: Summary must be <= {limit} words (got {words})", limit = MAX_SUMMARY_WORDS)]
    TooManyWords { words: usize },

    #[error("Processor panicked: {0}")]
    Panicked(String),

    #[error("Drainer stopped while processing job: {0}")]
    Interrupted(String),
}

/// Returned by `WorkQueue::enqueue` when the queue is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Work queue is full (capacity {capacity})")]
pub struct QueueFull {
    pub capacity: usize,
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: String, value: String },

    #[error("{key} must be greater than zero")]
    Zero { key: String },

    #[error("{key} must be one of queued_plus_pending, distinct_backlog; got {value:?}")]
    InvalidGate { key: String, value: String },
}
