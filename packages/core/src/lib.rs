//! Core domain types for the weather summary job queue.
//!
//! This crate contains the runtime-free pieces shared by all packages:
//! - Job records and their status state machine
//! - The bounded job store and work queue
//! - The admission gate and configuration
//! - Weather input and summary output types
//! - Events for observing the system

mod admission;
mod config;
mod error;
mod events;
mod job;
mod queue;
mod store;
mod weather;

pub use admission::AdmissionGate;
pub use config::{
    DEFAULT_MAX_JOBS, DEFAULT_MAX_QUEUE, DEFAULT_MODEL_PATH, MODEL_PATH_ENV, ModelConfig,
    QueueConfig,
};
pub use error::{ConfigError, PollError, ProcessingError, QueueFull, SubmitError};
pub use events::JobEvent;
pub use job::{JobId, JobRecord, JobStatus, SubmitReceipt};
pub use queue::{QueueEntry, QueueStats, WorkQueue};
pub use store::JobStore;
pub use weather::{CloudCover, MAX_SUMMARY_CHARS, MAX_SUMMARY_WORDS, WeatherRequest, WeatherSummary};
