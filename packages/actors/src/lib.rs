//! Actor system for the weather summary job queue.
//!
//! This crate provides the Ractor-based actors that admit, queue and
//! process jobs.
//!
//! # Architecture
//!
//! - `JobQueueActor` - Owns the job store, the work queue and the drain flag;
//!   handles submissions, polls and drain bookkeeping
//! - `DrainerActor` - Linked child that processes queued jobs one at a time
//! - `JobSystem` - Handle returned by `start_job_system`
//!
//! # Usage
//!
//! ```ignore
//! use nimbus_actors::{CannedModel, SummaryProcessor, start_job_system};
//!
//! let processor = Arc::new(SummaryProcessor::new(CannedModel::default()));
//! let system = start_job_system(QueueConfig::default(), processor).await?;
//!
//! let job_id = system.submit(request).await?;
//! let status = system.poll(job_id).await?;
//! ```

mod drainer;
mod messages;
mod processor;
mod queue_actor;
mod system;

pub use drainer::{DrainerActor, DrainerArgs};
pub use messages::{DrainerMessage, JobQueueMessage, SystemError};
pub use processor::{
    BackendFuture, CannedModel, FnProcessor, JobProcessor, ModelBackend, ProcessFuture,
    ProcessResult, SummaryProcessor, build_prompt,
};
pub use queue_actor::{JobQueueActor, JobQueueArgs};
pub use system::{JobSystem, start_job_system};

/// Re-export ractor types for convenience.
pub use ractor::{Actor, ActorRef, RpcReplyPort, concurrency};
