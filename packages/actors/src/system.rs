//! Handle for starting and talking to the job system.

use std::sync::Arc;

use nimbus_core::{
    JobEvent, JobId, JobStatus, PollError, QueueConfig, QueueStats, SubmitError, WeatherRequest,
};
use ractor::{Actor, ActorRef};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::messages::{JobQueueMessage, SystemError};
use crate::processor::JobProcessor;
use crate::queue_actor::{JobQueueActor, JobQueueArgs};

/// Running job system: the queue actor and its linked drainer.
pub struct JobSystem {
    queue: ActorRef<JobQueueMessage>,
    handle: JoinHandle<()>,
    event_tx: broadcast::Sender<JobEvent>,
}

impl JobSystem {
    /// Submit a request. Returns as soon as the job is queued.
    pub async fn submit(&self, request: WeatherRequest) -> Result<JobId, SubmitError> {
        let (tx, rx) = ractor::concurrency::oneshot();
        self.queue
            .send_message(JobQueueMessage::Submit {
                request: Box::new(request),
                reply: tx.into(),
            })
            .map_err(|e| SubmitError::Unavailable(format!("Failed to send message: {}", e)))?;

        rx.await
            .map_err(|_| SubmitError::Unavailable("Failed to receive response".into()))?
    }

    /// Read a job's current status.
    pub async fn poll(&self, job_id: JobId) -> Result<JobStatus, PollError> {
        let (tx, rx) = ractor::concurrency::oneshot();
        self.queue
            .send_message(JobQueueMessage::Poll {
                job_id,
                reply: tx.into(),
            })
            .map_err(|e| PollError::Unavailable(format!("Failed to send message: {}", e)))?;

        rx.await
            .map_err(|_| PollError::Unavailable("Failed to receive response".into()))?
    }

    /// Snapshot of queue load and outcome counters.
    pub async fn stats(&self) -> Result<QueueStats, SystemError> {
        let (tx, rx) = ractor::concurrency::oneshot();
        self.queue
            .send_message(JobQueueMessage::GetStats { reply: tx.into() })
            .map_err(|e| SystemError::Actor(format!("Failed to send message: {}", e)))?;

        rx.await.map_err(|_| SystemError::NoReply)
    }

    /// Subscribe to job events.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    /// The queue actor, for callers that want to message it directly.
    pub fn queue(&self) -> &ActorRef<JobQueueMessage> {
        &self.queue
    }

    /// Stop the queue actor and its drainer, waiting for them to exit.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        self.queue
            .send_message(JobQueueMessage::Shutdown)
            .map_err(|e| SystemError::Actor(format!("Failed to send message: {}", e)))?;

        self.handle
            .await
            .map_err(|e| SystemError::Actor(format!("Job queue task failed: {}", e)))
    }
}

/// Start the job system with the given config and processor.
pub async fn start_job_system(
    config: QueueConfig,
    processor: Arc<dyn JobProcessor>,
) -> Result<JobSystem, SystemError> {
    let (event_tx, _) = broadcast::channel(1024);
    let args = JobQueueArgs {
        config,
        processor,
        event_tx: event_tx.clone(),
    };

    let (queue, handle) = Actor::spawn(None, JobQueueActor, args).await?;

    Ok(JobSystem {
        queue,
        handle,
        event_tx,
    })
}
