//! Job queue actor owning admission, the job store and the drain flag.

use std::sync::Arc;

use chrono::Utc;
use nimbus_core::{
    JobEvent, JobId, JobRecord, JobStatus, JobStore, PollError, ProcessingError, QueueConfig,
    QueueEntry, QueueStats, SubmitError, WeatherRequest, WeatherSummary, WorkQueue,
};
use ractor::{Actor, ActorProcessingErr, ActorRef, SupervisionEvent};
use tokio::sync::broadcast;

use crate::drainer::{DrainerActor, DrainerArgs};
use crate::messages::{DrainerMessage, JobQueueMessage};
use crate::processor::JobProcessor;

/// Arguments for spawning the job queue actor.
pub struct JobQueueArgs {
    pub config: QueueConfig,
    pub processor: Arc<dyn JobProcessor>,
    pub event_tx: broadcast::Sender<JobEvent>,
}

/// State for the job queue actor.
///
/// Everything that admission and the drainer share lives here, so the actor's
/// one-message-at-a-time handling is the only lock.
pub struct JobQueueState {
    config: QueueConfig,
    store: JobStore,
    queue: WorkQueue<WeatherRequest>,
    /// Set while a drain episode runs; flipped only by this actor.
    drain_active: bool,
    /// Job handed to the drainer and not yet reported back.
    in_flight: Option<JobId>,
    episode_processed: u64,
    completed: u64,
    failed: u64,
    drainer: Option<ActorRef<DrainerMessage>>,
    processor: Arc<dyn JobProcessor>,
    event_tx: broadcast::Sender<JobEvent>,
    shutting_down: bool,
}

impl JobQueueState {
    /// Create a new job queue state.
    pub fn new(args: JobQueueArgs) -> Self {
        Self {
            store: JobStore::new(args.config.max_jobs),
            queue: WorkQueue::new(args.config.max_queue),
            config: args.config,
            drain_active: false,
            in_flight: None,
            episode_processed: 0,
            completed: 0,
            failed: 0,
            drainer: None,
            processor: args.processor,
            event_tx: args.event_tx,
            shutting_down: false,
        }
    }

    /// Broadcast an event.
    fn broadcast(&self, event: JobEvent) {
        let _ = self.event_tx.send(event);
    }

    fn note_eviction(&self, evicted: JobRecord) {
        let was_pending = evicted.status.is_pending();
        if was_pending {
            tracing::warn!("Evicted pending job {} to make room", evicted.id);
        } else {
            tracing::debug!("Evicted job {} ({})", evicted.id, evicted.status.as_str());
        }
        self.broadcast(JobEvent::JobEvicted {
            job_id: evicted.id,
            was_pending,
            timestamp: Utc::now(),
        });
    }

    /// Admit a request: evict, gate, create the record and enqueue.
    fn admit(&mut self, request: WeatherRequest) -> Result<JobId, SubmitError> {
        if let Some(evicted) = self.store.evict_oldest_if_full() {
            self.note_eviction(evicted);
        }

        let backlog = self.config.admission_gate.backlog(&self.queue, &self.store);
        if backlog >= self.config.max_queue {
            tracing::debug!(
                "Rejecting submission: backlog {} >= {} ({})",
                backlog,
                self.config.max_queue,
                self.config.admission_gate
            );
            self.broadcast(JobEvent::JobRejected {
                backlog,
                max_queue: self.config.max_queue,
                timestamp: Utc::now(),
            });
            return Err(SubmitError::CapacityExceeded);
        }

        let job_id = JobId::new();
        if let Some(evicted) = self.store.create(job_id) {
            self.note_eviction(evicted);
        }

        if let Err(e) = self.queue.enqueue(job_id, request) {
            tracing::warn!("Rolling back job {}: {}", job_id, e);
            self.store.remove(&job_id);
            return Err(SubmitError::CapacityExceeded);
        }

        tracing::debug!("Job {} admitted ({} queued)", job_id, self.queue.len());
        self.broadcast(JobEvent::JobSubmitted {
            job_id,
            timestamp: Utc::now(),
        });

        Ok(job_id)
    }

    /// Start a drain episode unless one is already running.
    fn trigger_drain(&mut self) {
        if self.drain_active || self.queue.is_empty() {
            return;
        }

        let Some(drainer) = self.drainer.as_ref() else {
            tracing::warn!("No drainer available; {} jobs waiting", self.queue.len());
            return;
        };

        if let Err(e) = drainer.send_message(DrainerMessage::Drain) {
            tracing::warn!("Failed to trigger drainer: {}", e);
            return;
        }

        self.drain_active = true;
        self.episode_processed = 0;
        self.broadcast(JobEvent::DrainStarted {
            timestamp: Utc::now(),
        });
    }

    /// Hand out the next entry, or end the episode when the queue is empty.
    fn next_job(&mut self) -> Option<QueueEntry<WeatherRequest>> {
        match self.queue.dequeue() {
            Some(entry) => {
                if !self.store.contains(&entry.job_id) {
                    tracing::debug!("Job {} was evicted while queued", entry.job_id);
                }
                self.in_flight = Some(entry.job_id);
                self.broadcast(JobEvent::JobStarted {
                    job_id: entry.job_id,
                    timestamp: Utc::now(),
                });
                Some(entry)
            }
            None => {
                self.drain_active = false;
                self.in_flight = None;
                tracing::debug!("Drain finished after {} jobs", self.episode_processed);
                self.broadcast(JobEvent::DrainFinished {
                    processed: self.episode_processed,
                    timestamp: Utc::now(),
                });
                None
            }
        }
    }

    fn record_outcome(
        &mut self,
        job_id: JobId,
        outcome: Result<WeatherSummary, ProcessingError>,
        duration_ms: u64,
    ) {
        if self.in_flight == Some(job_id) {
            self.in_flight = None;
        }
        self.episode_processed += 1;

        match outcome {
            Ok(summary) => {
                self.completed += 1;
                if !self.store.set_result(&job_id, summary) {
                    tracing::warn!(
                        "Job {} finished but its record is gone or settled",
                        job_id
                    );
                }
                self.broadcast(JobEvent::JobCompleted {
                    job_id,
                    duration_ms,
                    timestamp: Utc::now(),
                });
            }
            Err(e) => {
                self.record_failure(job_id, e);
            }
        }
    }

    fn record_failure(&mut self, job_id: JobId, error: ProcessingError) {
        let error = error.to_string();
        self.failed += 1;
        tracing::debug!("Job {} failed: {}", job_id, error);
        if !self.store.set_error(&job_id, error.clone()) {
            tracing::warn!("Job {} failed but its record is gone or settled", job_id);
        }
        self.broadcast(JobEvent::JobFailed {
            job_id,
            error,
            timestamp: Utc::now(),
        });
    }

    fn poll(&self, job_id: JobId) -> Result<JobStatus, PollError> {
        self.store
            .get(&job_id)
            .map(JobRecord::view)
            .ok_or(PollError::NotFound(job_id))
    }

    fn stats(&self) -> QueueStats {
        QueueStats {
            queued: self.queue.len(),
            pending: self.store.pending_count(),
            stored: self.store.len(),
            drain_active: self.drain_active,
            completed: self.completed,
            failed: self.failed,
        }
    }
}

async fn spawn_drainer(
    myself: &ActorRef<JobQueueMessage>,
    state: &mut JobQueueState,
) -> Result<(), ActorProcessingErr> {
    let args = DrainerArgs {
        queue: myself.clone(),
        processor: state.processor.clone(),
    };
    let (drainer, _handle) = Actor::spawn_linked(None, DrainerActor, args, myself.get_cell())
        .await
        .map_err(|e| ActorProcessingErr::from(format!("Failed to spawn drainer: {}", e)))?;

    state.drainer = Some(drainer);
    Ok(())
}

/// Queue actor that serializes admission, polling and drain bookkeeping.
pub struct JobQueueActor;

impl Actor for JobQueueActor {
    type Msg = JobQueueMessage;
    type State = JobQueueState;
    type Arguments = JobQueueArgs;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!(
            "Starting job queue: max_jobs={}, max_queue={}, gate={}",
            args.config.max_jobs,
            args.config.max_queue,
            args.config.admission_gate
        );

        let mut state = JobQueueState::new(args);
        spawn_drainer(&myself, &mut state).await?;
        Ok(state)
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            JobQueueMessage::Submit { request, reply } => {
                let result = state.admit(*request);
                if result.is_ok() {
                    state.trigger_drain();
                }
                let _ = reply.send(result);
            }

            JobQueueMessage::Poll { job_id, reply } => {
                let _ = reply.send(state.poll(job_id));
            }

            JobQueueMessage::GetStats { reply } => {
                let _ = reply.send(state.stats());
            }

            JobQueueMessage::NextJob { reply } => {
                let _ = reply.send(state.next_job());
            }

            JobQueueMessage::RecordOutcome {
                job_id,
                outcome,
                duration_ms,
            } => {
                state.record_outcome(job_id, outcome, duration_ms);
            }

            JobQueueMessage::Shutdown => {
                tracing::info!(
                    "Shutting down job queue ({} queued, {} stored)",
                    state.queue.len(),
                    state.store.len()
                );
                state.shutting_down = true;
                myself.stop(None);
                return Ok(());
            }
        }

        Ok(())
    }

    async fn handle_supervisor_evt(
        &self,
        myself: ActorRef<Self::Msg>,
        message: SupervisionEvent,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let (cell, reason) = match message {
            SupervisionEvent::ActorTerminated(cell, _, reason) => {
                (cell, reason.unwrap_or_else(|| "terminated".to_string()))
            }
            SupervisionEvent::ActorFailed(cell, err) => (cell, err.to_string()),
            _ => return Ok(()),
        };

        let is_drainer = state
            .drainer
            .as_ref()
            .is_some_and(|drainer| drainer.get_id() == cell.get_id());
        if !is_drainer || state.shutting_down {
            return Ok(());
        }

        tracing::warn!("Drainer stopped: {}; restarting", reason);
        state.drainer = None;
        state.drain_active = false;
        if let Some(job_id) = state.in_flight.take() {
            state.record_failure(job_id, ProcessingError::Interrupted(reason));
        }

        spawn_drainer(&myself, state).await?;
        state.trigger_drain();
        Ok(())
    }
}
