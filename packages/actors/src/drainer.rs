//! Drainer actor that processes queued jobs one at a time.

use std::sync::Arc;
use std::time::Instant;

use ractor::rpc::CallResult;
use ractor::{Actor, ActorProcessingErr, ActorRef};

use crate::messages::{DrainerMessage, JobQueueMessage};
use crate::processor::{JobProcessor, run_guarded};

/// Drainer actor arguments.
pub struct DrainerArgs {
    pub queue: ActorRef<JobQueueMessage>,
    pub processor: Arc<dyn JobProcessor>,
}

/// State for the drainer actor.
pub struct DrainerState {
    /// Queue actor handing out work.
    queue: ActorRef<JobQueueMessage>,
    processor: Arc<dyn JobProcessor>,
    /// Drain episodes run so far.
    episodes: u64,
}

/// Drainer actor.
///
/// Each `Drain` message is one episode: keep asking the queue for the next
/// entry until it answers `None`. The queue actor only sends `Drain` when it
/// flips from idle to active, so episodes never overlap.
pub struct DrainerActor;

impl Actor for DrainerActor {
    type Msg = DrainerMessage;
    type State = DrainerState;
    type Arguments = DrainerArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("Starting drainer");
        Ok(DrainerState {
            queue: args.queue,
            processor: args.processor,
            episodes: 0,
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DrainerMessage::Drain => {
                state.episodes += 1;
                let processed = drain(state).await?;
                tracing::debug!(
                    "Drain episode {} processed {} jobs",
                    state.episodes,
                    processed
                );
            }
        }

        Ok(())
    }
}

async fn drain(state: &mut DrainerState) -> Result<u64, ActorProcessingErr> {
    let mut processed = 0;

    loop {
        let next = ractor::rpc::call(
            &state.queue,
            |reply| JobQueueMessage::NextJob { reply },
            None,
        )
        .await?;

        let entry = match next {
            CallResult::Success(Some(entry)) => entry,
            CallResult::Success(None) => break,
            CallResult::Timeout | CallResult::SenderError => {
                tracing::warn!("Job queue stopped answering; ending drain");
                break;
            }
        };

        let started = Instant::now();
        let outcome = run_guarded(state.processor.as_ref(), &entry.payload).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        state.queue.send_message(JobQueueMessage::RecordOutcome {
            job_id: entry.job_id,
            outcome,
            duration_ms,
        })?;
        processed += 1;
    }

    Ok(processed)
}
