#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use nimbus_actors::{FnProcessor, JobProcessor, JobSystem, ProcessFuture};
use nimbus_core::{
    CloudCover, JobId, JobStatus, ProcessingError, QueueStats, WeatherRequest, WeatherSummary,
};
use tokio::sync::Semaphore;

pub const WAIT: Duration = Duration::from_secs(5);

pub fn request(temp_celcius: f64) -> WeatherRequest {
    WeatherRequest::new(temp_celcius, 55.0, 0.0, 6.0, CloudCover::Partly)
}

/// Summary a stub processor produces for `request`, so results can be paired
/// back with their submissions.
pub fn summary_for(request: &WeatherRequest) -> WeatherSummary {
    WeatherSummary::new(format!(
        "It is {} degrees and delightfully goofy out!",
        request.temp_celcius
    ))
}

/// Processor that answers immediately.
pub fn instant_processor() -> Arc<dyn JobProcessor> {
    Arc::new(FnProcessor::new(|req: &WeatherRequest| -> ProcessFuture {
        let summary = summary_for(req);
        Box::pin(async move { Ok(summary) })
    }))
}

/// Processor that waits for a permit from `gate` before answering.
///
/// Start the gate at zero permits to hold the drainer on its first job.
pub fn gated_processor(gate: Arc<Semaphore>) -> Arc<dyn JobProcessor> {
    Arc::new(FnProcessor::new(move |req: &WeatherRequest| -> ProcessFuture {
        let gate = gate.clone();
        let summary = summary_for(req);
        Box::pin(async move {
            match gate.acquire().await {
                Ok(permit) => {
                    permit.forget();
                    Ok(summary)
                }
                Err(e) => Err(ProcessingError::Backend(e.to_string())),
            }
        })
    }))
}

/// Processor whose `fail_on`-th call (zero based) returns a backend error.
pub fn failing_processor(fail_on: usize) -> Arc<dyn JobProcessor> {
    let calls = Arc::new(AtomicUsize::new(0));
    Arc::new(FnProcessor::new(move |req: &WeatherRequest| -> ProcessFuture {
        let call = calls.fetch_add(1, Ordering::SeqCst);
        let summary = summary_for(req);
        Box::pin(async move {
            if call == fail_on {
                Err(ProcessingError::Backend("model returned nothing".into()))
            } else {
                Ok(summary)
            }
        })
    }))
}

/// Tracks how many processing calls run at once.
#[derive(Default)]
pub struct OverlapTracker {
    active: AtomicUsize,
    max_active: AtomicUsize,
    calls: AtomicUsize,
}

impl OverlapTracker {
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn tracked_processor(tracker: Arc<OverlapTracker>) -> Arc<dyn JobProcessor> {
    Arc::new(FnProcessor::new(move |req: &WeatherRequest| -> ProcessFuture {
        let tracker = tracker.clone();
        let summary = summary_for(req);
        Box::pin(async move {
            tracker.calls.fetch_add(1, Ordering::SeqCst);
            let now = tracker.active.fetch_add(1, Ordering::SeqCst) + 1;
            tracker.max_active.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2)).await;
            tracker.active.fetch_sub(1, Ordering::SeqCst);
            Ok(summary)
        })
    }))
}

/// Poll until the job settles or disappears.
pub async fn wait_for_terminal(system: &JobSystem, job_id: JobId) -> JobStatus {
    let settled = tokio::time::timeout(WAIT, async {
        loop {
            match system.poll(job_id).await {
                Ok(JobStatus::Pending) => tokio::time::sleep(Duration::from_millis(5)).await,
                Ok(status) => return status,
                Err(e) => panic!("job {} vanished while waiting: {}", job_id, e),
            }
        }
    })
    .await;

    match settled {
        Ok(status) => status,
        Err(_) => panic!("job {} did not settle in time", job_id),
    }
}

/// Poll stats until `done` holds.
pub async fn wait_for_stats<F>(system: &JobSystem, done: F) -> QueueStats
where
    F: Fn(&QueueStats) -> bool,
{
    let reached = tokio::time::timeout(WAIT, async {
        loop {
            match system.stats().await {
                Ok(stats) if done(&stats) => return stats,
                Ok(_) => tokio::time::sleep(Duration::from_millis(5)).await,
                Err(e) => panic!("stats unavailable: {}", e),
            }
        }
    })
    .await;

    match reached {
        Ok(stats) => stats,
        Err(_) => panic!("stats condition not reached in time"),
    }
}

/// Wait for the drainer to go idle with nothing queued.
pub async fn wait_for_idle(system: &JobSystem) -> QueueStats {
    wait_for_stats(system, |stats| !stats.drain_active && stats.queued == 0).await
}
