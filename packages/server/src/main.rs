//! Weather summary job runner.
//!
//! Reads one JSON weather request per line on stdin, submits each to the job
//! system, prints a receipt (or rejection) per line, then polls every
//! accepted job until it settles and prints its status.

use std::sync::Arc;
use std::time::Duration;

use nimbus_actors::{CannedModel, JobSystem, SummaryProcessor, start_job_system};
use nimbus_core::{JobEvent, JobId, JobStatus, QueueConfig, SubmitReceipt, WeatherRequest};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// One line of poll output.
#[derive(Serialize)]
struct PollLine {
    job_id: JobId,
    #[serde(flatten)]
    status: JobStatus,
}

#[derive(Serialize)]
struct ErrorLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    job_id: Option<JobId>,
    error: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = QueueConfig::from_env()?;
    let processor = Arc::new(SummaryProcessor::new(CannedModel::default()));
    let system = start_job_system(config, processor).await?;
    log_events(system.subscribe());

    let mut accepted = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let request: WeatherRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Skipping invalid request: {}", e);
                print_line(&ErrorLine {
                    job_id: None,
                    error: format!("Invalid request: {}", e),
                })?;
                continue;
            }
        };

        match system.submit(request).await {
            Ok(job_id) => {
                print_line(&SubmitReceipt { job_id })?;
                accepted.push(job_id);
            }
            Err(e) => {
                tracing::warn!("Submission rejected: {}", e);
                print_line(&ErrorLine {
                    job_id: None,
                    error: e.to_string(),
                })?;
            }
        }
    }

    for job_id in accepted {
        match wait_settled(&system, job_id).await {
            Ok(status) => print_line(&PollLine { job_id, status })?,
            Err(e) => print_line(&ErrorLine {
                job_id: Some(job_id),
                error: e.to_string(),
            })?,
        }
    }

    let stats = system.stats().await?;
    tracing::info!(
        "Processed {} jobs ({} failed, {:.0}% succeeded)",
        stats.processed(),
        stats.failed,
        stats.success_rate().unwrap_or(0.0)
    );

    system.shutdown().await?;
    Ok(())
}

/// Log job events until the system shuts down.
fn log_events(mut events: broadcast::Receiver<JobEvent>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::debug!("{}", event.description()),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event log skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

async fn wait_settled(
    system: &JobSystem,
    job_id: JobId,
) -> Result<JobStatus, nimbus_core::PollError> {
    loop {
        let status = system.poll(job_id).await?;
        if status.is_terminal() {
            return Ok(status);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

fn print_line<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
