//! Waiting on a single job
//!
//! Shared by every command that starts a job and then blocks until it is done.

use anyhow::{Context, Result, bail};
use colored::*;
use scribe_client::ScribeClient;
use scribe_core::domain::job::{Job, JobId, JobStatus};
use scribe_poller::{HttpJobRepository, JobEvent, JobPoller, PollerCallbacks, PollerConfig};
use std::sync::Arc;
use tokio::time::{self, MissedTickBehavior};

use super::job::colorize_status;

/// Polls `job_id` until it completes, fails or a ceiling is hit
///
/// Progress is printed whenever the observed status changes. Ctrl-C cancels
/// the poller and returns an error.
///
/// # Returns
/// The completed job, or an error describing the failure or timeout
pub async fn wait_for_job(
    client: Arc<ScribeClient>,
    job_id: &JobId,
    config: PollerConfig,
) -> Result<Job> {
    let (callbacks, mut events) = PollerCallbacks::channel();
    let poller = JobPoller::builder(Arc::new(HttpJobRepository::new(client)))
        .config(config.clone())
        .callbacks(callbacks)
        .build();

    println!(
        "{} Waiting for job {}...",
        "⏳".yellow(),
        job_id.to_string().cyan()
    );
    poller.start(job_id.clone());

    let mut ticker = time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_status: Option<JobStatus> = None;
    let mut last_error: Option<String> = None;

    loop {
        tokio::select! {
            event = events.recv() => {
                let event = event.context("Poller stopped without reporting an outcome")?;
                return match event {
                    JobEvent::Completed(job) => Ok(job),
                    JobEvent::Failed { job_id, message } => {
                        bail!("Job {} failed: {}", job_id, message)
                    }
                    JobEvent::TimedOut { job_id, attempts } => {
                        bail!("Gave up waiting for job {} after {} status read(s)", job_id, attempts)
                    }
                };
            }
            _ = ticker.tick() => {
                let snapshot = poller.snapshot();

                if let Some(status) = snapshot.job.as_ref().map(|job| job.status)
                    && last_status != Some(status)
                {
                    println!("  {} {}", "▸".cyan(), colorize_status(&status));
                    last_status = Some(status);
                }

                if snapshot.last_error != last_error {
                    if let Some(error) = &snapshot.last_error {
                        println!("  {} {}", "⚠".yellow(), error.dimmed());
                    }
                    last_error = snapshot.last_error;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                poller.cancel();
                bail!("Interrupted while waiting for job {}", job_id);
            }
        }
    }
}
