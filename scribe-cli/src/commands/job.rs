//! Job command handlers
//!
//! Handles reading a job once and watching it until it finishes.

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use scribe_core::domain::job::{Job, JobId, JobKind, JobStatus};

use super::watch::wait_for_job;
use crate::config::{Config, PollArgs};

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Get job details
    Get {
        /// Job ID
        id: String,
    },
    /// Poll a job until it completes or fails
    Watch {
        /// Job ID
        id: String,

        #[command(flatten)]
        poll: PollArgs,
    },
}

/// Handle job commands
///
/// # Arguments
/// * `command` - The job command to execute
/// * `config` - The CLI configuration
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    match command {
        JobCommands::Get { id } => get_job(config, &JobId::from(id)).await,
        JobCommands::Watch { id, poll } => watch_job(config, &JobId::from(id), &poll).await,
    }
}

/// Get and display a single job
async fn get_job(config: &Config, job_id: &JobId) -> Result<()> {
    let job = config.client().get_job(job_id).await?;

    print_job_details(&job);

    Ok(())
}

/// Watch a job and display it once it completes
async fn watch_job(config: &Config, job_id: &JobId, poll: &PollArgs) -> Result<()> {
    let poller_config = poll.apply(&config.poller)?;
    let job = wait_for_job(config.client(), job_id, poller_config).await?;

    println!();
    print_job_details(&job);

    Ok(())
}

/// Print detailed job information
pub(crate) fn print_job_details(job: &Job) {
    let status_colored = colorize_status(&job.status);

    println!("{}", "Job Details:".bold());
    println!("  ID:          {}", job.id.to_string().cyan());
    if let Some(kind) = job.kind {
        println!("  Type:        {}", describe_kind(kind));
    }
    println!("  Status:      {}", status_colored);

    if let Some(created) = job.created_at {
        println!("  Created:     {}", created.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(started) = job.started_at {
        println!("  Started:     {}", started.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(completed) = job.completed_at {
        println!("  Completed:   {}", completed.format("%Y-%m-%d %H:%M:%S"));

        if let Some(started) = job.started_at {
            let duration = completed.signed_duration_since(started);
            println!("  Duration:    {}s", duration.num_seconds());
        }
    }

    if let Some(input) = &job.input {
        println!("\n{}", "Input:".bold());
        print_json(input);
    }

    if let Some(result) = &job.result {
        println!("\n{}", "Result:".bold());
        print_json(result);
    }

    if job.status == JobStatus::Failed {
        println!("\n{}", "Error:".bold());
        println!("{}", job.failure_message().red());
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(pretty) => println!("{}", pretty),
        Err(_) => println!("{:?}", value),
    }
}

fn describe_kind(kind: JobKind) -> &'static str {
    match kind {
        JobKind::TitleGeneration => "title generation",
        JobKind::OutlineGeneration => "outline generation",
        JobKind::BlogGeneration => "blog generation",
        JobKind::Other => "other",
    }
}

/// Colorize job status for display
pub(crate) fn colorize_status(status: &JobStatus) -> colored::ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Pending => status_str.yellow(),
        JobStatus::Processing => status_str.cyan(),
        JobStatus::Completed => status_str.green(),
        JobStatus::Failed => status_str.red(),
    }
}
