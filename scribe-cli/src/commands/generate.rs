//! Generation command handlers
//!
//! Starts title, outline and blog generation jobs and, unless `--no-wait`
//! is given, watches them until they finish.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use colored::*;
use scribe_core::domain::job::JobId;
use scribe_core::dto::job::{GenerateBlog, GenerateOutline, GenerateTitles};

use super::job::print_job_details;
use super::watch::wait_for_job;
use crate::config::{Config, PollArgs};

/// Title subcommands
#[derive(Subcommand)]
pub enum TitlesCommands {
    /// Generate blog titles for a calendar date
    Generate {
        /// Calendar date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: String,

        /// Topic to steer the titles towards
        #[arg(long)]
        topic: Option<String>,

        /// Number of titles to generate
        #[arg(long)]
        count: Option<u32>,

        /// Print the job ID and exit without waiting
        #[arg(long)]
        no_wait: bool,

        #[command(flatten)]
        poll: PollArgs,
    },
}

/// Outline subcommands
#[derive(Subcommand)]
pub enum OutlineCommands {
    /// Generate an outline for an existing title
    Generate {
        /// Title ID
        #[arg(long)]
        title_id: String,

        /// Print the job ID and exit without waiting
        #[arg(long)]
        no_wait: bool,

        #[command(flatten)]
        poll: PollArgs,
    },
}

/// Blog subcommands
#[derive(Subcommand)]
pub enum BlogCommands {
    /// Generate a blog post from an existing outline
    Generate {
        /// Outline ID
        #[arg(long)]
        outline_id: String,

        /// Print the job ID and exit without waiting
        #[arg(long)]
        no_wait: bool,

        #[command(flatten)]
        poll: PollArgs,
    },
}

pub async fn handle_titles_command(command: TitlesCommands, config: &Config) -> Result<()> {
    match command {
        TitlesCommands::Generate {
            date,
            topic,
            count,
            no_wait,
            poll,
        } => {
            let job_id = config
                .client()
                .create_title_job(GenerateTitles { date: date.clone(), topic, count })
                .await
                .with_context(|| format!("Failed to start title generation for {}", date))?;
            follow_job(config, job_id, no_wait, &poll).await
        }
    }
}

pub async fn handle_outline_command(command: OutlineCommands, config: &Config) -> Result<()> {
    match command {
        OutlineCommands::Generate {
            title_id,
            no_wait,
            poll,
        } => {
            let job_id = config
                .client()
                .create_outline_job(GenerateOutline { title_id })
                .await
                .context("Failed to start outline generation")?;
            follow_job(config, job_id, no_wait, &poll).await
        }
    }
}

pub async fn handle_blog_command(command: BlogCommands, config: &Config) -> Result<()> {
    match command {
        BlogCommands::Generate {
            outline_id,
            no_wait,
            poll,
        } => {
            let job_id = config
                .client()
                .create_blog_job(GenerateBlog { outline_id })
                .await
                .context("Failed to start blog generation")?;
            follow_job(config, job_id, no_wait, &poll).await
        }
    }
}

/// Reports a freshly created job and optionally waits for it
async fn follow_job(config: &Config, job_id: JobId, no_wait: bool, poll: &PollArgs) -> Result<()> {
    println!(
        "{} Started job {}",
        "✓".green(),
        job_id.to_string().cyan()
    );

    if no_wait {
        println!(
            "{}",
            format!("  Watch it with: scribe job watch {}", job_id).dimmed()
        );
        return Ok(());
    }

    let poller_config = poll.apply(&config.poller)?;
    let job = wait_for_job(config.client(), &job_id, poller_config).await?;

    println!();
    print_job_details(&job);

    Ok(())
}

/// Validates a `YYYY-MM-DD` calendar date
pub(crate) fn parse_date(s: &str) -> Result<String, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .map_err(|e| format!("invalid date '{}' (expected YYYY-MM-DD): {}", s, e))
}
