//! Calendar command handlers
//!
//! Plans content for several dates at once: one title generation job per
//! date, each watched by its own [`JobWatcher`] over a shared cache.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use scribe_core::domain::job::JobId;
use scribe_core::dto::job::GenerateTitles;
use scribe_poller::{HttpJobRepository, InMemoryJobCache, JobPoller, JobWatcher, PollerSnapshot, PollerState};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use super::generate::parse_date;
use crate::config::{Config, PollArgs};

/// Calendar subcommands
#[derive(Subcommand)]
pub enum CalendarCommands {
    /// Generate titles for one or more calendar dates
    Generate {
        /// Calendar date (YYYY-MM-DD); repeat for several dates
        #[arg(long = "date", required = true, value_parser = parse_date)]
        dates: Vec<String>,

        /// Topic to steer the titles towards
        #[arg(long)]
        topic: Option<String>,

        /// Number of titles per date
        #[arg(long)]
        count: Option<u32>,

        #[command(flatten)]
        poll: PollArgs,
    },
}

pub async fn handle_calendar_command(command: CalendarCommands, config: &Config) -> Result<()> {
    match command {
        CalendarCommands::Generate {
            dates,
            topic,
            count,
            poll,
        } => generate_calendar(config, dates, topic, count, &poll).await,
    }
}

/// Terminal outcome reported by the watcher at the given position
type Outcome = (usize, bool);

/// Which watchers have reported, by position
///
/// Keyed by position: two dates may be backed by the same job id.
struct Progress {
    outcomes: Vec<Option<bool>>,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self {
            outcomes: vec![None; total],
        }
    }

    /// Records an outcome; returns false if `index` already reported
    fn record(&mut self, index: usize, succeeded: bool) -> bool {
        match self.outcomes.get_mut(index) {
            Some(slot @ None) => {
                *slot = Some(succeeded);
                true
            }
            _ => false,
        }
    }

    fn finished(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_some()).count()
    }

    fn is_complete(&self) -> bool {
        self.finished() == self.outcomes.len()
    }
}

async fn generate_calendar(
    config: &Config,
    dates: Vec<String>,
    topic: Option<String>,
    count: Option<u32>,
    poll: &PollArgs,
) -> Result<()> {
    let poller_config = poll.apply(&config.poller)?;
    let client = config.client();

    let mut jobs = Vec::new();
    for date in unique_dates(dates) {
        let request = GenerateTitles {
            date: date.clone(),
            topic: topic.clone(),
            count,
        };
        let job_id = client
            .create_title_job(request)
            .await
            .with_context(|| format!("Failed to start title generation for {}", date))?;
        println!(
            "{} {} → job {}",
            "✓".green(),
            date.bold(),
            job_id.to_string().cyan()
        );
        jobs.push((date, job_id));
    }

    let builder = JobPoller::builder(Arc::new(HttpJobRepository::new(client)))
        .cache(Arc::new(InMemoryJobCache::new()))
        .config(poller_config);

    let (tx, mut outcomes) = mpsc::unbounded_channel::<Outcome>();
    let watchers: Vec<JobWatcher<String>> = jobs
        .into_iter()
        .enumerate()
        .map(|(index, (date, job_id))| {
            let done = tx.clone();
            let failed = tx.clone();
            JobWatcher::mount(
                builder.clone(),
                job_id,
                date,
                move |_: &JobId| {
                    let _ = done.send((index, true));
                },
                move |_: &JobId| {
                    let _ = failed.send((index, false));
                },
            )
        })
        .collect();
    drop(tx);

    println!();
    println!(
        "{} Waiting for {} job(s)...",
        "⏳".yellow(),
        watchers.len()
    );

    let mut progress = Progress::new(watchers.len());
    while !progress.is_complete() {
        tokio::select! {
            outcome = outcomes.recv() => {
                let Some((index, succeeded)) = outcome else {
                    break;
                };
                if !progress.record(index, succeeded) {
                    continue;
                }
                if let Some(watcher) = watchers.get(index) {
                    let marker = if succeeded { "✓".green() } else { "✗".red() };
                    println!("  {} {}", marker, watcher.correlation());
                    debug!("Job {} finished (succeeded: {})", watcher.job_id(), succeeded);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                bail!(
                    "Interrupted with {} of {} job(s) still running",
                    watchers.len() - progress.finished(),
                    watchers.len()
                );
            }
        }
    }

    println!();
    println!("{}", "Calendar summary:".bold());
    let mut failures = 0;
    for watcher in &watchers {
        let snapshot = watcher.snapshot();
        if snapshot.state != PollerState::Succeeded {
            failures += 1;
        }
        println!("  {:<12} {}", watcher.correlation(), summarize(&snapshot));
    }

    if failures > 0 {
        bail!("{} of {} date(s) failed", failures, watchers.len());
    }

    Ok(())
}

/// Drops repeated dates, keeping the first occurrence
fn unique_dates(dates: Vec<String>) -> Vec<String> {
    let mut unique = Vec::with_capacity(dates.len());
    for date in dates {
        if !unique.contains(&date) {
            unique.push(date);
        }
    }
    unique
}

/// One-line outcome of a watched job
fn summarize(snapshot: &PollerSnapshot) -> String {
    match snapshot.state {
        PollerState::Succeeded => {
            let produced = snapshot
                .job
                .as_ref()
                .and_then(|job| job.result.as_ref())
                .and_then(|result| result.as_array())
                .map(|titles| format!(" ({} title(s))", titles.len()))
                .unwrap_or_default();
            format!("{}{}", "completed".green(), produced)
        }
        PollerState::Failed => {
            let message = snapshot
                .job
                .as_ref()
                .map(|job| job.failure_message())
                .unwrap_or_default();
            format!("{} {}", "failed:".red(), message)
        }
        PollerState::TimedOut => format!(
            "{} after {} status read(s)",
            "timed out".red(),
            snapshot.attempts
        ),
        state => format!("{:?}", state).dimmed().to_string(),
    }
}
