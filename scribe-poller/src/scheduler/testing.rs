//! Scripted fakes shared by the scheduler tests

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use scribe_core::domain::job::{Job, JobId, JobStatus};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::{self, Duration};

use crate::config::PollerConfig;
use crate::repository::JobRepository;
use crate::scheduler::events::PollerCallbacks;

/// One scripted answer to a read
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Status(JobStatus),
    Failed(Option<&'static str>),
    ReadError,
}

/// Repository that replays a script per job; the last reply repeats forever
#[derive(Default)]
pub(crate) struct ScriptedRepository {
    scripts: Mutex<HashMap<JobId, Vec<Reply>>>,
    calls: Mutex<HashMap<JobId, usize>>,
}

impl ScriptedRepository {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn script(self: Arc<Self>, job_id: &str, replies: Vec<Reply>) -> Arc<Self> {
        self.scripts
            .lock()
            .unwrap()
            .insert(JobId::from(job_id), replies);
        self
    }

    pub(crate) fn calls_for(&self, job_id: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&JobId::from(job_id))
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl JobRepository for ScriptedRepository {
    async fn fetch_job(&self, job_id: &JobId) -> Result<Job> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(job_id.clone()).or_insert(0);
            *count += 1;
            *count
        };

        let reply = {
            let scripts = self.scripts.lock().unwrap();
            let replies = scripts
                .get(job_id)
                .ok_or_else(|| anyhow!("Resource not found: job {}", job_id))?;
            replies[(call - 1).min(replies.len() - 1)].clone()
        };

        match reply {
            Reply::Status(status) => Ok(Job::new(job_id.clone(), status)),
            Reply::Failed(Some(error)) => Ok(Job::new(job_id.clone(), JobStatus::Failed).with_error(error)),
            Reply::Failed(None) => Ok(Job::new(job_id.clone(), JobStatus::Failed)),
            Reply::ReadError => Err(anyhow!("connection refused")),
        }
    }
}

/// Repository whose reads take `delay` and always report `PROCESSING`
pub(crate) struct SlowRepository {
    delay: Duration,
    started: AtomicU32,
    in_flight: AtomicU32,
    max_in_flight: AtomicU32,
}

impl SlowRepository {
    pub(crate) fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            started: AtomicU32::new(0),
            in_flight: AtomicU32::new(0),
            max_in_flight: AtomicU32::new(0),
        })
    }

    /// Reads issued so far, finished or not
    pub(crate) fn started(&self) -> u32 {
        self.started.load(Ordering::SeqCst)
    }

    /// Highest number of reads ever outstanding at once
    pub(crate) fn max_in_flight(&self) -> u32 {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobRepository for SlowRepository {
    async fn fetch_job(&self, job_id: &JobId) -> Result<Job> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let outstanding = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(outstanding, Ordering::SeqCst);

        time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Job::new(job_id.clone(), JobStatus::Processing))
    }
}

/// Records every terminal callback
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    completed: Arc<Mutex<Vec<String>>>,
    errors: Arc<Mutex<Vec<String>>>,
    timeouts: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub(crate) fn callbacks(&self) -> PollerCallbacks {
        let (completed, errors, timeouts) = (
            self.completed.clone(),
            self.errors.clone(),
            self.timeouts.clone(),
        );
        PollerCallbacks::new()
            .on_complete(move |job| completed.lock().unwrap().push(job.id.to_string()))
            .on_error(move |message| errors.lock().unwrap().push(message.to_string()))
            .on_timeout(move |job_id| timeouts.lock().unwrap().push(job_id.to_string()))
    }

    pub(crate) fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    pub(crate) fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub(crate) fn timeouts(&self) -> Vec<String> {
        self.timeouts.lock().unwrap().clone()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.completed().is_empty() && self.errors().is_empty() && self.timeouts().is_empty()
    }
}

/// Fast cadence so tests finish in milliseconds
pub(crate) fn test_config() -> PollerConfig {
    PollerConfig::default()
        .with_poll_interval(Duration::from_millis(10))
        .with_max_backoff(Duration::from_millis(40))
}

/// Polls `condition` until it holds or two seconds pass
pub(crate) async fn wait_until(condition: impl Fn() -> bool) -> bool {
    time::timeout(Duration::from_secs(2), async {
        while !condition() {
            time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .is_ok()
}
