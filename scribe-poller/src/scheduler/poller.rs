//! Job status poller
//!
//! Watches a single job until it reaches a terminal status. Reads are
//! strictly sequential: the next read is armed only after the previous one
//! resolved and its result was evaluated.
//!
//! Lifecycle of one subscription:
//! - `start`/`set_job_id` with polling enabled spawns a task for the id
//! - a non-terminal cache entry present at that point seeds the state
//! - every read refreshes the shared cache entry for the job
//! - before each read the cache entry is checked again; a record written by
//!   someone else that is further along (or terminal) is applied as if read
//! - `COMPLETED` fires `on_complete`, `FAILED` fires `on_error`, each once
//! - the cache entry is evicted and the task ends on a terminal status
//! - changing the id, disabling, `cancel` or dropping the poller aborts the task,
//!   and a job left before it finished has its cache entry evicted
//!
//! Callbacks are dispatched outside the subscription lock. A terminal event
//! is dropped if the subscription was cancelled before dispatch starts; a
//! cancel racing on another thread with a dispatch already under way cannot
//! recall it.

use scribe_core::domain::job::{Job, JobId, JobStatus};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::PollerConfig;
use crate::repository::JobRepository;
use crate::scheduler::events::{JobEvent, PollerCallbacks};
use crate::service::{ActivityProbe, AlwaysActive, InMemoryJobCache, JobCache, JobCacheKey};

/// Observable state of a poller
///
/// Derived from the identifier, the enabled flag and the last-observed
/// job status; it is never tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollerState {
    /// No identifier, or polling disabled
    Idle,
    /// Identifier set, nothing read yet
    AwaitingFirstRead,
    /// Last observed status is `PENDING` or `PROCESSING`
    InProgress,
    /// Last observed status is `COMPLETED`
    Succeeded,
    /// Last observed status is `FAILED`
    Failed,
    /// A polling ceiling was exceeded before a terminal status
    TimedOut,
}

impl PollerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::TimedOut)
    }
}

/// Point-in-time view of a poller
#[derive(Debug, Clone, Serialize)]
pub struct PollerSnapshot {
    pub job_id: Option<JobId>,
    pub state: PollerState,
    /// Last job record observed for the current identifier
    pub job: Option<Job>,
    /// True while the job is being watched and has not finished
    pub is_polling: bool,
    /// True until the first read for the current identifier succeeds
    pub is_loading: bool,
    /// A read is currently outstanding
    pub is_fetching: bool,
    /// Most recent read failure; cleared by the next successful read
    pub last_error: Option<String>,
    /// Reads issued for the current identifier
    pub attempts: u32,
}

/// Mutable state for the current identifier
#[derive(Default)]
struct Subscription {
    job_id: Option<JobId>,
    enabled: bool,
    /// Bumped whenever the running task is replaced or cancelled
    generation: u64,
    /// A terminal callback already fired for this identifier
    finished: bool,
    timed_out: bool,
    last_job: Option<Job>,
    fetching: bool,
    last_error: Option<String>,
    failures: u32,
    attempts: u32,
    started_at: Option<Instant>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    fn reset_progress(&mut self) {
        self.finished = false;
        self.timed_out = false;
        self.last_job = None;
        self.fetching = false;
        self.last_error = None;
        self.failures = 0;
        self.attempts = 0;
        self.started_at = None;
    }

    fn should_poll(&self) -> bool {
        self.job_id.is_some() && self.enabled && !self.finished
    }

    fn state(&self) -> PollerState {
        if self.job_id.is_none() || !self.enabled {
            return PollerState::Idle;
        }
        match self.last_job.as_ref().map(|job| job.status) {
            Some(JobStatus::Completed) => PollerState::Succeeded,
            Some(JobStatus::Failed) => PollerState::Failed,
            _ if self.timed_out => PollerState::TimedOut,
            Some(JobStatus::Pending | JobStatus::Processing) => PollerState::InProgress,
            None => PollerState::AwaitingFirstRead,
        }
    }
}

/// What the task does after evaluating a read
enum Step {
    /// Sleep for the given delay, then read again
    Continue(Duration),
    /// End the task, dispatching the event if any
    Stop(Option<JobEvent>),
}

struct Shared {
    repository: Arc<dyn JobRepository>,
    cache: Arc<dyn JobCache>,
    activity: Arc<dyn ActivityProbe>,
    config: PollerConfig,
    callbacks: PollerCallbacks,
    subscription: Mutex<Subscription>,
}

/// Builder for [`JobPoller`]
///
/// Cheap to clone: a consumer watching many jobs keeps one builder and
/// clones it per job so every poller shares the same cache and repository.
#[derive(Clone)]
pub struct JobPollerBuilder {
    repository: Arc<dyn JobRepository>,
    cache: Arc<dyn JobCache>,
    activity: Arc<dyn ActivityProbe>,
    config: PollerConfig,
    callbacks: PollerCallbacks,
}

impl JobPollerBuilder {
    /// Shares an existing cache instead of a private in-memory one
    pub fn cache(mut self, cache: Arc<dyn JobCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(mut self, config: PollerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn callbacks(mut self, callbacks: PollerCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Predicate consulted before each read; reads are deferred while it is false
    pub fn activity_probe(mut self, probe: Arc<dyn ActivityProbe>) -> Self {
        self.activity = probe;
        self
    }

    pub fn build(self) -> JobPoller {
        JobPoller {
            shared: Arc::new(Shared {
                repository: self.repository,
                cache: self.cache,
                activity: self.activity,
                config: self.config,
                callbacks: self.callbacks,
                subscription: Mutex::new(Subscription {
                    enabled: true,
                    ..Subscription::default()
                }),
            }),
        }
    }
}

/// Stateful subscription to one job's status
///
/// A fresh poller is idle and enabled: it starts reading as soon as it is
/// given an identifier. Methods that spawn the polling task must be called
/// from within a tokio runtime.
pub struct JobPoller {
    shared: Arc<Shared>,
}

impl JobPoller {
    /// Starts building a poller that reads jobs through `repository`
    pub fn builder(repository: Arc<dyn JobRepository>) -> JobPollerBuilder {
        JobPollerBuilder {
            repository,
            cache: Arc::new(InMemoryJobCache::new()),
            activity: Arc::new(AlwaysActive),
            config: PollerConfig::default(),
            callbacks: PollerCallbacks::default(),
        }
    }

    /// Creates a poller with the default activity probe
    pub fn new(
        repository: Arc<dyn JobRepository>,
        cache: Arc<dyn JobCache>,
        config: PollerConfig,
        callbacks: PollerCallbacks,
    ) -> Self {
        Self::builder(repository)
            .cache(cache)
            .config(config)
            .callbacks(callbacks)
            .build()
    }

    /// Watches `job_id` with polling enabled
    ///
    /// Calling this again with the identifier already being watched is a
    /// no-op, even after a terminal callback fired.
    pub fn start(&self, job_id: impl Into<JobId>) {
        let mut sub = self.shared.lock();
        sub.enabled = true;
        self.shared.assign(&mut sub, Some(job_id.into()));
    }

    /// Switches to another identifier, or back to idle with `None`
    ///
    /// Any pending read for the previous identifier is cancelled and no
    /// callback fires for it. A blank identifier counts as `None`.
    pub fn set_job_id(&self, job_id: Option<JobId>) {
        let mut sub = self.shared.lock();
        self.shared.assign(&mut sub, job_id);
    }

    /// Enables or disables polling without forgetting the identifier
    pub fn set_enabled(&self, enabled: bool) {
        let mut sub = self.shared.lock();
        if sub.enabled == enabled {
            return;
        }
        sub.enabled = enabled;
        debug!("Polling {}", if enabled { "enabled" } else { "disabled" });
        self.shared.rearm(&mut sub);
    }

    /// Stops watching and returns to idle
    pub fn cancel(&self) {
        self.set_job_id(None);
    }

    /// Feeds an externally obtained job record through the state machine
    ///
    /// Used when fresher data arrives from elsewhere (for example a cache
    /// refresh). Records for another identifier, or delivered while idle,
    /// are ignored. A terminal record stops polling; re-delivering one never
    /// fires a callback twice.
    pub fn observe(&self, job: Job) {
        let event = {
            let mut sub = self.shared.lock();
            if sub.job_id.as_ref() != Some(&job.id) || !sub.enabled {
                debug!("Ignoring observed job {}: not the watched job", job.id);
                return;
            }

            match self.shared.apply(&mut sub, job) {
                Step::Continue(_) => None,
                Step::Stop(event) => {
                    sub.generation += 1;
                    if let Some(task) = sub.task.take() {
                        task.abort();
                    }
                    event
                }
            }
        };

        if let Some(event) = event {
            self.shared.callbacks.emit(&event);
        }
    }

    /// Current state of the subscription
    pub fn snapshot(&self) -> PollerSnapshot {
        let sub = self.shared.lock();
        let state = sub.state();
        PollerSnapshot {
            job_id: sub.job_id.clone(),
            state,
            job: sub.last_job.clone(),
            is_polling: sub.should_poll(),
            is_loading: state == PollerState::AwaitingFirstRead,
            is_fetching: sub.fetching,
            last_error: sub.last_error.clone(),
            attempts: sub.attempts,
        }
    }

    pub fn state(&self) -> PollerState {
        self.shared.lock().state()
    }

    pub fn job_id(&self) -> Option<JobId> {
        self.shared.lock().job_id.clone()
    }
}

impl Drop for JobPoller {
    fn drop(&mut self) {
        let mut sub = self.shared.lock();
        self.shared.abandon(&sub);
        sub.generation += 1;
        if let Some(task) = sub.task.take() {
            task.abort();
        }
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Subscription> {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Points the subscription at `job_id`, restarting only when it changed
    fn assign(self: &Arc<Self>, sub: &mut Subscription, job_id: Option<JobId>) {
        let job_id = job_id.filter(|id| {
            if id.is_empty() {
                warn!("Ignoring blank job id");
            }
            !id.is_empty()
        });

        if sub.job_id == job_id {
            // Already watching (or already idle); re-arm only if a disable
            // left no task running.
            if sub.task.is_none() && sub.should_poll() {
                self.rearm(sub);
            }
            return;
        }

        self.abandon(sub);
        sub.job_id = job_id;
        sub.reset_progress();
        self.seed_from_cache(sub);
        self.rearm(sub);
    }

    /// Evicts the cache entry of a job that is being left unfinished
    fn abandon(&self, sub: &Subscription) {
        if let Some(job_id) = &sub.job_id
            && !sub.finished
            && self.cache.evict(&JobCacheKey::job_status(job_id)).is_some()
        {
            debug!("Evicted cached status of abandoned job {}", job_id);
        }
    }

    /// Starts from the cached record when it is not terminal yet
    ///
    /// Terminal entries are left for the first gate of the task, so their
    /// callback is dispatched like any other.
    fn seed_from_cache(&self, sub: &mut Subscription) {
        let Some(job_id) = &sub.job_id else {
            return;
        };
        if let Some(cached) = self.cache.get(&JobCacheKey::job_status(job_id))
            && cached.id == *job_id
            && !cached.is_terminal()
        {
            debug!("Seeding job {} from cache ({})", job_id, cached.status);
            sub.last_job = Some(cached);
        }
    }

    /// Cached record for `job_id` that is further along than the last one applied
    fn fresher_cached(&self, sub: &Subscription, job_id: &JobId) -> Option<Job> {
        let cached = self.cache.get(&JobCacheKey::job_status(job_id))?;
        if cached.id != *job_id {
            return None;
        }
        let fresher = match &sub.last_job {
            None => true,
            Some(last) => *last != cached && progress(cached.status) >= progress(last.status),
        };
        fresher.then_some(cached)
    }

    /// Cancels the running task and spawns a new one if polling should run
    fn rearm(self: &Arc<Self>, sub: &mut Subscription) {
        sub.generation += 1;
        sub.fetching = false;
        if let Some(task) = sub.task.take() {
            task.abort();
        }

        let Some(job_id) = sub.job_id.clone() else {
            debug!("Poller idle");
            return;
        };
        if !sub.should_poll() {
            return;
        }

        sub.started_at.get_or_insert_with(Instant::now);
        info!(
            "Watching job {} (interval: {:?})",
            job_id, self.config.poll_interval
        );

        let shared = Arc::clone(self);
        let generation = sub.generation;
        sub.task = Some(tokio::spawn(run(shared, generation, job_id)));
    }

    fn ceiling_reached(&self, sub: &Subscription) -> bool {
        let attempts_exhausted = self
            .config
            .max_attempts
            .is_some_and(|max| sub.attempts >= max);
        let expired = match (self.config.max_duration, sub.started_at) {
            (Some(max), Some(started)) => started.elapsed() >= max,
            _ => false,
        };
        attempts_exhausted || expired
    }

    fn time_out(&self, sub: &mut Subscription, job_id: &JobId) -> Step {
        sub.timed_out = true;
        sub.finished = true;
        self.cache.evict(&JobCacheKey::job_status(job_id));
        warn!(
            "Giving up on job {} after {} read(s)",
            job_id, sub.attempts
        );
        Step::Stop(Some(JobEvent::TimedOut {
            job_id: job_id.clone(),
            attempts: sub.attempts,
        }))
    }

    /// Checks whether the task for `generation` may issue another read
    fn gate(&self, generation: u64, job_id: &JobId) -> Option<Step> {
        let mut sub = self.lock();
        if sub.generation != generation {
            return Some(Step::Stop(None));
        }
        if let Some(cached) = self.fresher_cached(&sub, job_id) {
            debug!("Picked up cached status {} for job {}", cached.status, job_id);
            if let Step::Stop(event) = self.apply(&mut sub, cached) {
                return Some(Step::Stop(event));
            }
        }
        if self.ceiling_reached(&sub) {
            return Some(self.time_out(&mut sub, job_id));
        }
        None
    }

    fn begin_read(&self, generation: u64) -> bool {
        let mut sub = self.lock();
        if sub.generation != generation {
            return false;
        }
        sub.fetching = true;
        sub.attempts += 1;
        true
    }

    /// Evaluates the outcome of a read issued by the task for `generation`
    fn finish_read(&self, generation: u64, job_id: &JobId, result: anyhow::Result<Job>) -> Step {
        let mut sub = self.lock();
        if sub.generation != generation {
            debug!("Discarding stale read of job {}", job_id);
            return Step::Stop(None);
        }
        sub.fetching = false;

        match result {
            Ok(mut job) => {
                sub.failures = 0;
                sub.last_error = None;
                if job.id != *job_id {
                    warn!("Read of job {} returned job {}", job_id, job.id);
                    job.id = job_id.clone();
                }
                // A terminal record cached while the read was outstanding wins.
                let job = match self.fresher_cached(&sub, job_id) {
                    Some(cached) if cached.is_terminal() && !job.is_terminal() => cached,
                    _ => job,
                };
                self.apply(&mut sub, job)
            }
            Err(e) => {
                sub.failures += 1;
                sub.last_error = Some(format!("{:#}", e));
                let delay = self.config.backoff(sub.failures);
                warn!(
                    "Failed to read job {} (attempt {}): {:#}; retrying in {:?}",
                    job_id, sub.attempts, e, delay
                );
                if self.ceiling_reached(&sub) {
                    return self.time_out(&mut sub, job_id);
                }
                Step::Continue(delay)
            }
        }
    }

    /// Emits `event` unless the subscription for `generation` was cancelled
    fn dispatch(&self, generation: u64, event: &JobEvent) -> bool {
        if self.lock().generation != generation {
            debug!("Dropping {}: subscription was cancelled", event);
            return false;
        }
        self.callbacks.emit(event);
        true
    }

    /// Applies an observed job record to the subscription
    fn apply(&self, sub: &mut Subscription, job: Job) -> Step {
        let key = JobCacheKey::job_status(&job.id);

        if sub.finished {
            if job.is_terminal() {
                self.cache.evict(&key);
            }
            debug!("Job {} already finished, ignoring {}", job.id, job.status);
            return Step::Stop(None);
        }

        if !job.is_consistent() {
            warn!(
                "Job {} is {} but carries an unexpected result/error payload",
                job.id, job.status
            );
        }

        sub.last_job = Some(job.clone());

        match job.status {
            JobStatus::Pending | JobStatus::Processing => {
                debug!("Job {} is {}", job.id, job.status);
                let job_id = job.id.clone();
                self.cache.insert(key, job);
                if self.ceiling_reached(sub) {
                    return self.time_out(sub, &job_id);
                }
                Step::Continue(self.config.poll_interval)
            }
            JobStatus::Completed => {
                sub.finished = true;
                self.cache.evict(&key);
                info!("Job {} completed", job.id);
                Step::Stop(Some(JobEvent::Completed(job)))
            }
            JobStatus::Failed => {
                sub.finished = true;
                self.cache.evict(&key);
                let message = job.failure_message();
                info!("Job {} failed: {}", job.id, message);
                Step::Stop(Some(JobEvent::Failed {
                    job_id: job.id,
                    message,
                }))
            }
        }
    }
}

/// Ordering used to tell whether a cached record is further along
fn progress(status: JobStatus) -> u8 {
    match status {
        JobStatus::Pending => 0,
        JobStatus::Processing => 1,
        JobStatus::Completed | JobStatus::Failed => 2,
    }
}

/// Polling loop for one subscription generation
async fn run(shared: Arc<Shared>, generation: u64, job_id: JobId) {
    loop {
        if let Some(step) = shared.gate(generation, &job_id) {
            if let Step::Stop(Some(event)) = step {
                shared.dispatch(generation, &event);
            }
            return;
        }

        if !shared.activity.is_active() {
            debug!("Consumer inactive, deferring read of job {}", job_id);
            time::sleep(shared.config.poll_interval).await;
            continue;
        }

        if !shared.begin_read(generation) {
            return;
        }

        debug!("Reading job {}", job_id);
        let result = shared.repository.fetch_job(&job_id).await;

        match shared.finish_read(generation, &job_id, result) {
            Step::Continue(delay) => time::sleep(delay).await,
            Step::Stop(event) => {
                if let Some(event) = event {
                    shared.dispatch(generation, &event);
                }
                return;
            }
        }
    }
}
