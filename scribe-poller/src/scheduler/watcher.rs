//! Job watcher
//!
//! Binds one [`JobPoller`] to one job for consumers that track several jobs
//! at once (for example one title job per calendar date). Terminal events
//! are reported with the job id instead of the job payload, so the consumer
//! never depends on the shape of a job record.

use scribe_core::domain::job::{Job, JobId};
use std::sync::Arc;

use crate::scheduler::events::PollerCallbacks;
use crate::scheduler::poller::{JobPoller, JobPollerBuilder, PollerSnapshot};

/// A mounted poller for a single job
///
/// Dropping the watcher unmounts it and cancels polling.
pub struct JobWatcher<C> {
    job_id: JobId,
    correlation: C,
    poller: JobPoller,
}

impl<C> JobWatcher<C> {
    /// Starts watching `job_id`
    ///
    /// `correlation` is kept for the caller's bookkeeping only. `on_error`
    /// receives the job id both when the job fails and when polling times out.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Arguments
    /// * `builder` - Poller template sharing repository, cache and config
    /// * `job_id` - The job to watch
    /// * `correlation` - Caller-side value tied to this job (e.g. a date)
    /// * `on_complete` - Called with `job_id` when the job completes
    /// * `on_error` - Called with `job_id` when the job fails or times out
    pub fn mount<F, E>(
        builder: JobPollerBuilder,
        job_id: impl Into<JobId>,
        correlation: C,
        on_complete: F,
        on_error: E,
    ) -> Self
    where
        F: Fn(&JobId) + Send + Sync + 'static,
        E: Fn(&JobId) + Send + Sync + 'static,
    {
        let job_id = job_id.into();
        let on_complete = Arc::new(on_complete);
        let on_error = Arc::new(on_error);

        let callbacks = PollerCallbacks::new()
            .on_complete({
                let job_id = job_id.clone();
                move |_: &Job| on_complete(&job_id)
            })
            .on_error({
                let job_id = job_id.clone();
                let on_error = Arc::clone(&on_error);
                move |_: &str| on_error(&job_id)
            })
            .on_timeout({
                let job_id = job_id.clone();
                move |_: &JobId| on_error(&job_id)
            });

        let poller = builder.callbacks(callbacks).build();
        poller.start(job_id.clone());

        Self {
            job_id,
            correlation,
            poller,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn correlation(&self) -> &C {
        &self.correlation
    }

    pub fn snapshot(&self) -> PollerSnapshot {
        self.poller.snapshot()
    }

    /// Stops watching and hands back the correlating value
    pub fn unmount(self) -> C {
        self.correlation
    }
}
