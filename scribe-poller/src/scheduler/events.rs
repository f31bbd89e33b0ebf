//! Terminal events and the callbacks that receive them
//!
//! A poller reports exactly one terminal event per job identifier:
//!
//! - [`on_complete`](PollerCallbacks::on_complete): the job reported `COMPLETED`
//! - [`on_error`](PollerCallbacks::on_error): the job reported `FAILED`
//! - [`on_timeout`](PollerCallbacks::on_timeout): a configured polling ceiling was hit
//!
//! Consumers that prefer a message channel can use [`PollerCallbacks::channel`].

use scribe_core::domain::job::{Job, JobId};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Terminal outcome of watching one job
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// The job finished successfully
    Completed(Job),
    /// The job reported its own failure
    Failed { job_id: JobId, message: String },
    /// Polling gave up before the job reached a terminal status
    TimedOut { job_id: JobId, attempts: u32 },
}

impl JobEvent {
    pub fn job_id(&self) -> &JobId {
        match self {
            JobEvent::Completed(job) => &job.id,
            JobEvent::Failed { job_id, .. } | JobEvent::TimedOut { job_id, .. } => job_id,
        }
    }
}

impl fmt::Display for JobEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobEvent::Completed(job) => write!(f, "job {} completed", job.id),
            JobEvent::Failed { job_id, message } => write!(f, "job {} failed: {}", job_id, message),
            JobEvent::TimedOut { job_id, attempts } => {
                write!(f, "job {} timed out after {} read(s)", job_id, attempts)
            }
        }
    }
}

/// Type alias for the on_complete callback.
pub type OnCompleteCallback = Arc<dyn Fn(&Job) + Send + Sync>;

/// Type alias for the on_error callback.
pub type OnErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Type alias for the on_timeout callback.
pub type OnTimeoutCallback = Arc<dyn Fn(&JobId) + Send + Sync>;

/// Type alias for the catch-all on_event callback.
pub type OnEventCallback = Arc<dyn Fn(&JobEvent) + Send + Sync>;

/// Callbacks invoked when a watched job reaches a terminal state
///
/// Unset callbacks are skipped. Callbacks run on the poller's task and
/// should not block.
#[derive(Clone, Default)]
pub struct PollerCallbacks {
    on_complete: Option<OnCompleteCallback>,
    on_error: Option<OnErrorCallback>,
    on_timeout: Option<OnTimeoutCallback>,
    on_event: Option<OnEventCallback>,
}

impl PollerCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the completed job
    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: Fn(&Job) + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(f));
        self
    }

    /// Called with the job's `error`, or "Job failed" when it has none
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    /// Called with the job id when a polling ceiling is exceeded
    pub fn on_timeout<F>(mut self, f: F) -> Self
    where
        F: Fn(&JobId) + Send + Sync + 'static,
    {
        self.on_timeout = Some(Arc::new(f));
        self
    }

    /// Called with every terminal event, after the specific callback
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&JobEvent) + Send + Sync + 'static,
    {
        self.on_event = Some(Arc::new(f));
        self
    }

    /// Callbacks that forward every terminal event into a channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<JobEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let callbacks = Self::new().on_event(move |event| {
            // Receiver gone means nobody is waiting any more.
            let _ = tx.send(event.clone());
        });
        (callbacks, rx)
    }

    pub(crate) fn emit(&self, event: &JobEvent) {
        debug!("Dispatching terminal event: {}", event);
        match event {
            JobEvent::Completed(job) => {
                if let Some(cb) = &self.on_complete {
                    cb(job);
                }
            }
            JobEvent::Failed { message, .. } => {
                if let Some(cb) = &self.on_error {
                    cb(message);
                }
            }
            JobEvent::TimedOut { job_id, .. } => {
                if let Some(cb) = &self.on_timeout {
                    cb(job_id);
                }
            }
        }
        if let Some(cb) = &self.on_event {
            cb(event);
        }
    }
}

impl fmt::Debug for PollerCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollerCallbacks")
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_timeout", &self.on_timeout.is_some())
            .field("on_event", &self.on_event.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::domain::job::JobStatus;
    use std::sync::Mutex;

    #[test]
    fn test_emit_routes_to_matching_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));

        let (c, e, t) = (seen.clone(), seen.clone(), seen.clone());
        let callbacks = PollerCallbacks::new()
            .on_complete(move |job| c.lock().unwrap().push(format!("complete:{}", job.id)))
            .on_error(move |msg| e.lock().unwrap().push(format!("error:{}", msg)))
            .on_timeout(move |id| t.lock().unwrap().push(format!("timeout:{}", id)));

        callbacks.emit(&JobEvent::Completed(Job::new("a", JobStatus::Completed)));
        callbacks.emit(&JobEvent::Failed {
            job_id: JobId::from("b"),
            message: "Oh no".to_string(),
        });
        callbacks.emit(&JobEvent::TimedOut {
            job_id: JobId::from("c"),
            attempts: 3,
        });

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["complete:a", "error:Oh no", "timeout:c"]
        );
    }

    #[test]
    fn test_missing_callbacks_are_skipped() {
        PollerCallbacks::new().emit(&JobEvent::Completed(Job::new("a", JobStatus::Completed)));
    }

    #[tokio::test]
    async fn test_channel_forwards_events() {
        let (callbacks, mut rx) = PollerCallbacks::channel();
        let event = JobEvent::Failed {
            job_id: JobId::from("job-2"),
            message: "Oh no".to_string(),
        };

        callbacks.emit(&event);

        let received = rx.recv().await.unwrap();
        assert_eq!(received, event);
        assert_eq!(received.job_id().as_str(), "job-2");
    }
}
