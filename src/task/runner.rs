use crate::observability;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn, Span};

/// Lifecycle of a background task as seen by its handle.
///
/// `Running` moves to exactly one of the terminal states once the result has
/// been observed through [`TaskHandle::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Running,
    Completed,
    Failed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Failure of a background task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The work returned an error.
    #[error("{0:#}")]
    Failed(anyhow::Error),

    /// The work panicked; the panic was contained on the worker thread.
    #[error("background task panicked: {0}")]
    Panicked(String),

    /// The worker went away without reporting a result.
    #[error("background task ended without reporting a result")]
    Disconnected,

    /// The caller stopped waiting. The task keeps running and its result is
    /// discarded.
    #[error("background task did not finish within {0:?}")]
    TimedOut(Duration),

    /// The result was already handed out by an earlier `poll`.
    #[error("background task result was already taken")]
    Consumed,

    /// The worker thread could not be created.
    #[error("failed to spawn background thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Runs units of work off the calling thread.
///
/// Every task gets its own named thread; at most one task per command kind
/// is expected to be alive at a time (see [`InFlightSlot`](super::InFlightSlot)),
/// so no pool is kept.
#[derive(Debug, Clone)]
pub struct AsyncTaskRunner {
    thread_prefix: String,
}

impl Default for AsyncTaskRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncTaskRunner {
    pub fn new() -> Self {
        Self::with_prefix("proofcheck")
    }

    /// Use a custom prefix for worker thread names.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            thread_prefix: prefix.into(),
        }
    }

    /// Start `work` on a dedicated background thread.
    ///
    /// The result (value, error or contained panic) is sent exactly once
    /// through a one-shot channel owned by the returned handle. If the handle
    /// is gone by then, the result is dropped on the worker thread.
    pub fn start<T, F>(&self, label: &str, work: F) -> Result<TaskHandle<T>, TaskError>
    where
        T: Send + 'static,
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        let (sender, receiver) = channel::bounded(1);
        let thread_name = format!("{}-{}", self.thread_prefix, label);
        let task_label = label.to_string();
        let parent_span = Span::current();

        thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                let _span = parent_span.entered();
                let outcome = {
                    let _contained = observability::contain_panics();
                    match panic::catch_unwind(AssertUnwindSafe(work)) {
                        Ok(Ok(value)) => Ok(value),
                        Ok(Err(err)) => Err(TaskError::Failed(err)),
                        Err(payload) => Err(TaskError::Panicked(panic_message(payload.as_ref()))),
                    }
                };
                if sender.send(outcome).is_err() {
                    debug!(task = %task_label, "result discarded, handle was dropped");
                }
            })
            .map_err(TaskError::Spawn)?;

        debug!(task = label, "background task started");
        Ok(TaskHandle {
            label: label.to_string(),
            receiver,
            state: TaskState::Running,
            started: Instant::now(),
        })
    }
}

/// One in-flight unit of background work.
#[must_use = "dropping a TaskHandle abandons the task's result"]
pub struct TaskHandle<T> {
    label: String,
    receiver: Receiver<Result<T, TaskError>>,
    state: TaskState,
    started: Instant,
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("label", &self.label)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<T> TaskHandle<T> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Time since the task was started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Block until the task finishes.
    pub fn wait(self) -> Result<T, TaskError> {
        if self.state != TaskState::Running {
            return Err(TaskError::Consumed);
        }
        self.receiver.recv().unwrap_or(Err(TaskError::Disconnected))
    }

    /// Block until the task finishes or `timeout` elapses.
    ///
    /// On timeout the task is abandoned, not stopped: it runs to completion
    /// and its result is discarded.
    pub fn wait_timeout(self, timeout: Duration) -> Result<T, TaskError> {
        if self.state != TaskState::Running {
            return Err(TaskError::Consumed);
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                warn!(task = %self.label, ?timeout, "abandoning background task");
                Err(TaskError::TimedOut(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(TaskError::Disconnected),
        }
    }

    /// [`wait`](Self::wait) or [`wait_timeout`](Self::wait_timeout) depending
    /// on whether a timeout is configured.
    pub fn wait_for(self, timeout: Option<Duration>) -> Result<T, TaskError> {
        match timeout {
            Some(timeout) => self.wait_timeout(timeout),
            None => self.wait(),
        }
    }

    /// Non-blocking check for completion.
    ///
    /// Returns the result the first time it is available and `None` before
    /// that and forever after.
    pub fn poll(&mut self) -> Option<Result<T, TaskError>> {
        if self.state != TaskState::Running {
            return None;
        }
        let outcome = match self.receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(TaskError::Disconnected),
        };
        self.state = if outcome.is_ok() {
            TaskState::Completed
        } else {
            TaskState::Failed
        };
        Some(outcome)
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::bounded;

    fn poll_until_done<T>(handle: &mut TaskHandle<T>) -> Result<T, TaskError> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = handle.poll() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "task never completed");
            thread::yield_now();
        }
    }

    #[test]
    fn test_wait_returns_value() {
        let runner = AsyncTaskRunner::new();
        let handle = runner.start("sum", || Ok(2 + 2)).unwrap();
        assert_eq!(handle.wait().unwrap(), 4);
    }

    #[test]
    fn test_work_runs_off_the_calling_thread() {
        let caller = thread::current().id();
        let runner = AsyncTaskRunner::with_prefix("test");
        let handle = runner
            .start("where", || {
                let current = thread::current();
                Ok((current.id(), current.name().map(str::to_string)))
            })
            .unwrap();

        let (worker, name) = handle.wait().unwrap();
        assert_ne!(worker, caller);
        assert_eq!(name.as_deref(), Some("test-where"));
    }

    #[test]
    fn test_failure_is_surfaced_not_swallowed() {
        let runner = AsyncTaskRunner::new();
        let handle = runner
            .start::<(), _>("fail", || Err(anyhow::anyhow!("engine exploded")))
            .unwrap();

        match handle.wait() {
            Err(TaskError::Failed(err)) => assert!(err.to_string().contains("engine exploded")),
            other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_panic_is_contained() {
        let runner = AsyncTaskRunner::new();
        let handle = runner
            .start::<(), _>("panics", || panic!("rule table corrupt"))
            .unwrap();

        match handle.wait() {
            Err(TaskError::Panicked(message)) => assert_eq!(message, "rule table corrupt"),
            other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_poll_yields_result_exactly_once() {
        let runner = AsyncTaskRunner::new();
        let (release, gate) = bounded::<()>(0);
        let mut handle = runner
            .start("gated", move || {
                gate.recv()?;
                Ok("done")
            })
            .unwrap();

        assert!(handle.poll().is_none());
        assert_eq!(handle.state(), TaskState::Running);

        release.send(()).unwrap();
        assert_eq!(poll_until_done(&mut handle).unwrap(), "done");
        assert_eq!(handle.state(), TaskState::Completed);

        assert!(handle.poll().is_none());
        assert!(matches!(handle.wait(), Err(TaskError::Consumed)));
    }

    #[test]
    fn test_poll_marks_failed_state() {
        let runner = AsyncTaskRunner::new();
        let mut handle = runner
            .start::<(), _>("fail", || Err(anyhow::anyhow!("nope")))
            .unwrap();

        assert!(poll_until_done(&mut handle).is_err());
        assert_eq!(handle.state(), TaskState::Failed);
    }

    #[test]
    fn test_timeout_abandons_but_task_still_finishes() {
        let runner = AsyncTaskRunner::new();
        let (release, gate) = bounded::<()>(0);
        let (finished_tx, finished_rx) = bounded::<()>(1);
        let handle = runner
            .start("slow", move || {
                gate.recv()?;
                finished_tx.send(())?;
                Ok(())
            })
            .unwrap();

        let outcome = handle.wait_timeout(Duration::from_millis(20));
        assert!(matches!(outcome, Err(TaskError::TimedOut(_))));

        release.send(()).unwrap();
        finished_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("abandoned task should still run to completion");
    }

    #[test]
    fn test_wait_for_without_timeout_blocks_until_done() {
        let runner = AsyncTaskRunner::new();
        let handle = runner.start("quick", || Ok("ok")).unwrap();
        assert_eq!(handle.wait_for(None).unwrap(), "ok");
    }

    #[test]
    fn test_state_display() {
        assert_eq!(TaskState::Running.to_string(), "running");
        assert_eq!(TaskState::Completed.to_string(), "completed");
        assert_eq!(TaskState::Failed.to_string(), "failed");
    }
}
