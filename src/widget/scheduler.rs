//! Delayed tasks with cancellation handles.
//!
//! Every deferred step of the widget (scroll, simulated reply, reset
//! confirmation) is a tokio task sleeping for its delay. Callers get a
//! [`TaskHandle`] back; dropping it does not cancel the task. Outside a
//! tokio runtime nothing is spawned and the step is skipped with a warning.

use std::sync::Mutex;
use std::time::Duration;

use rand::Rng;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::warn;

/// Handle to a scheduled task.
#[derive(Debug)]
pub struct TaskHandle {
    label: &'static str,
    delay: Duration,
    handle: JoinHandle<()>,
}

impl TaskHandle {
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Abort the task if it has not run yet. Returns whether it was still pending.
    pub fn cancel(&self) -> bool {
        if self.handle.is_finished() {
            return false;
        }
        self.handle.abort();
        true
    }
}

/// Run `task` once after `delay` on the current tokio runtime.
///
/// Returns `None`, dropping `task`, when called outside a runtime.
pub fn schedule<F>(label: &'static str, delay: Duration, task: F) -> Option<TaskHandle>
where
    F: FnOnce() + Send + 'static,
{
    let Ok(runtime) = Handle::try_current() else {
        warn!(name: "widget.task.skipped", label, "No tokio runtime, delayed task dropped");
        return None;
    };

    let handle = runtime.spawn(async move {
        tokio::time::sleep(delay).await;
        task();
    });

    Some(TaskHandle {
        label,
        delay,
        handle,
    })
}

/// Inclusive range a randomized delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    /// Returns `None` when `min > max`.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Option<Self> {
        (min <= max).then_some(Self { min, max })
    }

    /// Range with both bounds equal.
    #[must_use]
    pub fn fixed(delay: Duration) -> Self {
        Self {
            min: delay,
            max: delay,
        }
    }

    #[must_use]
    pub fn min(&self) -> Duration {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Uniform sample using the thread-local RNG.
    #[must_use]
    pub fn sample(&self) -> Duration {
        self.sample_with(&mut rand::rng())
    }

    /// Uniform sample with millisecond granularity.
    pub fn sample_with<R: Rng>(&self, rng: &mut R) -> Duration {
        let min = duration_millis(self.min);
        let max = duration_millis(self.max);
        Duration::from_millis(rng.random_range(min..=max))
    }
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Set of outstanding handles, pruned as tasks finish.
#[derive(Debug, Default)]
pub struct PendingTasks {
    handles: Mutex<Vec<TaskHandle>>,
}

impl PendingTasks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, handle: TaskHandle) {
        let mut guard = self.handles.lock().unwrap();
        guard.retain(|h| !h.is_finished());
        guard.push(handle);
    }

    /// Number of tasks that have not finished.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut guard = self.handles.lock().unwrap();
        guard.retain(|h| !h.is_finished());
        guard.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cancel everything still pending. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<TaskHandle> = self.handles.lock().unwrap().drain(..).collect();
        drained.iter().filter(|h| h.cancel()).count()
    }
}
