//! Per-task result channel.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::task::Waker;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::{TaskId, TaskStatus};
use crate::error::TaskError;

struct Slot<T> {
    outcome: Option<Result<T, TaskError>>,
    taken: bool,
    waker: Option<Waker>,
}

/// Shared between a running task and its handle.
pub(super) struct Completion<T> {
    status: AtomicU8,
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T> Completion<T> {
    pub(super) fn new() -> Self {
        Self {
            status: AtomicU8::new(TaskStatus::Pending.as_u8()),
            slot: Mutex::new(Slot {
                outcome: None,
                taken: false,
                waker: None,
            }),
            ready: Condvar::new(),
        }
    }

    pub(super) fn status(&self) -> TaskStatus {
        TaskStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub(super) fn mark_running(&self) {
        self.advance(TaskStatus::Running);
    }

    pub(super) fn finish(&self, outcome: Result<T, TaskError>) {
        let waker = {
            let mut slot = self.slot.lock();
            slot.outcome = Some(outcome);
            self.advance(TaskStatus::Finished);
            slot.waker.take()
        };
        self.ready.notify_all();
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    fn advance(&self, to: TaskStatus) {
        // fetch_max keeps the status from ever moving backwards
        self.status.fetch_max(to.as_u8(), Ordering::AcqRel);
    }

    fn take(slot: &mut Slot<T>) -> Option<Result<T, TaskError>> {
        if slot.taken {
            return Some(Err(TaskError::ResultTaken));
        }
        let outcome = slot.outcome.take()?;
        slot.taken = true;
        Some(outcome)
    }

    fn wait(&self) -> Result<T, TaskError> {
        let mut slot = self.slot.lock();
        loop {
            if let Some(outcome) = Self::take(&mut slot) {
                return outcome;
            }
            self.ready.wait(&mut slot);
        }
    }

    fn try_take(&self) -> Option<Result<T, TaskError>> {
        Self::take(&mut self.slot.lock())
    }

    fn wait_until(&self, deadline: Instant) -> bool {
        let mut slot = self.slot.lock();
        while slot.outcome.is_none() && !slot.taken {
            if self.ready.wait_until(&mut slot, deadline).timed_out() {
                return slot.outcome.is_some() || slot.taken;
            }
        }
        true
    }

    #[cfg(feature = "async")]
    pub(super) fn poll_outcome(
        &self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<T, TaskError>> {
        use std::task::Poll;

        let mut slot = self.slot.lock();
        if slot.outcome.is_some() {
            return match Self::take(&mut slot) {
                Some(outcome) => Poll::Ready(outcome),
                None => Poll::Pending,
            };
        }
        if slot.taken {
            // already resolved; a fused future is not polled again
            return Poll::Pending;
        }
        slot.waker = Some(cx.waker().clone());
        Poll::Pending
    }

    #[cfg(feature = "async")]
    pub(super) fn is_taken(&self) -> bool {
        self.slot.lock().taken
    }
}

/// Handle to the outcome of a [`Task`](crate::Task).
///
/// Dropping the handle does not cancel the task; the result is discarded
/// once it arrives.
///
/// # Example
///
/// ```
/// use iocore::ThreadingPool;
///
/// let pool = ThreadingPool::with_threads(2)?;
/// pool.start()?;
///
/// let handle = pool.spawn(|| (1..=10).sum::<u32>())?;
/// assert_eq!(handle.join(), Ok(55));
/// # Ok::<(), iocore::PoolError>(())
/// ```
pub struct TaskHandle<T> {
    id: TaskId,
    pub(super) completion: Arc<Completion<T>>,
}

impl<T> TaskHandle<T> {
    pub(super) fn new(id: TaskId, completion: Arc<Completion<T>>) -> Self {
        Self { id, completion }
    }

    /// Returns the task id.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the current status of the task.
    pub fn status(&self) -> TaskStatus {
        self.completion.status()
    }

    /// Returns true once the task has finished.
    pub fn is_finished(&self) -> bool {
        self.status() == TaskStatus::Finished
    }

    /// Blocks until the task finishes and returns its outcome.
    pub fn join(self) -> Result<T, TaskError> {
        self.completion.wait()
    }

    /// Returns the outcome if the task has finished, or the handle back.
    pub fn try_join(self) -> Result<Result<T, TaskError>, Self> {
        match self.completion.try_take() {
            Some(outcome) => Ok(outcome),
            None => Err(self),
        }
    }

    /// Blocks for at most `timeout` waiting for the task to finish.
    ///
    /// Returns true if the outcome is available.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.completion.wait_until(Instant::now() + timeout)
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("status", &self.status())
            .finish()
    }
}
