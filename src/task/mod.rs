//! Deferred work units and the queue workers pull them from.
//!
//! - [`Task`] - A callback waiting to run, with a monotonic [`TaskStatus`]
//! - [`TaskHandle`] - Result channel for one task: join, poll or await it
//! - [`TaskQueue`] - Closable blocking FIFO shared by a pool's workers
//! - [`TaskIdGen`] - Counter handing out [`TaskId`]s, owned by whoever
//!   creates tasks (each pool has its own)

mod handle;
mod queue;

#[cfg(feature = "async")]
mod future;

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::TaskError;

pub use handle::TaskHandle;
pub use queue::{Pop, TaskQueue};

use handle::Completion;

/// Identifier of a task, unique within the [`TaskIdGen`] that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a raw id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Sequential [`TaskId`] source.
#[derive(Debug, Default)]
pub struct TaskIdGen {
    next: AtomicU64,
}

impl TaskIdGen {
    /// Creates a generator starting at id 0.
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Issues the next id.
    pub fn next_id(&self) -> TaskId {
        TaskId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Lifecycle of a task. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskStatus {
    /// Waiting in a queue.
    Pending,
    /// A worker is executing the callback.
    Running,
    /// The callback returned, panicked, or the task was abandoned.
    Finished,
}

impl TaskStatus {
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => TaskStatus::Pending,
            1 => TaskStatus::Running,
            _ => TaskStatus::Finished,
        }
    }

    pub(crate) fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Type-erased body of a task.
trait Runnable: Send {
    fn run(self: Box<Self>) -> Result<(), TaskError>;
    fn abandon(self: Box<Self>);
    fn status(&self) -> TaskStatus;
}

struct Job<F, T> {
    f: F,
    completion: Arc<Completion<T>>,
}

impl<F, T> Runnable for Job<F, T>
where
    F: FnOnce() -> T + Send,
    T: Send,
{
    fn run(self: Box<Self>) -> Result<(), TaskError> {
        let Job { f, completion } = *self;
        completion.mark_running();
        let outcome = panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
            TaskError::Panicked {
                message: panic_message(payload.as_ref()),
            }
        });
        let report = outcome.as_ref().map(|_| ()).map_err(Clone::clone);
        completion.finish(outcome);
        report
    }

    fn abandon(self: Box<Self>) {
        self.completion.finish(Err(TaskError::Abandoned));
    }

    fn status(&self) -> TaskStatus {
        self.completion.status()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// A unit of deferred work.
///
/// Created together with its [`TaskHandle`]. Running a task consumes it, so
/// no task runs twice. A task dropped without running (for example, rejected
/// by a closed queue) resolves its handle with [`TaskError::Abandoned`].
///
/// # Example
///
/// ```
/// use iocore::{Task, TaskId, TaskStatus};
///
/// let (task, handle) = Task::new(TaskId::new(7), || 6 * 7);
/// assert_eq!(task.status(), TaskStatus::Pending);
///
/// task.run()?;
/// assert_eq!(handle.status(), TaskStatus::Finished);
/// assert_eq!(handle.join()?, 42);
/// # Ok::<(), iocore::TaskError>(())
/// ```
pub struct Task {
    id: TaskId,
    job: Option<Box<dyn Runnable>>,
}

impl Task {
    /// Wraps `f` as a task and returns it with its result handle.
    pub fn new<F, T>(id: TaskId, f: F) -> (Task, TaskHandle<T>)
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let completion = Arc::new(Completion::new());
        let task = Task {
            id,
            job: Some(Box::new(Job {
                f,
                completion: Arc::clone(&completion),
            })),
        };
        (task, TaskHandle::new(id, completion))
    }

    /// Returns the task id.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the current status.
    pub fn status(&self) -> TaskStatus {
        self.job
            .as_ref()
            .map_or(TaskStatus::Finished, |job| job.status())
    }

    /// Runs the callback on the current thread and marks the task finished.
    ///
    /// A panic inside the callback is caught; it is delivered to the handle
    /// and also returned here so the caller can log it.
    pub fn run(mut self) -> Result<(), TaskError> {
        match self.job.take() {
            Some(job) => job.run(),
            None => Ok(()),
        }
    }
}

impl Drop for Task {
    fn drop(&mut self) {
        if let Some(job) = self.job.take() {
            job.abandon();
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("status", &self.status())
            .finish()
    }
}
