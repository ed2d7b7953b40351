//! Blocking, closable FIFO of tasks.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::Task;

/// Result of a timed pop.
#[derive(Debug)]
pub enum Pop {
    /// A task was dequeued.
    Task(Task),
    /// The wait bound elapsed with the queue still open and empty.
    TimedOut,
    /// The queue is closed and fully drained.
    Closed,
}

struct QueueState {
    tasks: VecDeque<Task>,
    closed: bool,
}

/// A FIFO of [`Task`]s shared by producers and workers.
///
/// Pushing never blocks. Popping blocks until a task arrives or the queue is
/// closed. Closing stops new pushes but keeps the backlog: poppers keep
/// receiving queued tasks and only see "closed" once the queue is empty.
///
/// # Example
///
/// ```
/// use iocore::{Task, TaskId, TaskQueue};
///
/// let queue = TaskQueue::new();
/// let (task, _handle) = Task::new(TaskId::new(0), || ());
/// queue.push(task).expect("queue is open");
///
/// queue.close();
/// assert!(queue.pop_wait().is_some());
/// assert!(queue.pop_wait().is_none());
/// ```
pub struct TaskQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl TaskQueue {
    /// Creates an open, empty queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Appends `task` and wakes one waiting popper.
    ///
    /// # Errors
    ///
    /// Hands the task back if the queue is closed.
    pub fn push(&self, task: Task) -> Result<(), Task> {
        {
            let mut state = self.state.lock();
            if state.closed {
                return Err(task);
            }
            state.tasks.push_back(task);
        }
        self.available.notify_one();
        Ok(())
    }

    /// Blocks until a task is available.
    ///
    /// Returns `None` only when the queue is closed and empty.
    pub fn pop_wait(&self) -> Option<Task> {
        let mut state = self.state.lock();
        loop {
            if let Some(task) = state.tasks.pop_front() {
                return Some(task);
            }
            if state.closed {
                return None;
            }
            self.available.wait(&mut state);
        }
    }

    /// Like [`pop_wait`](Self::pop_wait), but gives up after `timeout`.
    pub fn pop_timeout(&self, timeout: Duration) -> Pop {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if let Some(task) = state.tasks.pop_front() {
                return Pop::Task(task);
            }
            if state.closed {
                return Pop::Closed;
            }
            if self.available.wait_until(&mut state, deadline).timed_out() {
                return match state.tasks.pop_front() {
                    Some(task) => Pop::Task(task),
                    None if state.closed => Pop::Closed,
                    None => Pop::TimedOut,
                };
            }
        }
    }

    /// Dequeues a task if one is ready, without blocking.
    pub fn try_pop(&self) -> Option<Task> {
        self.state.lock().tasks.pop_front()
    }

    /// Stops accepting tasks and wakes every blocked popper.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.available.notify_all();
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.state.lock().tasks.len()
    }

    /// Returns true if no tasks are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TaskQueue")
            .field("len", &state.tasks.len())
            .field("closed", &state.closed)
            .finish()
    }
}
