//! Fixed-size worker pool.
//!
//! - [`ThreadingPool`] - N named OS threads draining one shared [`TaskQueue`]
//! - [`PoolStats`] - Point-in-time counters
//!
//! Workers run each task to completion on their own thread. There is no
//! dynamic scaling, no work stealing and no cancellation of running work:
//! [`ThreadingPool::exit`] closes the queue, lets the backlog drain, and
//! joins every worker.
//!
//! [`TaskQueue`]: crate::TaskQueue

mod worker;

use std::fmt;
use std::mem;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle, ThreadId};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::task::{Task, TaskHandle, TaskId};

use worker::{Shared, worker_loop};

/// Point-in-time pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Worker threads spawned and not yet joined.
    pub workers: usize,
    /// Workers currently inside a callback.
    pub active: usize,
    /// Tasks waiting in the queue.
    pub queued: usize,
    /// Tasks that ran to completion, including failed ones.
    pub completed: u64,
    /// Tasks whose callback panicked.
    pub failed: u64,
}

/// Start/exit bookkeeping, guarded by one lock so the two cannot interleave.
#[derive(Default)]
struct Lifecycle {
    started: bool,
    /// Set by the first `exit` caller, which does the joining.
    exiting: bool,
    /// Set once every joinable worker has been joined.
    exited: bool,
    workers: Vec<JoinHandle<()>>,
    worker_threads: Vec<ThreadId>,
}

/// A fixed set of worker threads consuming a shared task queue.
///
/// Tasks are dequeued in submission order but run concurrently once
/// dequeued. Submitting to a pool that has exited returns
/// [`PoolError::Closed`]; the caller decides whether to drop, log or retry
/// elsewhere. Dropping the pool calls [`exit`](Self::exit).
///
/// # Example
///
/// ```
/// use iocore::{PoolConfig, ThreadingPool};
///
/// let pool = ThreadingPool::new(PoolConfig::new(4)?.with_thread_name("offload"))?;
/// pool.start()?;
///
/// let handles: Vec<_> = (0..8u64)
///     .map(|n| pool.spawn(move || n * n))
///     .collect::<Result<_, _>>()?;
///
/// let total: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
/// assert_eq!(total, 140);
///
/// pool.exit();
/// assert!(pool.spawn(|| ()).is_err());
/// # Ok::<(), iocore::PoolError>(())
/// ```
pub struct ThreadingPool {
    config: PoolConfig,
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle>,
    exited: Condvar,
}

impl ThreadingPool {
    /// Creates a pool. No threads run until [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if the configuration does not
    /// validate.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        Ok(Self {
            config,
            shared: Arc::new(Shared::default()),
            lifecycle: Mutex::new(Lifecycle::default()),
            exited: Condvar::new(),
        })
    }

    /// Creates a pool with `threads` workers and default settings.
    pub fn with_threads(threads: usize) -> Result<Self, PoolError> {
        Self::new(PoolConfig::default().with_thread_count(threads))
    }

    /// Spawns exactly `thread_count` workers.
    ///
    /// # Errors
    ///
    /// - [`PoolError::AlreadyStarted`] on a second call
    /// - [`PoolError::Closed`] after [`exit`](Self::exit)
    /// - [`PoolError::Spawn`] if the OS refuses a thread; workers spawned
    ///   before the failure keep running and are joined by `exit`
    pub fn start(&self) -> Result<(), PoolError> {
        let mut lifecycle = self.lifecycle.lock();
        // exit closes the queue before taking this lock
        if lifecycle.exiting || self.shared.queue.is_closed() {
            return Err(PoolError::Closed);
        }
        if lifecycle.started {
            return Err(PoolError::AlreadyStarted);
        }
        lifecycle.started = true;

        for worker_id in 0..self.config.thread_count() {
            let shared = Arc::clone(&self.shared);
            let wait = self.config.wait_timeout();
            let mut builder =
                thread::Builder::new().name(format!("{}-{}", self.config.thread_name(), worker_id));
            if let Some(size) = self.config.stack_size() {
                builder = builder.stack_size(size);
            }
            let handle = builder.spawn(move || worker_loop(shared, worker_id, wait))?;
            lifecycle.worker_threads.push(handle.thread().id());
            lifecycle.workers.push(handle);
        }

        info!(
            threads = self.config.thread_count(),
            name = self.config.thread_name(),
            "threading pool started"
        );
        Ok(())
    }

    /// Queues a prepared task.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Closed`] if the pool no longer accepts work. The
    /// rejected task is dropped, so its handle resolves to
    /// [`TaskError::Abandoned`](crate::TaskError::Abandoned).
    pub fn add_task(&self, task: Task) -> Result<(), PoolError> {
        self.shared.queue.push(task).map_err(|task| {
            debug!(task = %task.id(), "task rejected, pool closed");
            PoolError::Closed
        })
    }

    /// Wraps `f` in a task with a fresh id and queues it.
    pub fn spawn<F, T>(&self, f: F) -> Result<TaskHandle<T>, PoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (task, handle) = Task::new(self.next_task_id(), f);
        self.add_task(task)?;
        Ok(handle)
    }

    /// Issues an id from this pool's counter, for building tasks by hand.
    pub fn next_task_id(&self) -> TaskId {
        self.shared.ids.next_id()
    }

    /// Closes the queue and joins every worker.
    ///
    /// Tasks already queued still run before this returns. Concurrent and
    /// repeated calls all block until the workers are joined. The one
    /// exception is a call made from a pool worker while another caller is
    /// joining: it returns at once, since waiting would mean waiting on
    /// itself. On a pool that was never started, queued tasks are dropped
    /// instead (their handles report abandonment).
    pub fn exit(&self) {
        self.shared.queue.close();
        let current = thread::current().id();

        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.exiting {
            if lifecycle.worker_threads.contains(&current) {
                return;
            }
            while !lifecycle.exited {
                self.exited.wait(&mut lifecycle);
            }
            return;
        }
        lifecycle.exiting = true;
        let handles = mem::take(&mut lifecycle.workers);
        let started = lifecycle.started;
        drop(lifecycle);

        let joined = handles.len();
        for handle in handles {
            if handle.thread().id() == current {
                warn!("exit called from a pool worker; not joining the calling thread");
                continue;
            }
            if handle.join().is_err() {
                error!("worker thread panicked outside a task");
            }
        }

        if !started {
            while let Some(task) = self.shared.queue.try_pop() {
                debug!(task = %task.id(), "dropping task queued on a pool that never started");
            }
        }

        self.lifecycle.lock().exited = true;
        self.exited.notify_all();

        if joined > 0 {
            info!(workers = joined, "threading pool exited");
        }
    }

    /// Number of workers this pool spawns.
    pub fn thread_count(&self) -> usize {
        self.config.thread_count()
    }

    /// Returns true until [`exit`](Self::exit) has been called.
    pub fn is_accepting(&self) -> bool {
        !self.shared.queue.is_closed()
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            workers: self.lifecycle.lock().workers.len(),
            active: self.shared.active.load(Ordering::Relaxed),
            queued: self.shared.queue.len(),
            completed: self.shared.completed.load(Ordering::Relaxed),
            failed: self.shared.failed.load(Ordering::Relaxed),
        }
    }
}

impl Drop for ThreadingPool {
    fn drop(&mut self) {
        self.exit();
    }
}

impl fmt::Debug for ThreadingPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadingPool")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
