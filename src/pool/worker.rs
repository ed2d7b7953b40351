//! Worker thread main loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::task::{Pop, Task, TaskIdGen, TaskQueue};

/// State shared between the pool handle and its workers.
#[derive(Debug, Default)]
pub(super) struct Shared {
    pub(super) queue: TaskQueue,
    pub(super) ids: TaskIdGen,
    /// Workers currently inside a callback.
    pub(super) active: AtomicUsize,
    pub(super) completed: AtomicU64,
    pub(super) failed: AtomicU64,
}

/// Pulls tasks until the queue reports closed-and-empty.
pub(super) fn worker_loop(shared: Arc<Shared>, worker_id: usize, wait: Option<Duration>) {
    debug!(worker_id, "worker started");

    while let Some(task) = next_task(&shared.queue, worker_id, wait) {
        execute(&shared, worker_id, task);
    }

    debug!(worker_id, "worker exiting, queue closed");
}

fn next_task(queue: &TaskQueue, worker_id: usize, wait: Option<Duration>) -> Option<Task> {
    let Some(timeout) = wait else {
        return queue.pop_wait();
    };
    loop {
        match queue.pop_timeout(timeout) {
            Pop::Task(task) => return Some(task),
            Pop::Closed => return None,
            Pop::TimedOut => trace!(worker_id, "worker idle"),
        }
    }
}

fn execute(shared: &Shared, worker_id: usize, task: Task) {
    let id = task.id();
    shared.active.fetch_add(1, Ordering::Relaxed);
    let result = task.run();
    shared.active.fetch_sub(1, Ordering::Relaxed);
    shared.completed.fetch_add(1, Ordering::Relaxed);

    if let Err(err) = result {
        shared.failed.fetch_add(1, Ordering::Relaxed);
        warn!(worker_id, task = %id, error = %err, "task failed");
    }
}
