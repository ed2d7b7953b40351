// Integration tests for ThreadingPool and TaskQueue
// Tests cover: every task runs exactly once, shutdown drains the backlog,
// dequeue order, and rejection after exit

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use iocore::{
    PoolConfig, PoolError, Task, TaskError, TaskId, TaskQueue, TaskStatus, ThreadingPool,
};
use parking_lot::Mutex;

fn started_pool(threads: usize) -> ThreadingPool {
    let pool = ThreadingPool::new(PoolConfig::new(threads).unwrap()).unwrap();
    pool.start().unwrap();
    pool
}

// ============================================================================
// Execution
// ============================================================================

#[test]
fn test_every_task_runs_exactly_once() {
    const TASKS: usize = 500;

    for workers in [1, 2, 8] {
        let pool = started_pool(workers);
        let counters: Arc<Vec<AtomicUsize>> =
            Arc::new((0..TASKS).map(|_| AtomicUsize::new(0)).collect());

        let handles: Vec<_> = (0..TASKS)
            .map(|i| {
                let counters = Arc::clone(&counters);
                pool.spawn(move || {
                    counters[i].fetch_add(1, Ordering::SeqCst);
                })
                .unwrap()
            })
            .collect();

        for handle in &handles {
            assert!(handle.wait_timeout(Duration::from_secs(10)));
            assert_eq!(handle.status(), TaskStatus::Finished);
        }
        for (i, counter) in counters.iter().enumerate() {
            assert_eq!(counter.load(Ordering::SeqCst), 1, "task {} with {} workers", i, workers);
        }

        pool.exit();
        assert_eq!(pool.stats().completed, TASKS as u64);
    }
}

#[test]
fn test_tasks_run_concurrently_across_workers() {
    let pool = started_pool(4);
    let barrier = Arc::new(std::sync::Barrier::new(4));

    // all four must be running at once for any of them to pass the barrier
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            pool.spawn(move || {
                barrier.wait();
            })
            .unwrap()
        })
        .collect();

    for handle in handles {
        assert!(handle.wait_timeout(Duration::from_secs(10)));
    }
}

#[test]
fn test_single_worker_preserves_submission_order() {
    let pool = started_pool(1);
    let order = Arc::new(Mutex::new(Vec::new()));

    for i in 0..100 {
        let order = Arc::clone(&order);
        pool.spawn(move || order.lock().push(i)).unwrap();
    }
    pool.exit();

    assert_eq!(*order.lock(), (0..100).collect::<Vec<_>>());
}

#[test]
fn test_hand_built_tasks_use_pool_ids() {
    let pool = started_pool(2);
    let id = pool.next_task_id();
    let (task, handle) = Task::new(id, || "built by hand");

    assert_eq!(task.id(), id);
    pool.add_task(task).unwrap();
    assert_eq!(handle.id(), id);
    assert_eq!(handle.join(), Ok("built by hand"));

    assert_ne!(pool.next_task_id(), id);
}

#[test]
fn test_panic_is_reported_per_task() {
    let pool = started_pool(2);

    let handle = pool
        .spawn(|| -> u8 { panic!("decoder rejected frame") })
        .unwrap();
    match handle.join() {
        Err(TaskError::Panicked { message }) => assert_eq!(message, "decoder rejected frame"),
        other => panic!("unexpected outcome: {:?}", other),
    }

    assert_eq!(pool.spawn(|| 5).unwrap().join(), Ok(5));
}

// ============================================================================
// Shutdown
// ============================================================================

#[test]
fn test_exit_drains_queued_tasks() {
    let pool = started_pool(2);
    let ran = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let ran = Arc::clone(&ran);
            pool.spawn(move || {
                thread::sleep(Duration::from_millis(1));
                ran.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap()
        })
        .collect();

    pool.exit();

    assert_eq!(ran.load(Ordering::SeqCst), 50);
    for handle in handles {
        assert!(handle.is_finished());
        assert_eq!(handle.join(), Ok(()));
    }
}

#[test]
fn test_add_task_after_exit_is_rejected() {
    let pool = started_pool(2);
    pool.exit();

    let ran = Arc::new(AtomicUsize::new(0));
    let (task, handle) = {
        let ran = Arc::clone(&ran);
        Task::new(TaskId::new(99), move || {
            ran.fetch_add(1, Ordering::SeqCst);
        })
    };

    assert!(matches!(pool.add_task(task), Err(PoolError::Closed)));
    assert!(matches!(pool.spawn(|| ()), Err(PoolError::Closed)));
    assert_eq!(handle.join(), Err(TaskError::Abandoned));

    thread::sleep(Duration::from_millis(20));
    assert_eq!(ran.load(Ordering::SeqCst), 0, "no callback may run after exit");
}

#[test]
fn test_second_concurrent_exit_waits_for_backlog() {
    let pool = Arc::new(started_pool(1));
    let finished = Arc::new(AtomicUsize::new(0));

    for _ in 0..5 {
        let finished = Arc::clone(&finished);
        pool.spawn(move || {
            thread::sleep(Duration::from_millis(50));
            finished.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    let first = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || pool.exit())
    };
    thread::sleep(Duration::from_millis(10));

    pool.exit();
    assert_eq!(
        finished.load(Ordering::SeqCst),
        5,
        "every exit caller returns only after queued tasks finish"
    );
    assert_eq!(pool.stats().workers, 0);

    first.join().unwrap();
}

#[test]
fn test_exit_is_idempotent_and_drop_exits() {
    let ran = Arc::new(AtomicUsize::new(0));
    {
        let pool = started_pool(3);
        for _ in 0..10 {
            let ran = Arc::clone(&ran);
            pool.spawn(move || ran.fetch_add(1, Ordering::SeqCst)).unwrap();
        }
        pool.exit();
        pool.exit();
        assert!(!pool.is_accepting());
    }
    assert_eq!(ran.load(Ordering::SeqCst), 10);

    {
        let pool = started_pool(3);
        for _ in 0..10 {
            let ran = Arc::clone(&ran);
            pool.spawn(move || ran.fetch_add(1, Ordering::SeqCst)).unwrap();
        }
    }
    assert_eq!(ran.load(Ordering::SeqCst), 20);
}

// ============================================================================
// TaskQueue
// ============================================================================

#[test]
fn test_queue_dequeues_in_fifo_order_across_threads() {
    let queue = Arc::new(TaskQueue::new());
    for i in 0..20 {
        let (task, _) = Task::new(TaskId::new(i), || ());
        queue.push(task).unwrap();
    }
    queue.close();

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut ids = Vec::new();
            while let Some(task) = queue.pop_wait() {
                ids.push(task.id().as_u64());
            }
            ids
        })
    };

    assert_eq!(consumer.join().unwrap(), (0..20).collect::<Vec<u64>>());
}

#[test]
fn test_blocked_consumers_all_released_on_close() {
    let queue = Arc::new(TaskQueue::new());

    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop_wait().is_none())
        })
        .collect();

    thread::sleep(Duration::from_millis(20));
    queue.close();

    for consumer in consumers {
        assert!(consumer.join().unwrap());
    }
}
