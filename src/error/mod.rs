//! Error types for iocore.

use std::io;

use thiserror::Error;

/// Errors that can occur while slicing views or operating on a buffer.
#[derive(Debug, Error)]
pub enum BufferError {
    /// A read or slice asked for more bytes than are available.
    #[error("out of bounds: requested {requested} bytes, {available} available")]
    OutOfBounds {
        /// The number of bytes (or the index) asked for.
        requested: usize,
        /// What was actually available.
        available: usize,
    },

    /// Growing the store would exceed the configured maximum capacity.
    #[error("capacity exceeded: {requested} bytes required (max {max})")]
    CapacityExceeded {
        /// The capacity that would have been needed.
        requested: usize,
        /// The configured maximum.
        max: usize,
    },

    /// The allocator refused to grow the store.
    #[error("allocation failed: could not grow buffer to {requested} bytes")]
    Alloc {
        /// The capacity that was being allocated.
        requested: usize,
    },

    /// A saved read position was taken before the buffer was compacted.
    #[error("stale read position: saved at generation {saved}, buffer is at {current}")]
    StaleReadPos {
        /// Generation recorded in the read position.
        saved: u64,
        /// Current generation of the buffer.
        current: u64,
    },

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// An I/O error occurred while filling the buffer from a reader.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Errors returned by [`ThreadingPool`](crate::ThreadingPool).
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool has been shut down and no longer accepts work.
    #[error("pool is closed")]
    Closed,

    /// `start` was called on a pool whose workers are already running.
    #[error("pool already started")]
    AlreadyStarted,

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker: {0}")]
    Spawn(#[from] io::Error),
}

/// Why a task did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The callback panicked; the payload message is preserved.
    #[error("task panicked: {message}")]
    Panicked {
        /// The panic payload rendered as text.
        message: String,
    },

    /// The task was dropped before any worker ran it.
    #[error("task abandoned before it ran")]
    Abandoned,

    /// The outcome was already retrieved through another path.
    #[error("task result already taken")]
    ResultTaken,
}
