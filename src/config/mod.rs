//! Configuration for buffers and worker pools.
//!
//! This module provides types to configure the two primitives:
//!
//! - [`BufferConfig`] - Initial capacity, compaction threshold and growth cap
//! - [`PoolConfig`] - Worker count, idle wait bound and thread naming
//!
//! # Example
//!
//! ```
//! use iocore::{BufferConfig, PoolConfig};
//!
//! let buffer = BufferConfig::default()
//!     .with_initial_capacity(16 * 1024)
//!     .with_max_capacity(Some(1024 * 1024));
//! buffer.validate()?;
//!
//! let pool = PoolConfig::new(4)?.with_wait_timeout_ms(50);
//! assert_eq!(pool.thread_count(), 4);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::thread;
use std::time::Duration;

use crate::error::{BufferError, PoolError};

/// Default initial buffer capacity (4 KiB).
pub const DEFAULT_INITIAL_CAPACITY: usize = 4 * 1024;

/// Default dead-prefix length past which a buffer compacts before growing.
pub const DEFAULT_COMPACT_THRESHOLD: usize = 3000;

/// Worker count used when available parallelism cannot be queried.
pub const FALLBACK_THREAD_COUNT: usize = 4;

/// Default worker thread name prefix.
pub const DEFAULT_THREAD_NAME: &str = "iocore-worker";

/// Configuration for a [`Buffer`](crate::Buffer).
///
/// - `initial_capacity` - bytes allocated up front
/// - `compact_threshold` - once this many consumed bytes sit in front of the
///   read cursor, a write that runs out of trailing space shifts the live
///   region to the front before considering growth
/// - `max_capacity` - optional hard cap on the store; growth past it fails
///   with [`BufferError::CapacityExceeded`]
///
/// # Example
///
/// ```
/// use iocore::BufferConfig;
///
/// let config = BufferConfig::new(1024, 512);
/// assert_eq!(config.initial_capacity(), 1024);
/// assert!(config.with_max_capacity(Some(10)).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferConfig {
    initial_capacity: usize,
    compact_threshold: usize,
    max_capacity: Option<usize>,
}

impl BufferConfig {
    /// Creates an unbounded configuration.
    pub const fn new(initial_capacity: usize, compact_threshold: usize) -> Self {
        Self {
            initial_capacity,
            compact_threshold,
            max_capacity: None,
        }
    }

    /// Sets the initial capacity.
    ///
    /// Note: This does not validate the configuration.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets the compaction threshold.
    pub fn with_compact_threshold(mut self, threshold: usize) -> Self {
        self.compact_threshold = threshold;
        self
    }

    /// Sets (or clears) the maximum capacity.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`BufferConfig::validate`] to check it.
    pub fn with_max_capacity(mut self, max: Option<usize>) -> Self {
        self.max_capacity = max;
        self
    }

    /// Returns the initial capacity.
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// Returns the compaction threshold.
    pub fn compact_threshold(&self) -> usize {
        self.compact_threshold
    }

    /// Returns the maximum capacity, if bounded.
    pub fn max_capacity(&self) -> Option<usize> {
        self.max_capacity
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), BufferError> {
        match self.max_capacity {
            Some(max) if max < self.initial_capacity => Err(BufferError::InvalidConfig {
                message: "max_capacity cannot be smaller than initial_capacity",
            }),
            _ => Ok(()),
        }
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_CAPACITY, DEFAULT_COMPACT_THRESHOLD)
    }
}

/// Configuration for a [`ThreadingPool`](crate::ThreadingPool).
///
/// `wait_timeout` is advisory: idle workers wake up at that interval while
/// blocked on an empty queue. It never drops or reorders work, and shutdown
/// does not depend on it.
///
/// # Example
///
/// ```
/// use iocore::PoolConfig;
/// use std::time::Duration;
///
/// let config = PoolConfig::new(2)?
///     .with_wait_timeout_ms(25)
///     .with_thread_name("decoder");
///
/// assert_eq!(config.wait_timeout(), Some(Duration::from_millis(25)));
/// assert_eq!(config.thread_name(), "decoder");
/// # Ok::<(), iocore::PoolError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PoolConfig {
    thread_count: usize,
    wait_timeout: Option<Duration>,
    thread_name: String,
    stack_size: Option<usize>,
}

impl PoolConfig {
    /// Creates a configuration with `thread_count` workers.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if `thread_count` is zero.
    pub fn new(thread_count: usize) -> Result<Self, PoolError> {
        let config = Self {
            thread_count,
            wait_timeout: None,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            stack_size: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the worker count.
    ///
    /// Note: This does not validate the configuration.
    pub fn with_thread_count(mut self, count: usize) -> Self {
        self.thread_count = count;
        self
    }

    /// Sets the idle wait bound in milliseconds; `0` waits indefinitely.
    pub fn with_wait_timeout_ms(mut self, ms: u64) -> Self {
        self.wait_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        self
    }

    /// Sets the worker thread name prefix. Workers are named `{prefix}-{n}`.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Sets the worker stack size in bytes.
    pub fn with_stack_size(mut self, size: Option<usize>) -> Self {
        self.stack_size = size;
        self
    }

    /// Returns the worker count.
    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Returns the idle wait bound.
    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout
    }

    /// Returns the worker thread name prefix.
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// Returns the worker stack size, if set.
    pub fn stack_size(&self) -> Option<usize> {
        self.stack_size
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.thread_count == 0 {
            return Err(PoolError::InvalidConfig {
                message: "thread_count must be non-zero",
            });
        }

        if self.thread_name.is_empty() {
            return Err(PoolError::InvalidConfig {
                message: "thread_name cannot be empty",
            });
        }

        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        let thread_count = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(FALLBACK_THREAD_COUNT);

        Self {
            thread_count,
            wait_timeout: None,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            stack_size: None,
        }
    }
}
