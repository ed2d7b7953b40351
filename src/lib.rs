//! iocore
//!
//! Buffer and worker-pool primitives for event-driven I/O.
//!
//! `iocore` provides the two pieces an event loop leans on but should not
//! have to reinvent:
//!
//! - a synchronized, growable byte [`Buffer`] that accumulates inbound or
//!   outbound bytes, hands out zero-copy [`View`]s for incremental parsing,
//!   and reclaims consumed space by compaction before growing
//! - a fixed-size [`ThreadingPool`] that moves blocking or CPU-bound work
//!   off latency-sensitive I/O threads, with a [`TaskHandle`] per task to
//!   observe the result or the panic
//!
//! The crate intentionally:
//! - does NOT poll sockets or multiplex readiness
//! - does NOT parse any protocol
//! - does NOT schedule timers
//! - does NOT cancel work that is already queued or running
//!
//! # Buffer
//!
//! ```
//! use iocore::Buffer;
//!
//! let buffer = Buffer::new();
//! buffer.write("SET key 42\r\n")?;
//!
//! let mut guard = buffer.lock();
//! let mut line = guard.to_slice().eat_line();
//! let words: Vec<_> = std::iter::from_fn(|| Some(line.eat_word()))
//!     .take_while(|w| !w.is_empty())
//!     .map(|w| w.to_string())
//!     .collect();
//! assert_eq!(words, ["SET", "key", "42"]);
//! guard.consume(12);
//! # Ok::<(), iocore::BufferError>(())
//! ```
//!
//! # Pool
//!
//! ```
//! use iocore::{PoolConfig, ThreadingPool};
//!
//! let pool = ThreadingPool::new(PoolConfig::new(2)?)?;
//! pool.start()?;
//!
//! let handle = pool.spawn(|| "off the I/O thread")?;
//! assert_eq!(handle.join(), Ok("off the I/O thread"));
//!
//! pool.exit();
//! # Ok::<(), iocore::PoolError>(())
//! ```
//!
//! # Async (feature = "async")
//!
//! ```ignore
//! let handle = pool.spawn(expensive)?;
//! let value = handle.await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod buffer;
mod config;
mod error;
mod pool;
mod task;
mod view;

//
// Public surface
//

pub use buffer::{Buffer, BufferGuard, ReadPos};
pub use config::{BufferConfig, PoolConfig};
pub use error::{BufferError, PoolError, TaskError};
pub use pool::{PoolStats, ThreadingPool};
pub use task::{Pop, Task, TaskHandle, TaskId, TaskIdGen, TaskQueue, TaskStatus};
pub use view::{Split, View};
