//! Synchronized byte buffers.
//!
//! - [`Buffer`] - Lock-per-call buffer returning owned bytes
//! - [`BufferGuard`] - Held lock handing out borrowed [`View`](crate::View)s
//! - [`ReadPos`] - Read cursor checkpoint for speculative parsing
//!
//! The store is a single contiguous allocation with a read and a write
//! cursor (`read <= write <= capacity`). Consumed space at the front is
//! reclaimed by shifting the unread bytes down before the store is allowed
//! to grow.

mod guard;
mod shared;
mod state;

pub use guard::BufferGuard;
pub use shared::Buffer;
pub use state::ReadPos;
