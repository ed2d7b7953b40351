//! Awaiting task handles.
//!
//! With the `async` feature, a [`TaskHandle`] is a runtime-agnostic future:
//! the worker that finishes the task wakes the awaiting executor. This lets
//! async code hand blocking work to a [`ThreadingPool`](crate::ThreadingPool)
//! without parking an executor thread.
//!
//! # Example
//!
//! ```ignore
//! use iocore::ThreadingPool;
//!
//! async fn checksum(pool: &ThreadingPool, data: Vec<u8>) -> Option<u32> {
//!     let handle = pool.spawn(move || data.iter().map(|&b| b as u32).sum()).ok()?;
//!     handle.await.ok()
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::future::FusedFuture;

use super::TaskHandle;
use crate::error::TaskError;

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, TaskError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.completion.poll_outcome(cx)
    }
}

impl<T> FusedFuture for TaskHandle<T> {
    fn is_terminated(&self) -> bool {
        self.completion.is_taken()
    }
}
