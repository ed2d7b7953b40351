//! Locked, zero-copy access to a buffer.

use std::io::{self, Read};

use bytes::Buf;
use parking_lot::MutexGuard;

use super::state::{ReadPos, State};
use crate::error::BufferError;
use crate::view::View;

/// Exclusive access to a [`Buffer`](crate::Buffer) for as long as it lives.
///
/// Views handed out by the guard borrow it, so the borrow checker rejects
/// any write, read or compaction while a view is still in use. Drop the
/// guard (or copy the bytes with [`View::to_bytes`]) before handing data to
/// another thread.
///
/// The guard also implements [`bytes::Buf`] over the unread region and
/// [`std::io::Write`] for appending.
///
/// # Example
///
/// ```
/// use bytes::Buf;
/// use iocore::Buffer;
///
/// let buffer = Buffer::new();
/// buffer.write([0u8, 0, 0, 5])?.write("hello")?;
///
/// let mut guard = buffer.lock();
/// let len = guard.get_u32() as usize;
/// let body = guard.read(len)?;
/// assert_eq!(body, "hello");
/// # Ok::<(), iocore::BufferError>(())
/// ```
pub struct BufferGuard<'a> {
    state: MutexGuard<'a, State>,
}

impl<'a> BufferGuard<'a> {
    pub(super) fn new(state: MutexGuard<'a, State>) -> Self {
        Self { state }
    }

    /// Appends `data`, compacting or growing as needed.
    pub fn write(&mut self, data: impl AsRef<[u8]>) -> Result<&mut Self, BufferError> {
        self.state.write(data.as_ref())?;
        Ok(self)
    }

    /// Returns the next `n` unread bytes and advances past them.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfBounds`] if fewer than `n` bytes are
    /// unread. The read cursor does not move in that case.
    pub fn read(&mut self, n: usize) -> Result<View<'_>, BufferError> {
        self.state.read(n).map(View::new)
    }

    /// Returns every unread byte and advances past them.
    pub fn read_all(&mut self) -> View<'_> {
        View::new(self.state.read_all())
    }

    /// Skips `n` unread bytes, clamped to what is available.
    pub fn consume(&mut self, n: usize) {
        self.state.consume(n);
    }

    /// Returns the unread region without advancing.
    pub fn to_slice(&self) -> View<'_> {
        View::new(self.state.unread())
    }

    /// Checkpoints the read cursor.
    pub fn read_pos(&self) -> ReadPos {
        self.state.read_pos()
    }

    /// Restores a checkpoint taken with [`read_pos`](Self::read_pos).
    pub fn rewind_to(&mut self, pos: ReadPos) -> Result<(), BufferError> {
        self.state.rewind_to(pos)
    }

    /// Reads once from `reader` straight into trailing space, up to `max`
    /// bytes. Returns the number of bytes appended; `0` means EOF.
    pub fn fill_from<R: Read + ?Sized>(
        &mut self,
        reader: &mut R,
        max: usize,
    ) -> Result<usize, BufferError> {
        self.state.fill_from(reader, max)
    }

    /// Number of unread bytes.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Returns true if nothing is left to read.
    pub fn is_empty(&self) -> bool {
        self.state.len() == 0
    }

    /// Size of the underlying store.
    pub fn capacity(&self) -> usize {
        self.state.capacity()
    }

    /// Raw read cursor.
    pub fn read_index(&self) -> usize {
        self.state.read_index()
    }

    /// Raw write cursor.
    pub fn write_index(&self) -> usize {
        self.state.write_index()
    }
}

impl Buf for BufferGuard<'_> {
    fn remaining(&self) -> usize {
        self.state.len()
    }

    fn chunk(&self) -> &[u8] {
        self.state.unread()
    }

    /// Advances like [`consume`](BufferGuard::consume): a count past
    /// `remaining()` clamps to the write cursor instead of panicking, so a
    /// read cursor can never pass the written data. The `get_*` helpers
    /// still panic on short input because they check `remaining()` first.
    fn advance(&mut self, cnt: usize) {
        self.state.consume(cnt);
    }
}

impl io::Write for BufferGuard<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.state.write(buf).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
