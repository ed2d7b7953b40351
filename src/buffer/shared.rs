//! The synchronized buffer type.

use std::fmt;
use std::io::Read;

use bytes::Bytes;
use parking_lot::Mutex;

use super::guard::BufferGuard;
use super::state::{ReadPos, State};
use crate::config::BufferConfig;
use crate::error::BufferError;

/// A growable byte buffer with read and write cursors, safe to share
/// between producer and consumer threads.
///
/// Every method takes the buffer's lock for the duration of the call. Reads
/// through `Buffer` itself return owned [`Bytes`] copies, which stay valid
/// no matter what other threads do next. For zero-copy parsing, hold the
/// lock with [`Buffer::lock`] and work with the borrowed
/// [`View`](crate::View)s it hands out.
///
/// When a write runs out of trailing space the buffer first shifts its
/// unread bytes to the front (reclaiming consumed space), and only grows the
/// store if that is not enough.
///
/// # Example
///
/// ```
/// use iocore::Buffer;
///
/// let buffer = Buffer::new();
/// buffer.write("PING\r\n")?.write("PONG\r\n")?;
///
/// assert_eq!(&buffer.read(4)?[..], b"PING");
/// buffer.consume(2);
///
/// let checkpoint = buffer.read_pos();
/// assert_eq!(&buffer.read(4)?[..], b"PONG");
///
/// // not enough data for the next frame yet: rewind and wait for more
/// assert!(buffer.read(32).is_err());
/// buffer.rewind_to(checkpoint)?;
/// assert_eq!(buffer.len(), 6);
/// # Ok::<(), iocore::BufferError>(())
/// ```
pub struct Buffer {
    state: Mutex<State>,
}

impl Buffer {
    /// Creates a buffer with the default configuration.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::new(BufferConfig::default())),
        }
    }

    /// Creates a buffer with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidConfig`] if the configuration does not
    /// validate.
    pub fn with_config(config: BufferConfig) -> Result<Self, BufferError> {
        config.validate()?;
        Ok(Self {
            state: Mutex::new(State::new(config)),
        })
    }

    /// Locks the buffer for zero-copy access.
    pub fn lock(&self) -> BufferGuard<'_> {
        BufferGuard::new(self.state.lock())
    }

    /// Appends `data`. Returns the buffer for chaining.
    ///
    /// # Errors
    ///
    /// [`BufferError::CapacityExceeded`] or [`BufferError::Alloc`] if the
    /// store cannot grow enough. Nothing is written in that case.
    pub fn write(&self, data: impl AsRef<[u8]>) -> Result<&Self, BufferError> {
        self.state.lock().write(data.as_ref())?;
        Ok(self)
    }

    /// Copies out the next `n` unread bytes and advances past them.
    pub fn read(&self, n: usize) -> Result<Bytes, BufferError> {
        let mut state = self.state.lock();
        let bytes = Bytes::copy_from_slice(state.read(n)?);
        Ok(bytes)
    }

    /// Copies out every unread byte and advances past them.
    pub fn read_all(&self) -> Bytes {
        let mut state = self.state.lock();
        Bytes::copy_from_slice(state.read_all())
    }

    /// Skips `n` unread bytes, clamped to what is available.
    pub fn consume(&self, n: usize) {
        self.state.lock().consume(n);
    }

    /// Copies out the unread region without advancing.
    pub fn peek(&self) -> Bytes {
        let state = self.state.lock();
        Bytes::copy_from_slice(state.unread())
    }

    /// Checkpoints the read cursor.
    pub fn read_pos(&self) -> ReadPos {
        self.state.lock().read_pos()
    }

    /// Restores a checkpoint taken with [`read_pos`](Self::read_pos).
    ///
    /// A checkpoint at index `0` is ignored.
    ///
    /// # Errors
    ///
    /// [`BufferError::StaleReadPos`] if the buffer compacted since the
    /// checkpoint was taken; [`BufferError::OutOfBounds`] if it points past
    /// the written data.
    pub fn rewind_to(&self, pos: ReadPos) -> Result<(), BufferError> {
        self.state.lock().rewind_to(pos)
    }

    /// Reads once from `reader` straight into trailing space, up to `max`
    /// bytes. Returns the number of bytes appended; `0` means EOF.
    ///
    /// The lock is held while `reader` runs, so use non-blocking sources.
    /// Under a capacity cap the read is limited to the remaining headroom;
    /// a buffer already holding `max_capacity` unread bytes returns
    /// [`BufferError::CapacityExceeded`].
    pub fn fill_from<R: Read + ?Sized>(
        &self,
        reader: &mut R,
        max: usize,
    ) -> Result<usize, BufferError> {
        self.state.lock().fill_from(reader, max)
    }

    /// Number of unread bytes.
    pub fn len(&self) -> usize {
        self.state.lock().len()
    }

    /// Returns true if nothing is left to read.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the underlying store.
    pub fn capacity(&self) -> usize {
        self.state.lock().capacity()
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // try_lock: the caller may be holding a guard on this thread
        match self.state.try_lock() {
            Some(state) => f
                .debug_struct("Buffer")
                .field("read", &state.read_index())
                .field("write", &state.write_index())
                .field("capacity", &state.capacity())
                .finish(),
            None => f.debug_struct("Buffer").finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_chain_and_read() {
        let buffer = Buffer::new();
        buffer.write("ab").unwrap().write(b"cd").unwrap();
        assert_eq!(buffer.len(), 4);
        assert_eq!(&buffer.read(3).unwrap()[..], b"abc");
        assert_eq!(&buffer.read_all()[..], b"d");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_peek_does_not_advance() {
        let buffer = Buffer::new();
        buffer.write("peek").unwrap();
        assert_eq!(&buffer.peek()[..], b"peek");
        assert_eq!(&buffer.peek()[..], b"peek");
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn test_owned_reads_survive_later_writes() {
        let buffer = Buffer::with_config(BufferConfig::new(8, 0)).unwrap();
        buffer.write("12345678").unwrap();
        let first = buffer.read(4).unwrap();
        buffer.write("abcdefghijklmnop").unwrap();
        assert_eq!(&first[..], b"1234");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BufferConfig::new(64, 0).with_max_capacity(Some(8));
        assert!(Buffer::with_config(config).is_err());
    }

    #[test]
    fn test_debug_while_locked() {
        let buffer = Buffer::new();
        let rendered = format!("{:?}", buffer);
        assert!(rendered.contains("capacity"));

        let _guard = buffer.lock();
        assert_eq!(format!("{:?}", buffer), "Buffer { .. }");
    }
}
