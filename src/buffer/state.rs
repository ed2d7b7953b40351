//! Cursor state behind the buffer lock.

use std::io::{self, Read};

use tracing::{debug, trace};

use crate::config::BufferConfig;
use crate::error::BufferError;

/// Smallest capacity a growing store jumps to.
const MIN_GROW_CAPACITY: usize = 64;

/// A checkpoint of a buffer's read cursor.
///
/// Obtained from `read_pos` and handed back to `rewind_to` to undo a
/// speculative parse. The checkpoint remembers the compaction generation it
/// was taken in; once the buffer compacts, the bytes it pointed at have
/// moved and restoring it fails with [`BufferError::StaleReadPos`].
///
/// A checkpoint whose index is `0` is a no-op when restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadPos {
    index: usize,
    generation: u64,
}

impl ReadPos {
    /// Raw read index within the store.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Compaction generation the checkpoint belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Contiguous store with read and write cursors.
///
/// Invariant: `read <= write <= store.len()`; `store.len()` is the capacity.
#[derive(Debug)]
pub(crate) struct State {
    store: Vec<u8>,
    read: usize,
    write: usize,
    generation: u64,
    config: BufferConfig,
}

impl State {
    pub(crate) fn new(config: BufferConfig) -> Self {
        Self {
            store: vec![0; config.initial_capacity()],
            read: 0,
            write: 0,
            generation: 0,
            config,
        }
    }

    pub(crate) fn unread(&self) -> &[u8] {
        &self.store[self.read..self.write]
    }

    pub(crate) fn len(&self) -> usize {
        self.write - self.read
    }

    pub(crate) fn capacity(&self) -> usize {
        self.store.len()
    }

    pub(crate) fn read_index(&self) -> usize {
        self.read
    }

    pub(crate) fn write_index(&self) -> usize {
        self.write
    }

    pub(crate) fn write(&mut self, data: &[u8]) -> Result<(), BufferError> {
        self.reserve(data.len())?;
        let end = self.write + data.len();
        self.store[self.write..end].copy_from_slice(data);
        self.write = end;
        Ok(())
    }

    pub(crate) fn read(&mut self, n: usize) -> Result<&[u8], BufferError> {
        if n > self.len() {
            return Err(BufferError::OutOfBounds {
                requested: n,
                available: self.len(),
            });
        }
        let start = self.read;
        self.read += n;
        Ok(&self.store[start..self.read])
    }

    pub(crate) fn read_all(&mut self) -> &[u8] {
        let start = self.read;
        self.read = self.write;
        &self.store[start..self.write]
    }

    pub(crate) fn consume(&mut self, n: usize) {
        self.read += n.min(self.len());
    }

    pub(crate) fn read_pos(&self) -> ReadPos {
        ReadPos {
            index: self.read,
            generation: self.generation,
        }
    }

    pub(crate) fn rewind_to(&mut self, pos: ReadPos) -> Result<(), BufferError> {
        if pos.index == 0 {
            return Ok(());
        }
        if pos.generation != self.generation {
            return Err(BufferError::StaleReadPos {
                saved: pos.generation,
                current: self.generation,
            });
        }
        if pos.index > self.write {
            return Err(BufferError::OutOfBounds {
                requested: pos.index,
                available: self.write,
            });
        }
        self.read = pos.index;
        Ok(())
    }

    /// Reads once from `reader` into up to `max` bytes of trailing space.
    ///
    /// With a capacity cap, the read window shrinks to the headroom left
    /// under the cap; only a buffer with no headroom at all is an error.
    pub(crate) fn fill_from<R: Read + ?Sized>(
        &mut self,
        reader: &mut R,
        max: usize,
    ) -> Result<usize, BufferError> {
        if max == 0 {
            return Ok(0);
        }
        let max = match self.config.max_capacity() {
            Some(cap) if self.len() >= cap => {
                return Err(BufferError::CapacityExceeded {
                    requested: self.len().saturating_add(max),
                    max: cap,
                });
            }
            Some(cap) => max.min(cap - self.len()),
            None => max,
        };
        self.reserve(max)?;
        let window = &mut self.store[self.write..self.write + max];
        let n = loop {
            match reader.read(window) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        self.write += n;
        Ok(n)
    }

    /// Ensures `additional` bytes of trailing space, compacting first and
    /// growing only if compaction is not enough.
    fn reserve(&mut self, additional: usize) -> Result<(), BufferError> {
        if self.capacity() - self.write >= additional {
            return Ok(());
        }

        let fits_after_compact = self.len() + additional <= self.capacity();
        // growing in place past the cap fails where growing a compacted store may not
        let over_cap = self
            .config
            .max_capacity()
            .is_some_and(|max| self.write.saturating_add(additional) > max);
        if self.read > 0
            && (self.read >= self.config.compact_threshold() || fits_after_compact || over_cap)
        {
            self.compact();
            if self.capacity() - self.write >= additional {
                return Ok(());
            }
        }

        let required = self
            .write
            .checked_add(additional)
            .ok_or(BufferError::Alloc {
                requested: usize::MAX,
            })?;
        self.grow(required)
    }

    /// Shifts `[read, write)` to the front of the store.
    fn compact(&mut self) {
        let dead = self.read;
        self.store.copy_within(self.read..self.write, 0);
        self.write -= self.read;
        self.read = 0;
        self.generation += 1;
        trace!(
            reclaimed = dead,
            live = self.write,
            generation = self.generation,
            "buffer compacted"
        );
    }

    fn grow(&mut self, required: usize) -> Result<(), BufferError> {
        let max = self.config.max_capacity();
        if let Some(max) = max {
            if required > max {
                return Err(BufferError::CapacityExceeded {
                    requested: required,
                    max,
                });
            }
        }

        let doubled = self.capacity().max(MIN_GROW_CAPACITY).saturating_mul(2);
        let mut target = doubled.max(required);
        if let Some(max) = max {
            target = target.min(max);
        }

        let additional = target - self.store.len();
        self.store
            .try_reserve_exact(additional)
            .map_err(|_| BufferError::Alloc { requested: target })?;
        self.store.resize(target, 0);
        debug!(
            from = target - additional,
            to = target,
            live = self.len(),
            "buffer grown"
        );
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}
