//! Non-owning byte views.
//!
//! - [`View`] - Borrowed byte range with cursor-style parsing helpers
//! - [`Split`] - Iterator over separator-delimited segments of a view

mod split;

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

use bytes::Bytes;

use crate::error::BufferError;

pub use split::Split;

/// C-locale `isspace`: space, `\t`, `\n`, `\v`, `\f`, `\r`.
#[inline]
pub(crate) fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// A borrowed range of bytes owned elsewhere.
///
/// `View` is `Copy` and never owns or mutates the bytes it points at. The
/// `eat_*` methods only move the view's own start forward; `trim_space` only
/// narrows its bounds. Because it borrows, a view cannot outlive its storage
/// and the storage cannot be mutated while the view is alive.
///
/// Views order lexicographically by byte value, with a strict prefix
/// ordering before the longer view, so they can be used as map keys.
///
/// # Example
///
/// ```
/// use iocore::View;
///
/// let mut request = View::from("GET /index.html HTTP/1.1\r\nHost: x\r\n");
/// let mut line = request.eat_line();
///
/// assert_eq!(line.eat_word().as_bytes(), b"GET");
/// assert_eq!(line.eat_word().as_bytes(), b"/index.html");
/// assert!(line.trim_space().starts_with("HTTP/"));
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct View<'a> {
    bytes: &'a [u8],
}

impl<'a> View<'a> {
    /// Creates a view over `bytes`.
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Creates an empty view.
    pub const fn empty() -> Self {
        Self { bytes: &[] }
    }

    /// Returns the viewed bytes with the view's full lifetime.
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Returns the number of bytes in view.
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the view is empty.
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the first byte, if any.
    pub fn front(&self) -> Option<u8> {
        self.bytes.first().copied()
    }

    /// Returns the last byte, if any.
    pub fn back(&self) -> Option<u8> {
        self.bytes.last().copied()
    }

    /// Consumes and returns the leading whitespace-delimited token.
    ///
    /// Leading whitespace is skipped; whitespace after the token stays in
    /// the view. Returns an empty view once no tokens remain.
    pub fn eat_word(&mut self) -> View<'a> {
        let start = self
            .bytes
            .iter()
            .position(|&b| !is_space(b))
            .unwrap_or(self.bytes.len());
        let rest = &self.bytes[start..];
        let end = rest.iter().position(|&b| is_space(b)).unwrap_or(rest.len());
        let (word, tail) = rest.split_at(end);
        self.bytes = tail;
        View::new(word)
    }

    /// Consumes and returns everything before the first `\n` or `\r`.
    ///
    /// The terminator itself is left at the front of the view.
    pub fn eat_line(&mut self) -> View<'a> {
        let end = self
            .bytes
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
            .unwrap_or(self.bytes.len());
        let (line, tail) = self.bytes.split_at(end);
        self.bytes = tail;
        View::new(line)
    }

    /// Consumes exactly `n` bytes from the front.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfBounds`] if `n > self.len()`; the view is
    /// left untouched in that case.
    pub fn eat(&mut self, n: usize) -> Result<View<'a>, BufferError> {
        if n > self.bytes.len() {
            return Err(BufferError::OutOfBounds {
                requested: n,
                available: self.bytes.len(),
            });
        }
        let (head, tail) = self.bytes.split_at(n);
        self.bytes = tail;
        Ok(View::new(head))
    }

    /// Returns a view with `skip_front` bytes dropped from the start and
    /// `trim_back` bytes dropped from the end.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfBounds`] if the offsets overlap.
    pub fn sub(&self, skip_front: usize, trim_back: usize) -> Result<View<'a>, BufferError> {
        let requested = skip_front.saturating_add(trim_back);
        if requested > self.bytes.len() {
            return Err(BufferError::OutOfBounds {
                requested,
                available: self.bytes.len(),
            });
        }
        Ok(View::new(&self.bytes[skip_front..self.bytes.len() - trim_back]))
    }

    /// Strips leading and trailing whitespace in place.
    pub fn trim_space(&mut self) -> &mut Self {
        let start = self
            .bytes
            .iter()
            .position(|&b| !is_space(b))
            .unwrap_or(self.bytes.len());
        let end = self
            .bytes
            .iter()
            .rposition(|&b| !is_space(b))
            .map_or(start, |i| i + 1);
        self.bytes = &self.bytes[start..end];
        self
    }

    /// Three-way lexicographic comparison.
    pub fn compare(&self, other: &View<'_>) -> Ordering {
        self.bytes.cmp(other.bytes)
    }

    /// Returns true if `prefix` matches the start of the view.
    pub fn starts_with(&self, prefix: impl AsRef<[u8]>) -> bool {
        self.bytes.starts_with(prefix.as_ref())
    }

    /// Returns true if `suffix` matches the end of the view.
    pub fn ends_with(&self, suffix: impl AsRef<[u8]>) -> bool {
        self.bytes.ends_with(suffix.as_ref())
    }

    /// Splits on every occurrence of `separator`.
    ///
    /// Separators are omitted. Empty segments between adjacent separators
    /// are yielded, but a dangling empty segment at the very end is not.
    ///
    /// ```
    /// use iocore::View;
    ///
    /// let parts: Vec<_> = View::from("a,b,,c").split(b',').map(|v| v.as_bytes()).collect();
    /// assert_eq!(parts, [&b"a"[..], b"b", b"", b"c"]);
    ///
    /// assert_eq!(View::from("a,b,").split(b',').count(), 2);
    /// ```
    pub fn split(&self, separator: u8) -> Split<'a> {
        Split::new(self.bytes, separator)
    }

    /// Copies the viewed bytes into an owned [`Bytes`].
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.bytes)
    }

    /// Decodes the view as UTF-8, replacing invalid sequences.
    pub fn to_string_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.bytes)
    }
}

impl Deref for View<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.bytes
    }
}

impl AsRef<[u8]> for View<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

impl<'a> From<&'a [u8]> for View<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl<'a> From<&'a str> for View<'a> {
    fn from(s: &'a str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl<'a> From<&'a Bytes> for View<'a> {
    fn from(bytes: &'a Bytes) -> Self {
        Self::new(bytes)
    }
}

impl PartialEq<[u8]> for View<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.bytes == other
    }
}

impl PartialEq<str> for View<'_> {
    fn eq(&self, other: &str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl PartialEq<&str> for View<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl fmt::Debug for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "View(b\"{}\")", self.bytes.escape_ascii())
    }
}

impl fmt::Display for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}
