use std::fmt;
use std::ops::{Bound, RangeBounds};

use crate::error::{Result, RingBufferError};

/// Capacity used by [`RingBuffer::default`]
pub const DEFAULT_CAPACITY: usize = 4096;

/// Construction parameters for a [`RingBuffer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    /// Allocate a zeroed backing array of this many bytes
    Capacity(usize),
    /// Adopt a caller-supplied backing array; its length becomes the capacity
    Adopted(Box<[u8]>),
}

/// Fixed-capacity circular byte buffer
///
/// - One contiguous backing array, allocated once and never resized
/// - Read and write cursors wrap modulo the capacity
/// - A full-flag disambiguates full from empty when the cursors coincide
///
/// The buffer holds no lock and no atomics. It must be owned by a single
/// thread at a time or synchronized externally; concurrent access through
/// shared mutable aliases is not supported.
pub struct RingBuffer {
    /// Backing array, its length is the capacity
    buf: Box<[u8]>,
    /// Next position to read
    read_pos: usize,
    /// Next position to write
    write_pos: usize,
    /// Set when every byte of `buf` is unread data
    full: bool,
}

impl RingBuffer {
    /// Create a ring buffer with a zeroed backing array of `capacity` bytes
    ///
    /// # Returns
    /// * `Ok(RingBuffer)` on success
    /// * `Err(RingBufferError::InvalidCapacity)` if `capacity` is 0
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_storage(Storage::Capacity(capacity))
    }

    /// Create a ring buffer that takes ownership of `storage`
    ///
    /// The storage contents are treated as garbage: the buffer starts empty.
    ///
    /// # Returns
    /// * `Err(RingBufferError::InvalidCapacity)` if `storage` is empty
    pub fn from_storage(storage: impl Into<Box<[u8]>>) -> Result<Self> {
        Self::with_storage(Storage::Adopted(storage.into()))
    }

    /// Create a ring buffer from explicit construction parameters
    pub fn with_storage(storage: Storage) -> Result<Self> {
        let buf = match storage {
            Storage::Capacity(0) => return Err(RingBufferError::InvalidCapacity),
            Storage::Capacity(capacity) => vec![0; capacity].into_boxed_slice(),
            Storage::Adopted(buf) if buf.is_empty() => return Err(RingBufferError::InvalidCapacity),
            Storage::Adopted(buf) => buf,
        };
        Ok(Self::from_boxed(buf))
    }

    fn from_boxed(buf: Box<[u8]>) -> Self {
        RingBuffer {
            buf,
            read_pos: 0,
            write_pos: 0,
            full: false,
        }
    }

    /// Give the backing array back, discarding the cursors
    pub fn into_storage(self) -> Box<[u8]> {
        self.buf
    }

    /// Get the capacity in bytes
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Get the number of unread bytes
    pub fn len(&self) -> usize {
        if self.write_pos == self.read_pos {
            if self.full {
                self.capacity()
            } else {
                0
            }
        } else if self.write_pos > self.read_pos {
            self.write_pos - self.read_pos
        } else {
            self.capacity() - self.read_pos + self.write_pos
        }
    }

    /// Get the number of bytes that can be written before the buffer is full
    pub fn free(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Check if every byte of the backing array holds unread data
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Check if there is nothing to read
    pub fn is_empty(&self) -> bool {
        !self.full && self.write_pos == self.read_pos
    }

    /// Return to the empty state without touching the backing array
    pub fn reset(&mut self) {
        self.read_pos = 0;
        self.write_pos = 0;
        self.full = false;
    }

    /// Borrow the occupied region as at most two contiguous slices
    ///
    /// The first slice starts at the read cursor. The second is non-empty
    /// only when the occupied region wraps past the end of the array.
    pub fn as_slices(&self) -> (&[u8], &[u8]) {
        if self.is_empty() {
            (&[], &[])
        } else if self.write_pos > self.read_pos {
            (&self.buf[self.read_pos..self.write_pos], &[])
        } else {
            // Also covers full, where write_pos == read_pos
            (&self.buf[self.read_pos..], &self.buf[..self.write_pos])
        }
    }

    /// Borrow the free region as at most two contiguous slices, starting at
    /// the write cursor
    pub(crate) fn free_spans_mut(&mut self) -> (&mut [u8], &mut [u8]) {
        if self.full {
            return (&mut [], &mut []);
        }
        if self.write_pos >= self.read_pos {
            let (head, tail) = self.buf.split_at_mut(self.write_pos);
            (tail, &mut head[..self.read_pos])
        } else {
            (&mut self.buf[self.write_pos..self.read_pos], &mut [])
        }
    }

    /// Array index of the byte `n` positions after the read cursor, `n <= capacity`
    fn offset(&self, n: usize) -> usize {
        let i = self.read_pos + n;
        if i >= self.capacity() {
            i - self.capacity()
        } else {
            i
        }
    }

    /// Move the read cursor past `n` occupied bytes
    pub(crate) fn advance_read(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        self.read_pos = self.offset(n);
        self.full = false;
    }

    /// Move the write cursor past `n` freshly written bytes
    pub(crate) fn advance_write(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let i = self.write_pos + n;
        self.write_pos = if i >= self.capacity() { i - self.capacity() } else { i };
        if self.write_pos == self.read_pos {
            self.full = true;
        }
    }

    /// Copy the first `dest.len()` occupied bytes into `dest` without consuming them
    fn copy_out(&self, dest: &mut [u8]) {
        let (a, b) = self.as_slices();
        let n = dest.len();
        if n <= a.len() {
            dest.copy_from_slice(&a[..n]);
        } else {
            dest[..a.len()].copy_from_slice(a);
            dest[a.len()..].copy_from_slice(&b[..n - a.len()]);
        }
    }

    /// Append occupied bytes `[start, end)` to `out`
    fn extend_range(&self, start: usize, end: usize, out: &mut Vec<u8>) {
        let (a, b) = self.as_slices();
        if start < a.len() {
            out.extend_from_slice(&a[start..end.min(a.len())]);
        }
        if end > a.len() {
            out.extend_from_slice(&b[start.saturating_sub(a.len())..end - a.len()]);
        }
    }

    /// Copy `src` into the free region, `src.len() <= free()`
    fn copy_in(&mut self, src: &[u8]) {
        let (a, b) = self.free_spans_mut();
        if src.len() <= a.len() {
            a[..src.len()].copy_from_slice(src);
        } else {
            let split = a.len();
            a.copy_from_slice(&src[..split]);
            b[..src.len() - split].copy_from_slice(&src[split..]);
        }
        self.advance_write(src.len());
    }

    /// Read up to `dest.len()` bytes into `dest`
    ///
    /// # Returns
    /// * `Ok(n)` with the number of bytes copied, `0` for an empty `dest`
    /// * `Err(RingBufferError::Empty)` if the buffer held nothing and `dest` is non-empty
    pub fn read(&mut self, dest: &mut [u8]) -> Result<usize> {
        if dest.is_empty() {
            return Ok(0);
        }
        if self.is_empty() {
            return Err(RingBufferError::Empty);
        }
        let n = dest.len().min(self.len());
        self.copy_out(&mut dest[..n]);
        self.advance_read(n);
        Ok(n)
    }

    /// Read into `dest` up to and including the first byte matching `pred`
    ///
    /// At most `min(dest.len(), len())` bytes are scanned. Copied bytes are
    /// always consumed.
    ///
    /// # Returns
    /// * `Ok((n, true))` when a matching byte was copied as the last of `n` bytes
    /// * `Ok((n, false))` when `dest` filled up before a match
    /// * `Err(RingBufferError::EndOfData { read })` when the occupied bytes ran
    ///   out without a match while `dest` still had room; `read` bytes were copied.
    ///   A `dest` exactly as long as the occupied region gets `Ok((n, false))`
    ///   rather than end of data, since it has no spare room left.
    /// * `Err(RingBufferError::Empty)` if the buffer held nothing and `dest` is non-empty
    pub fn read_until<F>(&mut self, dest: &mut [u8], mut pred: F) -> Result<(usize, bool)>
    where
        F: FnMut(u8) -> bool,
    {
        if dest.is_empty() {
            return Ok((0, false));
        }
        let len = self.len();
        if len == 0 {
            return Err(RingBufferError::Empty);
        }

        let limit = dest.len().min(len);
        let found = {
            let (a, b) = self.as_slices();
            a.iter().chain(b).take(limit).position(|&c| pred(c))
        };
        let n = found.map_or(limit, |i| i + 1);

        self.copy_out(&mut dest[..n]);
        self.advance_read(n);

        if found.is_none() && limit == len && len < dest.len() {
            return Err(RingBufferError::EndOfData { read: n });
        }
        Ok((n, found.is_some()))
    }

    /// Remove and return the next byte
    pub fn read_byte(&mut self) -> Result<u8> {
        if self.is_empty() {
            return Err(RingBufferError::Empty);
        }
        let c = self.buf[self.read_pos];
        self.advance_read(1);
        Ok(c)
    }

    /// Append everything up to and including the first `delim` to `out`
    ///
    /// See [`read_bytes_until`](Self::read_bytes_until).
    pub fn read_bytes(&mut self, delim: u8, out: &mut Vec<u8>) -> Result<usize> {
        self.read_bytes_until(|c| c == delim, out)
    }

    /// Append everything up to and including the first byte matching `pred` to `out`
    ///
    /// The scan covers the whole occupied region.
    ///
    /// # Returns
    /// * `Ok(n)` with the appended byte count; the read cursor moves past the match
    /// * `Err(RingBufferError::EndOfData { read })` when nothing matched. All
    ///   `read` occupied bytes are still appended to `out`, but the read cursor
    ///   does not move, so the caller can retry once more data arrives.
    pub fn read_bytes_until<F>(&mut self, pred: F, out: &mut Vec<u8>) -> Result<usize>
    where
        F: FnMut(u8) -> bool,
    {
        match self.index_byte_by(pred) {
            Some(i) => {
                let n = i + 1;
                out.reserve(n);
                self.extend_range(0, n, out);
                self.advance_read(n);
                Ok(n)
            }
            None => {
                let len = self.len();
                out.reserve(len);
                self.extend_range(0, len, out);
                Err(RingBufferError::EndOfData { read: len })
            }
        }
    }

    /// Offset from the read cursor of the first occupied `byte`
    pub fn index_byte(&self, byte: u8) -> Option<usize> {
        self.index_byte_by(|c| c == byte)
    }

    /// Offset from the read cursor of the first occupied byte matching `pred`
    pub fn index_byte_by<F>(&self, mut pred: F) -> Option<usize>
    where
        F: FnMut(u8) -> bool,
    {
        let (a, b) = self.as_slices();
        a.iter().chain(b).position(|&c| pred(c))
    }

    /// Discard the next `n` occupied bytes
    ///
    /// # Returns
    /// * `Err(RingBufferError::OutOfRange)` if `n` exceeds `len()`; nothing is discarded
    pub fn consume(&mut self, n: usize) -> Result<()> {
        let len = self.len();
        if n > len {
            return Err(RingBufferError::OutOfRange {
                index: isize::try_from(n).unwrap_or(isize::MAX),
                len,
            });
        }
        self.advance_read(n);
        Ok(())
    }

    /// Copy out the whole occupied region without consuming it
    ///
    /// Named apart from `std::io::Read::bytes`, which would take the buffer
    /// by value and drain it.
    pub fn to_vec(&self) -> Vec<u8> {
        let len = self.len();
        let mut out = Vec::with_capacity(len);
        self.extend_range(0, len, &mut out);
        out
    }

    /// Copy out part of the occupied region without consuming it
    ///
    /// Offsets are relative to the read cursor. A negative bound `k` means
    /// `len() + k`, so `rb.byte_range(-2..)` copies the last two bytes.
    ///
    /// # Returns
    /// * `Err(RingBufferError::OutOfRange)` if a bound resolves outside `[0, len()]`
    /// * `Err(RingBufferError::InvalidRange)` if the end precedes the start
    pub fn byte_range<R>(&self, range: R) -> Result<Vec<u8>>
    where
        R: RangeBounds<isize>,
    {
        let len = self.len();
        let start = match range.start_bound() {
            Bound::Included(&s) => self.resolve(s, 0)?,
            Bound::Excluded(&s) => self.resolve(s, 1)?,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => self.resolve(e, 1)?,
            Bound::Excluded(&e) => self.resolve(e, 0)?,
            Bound::Unbounded => len,
        };
        if end < start {
            return Err(RingBufferError::InvalidRange { start, end });
        }

        let mut out = Vec::with_capacity(end - start);
        self.extend_range(start, end, &mut out);
        Ok(out)
    }

    /// Turn a possibly negative range bound into an offset within `[0, len()]`
    fn resolve(&self, bound: isize, bump: isize) -> Result<usize> {
        let len = self.len();
        let index = if bound < 0 {
            (len as isize).saturating_add(bound)
        } else {
            bound
        };
        let index = index.saturating_add(bump);
        match usize::try_from(index) {
            Ok(i) if i <= len => Ok(i),
            _ => Err(RingBufferError::OutOfRange { index, len }),
        }
    }

    /// Peek at the occupied byte `n` positions after the read cursor
    ///
    /// # Panics
    /// Panics if the buffer is empty or `n >= len()`. Use [`get`](Self::get)
    /// for a checked lookup.
    pub fn char_at(&self, n: usize) -> u8 {
        assert!(!self.is_empty(), "char_at on an empty ring buffer");
        let len = self.len();
        assert!(n < len, "offset {n} out of range for {len} occupied bytes");
        self.buf[self.offset(n)]
    }

    /// Peek at the occupied byte `n` positions after the read cursor, if any
    pub fn get(&self, n: usize) -> Option<u8> {
        (n < self.len()).then(|| self.buf[self.offset(n)])
    }

    /// Check if the occupied region equals `other` byte for byte
    pub fn equal(&self, other: &[u8]) -> bool {
        let (a, b) = self.as_slices();
        other.len() == a.len() + b.len() && &other[..a.len()] == a && &other[a.len()..] == b
    }

    /// Check if the occupied region starts with `prefix`
    pub fn has_prefix(&self, prefix: &[u8]) -> bool {
        if prefix.len() > self.len() {
            return false;
        }
        let (a, b) = self.as_slices();
        let head = prefix.len().min(a.len());
        a[..head] == prefix[..head] && b.starts_with(&prefix[head..])
    }

    /// Write all of `src` or nothing
    ///
    /// # Returns
    /// * `Ok(src.len())` on success, `Ok(0)` for an empty `src`
    /// * `Err(RingBufferError::Full)` if the buffer was full and `src` is non-empty
    /// * `Err(RingBufferError::TooMuchData)` if `src` exceeds `free()`; the
    ///   buffer is left untouched
    pub fn write(&mut self, src: &[u8]) -> Result<usize> {
        if src.is_empty() {
            return Ok(0);
        }
        if self.full {
            return Err(RingBufferError::Full);
        }
        let free = self.free();
        if src.len() > free {
            tracing::debug!(requested = src.len(), free, "rejecting oversize write");
            return Err(RingBufferError::TooMuchData {
                requested: src.len(),
                free,
            });
        }
        self.copy_in(src);
        Ok(src.len())
    }

    /// Write as much of `src` as fits, returning the count
    pub(crate) fn write_prefix(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.free());
        self.copy_in(&src[..n]);
        n
    }

    /// Write a single byte
    pub fn write_byte(&mut self, c: u8) -> Result<()> {
        if self.full {
            return Err(RingBufferError::Full);
        }
        self.buf[self.write_pos] = c;
        self.advance_write(1);
        Ok(())
    }

    /// Write the UTF-8 bytes of `s`, borrowed in place, with the semantics of [`write`](Self::write)
    pub fn write_str(&mut self, s: &str) -> Result<usize> {
        self.write(s.as_bytes())
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::from_boxed(vec![0; DEFAULT_CAPACITY].into_boxed_slice())
    }
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("read_pos", &self.read_pos)
            .field("write_pos", &self.write_pos)
            .field("full", &self.full)
            .finish()
    }
}

impl PartialEq<[u8]> for RingBuffer {
    fn eq(&self, other: &[u8]) -> bool {
        self.equal(other)
    }
}

impl PartialEq<&[u8]> for RingBuffer {
    fn eq(&self, other: &&[u8]) -> bool {
        self.equal(other)
    }
}
