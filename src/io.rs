//! `std::io` boundary of the ring buffer.
//!
//! [`RingBuffer::fill_from`] pulls from any [`Read`] straight into the free
//! region and [`RingBuffer::drain_to`] pushes the occupied region into any
//! [`Write`]. Neither allocates; each touches at most two contiguous spans
//! per trip around the array.
//!
//! The trait impls let a buffer stand in wherever a reader or writer is
//! expected. They follow the std conventions rather than the inherent
//! methods: `Read::read` on an empty buffer returns `Ok(0)`, and
//! `Write::write` accepts the prefix that fits.

use std::io::{self, BufRead, ErrorKind, Read, Write};

use crate::error::RingBufferError;
use crate::ring_buffer::RingBuffer;

impl RingBuffer {
    /// Fill the free region from `source` until it is full or `source` has
    /// nothing more to give right now
    ///
    /// `Ok(0)` and `WouldBlock` from `source` end the transfer normally;
    /// `Interrupted` is retried. Any other error is returned as-is and the
    /// bytes moved before it stay in the buffer.
    ///
    /// # Returns
    /// * `Ok(n)` with the number of bytes moved, `0` if the buffer was already full
    /// * `Err(e)` from `source`. The bytes moved before the error are
    ///   `len()` after the call minus `len()` before it.
    pub fn fill_from<R>(&mut self, source: &mut R) -> io::Result<usize>
    where
        R: Read + ?Sized,
    {
        let mut total = 0;
        let stop = loop {
            if self.is_full() {
                break "full";
            }
            let (span, _) = self.free_spans_mut();
            let room = span.len();
            match source.read(span) {
                Ok(0) => break "eof",
                Ok(n) => {
                    self.advance_write(n.min(room));
                    total += n.min(room);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::WouldBlock => break "would block",
                Err(e) => {
                    tracing::debug!(moved = total, error = %e, "fill aborted by source error");
                    return Err(e);
                }
            }
        };
        tracing::trace!(moved = total, len = self.len(), stop, "fill finished");
        Ok(total)
    }

    /// Push the occupied region into `sink` until the buffer is empty
    ///
    /// `WouldBlock` from `sink` ends the transfer normally; `Interrupted` is
    /// retried. A sink that accepts zero bytes yields `WriteZero`. Errors are
    /// returned as-is and bytes already accepted by `sink` stay consumed.
    ///
    /// # Returns
    /// * `Ok(n)` with the number of bytes moved
    /// * `Err(e)` from `sink`. The bytes moved before the error are
    ///   `len()` before the call minus `len()` after it.
    pub fn drain_to<W>(&mut self, sink: &mut W) -> io::Result<usize>
    where
        W: Write + ?Sized,
    {
        let mut total = 0;
        let stop = loop {
            if self.is_empty() {
                break "empty";
            }
            let (span, _) = self.as_slices();
            let avail = span.len();
            match sink.write(span) {
                Ok(0) => {
                    tracing::debug!(moved = total, "drain aborted: sink accepted no bytes");
                    return Err(io::Error::new(
                        ErrorKind::WriteZero,
                        "sink accepted no bytes",
                    ));
                }
                Ok(n) => {
                    self.advance_read(n.min(avail));
                    total += n.min(avail);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::WouldBlock => break "would block",
                Err(e) => {
                    tracing::debug!(moved = total, error = %e, "drain aborted by sink error");
                    return Err(e);
                }
            }
        };
        tracing::trace!(moved = total, len = self.len(), stop, "drain finished");
        Ok(total)
    }
}

impl Read for RingBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match RingBuffer::read(self, buf) {
            Ok(n) => Ok(n),
            Err(RingBufferError::Empty) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

impl BufRead for RingBuffer {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(self.as_slices().0)
    }

    fn consume(&mut self, amt: usize) {
        let n = amt.min(self.len());
        self.advance_read(n);
    }
}

impl Write for RingBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.is_full() {
            return Err(RingBufferError::Full.into());
        }
        Ok(self.write_prefix(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Source that hands out its data in fixed-size pieces, then reports
    /// `WouldBlock` instead of EOF when `blocking` is set.
    struct Trickle {
        data: VecDeque<u8>,
        piece: usize,
        blocking: bool,
        interrupted_once: bool,
    }

    impl Trickle {
        fn new(data: &[u8], piece: usize) -> Self {
            Trickle {
                data: data.iter().copied().collect(),
                piece,
                blocking: false,
                interrupted_once: false,
            }
        }
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted_once {
                self.interrupted_once = true;
                return Err(ErrorKind::Interrupted.into());
            }
            if self.data.is_empty() && self.blocking {
                return Err(ErrorKind::WouldBlock.into());
            }
            let n = buf.len().min(self.piece).min(self.data.len());
            for (slot, byte) in buf.iter_mut().zip(self.data.drain(..n)) {
                *slot = byte;
            }
            Ok(n)
        }
    }

    /// Sink that accepts at most `limit` bytes in total, then fails with `kind`.
    struct Capped {
        out: Vec<u8>,
        limit: usize,
        kind: ErrorKind,
    }

    impl Write for Capped {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.limit - self.out.len();
            if room == 0 {
                return Err(self.kind.into());
            }
            let n = buf.len().min(room).min(3);
            self.out.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::ConnectionReset, "peer went away"))
        }
    }

    fn offset_buffer(capacity: usize, read_pos: usize) -> RingBuffer {
        let mut rb = RingBuffer::new(capacity).unwrap();
        rb.write(&vec![0; read_pos]).unwrap();
        rb.consume(read_pos).unwrap();
        rb
    }

    #[test]
    fn test_fill_from_wraps_and_stops_when_full() {
        let mut rb = offset_buffer(8, 5);
        let mut src = Trickle::new(b"0123456789", 2);

        assert_eq!(rb.fill_from(&mut src).unwrap(), 8);
        assert!(rb.is_full());
        assert!(rb.equal(b"01234567"));
        assert_eq!(src.data.len(), 2);

        assert_eq!(rb.fill_from(&mut src).unwrap(), 0);
    }

    #[test]
    fn test_fill_from_stops_at_eof() {
        let mut rb = offset_buffer(8, 6);
        let mut src: &[u8] = b"abc";
        assert_eq!(rb.fill_from(&mut src).unwrap(), 3);
        assert_eq!(rb.to_vec(), b"abc");
        assert!(src.is_empty());
    }

    #[test]
    fn test_fill_from_stops_on_would_block() {
        let mut rb = RingBuffer::new(8).unwrap();
        let mut src = Trickle::new(b"abcd", 3);
        src.blocking = true;
        assert_eq!(rb.fill_from(&mut src).unwrap(), 4);
        assert_eq!(rb.to_vec(), b"abcd");
    }

    #[test]
    fn test_fill_from_propagates_errors() {
        let mut rb = RingBuffer::new(8).unwrap();
        let err = rb.fill_from(&mut Broken).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionReset);
        assert!(rb.is_empty());
    }

    #[test]
    fn test_fill_from_keeps_bytes_moved_before_error() {
        let mut rb = RingBuffer::new(8).unwrap();
        let mut src = (&b"xy"[..]).chain(Broken);
        let err = rb.fill_from(&mut src).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionReset);
        assert_eq!(rb.to_vec(), b"xy");
    }

    #[test]
    fn test_drain_to_vec_across_wrap() {
        let mut rb = offset_buffer(6, 4);
        rb.write(b"abcdef").unwrap();
        let mut out = Vec::new();
        assert_eq!(rb.drain_to(&mut out).unwrap(), 6);
        assert_eq!(out, b"abcdef");
        assert!(rb.is_empty());
    }

    #[test]
    fn test_drain_to_stops_on_would_block() {
        let mut rb = offset_buffer(8, 6);
        rb.write(b"abcdefg").unwrap();
        let mut sink = Capped {
            out: Vec::new(),
            limit: 5,
            kind: ErrorKind::WouldBlock,
        };
        assert_eq!(rb.drain_to(&mut sink).unwrap(), 5);
        assert_eq!(sink.out, b"abcde");
        assert_eq!(rb.to_vec(), b"fg");
    }

    #[test]
    fn test_drain_to_propagates_errors() {
        let mut rb = RingBuffer::new(8).unwrap();
        rb.write(b"abcdefg").unwrap();
        let mut sink = Capped {
            out: Vec::new(),
            limit: 4,
            kind: ErrorKind::BrokenPipe,
        };
        let err = rb.drain_to(&mut sink).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BrokenPipe);
        // No rollback of what the sink took
        assert_eq!(sink.out, b"abcd");
        assert_eq!(rb.to_vec(), b"efg");
    }

    #[test]
    fn test_moved_count_recoverable_after_error() {
        let mut rb = RingBuffer::new(8).unwrap();
        rb.write(b"abcdef").unwrap();
        let mut sink = Capped {
            out: Vec::new(),
            limit: 4,
            kind: ErrorKind::BrokenPipe,
        };
        let before = rb.len();
        rb.drain_to(&mut sink).unwrap_err();
        assert_eq!(before - rb.len(), sink.out.len());
        assert_eq!(before - rb.len(), 4);

        let before = rb.len();
        let mut src = (&b"xyz"[..]).chain(Broken);
        rb.fill_from(&mut src).unwrap_err();
        assert_eq!(rb.len() - before, 3);
        assert_eq!(rb.to_vec(), b"efxyz");
    }

    #[test]
    fn test_drain_to_write_zero() {
        let mut rb = RingBuffer::new(4).unwrap();
        rb.write(b"ab").unwrap();
        let mut no_room: &mut [u8] = &mut [];
        let err = rb.drain_to(&mut no_room).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WriteZero);
        assert_eq!(rb.len(), 2);
    }

    #[test]
    fn test_drain_then_fill_between_buffers() {
        let mut a = RingBuffer::new(5).unwrap();
        let mut b = offset_buffer(3, 2);
        a.write(b"hello").unwrap();

        // b fills up and reports WouldBlock, which ends the drain
        assert_eq!(a.drain_to(&mut b).unwrap(), 3);
        assert!(b.equal(b"hel"));
        assert!(a.equal(b"lo"));

        let mut out = Vec::new();
        b.drain_to(&mut out).unwrap();
        assert_eq!(b.fill_from(&mut a).unwrap(), 2);
        assert!(b.equal(b"lo"));
        assert!(a.is_empty());
    }

    #[test]
    fn test_read_impl_reports_eof_when_empty() {
        let mut rb = RingBuffer::new(4).unwrap();
        rb.write(b"abcd").unwrap();
        let mut out = Vec::new();
        assert_eq!(Read::read_to_end(&mut rb, &mut out).unwrap(), 4);
        assert_eq!(out, b"abcd");

        let mut buf = [0u8; 2];
        assert_eq!(Read::read(&mut rb, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_write_impl_short_write() {
        let mut rb = RingBuffer::new(4).unwrap();
        assert_eq!(Write::write(&mut rb, b"abcdef").unwrap(), 4);
        assert!(rb.is_full());

        let err = Write::write(&mut rb, b"g").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WouldBlock);
        assert_eq!(Write::write(&mut rb, b"").unwrap(), 0);

        rb.reset();
        write!(rb, "{}-{}", 1, 2).unwrap();
        assert!(rb.equal(b"1-2"));
    }

    #[test]
    fn test_buf_read_lines_across_wrap() {
        let mut rb = offset_buffer(10, 7);
        rb.write(b"one\ntwo\n").unwrap();

        let mut line = String::new();
        BufRead::read_line(&mut rb, &mut line).unwrap();
        assert_eq!(line, "one\n");

        line.clear();
        BufRead::read_line(&mut rb, &mut line).unwrap();
        assert_eq!(line, "two\n");
        assert!(rb.is_empty());
    }
}
