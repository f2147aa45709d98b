use std::io;

use thiserror::Error;

/// Errors reported by [`RingBuffer`](crate::RingBuffer) operations.
///
/// Every variant is a local, recoverable condition. Callers decide whether
/// to retry after freeing space or supplying more data.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingBufferError {
    /// A buffer was requested with zero capacity
    #[error("ring buffer capacity must be greater than zero")]
    InvalidCapacity,

    /// The operation needed at least one occupied byte
    #[error("ring buffer is empty")]
    Empty,

    /// The operation needed free space
    #[error("ring buffer is full")]
    Full,

    /// A write was larger than the free region; nothing was written
    #[error("write of {requested} bytes exceeds {free} free bytes")]
    TooMuchData {
        /// Length of the rejected source
        requested: usize,
        /// Free bytes at the time of the call
        free: usize,
    },

    /// A relative offset fell outside the occupied region
    #[error("offset {index} out of range for {len} occupied bytes")]
    OutOfRange {
        /// Offending offset, after negative offsets were resolved
        index: isize,
        /// Occupied length at the time of the call
        len: usize,
    },

    /// A range ended before it started
    #[error("invalid range: end {end} precedes start {start}")]
    InvalidRange {
        /// Resolved start offset
        start: usize,
        /// Resolved end offset
        end: usize,
    },

    /// A scan ran out of occupied bytes before finding its delimiter.
    ///
    /// `read` bytes were still delivered to the caller.
    #[error("end of data after {read} bytes without a delimiter")]
    EndOfData {
        /// Bytes delivered before the scan gave up
        read: usize,
    },
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, RingBufferError>;

impl From<RingBufferError> for io::Error {
    fn from(err: RingBufferError) -> Self {
        let kind = match err {
            RingBufferError::Empty | RingBufferError::Full => io::ErrorKind::WouldBlock,
            RingBufferError::TooMuchData { .. } => io::ErrorKind::WriteZero,
            RingBufferError::EndOfData { .. } => io::ErrorKind::UnexpectedEof,
            RingBufferError::InvalidCapacity
            | RingBufferError::OutOfRange { .. }
            | RingBufferError::InvalidRange { .. } => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_kinds() {
        let err: io::Error = RingBufferError::Full.into();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);

        let err: io::Error = RingBufferError::TooMuchData { requested: 8, free: 2 }.into();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
        assert_eq!(err.to_string(), "write of 8 bytes exceeds 2 free bytes");

        let err: io::Error = RingBufferError::InvalidRange { start: 3, end: 1 }.into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
