//! # bytering - fixed-capacity circular byte buffer
//!
//! A byte ring buffer for I/O pipelines such as protocol framing or pipe-like
//! relaying, where a bounded, reusable byte region is needed without
//! reallocation.
//!
//! ## Design
//!
//! - One backing array, allocated (or adopted) at construction and never resized
//! - Read and write cursors wrap modulo the capacity; a full-flag tells a full
//!   buffer apart from an empty one when the cursors coincide
//! - Copies are split into at most two contiguous spans at the wraparound
//! - No locking and no atomics: a buffer must be used by one owner at a time,
//!   or synchronized externally
//!
//! ## Policies
//!
//! - [`RingBuffer::write`] is all-or-nothing and reports
//!   [`RingBufferError::TooMuchData`] when the source does not fit
//! - [`RingBuffer::read`] on an empty buffer reports [`RingBufferError::Empty`]
//! - [`RingBuffer::read_bytes`] without a delimiter copies everything out,
//!   reports [`RingBufferError::EndOfData`] and leaves the read cursor alone
//! - The [`std::io::Read`]/[`std::io::Write`] impls follow the std contract
//!   instead: EOF as `Ok(0)` and short writes
//!
//! ## Example
//!
//! ```
//! use bytering::{RingBuffer, RingBufferError};
//!
//! let mut rb = RingBuffer::new(16).unwrap();
//! rb.write(b"ab,cd,ef").unwrap();
//!
//! let mut frame = Vec::new();
//! rb.read_bytes(b',', &mut frame).unwrap();
//! assert_eq!(frame, b"ab,");
//!
//! // Peek without consuming
//! assert!(rb.has_prefix(b"cd"));
//! assert_eq!(rb.byte_range(-2..).unwrap(), b"ef");
//!
//! // Relay the rest into any std writer
//! let mut out = Vec::new();
//! rb.drain_to(&mut out).unwrap();
//! assert_eq!(out, b"cd,ef");
//!
//! let mut byte = [0u8; 1];
//! assert_eq!(rb.read(&mut byte), Err(RingBufferError::Empty));
//! ```

#![warn(missing_docs)]

mod error;
mod io;
mod ring_buffer;

pub use error::{Result, RingBufferError};
pub use ring_buffer::{RingBuffer, Storage, DEFAULT_CAPACITY};
