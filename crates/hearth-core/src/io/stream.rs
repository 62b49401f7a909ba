//! B2 — the unified read/write stream contract.
//!
//! Every stream advertises a [`StreamMode`] (blocking or non-blocking) and a
//! [`StreamContext`] (finite / chunked / indefinite framing), and every
//! read/write call returns an [`IoOutcome`] rather than throwing: a
//! non-blocking call that would have blocked returns `RetryLater` carrying a
//! [`Suspension`] the caller hands to a reactor (C14) instead of busy-polling.

use std::sync::atomic::{AtomicU8, Ordering};

/// Whether a stream blocks the calling thread until progress, or returns
/// immediately with [`IoOutcome::RetryLater`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    Blocking,
    NonBlocking,
}

/// Describes how a stream's end is determined. The HTTP body parser (C9)
/// consults this to decide chunked vs. length-delimited vs. read-to-close
/// framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamContext {
    /// Ends after exactly `n` bytes.
    Finite(u64),
    /// Ends after a protocol-level terminator (e.g. the chunked
    /// zero-length final chunk).
    Chunked,
    /// Ends only when the underlying transport is closed.
    Indefinite,
}

/// The direction a caller must wait for readiness on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Readable,
    Writable,
}

/// An opaque handle a [`Suspension`] names. For real sockets this is the OS
/// file descriptor; in-process streams (the virtual socket) use a small
/// synthetic id that has no meaning to an OS event queue — they are meant
/// to be awaited by polling or by a test harness, not registered with
/// epoll/kqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IoHandle(pub i64);

impl IoHandle {
    pub const NONE: IoHandle = IoHandle(-1);
}

/// Names what a caller must wait on before retrying a call that returned
/// [`IoOutcome::RetryLater`].
#[derive(Debug, Clone, Copy)]
pub struct Suspension {
    pub handle: IoHandle,
    pub direction: Direction,
}

/// The result of a single non-blocking (or completed blocking) read/write.
#[derive(Debug)]
pub enum IoOutcome {
    /// `n > 0` bytes were transferred.
    Transferred(usize),
    /// The stream ended cleanly (0 bytes, and no more will ever come).
    EndOfStream,
    /// A non-blocking call would have blocked; retry after `suspension`
    /// becomes ready.
    RetryLater(Suspension),
    /// The stream is fatally broken (peer reset, I/O error).
    Broken,
}

/// Readable half of the stream contract (B2).
pub trait ReadStream: Send {
    fn read(&mut self, dst: &mut [u8]) -> IoOutcome;
    fn mode(&self) -> StreamMode;
    fn set_mode(&mut self, mode: StreamMode);
    fn context(&self) -> StreamContext {
        StreamContext::Indefinite
    }
}

/// Writable half of the stream contract (B2).
pub trait WriteStream: Send {
    fn write(&mut self, src: &[u8]) -> IoOutcome;
    fn mode(&self) -> StreamMode;
    fn set_mode(&mut self, mode: StreamMode);
}

/// A simple atomic cell used by stream implementations to store their mode
/// without a full mutex — mirrors the teacher's preference for `spin`/atomic
/// primitives on hot, single-field state instead of locking.
pub(crate) struct ModeCell(AtomicU8);

impl ModeCell {
    pub(crate) fn new(mode: StreamMode) -> Self {
        Self(AtomicU8::new(mode as u8))
    }

    pub(crate) fn get(&self) -> StreamMode {
        match self.0.load(Ordering::Acquire) {
            0 => StreamMode::Blocking,
            _ => StreamMode::NonBlocking,
        }
    }

    pub(crate) fn set(&self, mode: StreamMode) {
        self.0.store(mode as u8, Ordering::Release);
    }
}
