//! A SPSC byte channel: a [`FifoBuffer`] guarded by a mutex and two
//! condvars, one for empty→non-empty and one for full→non-full.
//!
//! Ported from `examples/original_source/network/virtual_/Pipe.{hpp,cpp}`.
//! The original uses a spinlock for non-blocking mode and a mutex+condvar
//! pair for blocking mode; since a `Pipe` here always blocks a real OS
//! thread (it is meant for tests and local fan-out, not registered with an
//! event queue), we use `std::sync::{Mutex, Condvar}` throughout rather than
//! `spin`, matching the documented "Pipe policy".

use std::sync::{Condvar, Mutex};

use super::FifoBuffer;

struct Inner {
    buffer: FifoBuffer,
    open: bool,
}

pub struct Pipe {
    inner: Mutex<Inner>,
    non_empty: Condvar,
    non_full: Condvar,
}

/// Outcome of a pipe read/write in blocking mode.
#[derive(Debug, PartialEq, Eq)]
pub enum PipeOutcome {
    Transferred(usize),
    /// The pipe was closed and has no more data to deliver (reader) or no
    /// further writes are possible (writer).
    Broken,
}

impl Pipe {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner { buffer: FifoBuffer::new(capacity), open: true }),
            non_empty: Condvar::new(),
            non_full: Condvar::new(),
        }
    }

    /// Blocking read: waits until at least one byte is available or the
    /// pipe closes.
    pub fn read(&self, dst: &mut [u8]) -> PipeOutcome {
        let mut guard = self.inner.lock().unwrap();
        while guard.buffer.available_to_read() == 0 && guard.open {
            self.non_full.notify_one();
            guard = self.non_empty.wait(guard).unwrap();
        }
        let outcome = if guard.buffer.available_to_read() > 0 {
            PipeOutcome::Transferred(guard.buffer.read(dst))
        } else {
            PipeOutcome::Broken
        };
        self.non_full.notify_one();
        outcome
    }

    /// Blocking write: waits until there is room or the pipe closes.
    pub fn write(&self, src: &[u8]) -> PipeOutcome {
        let mut guard = self.inner.lock().unwrap();
        while guard.buffer.available_to_write() == 0 && guard.open {
            self.non_empty.notify_one();
            guard = self.non_full.wait(guard).unwrap();
        }
        let outcome = if guard.open && guard.buffer.available_to_write() > 0 {
            PipeOutcome::Transferred(guard.buffer.write(src))
        } else {
            PipeOutcome::Broken
        };
        self.non_empty.notify_one();
        outcome
    }

    /// Non-blocking read: never waits. Returns `None` when it would have to
    /// block (caller should retry later).
    pub fn try_read(&self, dst: &mut [u8]) -> Option<PipeOutcome> {
        let mut guard = self.inner.lock().unwrap();
        if guard.buffer.available_to_read() > 0 {
            Some(PipeOutcome::Transferred(guard.buffer.read(dst)))
        } else if guard.open {
            None
        } else {
            Some(PipeOutcome::Broken)
        }
    }

    /// Non-blocking write: never waits.
    pub fn try_write(&self, src: &[u8]) -> Option<PipeOutcome> {
        let mut guard = self.inner.lock().unwrap();
        if guard.buffer.available_to_write() > 0 {
            Some(PipeOutcome::Transferred(guard.buffer.write(src)))
        } else if guard.open {
            None
        } else {
            Some(PipeOutcome::Broken)
        }
    }

    /// Wakes both sides, which then observe `open == false` and return
    /// `Broken`.
    pub fn close(&self) {
        let mut guard = self.inner.lock().unwrap();
        guard.open = false;
        self.non_empty.notify_all();
        self.non_full.notify_all();
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().unwrap().open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn bytes_written_appear_contiguously_and_in_order() {
        // write 7 bytes then close; two 4-byte reads.
        let pipe = Arc::new(Pipe::new(16));
        let writer = Arc::clone(&pipe);
        let handle = thread::spawn(move || {
            writer.write(b"abcdefg");
            writer.close();
        });

        // Give the writer a chance to land its write before we read, though
        // correctness does not depend on this since `read` blocks.
        let mut buf = [0u8; 4];
        assert_eq!(pipe.read(&mut buf), PipeOutcome::Transferred(4));
        assert_eq!(&buf, b"abcd");

        let mut buf2 = [0u8; 4];
        assert_eq!(pipe.read(&mut buf2), PipeOutcome::Transferred(3));
        assert_eq!(&buf2[..3], b"efg");

        assert_eq!(pipe.read(&mut buf2), PipeOutcome::Broken);
        handle.join().unwrap();
    }

    #[test]
    fn non_blocking_read_on_empty_open_pipe_returns_none() {
        let pipe = Pipe::new(4);
        let mut buf = [0u8; 4];
        assert!(pipe.try_read(&mut buf).is_none());
    }

    #[test]
    fn non_blocking_read_on_empty_closed_pipe_returns_broken() {
        let pipe = Pipe::new(4);
        pipe.close();
        let mut buf = [0u8; 4];
        assert_eq!(pipe.try_read(&mut buf), Some(PipeOutcome::Broken));
    }
}
