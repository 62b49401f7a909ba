//! B3 — a virtual socket: two [`Pipe`]s (ingress/egress) forming a
//! full-duplex in-memory channel. Ported from
//! `examples/original_source/network/virtual_/Socket.hpp` and
//! `Interface.hpp`; used for tests and cross-thread fan-out without a real
//! OS socket.

use std::sync::Arc;

use super::pipe::{Pipe, PipeOutcome};
use super::stream::{IoOutcome, ModeCell, ReadStream, StreamContext, StreamMode, WriteStream};

const DEFAULT_CAPACITY: usize = 4096;

/// One endpoint of a pair created by [`VirtualSocket::pair`]. Writes on one
/// endpoint are observed as reads on the other, and vice versa.
pub struct VirtualSocket {
    read_pipe: Arc<Pipe>,
    write_pipe: Arc<Pipe>,
    mode: ModeCell,
}

impl VirtualSocket {
    /// Creates two connected endpoints: `a`'s writes are `b`'s reads and
    /// vice versa, so the pair is an "indefinite" full-duplex stream until
    /// either side calls [`close`](Self::close).
    pub fn pair() -> (VirtualSocket, VirtualSocket) {
        Self::pair_with_capacity(DEFAULT_CAPACITY)
    }

    pub fn pair_with_capacity(capacity: usize) -> (VirtualSocket, VirtualSocket) {
        let pipe_a_to_b = Arc::new(Pipe::new(capacity));
        let pipe_b_to_a = Arc::new(Pipe::new(capacity));
        let a = VirtualSocket { read_pipe: Arc::clone(&pipe_b_to_a), write_pipe: Arc::clone(&pipe_a_to_b), mode: ModeCell::new(StreamMode::Blocking) };
        let b = VirtualSocket { read_pipe: pipe_a_to_b, write_pipe: pipe_b_to_a, mode: ModeCell::new(StreamMode::Blocking) };
        (a, b)
    }

    /// Closes both directions. Either endpoint may call this; the peer's
    /// next read/write observes `Broken`.
    pub fn close(&self) {
        self.read_pipe.close();
        self.write_pipe.close();
    }

    fn outcome_from(result: Option<PipeOutcome>) -> IoOutcome {
        match result {
            Some(PipeOutcome::Transferred(0)) | None => IoOutcome::RetryLater(crate::io::Suspension {
                handle: crate::io::IoHandle::NONE,
                direction: crate::io::Direction::Readable,
            }),
            Some(PipeOutcome::Transferred(n)) => IoOutcome::Transferred(n),
            Some(PipeOutcome::Broken) => IoOutcome::Broken,
        }
    }
}

impl ReadStream for VirtualSocket {
    fn read(&mut self, dst: &mut [u8]) -> IoOutcome {
        match self.mode.get() {
            StreamMode::Blocking => match self.read_pipe.read(dst) {
                PipeOutcome::Transferred(n) => IoOutcome::Transferred(n),
                PipeOutcome::Broken => IoOutcome::Broken,
            },
            StreamMode::NonBlocking => Self::outcome_from(self.read_pipe.try_read(dst)),
        }
    }

    fn mode(&self) -> StreamMode {
        self.mode.get()
    }

    fn set_mode(&mut self, mode: StreamMode) {
        self.mode.set(mode);
    }

    fn context(&self) -> StreamContext {
        StreamContext::Indefinite
    }
}

impl WriteStream for VirtualSocket {
    fn write(&mut self, src: &[u8]) -> IoOutcome {
        match self.mode.get() {
            StreamMode::Blocking => match self.write_pipe.write(src) {
                PipeOutcome::Transferred(n) => IoOutcome::Transferred(n),
                PipeOutcome::Broken => IoOutcome::Broken,
            },
            StreamMode::NonBlocking => {
                let result = self.write_pipe.try_write(src);
                match result {
                    Some(PipeOutcome::Transferred(n)) => IoOutcome::Transferred(n),
                    Some(PipeOutcome::Broken) => IoOutcome::Broken,
                    None => IoOutcome::RetryLater(crate::io::Suspension {
                        handle: crate::io::IoHandle::NONE,
                        direction: crate::io::Direction::Writable,
                    }),
                }
            }
        }
    }

    fn mode(&self) -> StreamMode {
        self.mode.get()
    }

    fn set_mode(&mut self, mode: StreamMode) {
        self.mode.set(mode);
    }
}
