//! I/O stream contracts (C2), FIFO ring buffer and pipe (C3), and the
//! in-process virtual socket built on top of them.

mod fifo;
mod pipe;
mod stream;
mod virtual_socket;

pub use fifo::FifoBuffer;
pub use pipe::Pipe;
pub use stream::{Direction, IoHandle, IoOutcome, ReadStream, StreamContext, StreamMode, Suspension, WriteStream};
pub use virtual_socket::VirtualSocket;
