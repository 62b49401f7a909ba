//! Drives a real task through [`Foreman`] end to end: a task waits on the
//! read end of an OS pipe, the test writes to the write end from the main
//! thread, and the reactor (epoll on Linux, kqueue on BSD/macOS) wakes the
//! task back up.

use std::sync::mpsc;
use std::time::Duration;

use hearth_core::io::{Direction, IoHandle};
use hearth_runtime::event_queue::PlatformQueue;
use hearth_runtime::{Action, Foreman, Task};

struct ReadOnceReady {
    read_fd: i32,
    waiting: bool,
    done: mpsc::Sender<Vec<u8>>,
}

impl Task for ReadOnceReady {
    fn step(&mut self) -> Action {
        if !self.waiting {
            self.waiting = true;
            return Action::WaitIo { handle: IoHandle(self.read_fd as i64), direction: Direction::Readable };
        }

        let mut buf = [0u8; 64];
        let n = unsafe { libc::read(self.read_fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
        if n > 0 {
            let _ = self.done.send(buf[..n as usize].to_vec());
            Action::Finish
        } else {
            // Spurious wakeup or would-block: keep waiting on the same fd.
            Action::WaitIo { handle: IoHandle(self.read_fd as i64), direction: Direction::Readable }
        }
    }
}

#[test]
fn a_task_waiting_on_a_pipe_wakes_when_the_peer_writes() {
    let mut fds = [0i32; 2];
    let res = unsafe { libc::pipe(fds.as_mut_ptr()) };
    assert_eq!(res, 0, "pipe() must succeed");
    let [read_fd, write_fd] = fds;

    unsafe {
        let flags = libc::fcntl(read_fd, libc::F_GETFL);
        libc::fcntl(read_fd, libc::F_SETFL, flags | libc::O_NONBLOCK);
    }

    let mut foreman: Foreman<PlatformQueue> = Foreman::new().expect("foreman opens its event queues");

    let (tx, rx) = mpsc::channel();
    foreman.submit(Box::new(ReadOnceReady { read_fd, waiting: false, done: tx }));

    std::thread::sleep(Duration::from_millis(20));
    let message = b"hello";
    let written = unsafe { libc::write(write_fd, message.as_ptr() as *const libc::c_void, message.len()) };
    assert_eq!(written as usize, message.len());

    let received = rx.recv_timeout(Duration::from_secs(5)).expect("task must observe the write and finish");
    assert_eq!(received, message);

    foreman.stop();
    foreman.join();

    unsafe {
        libc::close(read_fd);
        libc::close(write_fd);
    }
}
