//! Linux backend: `epoll_create1` + `epoll_ctl` + `epoll_wait`, with an
//! `eventfd` standing in for the wakeup mechanism oatpp's kqueue side gets
//! for free from `EVFILT_USER` (`IOEventWorker_kqueue.cpp`'s
//! `triggerWakeup`/`setTriggerEvent`).

use std::io;
use std::os::unix::io::RawFd;

use hearth_core::io::Direction;

use super::{EventQueueBackend, Interest, ReadyEvent, Waker};
use crate::worker::MAX_EVENTS;

/// Token reserved for the wakeup eventfd; real interests are registered
/// with the caller's own token values, which are array indices or similar
/// small integers chosen by the worker and never equal to this sentinel
/// in practice (the worker never hands out `usize::MAX` as a token).
const WAKEUP_TOKEN: u64 = u64::MAX;

/// Writes to the wakeup `eventfd`, waking an `epoll_wait` blocked on it.
/// Safe to clone and call from any thread.
#[derive(Clone, Copy)]
pub struct EpollWaker(RawFd);

impl Waker for EpollWaker {
    fn wake(&self) -> io::Result<()> {
        let one: u64 = 1;
        let res = unsafe { libc::write(self.0, &one as *const u64 as *const libc::c_void, std::mem::size_of::<u64>()) };
        if res < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::WouldBlock {
                // Counter already non-zero: a wakeup is already pending.
                return Ok(());
            }
            return Err(err);
        }
        Ok(())
    }
}

pub struct EpollQueue {
    epoll_fd: RawFd,
    wakeup_fd: RawFd,
    out_buf: Vec<libc::epoll_event>,
}

impl EpollQueue {
    fn ctl_add(&self, fd: RawFd, events: u32, token: u64) -> io::Result<()> {
        let mut event = libc::epoll_event { events, u64: token };
        let res = unsafe { libc::epoll_ctl(self.epoll_fd, libc::EPOLL_CTL_ADD, fd, &mut event) };
        if res < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl EventQueueBackend for EpollQueue {
    type Waker = EpollWaker;

    fn new() -> io::Result<Self> {
        let epoll_fd = unsafe { libc::epoll_create1(0) };
        if epoll_fd < 0 {
            return Err(io::Error::last_os_error());
        }
        let wakeup_fd = unsafe { libc::eventfd(0, libc::EFD_NONBLOCK) };
        if wakeup_fd < 0 {
            let err = io::Error::last_os_error();
            unsafe { libc::close(epoll_fd) };
            return Err(err);
        }
        let queue = EpollQueue { epoll_fd, wakeup_fd, out_buf: Vec::with_capacity(MAX_EVENTS) };
        // Level-triggered, no ONESHOT: drained by `read` on every wakeup so
        // it never re-fires spuriously, and it must always be armed.
        queue.ctl_add(wakeup_fd, libc::EPOLLIN as u32, WAKEUP_TOKEN)?;
        Ok(queue)
    }

    fn waker(&self) -> EpollWaker {
        EpollWaker(self.wakeup_fd)
    }

    fn wait(&mut self, interests: &[Interest], out: &mut Vec<ReadyEvent>) -> io::Result<()> {
        for interest in interests {
            let events = match interest.direction {
                Direction::Readable => libc::EPOLLIN,
                Direction::Writable => libc::EPOLLOUT,
            } as u32
                | libc::EPOLLONESHOT as u32;
            self.ctl_add(interest.fd, events, interest.token as u64)?;
        }

        self.out_buf.resize(MAX_EVENTS, unsafe { std::mem::zeroed() });
        let count = unsafe { libc::epoll_wait(self.epoll_fd, self.out_buf.as_mut_ptr(), MAX_EVENTS as i32, -1) };
        if count < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(());
            }
            return Err(err);
        }

        for event in &self.out_buf[..count as usize] {
            if event.u64 == WAKEUP_TOKEN {
                let mut drain = 0u64;
                unsafe {
                    libc::read(self.wakeup_fd, &mut drain as *mut u64 as *mut libc::c_void, std::mem::size_of::<u64>());
                }
                continue;
            }
            let errored = event.events & (libc::EPOLLERR as u32 | libc::EPOLLHUP as u32) != 0;
            out.push(ReadyEvent { token: event.u64 as usize, errored });
        }

        Ok(())
    }
}

impl Drop for EpollQueue {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.wakeup_fd);
            libc::close(self.epoll_fd);
        }
    }
}
