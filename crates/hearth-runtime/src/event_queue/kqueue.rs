//! BSD/macOS backend: `kqueue` + `kevent`, ported from
//! `examples/original_source/src/oatpp/async/worker/IOEventWorker_kqueue.cpp`
//! (`initEventQueue`, `triggerWakeup`, `setTriggerEvent`,
//! `setCoroutineEvent`, `waitEvents`). The original's `EVFILT_USER` wakeup
//! trick is kept verbatim; `udata` carrying a raw `CoroutineHandle*`
//! becomes `token` carrying a plain `usize` the worker assigned.

use std::io;
use std::mem::MaybeUninit;
use std::os::unix::io::RawFd;

use hearth_core::io::Direction;

use super::{EventQueueBackend, Interest, ReadyEvent, Waker};
use crate::worker::MAX_EVENTS;

fn submit(kq: RawFd, changes: &[libc::kevent]) -> io::Result<()> {
    let res = unsafe { libc::kevent(kq, changes.as_ptr(), changes.len() as i32, std::ptr::null_mut(), 0, std::ptr::null()) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Triggers the `EVFILT_USER` ident-0 event, waking a `kevent` call
/// blocked on this queue. Safe to clone and call from any thread.
#[derive(Clone, Copy)]
pub struct KqueueWaker(RawFd);

impl Waker for KqueueWaker {
    fn wake(&self) -> io::Result<()> {
        let mut trigger: libc::kevent = unsafe { std::mem::zeroed() };
        trigger.ident = 0;
        trigger.filter = libc::EVFILT_USER;
        trigger.fflags = libc::NOTE_TRIGGER;
        submit(self.0, &[trigger])
    }
}

pub struct KqueueQueue {
    kq: RawFd,
    out_buf: Vec<libc::kevent>,
}

impl EventQueueBackend for KqueueQueue {
    type Waker = KqueueWaker;

    fn new() -> io::Result<Self> {
        let kq = unsafe { libc::kqueue() };
        if kq < 0 {
            return Err(io::Error::last_os_error());
        }
        let queue = KqueueQueue { kq, out_buf: Vec::with_capacity(MAX_EVENTS) };

        let mut trigger: libc::kevent = unsafe { std::mem::zeroed() };
        trigger.ident = 0;
        trigger.filter = libc::EVFILT_USER;
        trigger.flags = libc::EV_ADD | libc::EV_CLEAR;
        submit(queue.kq, &[trigger])?;

        Ok(queue)
    }

    fn waker(&self) -> KqueueWaker {
        KqueueWaker(self.kq)
    }

    fn wait(&mut self, interests: &[Interest], out: &mut Vec<ReadyEvent>) -> io::Result<()> {
        let mut changes = Vec::with_capacity(interests.len());
        for interest in interests {
            let mut event: libc::kevent = unsafe { std::mem::zeroed() };
            event.ident = interest.fd as usize as libc::uintptr_t;
            event.flags = libc::EV_ADD | libc::EV_ONESHOT;
            event.filter = match interest.direction {
                Direction::Readable => libc::EVFILT_READ,
                Direction::Writable => libc::EVFILT_WRITE,
            };
            event.udata = interest.token as *mut libc::c_void;
            changes.push(event);
        }

        self.out_buf.resize(MAX_EVENTS, unsafe { MaybeUninit::<libc::kevent>::zeroed().assume_init() });
        let count = unsafe {
            libc::kevent(
                self.kq,
                changes.as_ptr(),
                changes.len() as i32,
                self.out_buf.as_mut_ptr(),
                MAX_EVENTS as i32,
                std::ptr::null(),
            )
        };
        if count < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(());
            }
            return Err(err);
        }

        for event in &self.out_buf[..count as usize] {
            if event.filter == libc::EVFILT_USER {
                continue;
            }
            let errored = event.flags & libc::EV_ERROR != 0;
            out.push(ReadyEvent { token: event.udata as usize, errored });
        }

        Ok(())
    }
}

impl Drop for KqueueQueue {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.kq);
        }
    }
}
