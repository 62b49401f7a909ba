//! A minimal deadline heap backing [`crate::task::Action::WaitTime`].
//!
//! oatpp has no equivalent here — `WAIT_TIME` scheduling belongs to its
//! generic coroutine processor, out of scope for this crate's worker pair
//! (see [`crate::task::Action::WaitTime`]'s doc comment). Rather than spin a
//! worker thread on an immediate re-`step()` whenever a task asks to sleep,
//! a `WaitTime` handle is parked in a `BinaryHeap` keyed by deadline and a
//! dedicated thread sleeps exactly until the next one is due, mirroring the
//! reader/writer split's own two-phase-construction/`Front` pattern
//! (see [`crate::worker::WorkerFront`]) so [`crate::foreman::Foreman`] can
//! build all three fronts before any of their threads start.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

use tracing::warn;

use crate::task::TaskHandle;

/// One parked task, ordered by `deadline` alone — `BinaryHeap` needs a total
/// order and a task's own progress state has none.
struct Entry {
    deadline: Instant,
    handle: TaskHandle,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline
    }
}
impl Eq for Entry {}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.deadline.cmp(&other.deadline)
    }
}

/// Called from the timer thread with a task whose deadline has elapsed;
/// expected to step it once and route whatever `Action` comes back exactly
/// as a fresh submission would.
pub type Resume = Arc<dyn Fn(TaskHandle) + Send + Sync>;

/// The pushable front of a [`TimerQueue`]: enough to park a task from any
/// thread. Cheap to clone, for the same reason [`crate::worker::WorkerFront`]
/// is: it lets a sibling's resume closure capture this queue's front without
/// the two needing to reference each other directly.
pub struct TimerFront {
    heap: Arc<Mutex<BinaryHeap<Reverse<Entry>>>>,
    condvar: Arc<Condvar>,
}

impl Clone for TimerFront {
    fn clone(&self) -> Self {
        TimerFront { heap: self.heap.clone(), condvar: self.condvar.clone() }
    }
}

impl TimerFront {
    /// Parks `handle` until `deadline`, waking the timer thread so it can
    /// recompute how long to sleep for.
    pub fn push(&self, deadline: Instant, handle: TaskHandle) {
        self.heap.lock().unwrap_or_else(|poison| poison.into_inner()).push(Reverse(Entry { deadline, handle }));
        self.condvar.notify_one();
    }
}

/// One thread that sleeps until the nearest parked deadline, in place of a
/// timer wheel. `new_unstarted`/`start` split the same way [`crate::worker::IoWorker`]
/// does, for the same reason.
pub struct TimerQueue {
    front: TimerFront,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl TimerQueue {
    pub fn new_unstarted() -> TimerQueue {
        let front = TimerFront { heap: Arc::new(Mutex::new(BinaryHeap::new())), condvar: Arc::new(Condvar::new()) };
        TimerQueue { front, running: Arc::new(AtomicBool::new(true)), thread: None }
    }

    pub fn front(&self) -> TimerFront {
        self.front.clone()
    }

    pub fn start(&mut self, resume: Resume) {
        let heap = self.front.heap.clone();
        let condvar = self.front.condvar.clone();
        let running = self.running.clone();
        self.thread = Some(std::thread::spawn(move || run_loop(heap, condvar, running, resume)));
    }

    /// Breaks the run loop once it next wakes; does not block for the
    /// thread to actually exit (see [`Self::join`]).
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.front.condvar.notify_one();
    }

    pub fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn run_loop(heap: Arc<Mutex<BinaryHeap<Reverse<Entry>>>>, condvar: Arc<Condvar>, running: Arc<AtomicBool>, resume: Resume) {
    let mut guard = heap.lock().unwrap_or_else(|poison| poison.into_inner());
    while running.load(Ordering::SeqCst) {
        match guard.peek() {
            None => {
                guard = condvar.wait(guard).unwrap_or_else(|poison| poison.into_inner());
            }
            Some(Reverse(entry)) => {
                let now = Instant::now();
                if entry.deadline <= now {
                    let Reverse(entry) = guard.pop().expect("just peeked a non-empty heap");
                    drop(guard);
                    resume(entry.handle);
                    guard = heap.lock().unwrap_or_else(|poison| poison.into_inner());
                } else {
                    let timeout = entry.deadline - now;
                    // Ignore whether this actually timed out or was woken by
                    // a fresher `push`: either way the loop re-peeks and
                    // recomputes against whatever is now soonest.
                    let (next_guard, _) = condvar.wait_timeout(guard, timeout).unwrap_or_else(|poison| poison.into_inner());
                    guard = next_guard;
                }
            }
        }
    }
    if !guard.is_empty() {
        warn!(parked = guard.len(), "timer queue stopped with tasks still parked");
    }
}
