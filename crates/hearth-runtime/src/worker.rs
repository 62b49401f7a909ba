//! C14 — the cooperative I/O worker: a backlog of tasks, a spinlock
//! guarding it, and a thread driving one [`EventQueueBackend`] in a loop.
//!
//! Ported from `examples/original_source/src/oatpp/async/worker/IOEventWorker_common.cpp`'s
//! `run()` (`while(m_running) { consumeBacklog(); waitEvents(); }`) and
//! `IOEventWorker_kqueue.cpp`'s `waitEvents` (resuming a ready task and
//! either re-queuing it on this worker when it asks to wait on the same
//! direction again, or handing it off otherwise).

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, error, warn};

use hearth_core::io::Direction;

use crate::event_queue::{EventQueueBackend, Interest, Waker};
use crate::task::{Action, TaskHandle};

/// Pinned per `IOEventWorker::MAX_EVENTS` in the original: the number of
/// readiness events drained from the OS event queue in a single
/// `wait` call.
pub const MAX_EVENTS: usize = 10_000;

/// The pushable front of a worker: just enough to hand it a task and wake
/// its thread from any other thread. Cloning is cheap (an `Arc`'d backlog
/// plus a `Copy`/`Clone` waker), which is what lets
/// [`crate::foreman::Foreman`] hand each worker a closure capturing its
/// sibling's front without the two workers needing to reference each
/// other directly.
pub struct WorkerFront<Q: EventQueueBackend> {
    backlog: Arc<spin::Mutex<Vec<TaskHandle>>>,
    waker: Q::Waker,
}

impl<Q: EventQueueBackend> Clone for WorkerFront<Q> {
    fn clone(&self) -> Self {
        WorkerFront { backlog: self.backlog.clone(), waker: self.waker.clone() }
    }
}

impl<Q: EventQueueBackend> WorkerFront<Q> {
    /// Adds `task` to the backlog and wakes the worker thread, mirroring
    /// `pushOneTask`/`triggerWakeup`. `task.pending` must already be
    /// [`Action::WaitIo`] for this worker's direction.
    pub fn push(&self, task: TaskHandle) {
        self.backlog.lock().push(task);
        if let Err(err) = self.waker.wake() {
            warn!(error = %err, "failed to wake io worker after pushing a task");
        }
    }

    pub fn push_all(&self, tasks: Vec<TaskHandle>) {
        if tasks.is_empty() {
            return;
        }
        self.backlog.lock().extend(tasks);
        if let Err(err) = self.waker.wake() {
            warn!(error = %err, "failed to wake io worker after pushing tasks");
        }
    }
}

/// A handoff for a task that just returned an [`Action`] this worker
/// cannot itself act on further: a `WaitIo` for the other direction, or
/// `Repeat`/`WaitTime`/`Finish`/`Error`, none of which name an I/O
/// readiness this worker watches.
pub type Handoff = Arc<dyn Fn(TaskHandle, Action) + Send + Sync>;

/// One half of the C15 foreman split: a thread that owns exactly one
/// `Q: EventQueueBackend` and only ever resumes tasks waiting on I/O in
/// `direction`.
pub struct IoWorker<Q: EventQueueBackend> {
    direction: Direction,
    running: Arc<AtomicBool>,
    front: WorkerFront<Q>,
    thread: Option<JoinHandle<()>>,
}

impl<Q: EventQueueBackend + 'static> IoWorker<Q> {
    /// Opens the event-queue backend and builds this worker's pushable
    /// front, but does not yet spawn its thread — see [`Self::start`].
    /// Split in two so [`crate::foreman::Foreman`] can build both
    /// workers' fronts before either thread starts, letting each thread's
    /// handoff closure capture the other's front by value.
    pub fn new_unstarted(direction: Direction) -> io::Result<(Self, Q)> {
        let queue = Q::new()?;
        let front = WorkerFront { backlog: Arc::new(spin::Mutex::new(Vec::new())), waker: queue.waker() };
        let worker = IoWorker { direction, running: Arc::new(AtomicBool::new(true)), front, thread: None };
        Ok((worker, queue))
    }

    pub fn front(&self) -> WorkerFront<Q> {
        self.front.clone()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Spawns the run-loop thread, taking ownership of the event queue
    /// opened by [`Self::new_unstarted`]. `handoff` is called for every
    /// task this worker steps whose new action it cannot itself service.
    pub fn start(&mut self, queue: Q, handoff: Handoff) {
        let direction = self.direction;
        let running = self.running.clone();
        let backlog = self.front.backlog.clone();
        self.thread = Some(std::thread::spawn(move || run_loop(direction, queue, running, backlog, handoff)));
    }

    pub fn push_one_task(&self, task: TaskHandle) {
        self.front.push(task);
    }

    pub fn push_tasks(&self, tasks: Vec<TaskHandle>) {
        self.front.push_all(tasks);
    }

    /// Breaks the run loop after the current `wait` call returns; does not
    /// block for the thread to actually exit (see [`Self::join`]).
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Err(err) = self.front.waker.wake() {
            warn!(error = %err, "failed to wake io worker during stop");
        }
    }

    pub fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn run_loop<Q: EventQueueBackend>(
    direction: Direction,
    mut queue: Q,
    running: Arc<AtomicBool>,
    backlog: Arc<spin::Mutex<Vec<TaskHandle>>>,
    handoff: Handoff,
) {
    // Maps a token handed to the event-queue backend back to the task it
    // stands for. oatpp instead stashes the raw `CoroutineHandle*` in
    // `udata`/`u64` directly; a safe Rust reactor can't alias a boxed
    // task that way, so a small side table takes its place.
    let mut pending: HashMap<usize, TaskHandle> = HashMap::new();
    let mut next_token: usize = 0;
    let mut ready = Vec::with_capacity(MAX_EVENTS);

    while running.load(Ordering::SeqCst) {
        let drained: Vec<TaskHandle> = {
            let mut guard = backlog.lock();
            std::mem::take(&mut *guard)
        };

        let mut interests = Vec::with_capacity(drained.len());
        for handle in drained {
            match &handle.pending {
                Action::WaitIo { handle: io_handle, direction: wait_direction } if *wait_direction == direction => {
                    let token = next_token;
                    next_token = next_token.wrapping_add(1);
                    interests.push(Interest { fd: io_handle.0 as i32, direction, token });
                    pending.insert(token, handle);
                }
                _ => {
                    // A task should only ever be pushed onto the worker
                    // matching its own pending wait direction; anything
                    // else reached the wrong worker and is handed back up
                    // immediately, carrying its own pending action rather
                    // than a fabricated one.
                    let mut handle = handle;
                    let action = std::mem::replace(&mut handle.pending, Action::Repeat);
                    handoff(handle, action);
                }
            }
        }

        ready.clear();
        if let Err(err) = queue.wait(&interests, &mut ready) {
            error!(error = %err, ?direction, "io worker event wait failed");
            continue;
        }

        for event in ready.drain(..) {
            let Some(mut handle) = pending.remove(&event.token) else { continue };
            if event.errored {
                debug!(token = event.token, ?direction, "io worker observed an errored fd");
            }
            let action = handle.task.step();
            match action {
                Action::WaitIo { handle: io_handle, direction: wait_direction } if wait_direction == direction => {
                    handle.pending = Action::WaitIo { handle: io_handle, direction: wait_direction };
                    backlog.lock().push(handle);
                }
                other => handoff(handle, other),
            }
        }
    }

    debug!(?direction, "io worker stopped");
}
