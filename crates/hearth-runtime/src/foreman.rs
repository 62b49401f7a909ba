//! C15 — the foreman: owns one reader [`IoWorker`], one writer `IoWorker`,
//! and one [`TimerQueue`], and is the single entry point new tasks are
//! submitted through.
//!
//! Grounded on `IOEventWorkerForeman` in
//! `examples/original_source/src/oatpp/async/worker/IOEventWorker.hpp`/
//! `IOEventWorker_common.cpp`: the original owns `m_reader`/`m_writer` by
//! value and routes a task by `action.getIOEventType()` in `pushTasks`/
//! `pushOneTask`. Each `IOEventWorker` there also keeps a raw `m_foreman`
//! pointer back to this owner, used once a resumed task's action no longer
//! matches that worker's own direction. A boxed-`dyn` closure captured at
//! construction time (see [`crate::worker::WorkerFront`]) takes the place
//! of that back-pointer, since a safe two-way reference between owner and
//! owned would need `Arc`/`Weak` on both sides for no real benefit here.
//! The timer queue (oatpp has no equivalent — `WAIT_TIME` belongs to its
//! generic coroutine processor there) is wired in the same way, so a task
//! that wakes from a deadline and immediately asks for I/O routes exactly
//! like a freshly submitted one.

use std::io;
use std::sync::Arc;

use tracing::{debug, warn};

use hearth_core::io::Direction;

use crate::event_queue::EventQueueBackend;
use crate::task::{Action, Task, TaskHandle};
use crate::timer::{TimerFront, TimerQueue};
use crate::worker::{IoWorker, WorkerFront};

/// The three destinations a settled task can be routed to, bundled so a
/// handoff closure only needs to capture one value instead of three.
struct Routers<Q: EventQueueBackend> {
    reader: WorkerFront<Q>,
    writer: WorkerFront<Q>,
    timers: TimerFront,
}

impl<Q: EventQueueBackend> Clone for Routers<Q> {
    fn clone(&self) -> Self {
        Routers { reader: self.reader.clone(), writer: self.writer.clone(), timers: self.timers.clone() }
    }
}

/// Owns the read/write worker pair and the timer queue, and routes tasks
/// among them.
///
/// `Q` is shared by both workers, mirroring the original compiling a
/// single `IOEventWorker` translation unit for both specializations.
pub struct Foreman<Q: EventQueueBackend> {
    reader: IoWorker<Q>,
    writer: IoWorker<Q>,
    timers: TimerQueue,
    routers: Routers<Q>,
}

impl<Q: EventQueueBackend + 'static> Foreman<Q> {
    pub fn new() -> io::Result<Foreman<Q>> {
        let (mut reader, reader_queue) = IoWorker::new_unstarted(Direction::Readable)?;
        let (mut writer, writer_queue) = IoWorker::new_unstarted(Direction::Writable)?;
        let mut timers = TimerQueue::new_unstarted();

        let routers = Routers { reader: reader.front(), writer: writer.front(), timers: timers.front() };

        let routers_for_reader = routers.clone();
        reader.start(reader_queue, Arc::new(move |handle, action| settle_and_route(handle, action, &routers_for_reader)));

        let routers_for_writer = routers.clone();
        writer.start(writer_queue, Arc::new(move |handle, action| settle_and_route(handle, action, &routers_for_writer)));

        let routers_for_timer = routers.clone();
        timers.start(Arc::new(move |mut handle: TaskHandle| {
            let action = handle.task.step();
            settle_and_route(handle, action, &routers_for_timer);
        }));

        Ok(Foreman { reader, writer, timers, routers })
    }

    /// Steps a brand-new task once to learn its first action, then routes
    /// it exactly as a resumed task's handoff would be. Mirrors a
    /// coroutine's first `iterate()` happening before it ever reaches a
    /// worker in the original.
    pub fn submit(&self, task: Box<dyn Task>) {
        let mut handle = TaskHandle::new(task, Action::Repeat);
        let action = handle.task.step();
        settle_and_route(handle, action, &self.routers);
    }

    /// Signals both workers and the timer thread to stop after their
    /// current wait returns; does not block. Pair with [`Self::join`].
    pub fn stop(&self) {
        self.reader.stop();
        self.writer.stop();
        self.timers.stop();
    }

    pub fn join(&mut self) {
        self.reader.join();
        self.writer.join();
        self.timers.join();
    }
}

/// Drives `handle` forward through any number of `Repeat` actions, then
/// routes whatever it settles on: a same-crate `WaitIo` to the matching
/// worker, a `WaitTime` into the timer queue to be resumed once its
/// deadline passes, or logs and drops the task on `Finish`/`Error`. Shared
/// by fresh submissions and every worker/timer handoff so a task is routed
/// identically regardless of where it was last stepped.
fn settle_and_route<Q: EventQueueBackend>(mut handle: TaskHandle, mut action: Action, routers: &Routers<Q>) {
    loop {
        match action {
            Action::WaitIo { handle: io_handle, direction } => {
                handle.pending = Action::WaitIo { handle: io_handle, direction };
                match direction {
                    Direction::Readable => routers.reader.push(handle),
                    Direction::Writable => routers.writer.push(handle),
                }
                return;
            }
            Action::Repeat => {
                action = handle.task.step();
            }
            Action::WaitTime { deadline } => {
                routers.timers.push(deadline, handle);
                return;
            }
            Action::Finish => {
                debug!("task finished");
                return;
            }
            Action::Error(err) => {
                warn!(error = %err, "task errored");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_queue::PlatformQueue;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    struct Immediate(Option<Action>);

    impl Task for Immediate {
        fn step(&mut self) -> Action {
            self.0.take().unwrap_or(Action::Finish)
        }
    }

    #[test]
    fn a_finishing_task_is_dropped_without_touching_either_worker() {
        let mut foreman: Foreman<PlatformQueue> = Foreman::new().expect("foreman opens its event queues");
        foreman.submit(Box::new(Immediate(Some(Action::Finish))));
        foreman.stop();
        foreman.join();
    }

    struct WaitThenFinish {
        waited: bool,
        delay: Duration,
        finished: Arc<AtomicBool>,
    }

    impl Task for WaitThenFinish {
        fn step(&mut self) -> Action {
            if !self.waited {
                self.waited = true;
                return Action::wait_time_from_now(self.delay);
            }
            self.finished.store(true, Ordering::SeqCst);
            Action::Finish
        }
    }

    #[test]
    fn a_wait_time_task_is_not_resumed_before_its_deadline() {
        let mut foreman: Foreman<PlatformQueue> = Foreman::new().expect("foreman opens its event queues");
        let finished = Arc::new(AtomicBool::new(false));
        foreman.submit(Box::new(WaitThenFinish { waited: false, delay: Duration::from_millis(50), finished: finished.clone() }));

        std::thread::sleep(Duration::from_millis(10));
        assert!(!finished.load(Ordering::SeqCst), "task resumed before its deadline elapsed");

        std::thread::sleep(Duration::from_millis(100));
        assert!(finished.load(Ordering::SeqCst), "task was never resumed after its deadline elapsed");

        foreman.stop();
        foreman.join();
    }
}
