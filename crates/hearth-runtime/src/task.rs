//! B9 — the task (coroutine) model: a state machine whose body is
//! expressed as a sequence of [`Action`]s, and the [`Task`] trait a worker
//! (C14) drives one step at a time.
//!
//! oatpp represents a task body as a `CoroutineHandle`, a hand-rolled
//! stackless coroutine `iterate()`d by a worker thread; each `iterate()`
//! call returns an `Action` telling the worker what to do next
//! (`examples/original_source/src/oatpp/async/worker/IOEventWorker_kqueue.cpp`,
//! `coroutine->iterate()` inside `waitEvents`). Rust has no portable
//! stackless-coroutine primitive outside `async fn`, and this reactor
//! deliberately does not prescribe an async runtime, so [`Task`] plays the
//! same role as a plain trait: a type holding its own progress state,
//! stepped by repeated calls to [`Task::step`] rather than `.poll()`.

use std::time::{Duration, Instant};

use hearth_core::io::{Direction, IoHandle};
use hearth_core::HearthError;

/// What a [`Task`] wants to happen next, returned from every [`Task::step`]
/// call. Five variants, one per kind of suspension a task can ask for.
pub enum Action {
    /// Equivalent to oatpp's `Action::TYPE_COROUTINE`/`TYPE_YIELD`: make
    /// progress was made, run again on the next backlog pass without
    /// waiting on I/O.
    Repeat,
    /// Suspend until `handle` is ready for `direction`; the worker takes
    /// over registration with the OS event queue until then.
    WaitIo { handle: IoHandle, direction: Direction },
    /// Suspend until `deadline` has passed. A [`crate::foreman::Foreman`]
    /// parks the task in its [`crate::timer::TimerQueue`], a deadline-ordered
    /// heap serviced by one dedicated thread, rather than on either I/O
    /// worker — those only ever wake on file-descriptor readiness.
    WaitTime { deadline: Instant },
    /// The task completed successfully; it is dropped and not resumed again.
    Finish,
    /// The task failed; it is dropped and not resumed again. Mirrors
    /// `Action::TYPE_ERROR` unwinding the coroutine stack.
    Error(HearthError),
}

impl Action {
    pub fn wait_time_from_now(delay: Duration) -> Action {
        Action::WaitTime { deadline: Instant::now() + delay }
    }
}

/// A unit of cooperative work. `step` is called once by the worker that
/// currently owns the task: on the next pass through the backlog if the
/// prior action was [`Action::Repeat`], or once the registered handle
/// becomes ready if it was [`Action::WaitIo`].
///
/// Implementors own whatever progress state they need between calls
/// (mirroring a hand-written coroutine's local variables becoming struct
/// fields) — this trait only fixes the re-entry point and its signature.
pub trait Task: Send {
    fn step(&mut self) -> Action;
}

/// A boxed task plus the [`Action`] it last returned, carried in a
/// worker's backlog between passes. Mirrors oatpp's `CoroutineHandle`
/// holding its own `m_savedAction`.
pub struct TaskHandle {
    pub task: Box<dyn Task>,
    pub pending: Action,
}

impl TaskHandle {
    pub fn new(task: Box<dyn Task>, pending: Action) -> TaskHandle {
        TaskHandle { task, pending }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountToThree(u32);

    impl Task for CountToThree {
        fn step(&mut self) -> Action {
            self.0 += 1;
            if self.0 < 3 {
                Action::Repeat
            } else {
                Action::Finish
            }
        }
    }

    #[test]
    fn a_task_can_repeat_until_it_finishes() {
        let mut task = CountToThree(0);
        assert!(matches!(task.step(), Action::Repeat));
        assert!(matches!(task.step(), Action::Repeat));
        assert!(matches!(task.step(), Action::Finish));
    }
}
