//! One-shot timer contracts used for transient notices and highlight flags.

use std::{cell::RefCell, rc::Rc, time::Duration};

/// Opaque identifier of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// Deferred work item run once by a [`Scheduler`].
pub type ScheduledTask = Box<dyn FnOnce()>;

/// Host service that runs tasks after a delay on the UI thread.
pub trait Scheduler {
    /// Runs `task` once after `delay`.
    fn schedule(&self, delay: Duration, task: ScheduledTask) -> TimerHandle;

    /// Cancels a pending task. Unknown or already-fired handles are ignored.
    fn cancel(&self, handle: TimerHandle);
}

struct PendingTask {
    due: Duration,
    handle: TimerHandle,
    task: ScheduledTask,
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    next_id: u64,
    pending: Vec<PendingTask>,
}

#[derive(Clone, Default)]
/// Virtual-time scheduler. Tasks only run when the test advances the clock.
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualClock>>,
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clock = self.inner.borrow();
        f.debug_struct("ManualScheduler")
            .field("now", &clock.now)
            .field("pending", &clock.pending.len())
            .finish()
    }
}

impl ManualScheduler {
    /// Current virtual time since creation.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of tasks still waiting to fire.
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Advances virtual time by `by`, running every task that becomes due in due order.
    ///
    /// Tasks scheduled by a running task are picked up in the same call when they fall due
    /// before the target time.
    pub fn advance(&self, by: Duration) {
        let target = self.inner.borrow().now + by;
        loop {
            let next = {
                let mut clock = self.inner.borrow_mut();
                let due_idx = clock
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, pending)| pending.due <= target)
                    .min_by_key(|(_, pending)| (pending.due, pending.handle.0))
                    .map(|(idx, _)| idx);
                due_idx.map(|idx| {
                    let pending = clock.pending.remove(idx);
                    clock.now = pending.due;
                    pending.task
                })
            };
            match next {
                Some(task) => task(),
                None => break,
            }
        }
        self.inner.borrow_mut().now = target;
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: ScheduledTask) -> TimerHandle {
        let mut clock = self.inner.borrow_mut();
        clock.next_id += 1;
        let handle = TimerHandle(clock.next_id);
        let due = clock.now + delay;
        clock.pending.push(PendingTask { due, handle, task });
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        self.inner
            .borrow_mut()
            .pending
            .retain(|pending| pending.handle != handle);
    }
}
