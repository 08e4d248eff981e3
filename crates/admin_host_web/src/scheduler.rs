//! `setTimeout`-backed scheduler for the browser UI thread.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
    time::Duration,
};

use admin_host::{ScheduledTask, Scheduler, TimerHandle};
use leptos::{leptos_dom::helpers::TimeoutHandle, logging::warn, set_timeout_with_handle};

#[derive(Default)]
struct Timers {
    next_id: Cell<u64>,
    pending: RefCell<HashMap<u64, TimeoutHandle>>,
}

#[derive(Clone, Default)]
/// Scheduler handing tasks to the browser event loop.
pub struct WebScheduler {
    timers: Rc<Timers>,
}

impl WebScheduler {
    /// Number of timers that have neither fired nor been cancelled.
    pub fn pending_count(&self) -> usize {
        self.timers.pending.borrow().len()
    }
}

impl Scheduler for WebScheduler {
    fn schedule(&self, delay: Duration, task: ScheduledTask) -> TimerHandle {
        let id = self.timers.next_id.get() + 1;
        self.timers.next_id.set(id);
        let timers = self.timers.clone();
        let scheduled = set_timeout_with_handle(
            move || {
                timers.pending.borrow_mut().remove(&id);
                task();
            },
            delay,
        );
        match scheduled {
            Ok(handle) => {
                self.timers.pending.borrow_mut().insert(id, handle);
            }
            Err(err) => warn!("setTimeout failed: {err:?}"),
        }
        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(timeout) = self.timers.pending.borrow_mut().remove(&handle.0) {
            timeout.clear();
        }
    }
}
