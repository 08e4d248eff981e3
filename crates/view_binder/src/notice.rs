//! Transient status notice and highlight timers.

use std::{cell::Cell, rc::Rc, time::Duration};

use admin_host::{Scheduler, TimerHandle};

use crate::tree::ViewTree;

/// Id of the status notice element.
pub const RESPONSE_ID: &str = "response";
/// Class applied to successful notices.
pub const OK_CLASS: &str = "oktext";
/// Class applied to error notices.
pub const ERROR_CLASS: &str = "errortext";
/// Marker class of nodes that flash when updated.
pub const REACTIVE_CLASS: &str = "ajaxchange";
/// Class carried by a flashing node.
pub const HIGHLIGHT_CLASS: &str = "highlightOn";

/// The single `#response` status line.
///
/// Each call to [`StatusNotice::show`] replaces the message and cancels the previous pending
/// clear, so an older timer never wipes a newer message.
pub struct StatusNotice<T: ViewTree> {
    tree: T,
    scheduler: Rc<dyn Scheduler>,
    success_lifetime: Duration,
    error_lifetime: Duration,
    pending: Rc<Cell<Option<TimerHandle>>>,
}

impl<T: ViewTree + Clone> Clone for StatusNotice<T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            scheduler: self.scheduler.clone(),
            success_lifetime: self.success_lifetime,
            error_lifetime: self.error_lifetime,
            pending: self.pending.clone(),
        }
    }
}

impl<T: ViewTree + Clone + 'static> StatusNotice<T> {
    /// Creates a notice writer with explicit lifetimes.
    pub fn new(
        tree: T,
        scheduler: Rc<dyn Scheduler>,
        success_lifetime: Duration,
        error_lifetime: Duration,
    ) -> Self {
        Self {
            tree,
            scheduler,
            success_lifetime,
            error_lifetime,
            pending: Rc::new(Cell::new(None)),
        }
    }

    /// Shows `text` with success or error styling and schedules its removal.
    pub fn show(&self, ok: bool, text: &str) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
        let Some(node) = self.tree.element_by_id(RESPONSE_ID) else {
            return;
        };
        self.tree.set_content(&node, text);
        let (add, remove) = if ok {
            (OK_CLASS, ERROR_CLASS)
        } else {
            (ERROR_CLASS, OK_CLASS)
        };
        self.tree.remove_class(&node, remove);
        self.tree.add_class(&node, add);

        let lifetime = if ok {
            self.success_lifetime
        } else {
            self.error_lifetime
        };
        let tree = self.tree.clone();
        let pending = self.pending.clone();
        let handle = self.scheduler.schedule(
            lifetime,
            Box::new(move || {
                pending.set(None);
                if let Some(node) = tree.element_by_id(RESPONSE_ID) {
                    tree.set_content(&node, "");
                    tree.remove_class(&node, OK_CLASS);
                    tree.remove_class(&node, ERROR_CLASS);
                }
            }),
        );
        self.pending.set(Some(handle));
    }
}

/// Flashes reactive nodes for a fixed period.
pub struct Highlighter<T: ViewTree> {
    tree: T,
    scheduler: Rc<dyn Scheduler>,
    lifetime: Duration,
}

impl<T: ViewTree + Clone> Clone for Highlighter<T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            scheduler: self.scheduler.clone(),
            lifetime: self.lifetime,
        }
    }
}

impl<T: ViewTree + Clone + 'static> Highlighter<T> {
    /// Creates a highlighter whose flags last `lifetime`.
    pub fn new(tree: T, scheduler: Rc<dyn Scheduler>, lifetime: Duration) -> Self {
        Self {
            tree,
            scheduler,
            lifetime,
        }
    }

    /// Flashes `node` when it carries the reactive marker class. Overlapping flashes each get
    /// their own timer.
    pub fn flash_if_reactive(&self, node: &T::Node) {
        if !self.tree.has_class(node, REACTIVE_CLASS) {
            return;
        }
        self.tree.add_class(node, HIGHLIGHT_CLASS);
        let tree = self.tree.clone();
        let node = node.clone();
        self.scheduler.schedule(
            self.lifetime,
            Box::new(move || tree.remove_class(&node, HIGHLIGHT_CLASS)),
        );
    }
}

#[cfg(test)]
mod tests {
    use admin_host::ManualScheduler;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::memory::{ElementSpec, MemoryDocument};

    fn fixture() -> (MemoryDocument, ManualScheduler, StatusNotice<MemoryDocument>) {
        let doc = MemoryDocument::with_body([ElementSpec::new("div").id(RESPONSE_ID)]);
        let scheduler = ManualScheduler::default();
        let notice = StatusNotice::new(
            doc.clone(),
            Rc::new(scheduler.clone()),
            Duration::from_secs(2),
            Duration::from_secs(5),
        );
        (doc, scheduler, notice)
    }

    #[test]
    fn success_clears_after_two_seconds_and_error_after_five() {
        let (doc, scheduler, notice) = fixture();
        let node = doc.get(RESPONSE_ID).expect("response");

        notice.show(true, "saved");
        assert!(doc.has_class(&node, OK_CLASS));
        scheduler.advance(Duration::from_millis(1999));
        assert_eq!(doc.content(&node), "saved");
        scheduler.advance(Duration::from_millis(1));
        assert_eq!(doc.content(&node), "");
        assert!(!doc.has_class(&node, OK_CLASS));

        notice.show(false, "failed");
        assert!(doc.has_class(&node, ERROR_CLASS));
        scheduler.advance(Duration::from_millis(4999));
        assert_eq!(doc.content(&node), "failed");
        scheduler.advance(Duration::from_millis(1));
        assert_eq!(doc.content(&node), "");
    }

    #[test]
    fn newer_notice_cancels_pending_clear() {
        let (doc, scheduler, notice) = fixture();
        let node = doc.get(RESPONSE_ID).expect("response");

        notice.show(true, "first");
        scheduler.advance(Duration::from_millis(1500));
        notice.show(false, "second");
        assert!(!doc.has_class(&node, OK_CLASS));
        scheduler.advance(Duration::from_millis(1000));
        assert_eq!(doc.content(&node), "second");
        assert_eq!(scheduler.pending_count(), 1);
        scheduler.advance(Duration::from_secs(4));
        assert_eq!(doc.content(&node), "");
    }

    #[test]
    fn highlight_only_touches_reactive_nodes() {
        let doc = MemoryDocument::with_body([
            ElementSpec::new("span").id("live").class(REACTIVE_CLASS),
            ElementSpec::new("span").id("still"),
        ]);
        let scheduler = ManualScheduler::default();
        let highlighter =
            Highlighter::new(doc.clone(), Rc::new(scheduler.clone()), Duration::from_secs(1));
        let live = doc.get("live").expect("live");
        let still = doc.get("still").expect("still");

        highlighter.flash_if_reactive(&live);
        highlighter.flash_if_reactive(&still);
        assert!(doc.has_class(&live, HIGHLIGHT_CLASS));
        assert!(!doc.has_class(&still, HIGHLIGHT_CLASS));
        scheduler.advance(Duration::from_secs(1));
        assert!(!doc.has_class(&live, HIGHLIGHT_CLASS));
    }

    #[test]
    fn overlapping_flashes_keep_independent_timers() {
        let doc = MemoryDocument::with_body([ElementSpec::new("span")
            .id("live")
            .class(REACTIVE_CLASS)]);
        let scheduler = ManualScheduler::default();
        let highlighter =
            Highlighter::new(doc.clone(), Rc::new(scheduler.clone()), Duration::from_secs(1));
        let live = doc.get("live").expect("live");

        highlighter.flash_if_reactive(&live);
        scheduler.advance(Duration::from_millis(600));
        highlighter.flash_if_reactive(&live);
        assert_eq!(scheduler.pending_count(), 2);

        scheduler.advance(Duration::from_millis(400));
        assert!(!doc.has_class(&live, HIGHLIGHT_CLASS));
        assert_eq!(scheduler.pending_count(), 1);

        highlighter.flash_if_reactive(&live);
        scheduler.advance(Duration::from_millis(600));
        assert!(!doc.has_class(&live, HIGHLIGHT_CLASS));
        assert_eq!(scheduler.pending_count(), 1);

        scheduler.advance(Duration::from_millis(400));
        assert_eq!(scheduler.pending_count(), 0);
        assert!(!doc.has_class(&live, HIGHLIGHT_CLASS));
    }
}
