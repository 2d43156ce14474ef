//! Event Dispatch
//!
//! Single-threaded event queue. Toolkit callbacks post [`Event`]s; handlers
//! run to completion, and anything a handler posts is queued until it
//! returns.

use crate::controls::ControlId;
use crate::subscription::{Listeners, Subscription};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A sidebar row was selected; `None` when the selection was cleared
    RowSelected(Option<String>),
    /// A settings key changed, from this window or elsewhere
    SettingChanged(String),
    /// The user changed a page control
    ControlChanged(ControlId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RowSelected,
    SettingChanged,
    ControlChanged,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::RowSelected(_) => EventKind::RowSelected,
            Event::SettingChanged(_) => EventKind::SettingChanged,
            Event::ControlChanged(_) => EventKind::ControlChanged,
        }
    }
}

struct Handler {
    kind: EventKind,
    callback: Box<dyn Fn(&Event)>,
}

#[derive(Default)]
struct Inner {
    queue: RefCell<VecDeque<Event>>,
    handlers: Listeners<Handler>,
    dispatching: Cell<bool>,
}

/// Event queue shared by the window's components
#[derive(Clone, Default)]
pub struct Dispatcher {
    inner: Rc<Inner>,
}

/// Non-owning handle for toolkit callbacks
#[derive(Clone)]
pub struct WeakDispatcher {
    inner: Weak<Inner>,
}

impl WeakDispatcher {
    /// Post if the dispatcher is still alive
    pub fn post(&self, event: Event) {
        if let Some(inner) = self.inner.upgrade() {
            Dispatcher { inner }.post(event);
        }
    }
}

/// Clears the dispatching flag even if a handler panics
struct DispatchGuard<'a>(&'a Cell<bool>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downgrade(&self) -> WeakDispatcher {
        WeakDispatcher {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Run `handler` for every event of `kind`
    pub fn subscribe(
        &self,
        kind: EventKind,
        handler: impl Fn(&Event) + 'static,
    ) -> Subscription {
        self.inner.handlers.add(Rc::new(Handler {
            kind,
            callback: Box::new(handler),
        }))
    }

    /// Queue an event and, unless a dispatch is already running, drain the
    /// queue before returning
    pub fn post(&self, event: Event) {
        self.inner.queue.borrow_mut().push_back(event);
        if self.inner.dispatching.get() {
            return;
        }

        self.inner.dispatching.set(true);
        let _guard = DispatchGuard(&self.inner.dispatching);

        loop {
            let next = self.inner.queue.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            trace!("Dispatching {:?}", event);

            let kind = event.kind();
            for handler in self.inner.handlers.snapshot() {
                if handler.kind == kind {
                    (handler.callback)(&event);
                }
            }
        }
    }

    pub fn is_dispatching(&self) -> bool {
        self.inner.dispatching.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handlers_filtered_by_kind() {
        let dispatcher = Dispatcher::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = dispatcher.subscribe(EventKind::SettingChanged, {
            let seen = seen.clone();
            move |event| seen.borrow_mut().push(event.clone())
        });

        dispatcher.post(Event::RowSelected(Some("general".into())));
        dispatcher.post(Event::SettingChanged("color-scheme".into()));
        assert_eq!(
            *seen.borrow(),
            vec![Event::SettingChanged("color-scheme".into())]
        );
    }

    #[test]
    fn test_nested_posts_run_after_current_handler() {
        let dispatcher = Dispatcher::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let _a = dispatcher.subscribe(EventKind::ControlChanged, {
            let log = log.clone();
            let weak = dispatcher.downgrade();
            move |_| {
                log.borrow_mut().push("control:start");
                weak.post(Event::SettingChanged("color-scheme".into()));
                log.borrow_mut().push("control:end");
            }
        });
        let _b = dispatcher.subscribe(EventKind::SettingChanged, {
            let log = log.clone();
            move |_| log.borrow_mut().push("setting")
        });

        dispatcher.post(Event::ControlChanged(ControlId::ColorCombo));
        assert_eq!(
            *log.borrow(),
            vec!["control:start", "control:end", "setting"]
        );
        assert!(!dispatcher.is_dispatching());
    }

    #[test]
    fn test_released_handler_not_called() {
        let dispatcher = Dispatcher::new();
        let hits = Rc::new(Cell::new(0));
        let sub = dispatcher.subscribe(EventKind::RowSelected, {
            let hits = hits.clone();
            move |_| hits.set(hits.get() + 1)
        });
        dispatcher.post(Event::RowSelected(None));
        sub.release();
        dispatcher.post(Event::RowSelected(None));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_weak_post_after_drop_is_noop() {
        let dispatcher = Dispatcher::new();
        let weak = dispatcher.downgrade();
        drop(dispatcher);
        weak.post(Event::RowSelected(None));
    }
}
