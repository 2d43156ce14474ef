//! Scoped Subscriptions
//!
//! Every binding, signal connection and event handler hands back a
//! [`Subscription`]. Dropping or releasing it disconnects the underlying
//! listener. The window orchestrator keeps them in a [`Subscriptions`] bag
//! and releases them all on teardown.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Disposable handle for a live connection
#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a disposer that runs exactly once
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Release now
    pub fn release(mut self) {
        self.run();
    }

    /// Whether the disposer has not run yet
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    fn run(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Ordered collection of handles released together
#[derive(Debug, Default)]
pub struct Subscriptions {
    handles: Vec<Subscription>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: Subscription) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Release every handle, most recent first
    pub fn release_all(&mut self) {
        while let Some(handle) = self.handles.pop() {
            handle.release();
        }
    }
}

impl Extend<Subscription> for Subscriptions {
    fn extend<I: IntoIterator<Item = Subscription>>(&mut self, iter: I) {
        self.handles.extend(iter);
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.release_all();
    }
}

struct ListenerList<T: ?Sized> {
    next_id: u64,
    entries: Vec<(u64, Rc<T>)>,
}

/// Listener list whose entries are removed by their [`Subscription`]
pub struct Listeners<T: ?Sized> {
    inner: Rc<RefCell<ListenerList<T>>>,
}

impl<T: ?Sized + 'static> Listeners<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListenerList {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a listener; it stays registered until the handle is released
    pub fn add(&self, listener: Rc<T>) -> Subscription {
        let id = {
            let mut list = self.inner.borrow_mut();
            let id = list.next_id;
            list.next_id += 1;
            list.entries.push((id, listener));
            id
        };

        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().entries.retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Current listeners, cloned so callbacks may re-enter the list
    pub fn snapshot(&self) -> Vec<Rc<T>> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ?Sized + 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for Listeners<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
