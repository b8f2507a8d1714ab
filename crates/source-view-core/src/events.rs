//! Listener registration with disposer handles.
//!
//! Every subscription returns a [`Subscription`]. The listener stays attached for as long as the
//! handle is alive; dropping the handle (or calling [`Subscription::dispose`]) detaches it exactly
//! once. Listeners run synchronously, in registration order, on the emitting thread.
//!
//! # Example
//!
//! ```rust
//! use source_view_core::ListenerSet;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let listeners = ListenerSet::<u32>::new();
//! let seen = Rc::new(Cell::new(0));
//!
//! let seen_clone = Rc::clone(&seen);
//! let subscription = listeners.subscribe(move |value| {
//!     seen_clone.set(seen_clone.get() + *value);
//!     Ok(())
//! });
//!
//! listeners.emit(&2);
//! subscription.dispose();
//! listeners.emit(&40);
//! assert_eq!(seen.get(), 2);
//! ```

use crate::error::ListenerError;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Callback<E> = Rc<dyn Fn(&E) -> Result<(), ListenerError>>;

struct Slots<E> {
    next_id: u64,
    entries: Vec<(u64, Callback<E>)>,
}

/// A list of listeners for events of type `E`.
///
/// Cloning yields another handle to the same list, which lets an emitter be used after the
/// owner's borrow has been released.
pub struct ListenerSet<E> {
    slots: Rc<RefCell<Slots<E>>>,
}

impl<E: 'static> ListenerSet<E> {
    /// Create an empty listener list.
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Slots {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Attach `listener`. It stays attached until the returned handle is dropped or disposed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) -> Result<(), ListenerError> + 'static,
    {
        let id = {
            let mut slots = self.slots.borrow_mut();
            let id = slots.next_id;
            slots.next_id = slots.next_id.wrapping_add(1);
            slots.entries.push((id, Rc::new(listener)));
            id
        };

        let weak = Rc::downgrade(&self.slots);
        Subscription::new(move || {
            if let Some(slots) = weak.upgrade() {
                slots.borrow_mut().entries.retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Deliver `event` to every listener attached at the time of the call.
    ///
    /// Listener errors are logged and do not stop delivery. Returns the number of failures.
    pub fn emit(&self, event: &E) -> usize {
        let snapshot: Vec<Callback<E>> = self
            .slots
            .borrow()
            .entries
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();

        let mut failures = 0;
        for callback in snapshot {
            if let Err(err) = callback(event) {
                failures += 1;
                tracing::warn!(error = %err, event = std::any::type_name::<E>(), "listener failed");
            }
        }
        failures
    }

    /// Number of attached listeners.
    pub fn len(&self) -> usize {
        self.slots.borrow().entries.len()
    }

    /// Returns `true` if no listener is attached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Clone for ListenerSet<E> {
    /// Another handle to the same listener list.
    fn clone(&self) -> Self {
        Self {
            slots: Rc::clone(&self.slots),
        }
    }
}

impl<E: 'static> Default for ListenerSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for ListenerSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.slots.borrow().entries.len())
            .finish()
    }
}

/// Disposer handle for an attached listener or registration.
#[must_use = "dropping a Subscription detaches it immediately"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a detach action. It runs at most once.
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Detach now.
    pub fn dispose(mut self) {
        self.run();
    }

    /// Returns `true` until the handle has been disposed.
    pub fn is_active(&self) -> bool {
        self.detach.is_some()
    }

    fn run(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_failing_listener_does_not_block_others() {
        let listeners = ListenerSet::<()>::new();
        let reached = Rc::new(Cell::new(false));

        let _failing = listeners.subscribe(|_| Err(ListenerError::new("boom")));
        let reached_clone = Rc::clone(&reached);
        let _ok = listeners.subscribe(move |_| {
            reached_clone.set(true);
            Ok(())
        });

        assert_eq!(listeners.emit(&()), 1);
        assert!(reached.get());
    }

    #[test]
    fn test_drop_detaches_once() {
        let listeners = ListenerSet::<()>::new();
        let subscription = listeners.subscribe(|_| Ok(()));
        assert_eq!(listeners.len(), 1);
        drop(subscription);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_subscription_outliving_set_is_harmless() {
        let listeners = ListenerSet::<()>::new();
        let subscription = listeners.subscribe(|_| Ok(()));
        drop(listeners);
        subscription.dispose();
    }
}
