//! Observable holder for the profile shown on screen.
//!
//! The store is single-threaded (`Rc<RefCell<..>>`) and must only be touched
//! from the UI event loop. Observers run synchronously inside [`ProfileStore::set`],
//! in registration order. Dropping a [`Subscription`] detaches its observer
//! before the next notification.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::models::ProfileState;

type Observer = Rc<dyn Fn(&ProfileState)>;

#[derive(Default)]
struct Inner {
    value: ProfileState,
    observers: Vec<(u64, Observer)>,
    next_id: u64,
}

#[derive(Clone, Default)]
pub struct ProfileStore {
    inner: Rc<RefCell<Inner>>,
}

impl std::fmt::Debug for ProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ProfileStore")
            .field("value", &inner.value)
            .field("observers", &inner.observers.len())
            .finish()
    }
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> ProfileState {
        self.inner.borrow().value.clone()
    }

    #[cfg(test)]
    pub fn profile(&self) -> Option<crate::models::Profile> {
        self.inner.borrow().value.profile().cloned()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    /// Replaces the value and notifies every observer, even if nothing changed.
    pub fn set(&self, value: impl Into<ProfileState>) {
        let value = value.into();
        // Release the borrow first so observers may read, set or unsubscribe.
        let observers: Vec<Observer> = {
            let mut inner = self.inner.borrow_mut();
            inner.value = value.clone();
            inner.observers.iter().map(|(_, o)| o.clone()).collect()
        };
        for observer in observers {
            observer(&value);
        }
    }

    /// Calls `observer` with the current value now and after every [`set`](Self::set).
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&ProfileState) + 'static,
    {
        let observer: Observer = Rc::new(observer);
        let (id, current) = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.observers.push((id, observer.clone()));
            (id, inner.value.clone())
        };
        observer(&current);
        Subscription {
            id,
            store: Rc::downgrade(&self.inner),
        }
    }
}

/// Keeps an observer attached. Dropping it stops notifications.
#[must_use = "dropping a Subscription detaches the observer immediately"]
pub struct Subscription {
    id: u64,
    store: Weak<RefCell<Inner>>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.borrow_mut().observers.retain(|(id, _)| *id != self.id);
        }
    }
}
