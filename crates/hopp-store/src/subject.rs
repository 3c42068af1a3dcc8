//! Multicast value holder
//!
//! A `BehaviorSubject` always carries a current value. Observers receive it
//! immediately when they subscribe and afterwards every value passed to
//! [`BehaviorSubject::next`], in order, exactly once. Nothing older than the
//! current value is retained.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::observable::Observable;

pub(crate) type Observer<T> = Box<dyn FnMut(&T) + Send + 'static>;

struct Slot<T> {
    id: u64,
    observer: Observer<T>,
}

struct Inner<T> {
    value: T,
    slots: Vec<Slot<T>>,
    next_id: u64,
    /// Observers are moved out of the lock while values are delivered
    delivering: bool,
    /// Values published from inside an observer wait here
    queued: VecDeque<T>,
    /// Subscriptions dropped while their slot was out for delivery
    removed: Vec<u64>,
}

pub struct BehaviorSubject<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for BehaviorSubject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> BehaviorSubject<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value,
                slots: Vec::new(),
                next_id: 0,
                delivering: false,
                queued: VecDeque::new(),
                removed: Vec::new(),
            })),
        }
    }

    /// Snapshot of the current value
    pub fn value(&self) -> T {
        self.lock().value.clone()
    }

    /// Number of live observers
    pub fn observer_count(&self) -> usize {
        self.lock().slots.len()
    }

    /// Publish a new value to every observer
    ///
    /// Calling `next` from inside an observer does not recurse: the value is
    /// queued and delivered after the current round completes.
    pub fn next(&self, value: T) {
        {
            let mut inner = self.lock();
            inner.queued.push_back(value);
            if inner.delivering {
                return;
            }
            inner.delivering = true;
        }

        loop {
            let (value, mut slots) = {
                let mut inner = self.lock();
                let Some(value) = inner.queued.pop_front() else {
                    inner.delivering = false;
                    break;
                };
                inner.value = value.clone();
                (value, std::mem::take(&mut inner.slots))
            };

            for slot in slots.iter_mut() {
                if self.lock().removed.contains(&slot.id) {
                    continue;
                }
                (slot.observer)(&value);
            }

            let mut inner = self.lock();
            let removed = std::mem::take(&mut inner.removed);
            slots.retain(|slot| !removed.contains(&slot.id));
            // Observers that subscribed during delivery go after the existing ones
            let added = std::mem::take(&mut inner.slots);
            slots.extend(added);
            inner.slots = slots;
        }
    }

    /// Register an observer; it is called with the current value right away
    pub fn subscribe(&self, observer: impl FnMut(&T) + Send + 'static) -> Subscription {
        self.subscribe_boxed(Box::new(observer))
    }

    pub(crate) fn subscribe_boxed(&self, mut observer: Observer<T>) -> Subscription {
        let (id, current) = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            (id, inner.value.clone())
        };

        observer(&current);
        self.lock().slots.push(Slot { id, observer });

        let weak: Weak<Mutex<Inner<T>>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(pos) = inner.slots.iter().position(|slot| slot.id == id) {
                    inner.slots.remove(pos);
                } else if inner.delivering {
                    inner.removed.push(id);
                }
            }
        })
    }

    /// Read-only stream view of this subject
    pub fn observable(&self) -> Observable<T> {
        let subject = self.clone();
        Observable::new(move |observer| subject.subscribe_boxed(observer))
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to a registered observer
///
/// Dropping the handle unsubscribes. Use [`Subscription::detach`] to keep the
/// observer registered for the lifetime of its source.
#[must_use = "dropping a Subscription unsubscribes the observer"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    pub(crate) fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// Stop delivery to this observer
    pub fn unsubscribe(mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }

    /// Keep the observer registered without holding on to the handle
    pub fn detach(mut self) {
        self.teardown = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.teardown.is_some())
            .finish()
    }
}
