//! Derived streams
//!
//! An [`Observable`] is a recipe for a subscription: subscribing runs the
//! recipe against the upstream source. Operators build new recipes without
//! touching the source, so a derived stream costs nothing until someone
//! subscribes to it, and every subscriber gets its own operator state.

use std::sync::Arc;

use crate::subject::{Observer, Subscription};

type SubscribeFn<T> = dyn Fn(Observer<T>) -> Subscription + Send + Sync + 'static;

pub struct Observable<T> {
    subscribe_fn: Arc<SubscribeFn<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: Arc::clone(&self.subscribe_fn),
        }
    }
}

impl<T: Send + 'static> Observable<T> {
    pub(crate) fn new(
        subscribe_fn: impl Fn(Observer<T>) -> Subscription + Send + Sync + 'static,
    ) -> Self {
        Self {
            subscribe_fn: Arc::new(subscribe_fn),
        }
    }

    pub fn subscribe(&self, observer: impl FnMut(&T) + Send + 'static) -> Subscription {
        (self.subscribe_fn)(Box::new(observer))
    }

    /// Transform every emission
    pub fn map<U: Send + 'static>(
        &self,
        project: impl Fn(&T) -> U + Send + Sync + 'static,
    ) -> Observable<U> {
        let upstream = self.clone();
        let project = Arc::new(project);
        Observable::new(move |mut observer: Observer<U>| {
            let project = Arc::clone(&project);
            upstream.subscribe(move |value| observer(&project(value)))
        })
    }

    /// Drop emissions that fail the predicate
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Observable<T> {
        let upstream = self.clone();
        let predicate = Arc::new(predicate);
        Observable::new(move |mut observer: Observer<T>| {
            let predicate = Arc::clone(&predicate);
            upstream.subscribe(move |value| {
                if predicate(value) {
                    observer(value);
                }
            })
        })
    }

    /// Map and filter in one step
    pub fn filter_map<U: Send + 'static>(
        &self,
        project: impl Fn(&T) -> Option<U> + Send + Sync + 'static,
    ) -> Observable<U> {
        let upstream = self.clone();
        let project = Arc::new(project);
        Observable::new(move |mut observer: Observer<U>| {
            let project = Arc::clone(&project);
            upstream.subscribe(move |value| {
                if let Some(projected) = project(value) {
                    observer(&projected);
                }
            })
        })
    }

    /// Suppress an emission equal to the previous one seen by this subscriber
    pub fn distinct_until_changed(&self) -> Observable<T>
    where
        T: PartialEq + Clone,
    {
        let upstream = self.clone();
        Observable::new(move |mut observer: Observer<T>| {
            let mut last: Option<T> = None;
            upstream.subscribe(move |value| {
                if last.as_ref() == Some(value) {
                    return;
                }
                last = Some(value.clone());
                observer(value);
            })
        })
    }

    /// Project a slice of each emission and deduplicate it
    pub fn select<U>(&self, project: impl Fn(&T) -> U + Send + Sync + 'static) -> Observable<U>
    where
        U: PartialEq + Clone + Send + 'static,
    {
        self.map(project).distinct_until_changed()
    }
}

impl<T> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Observable")
    }
}
