//! Stream<T>: a cold push stream described by its subscribe function.
//!
//! Subscribing hands the stream an observer callback and gets back a
//! [`Disposable`]. Delivery is synchronous: a stream may call the observer
//! before `subscribe` returns (that is how [`Stream::just`] works) and later
//! from whatever thread its producer runs on.

use std::fmt;
use std::sync::Arc;

use super::disposable::Disposable;

/// Shared observer callback.
pub type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

type SubscribeFn<T> = dyn Fn(Observer<T>) -> Disposable + Send + Sync;

/// A push stream of `T` values.
///
/// Cheap to clone: clones share the same subscribe function.
pub struct Stream<T> {
    subscribe_fn: Arc<SubscribeFn<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: self.subscribe_fn.clone(),
        }
    }
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Construction and subscription
// ---------------------------------------------------------------------------

impl<T: 'static> Stream<T> {
    /// Build a stream from a subscribe function.
    pub fn new(subscribe: impl Fn(Observer<T>) -> Disposable + Send + Sync + 'static) -> Self {
        Self {
            subscribe_fn: Arc::new(subscribe),
        }
    }

    /// A stream that never delivers anything.
    pub fn never() -> Self {
        Self::new(|_| Disposable::empty())
    }

    /// Subscribe with a callback. Keep the returned handle to stay subscribed.
    pub fn subscribe(&self, on_next: impl Fn(&T) + Send + Sync + 'static) -> Disposable {
        self.subscribe_observer(Arc::new(on_next))
    }

    /// Subscribe with an already shared observer.
    pub fn subscribe_observer(&self, observer: Observer<T>) -> Disposable {
        (self.subscribe_fn)(observer)
    }

    // -----------------------------------------------------------------------
    // Operators
    // -----------------------------------------------------------------------

    /// Transform every value.
    pub fn map<U: 'static>(&self, f: impl Fn(&T) -> U + Send + Sync + 'static) -> Stream<U> {
        let source = self.clone();
        let f = Arc::new(f);
        Stream::new(move |observer: Observer<U>| {
            let f = f.clone();
            source.subscribe(move |value| observer(&f(value)))
        })
    }

    /// Keep only values matching `predicate`.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Stream<T> {
        let source = self.clone();
        let predicate = Arc::new(predicate);
        Stream::new(move |observer: Observer<T>| {
            let predicate = predicate.clone();
            source.subscribe(move |value| {
                if predicate(value) {
                    observer(value);
                }
            })
        })
    }

    /// Transform and drop in one pass; `None` results are skipped.
    pub fn filter_map<U: 'static>(
        &self,
        f: impl Fn(&T) -> Option<U> + Send + Sync + 'static,
    ) -> Stream<U> {
        let source = self.clone();
        let f = Arc::new(f);
        Stream::new(move |observer: Observer<U>| {
            let f = f.clone();
            source.subscribe(move |value| {
                if let Some(mapped) = f(value) {
                    observer(&mapped);
                }
            })
        })
    }
}

impl<T: Send + Sync + 'static> Stream<T> {
    /// Deliver `value` synchronously on subscribe, then nothing.
    pub fn just(value: T) -> Self {
        Self::new(move |observer| {
            observer(&value);
            Disposable::empty()
        })
    }

    /// Deliver every value synchronously on subscribe, in order.
    pub fn from_values(values: impl IntoIterator<Item = T>) -> Self {
        let values: Vec<T> = values.into_iter().collect();
        Self::new(move |observer| {
            for value in &values {
                observer(value);
            }
            Disposable::empty()
        })
    }

    /// `just(first)` followed by this stream.
    pub fn start_with(&self, first: T) -> Stream<T> {
        let source = self.clone();
        Stream::new(move |observer: Observer<T>| {
            observer(&first);
            source.subscribe_observer(observer)
        })
    }
}
