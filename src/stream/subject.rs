//! Subject<T>: hot multicast stream with optional replay of the latest value.
//!
//! Observers live in a slotmap arena. The [`Disposable`] returned for each
//! observer only holds a weak link back to the subject plus the observer's
//! key, so a live subscription never keeps a subject alive on its own.

use std::cell::Cell;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};
use slotmap::{new_key_type, SlotMap};

use crate::cell::{exclusivity_violation, FlagGuard};

use super::disposable::Disposable;
use super::source::{Observer, Stream};

new_key_type! {
    /// Key of one observer inside a [`Subject`].
    pub struct ObserverKey;
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

struct SubjectState<T> {
    /// Most recent value. Only tracked when `replay` is set.
    latest: Option<T>,
    replay: bool,
    observers: SlotMap<ObserverKey, Observer<T>>,
}

struct SubjectInner<T> {
    /// Serializes deliveries and subscriptions so observers see values in
    /// send order and a late subscriber never straddles a send. Re-entrant:
    /// an observer may send on the subject that is delivering to it. The flag
    /// is set while an `update` closure runs.
    delivery: ReentrantMutex<Cell<bool>>,
    /// Never held while user callbacks run.
    state: Mutex<SubjectState<T>>,
}

impl<T: Clone> SubjectInner<T> {
    #[track_caller]
    fn check_not_updating(modifying: &Cell<bool>, op: &str) {
        if modifying.get() {
            exclusivity_violation(op, "the subject is being updated");
        }
    }

    /// Store `value` (when replaying) and snapshot the observers to call.
    fn record(&self, value: &T) -> Vec<Observer<T>> {
        let mut state = self.state.lock();
        if state.replay {
            state.latest = Some(value.clone());
        }
        state.observers.values().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Subject
// ---------------------------------------------------------------------------

/// Multicast stream that pushes each sent value to every current observer.
///
/// Built with [`Subject::behavior`], it also replays the latest value to each
/// new observer before anything sent afterwards.
pub struct Subject<T> {
    inner: Arc<SubjectInner<T>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> Subject<T> {
    /// A subject without replay: observers only see values sent after they attach.
    pub fn new() -> Self {
        Self::build(None, false)
    }

    /// A replay-latest subject seeded with `initial`.
    pub fn behavior(initial: T) -> Self {
        Self::build(Some(initial), true)
    }

    fn build(latest: Option<T>, replay: bool) -> Self {
        Self {
            inner: Arc::new(SubjectInner {
                delivery: ReentrantMutex::new(Cell::new(false)),
                state: Mutex::new(SubjectState {
                    latest,
                    replay,
                    observers: SlotMap::with_key(),
                }),
            }),
        }
    }

    /// Push `value` to every current observer (and record it for replay).
    ///
    /// # Panics
    ///
    /// When called from inside an [`update`](Self::update) closure on this subject.
    #[track_caller]
    pub fn send(&self, value: T) {
        let delivery = self.inner.delivery.lock();
        SubjectInner::<T>::check_not_updating(&delivery, "send");
        let observers = self.inner.record(&value);
        for observer in observers {
            observer(&value);
        }
    }

    /// Read-modify-write the latest value, then deliver the result.
    ///
    /// Returns `None` (and does nothing) on a subject without replay.
    ///
    /// # Panics
    ///
    /// When `f` sends on or updates this same subject; the nested write would
    /// otherwise be overwritten by `f`'s result.
    #[track_caller]
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let delivery = self.inner.delivery.lock();
        SubjectInner::<T>::check_not_updating(&delivery, "update");
        let mut value = self.inner.state.lock().latest.clone()?;
        let result = {
            let _modifying = FlagGuard::raise(&delivery);
            f(&mut value)
        };
        let observers = self.inner.record(&value);
        for observer in observers {
            observer(&value);
        }
        Some(result)
    }

    /// The latest value, if this subject replays.
    pub fn latest(&self) -> Option<T> {
        self.inner.state.lock().latest.clone()
    }

    /// Number of attached observers.
    pub fn observer_count(&self) -> usize {
        self.inner.state.lock().observers.len()
    }

    /// A stream view of this subject. The stream keeps the subject alive.
    pub fn stream(&self) -> Stream<T> {
        let inner = self.inner.clone();
        Stream::new(move |observer| Self::attach(&inner, observer))
    }

    /// Subscribe directly.
    pub fn subscribe(&self, on_next: impl Fn(&T) + Send + Sync + 'static) -> Disposable {
        Self::attach(&self.inner, Arc::new(on_next))
    }

    fn attach(inner: &Arc<SubjectInner<T>>, observer: Observer<T>) -> Disposable {
        let _delivery = inner.delivery.lock();
        let (key, replay) = {
            let mut state = inner.state.lock();
            let key = state.observers.insert(observer.clone());
            (key, state.latest.clone())
        };
        if let Some(value) = replay {
            observer(&value);
        }
        let weak: Weak<SubjectInner<T>> = Arc::downgrade(inner);
        Disposable::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.state.lock().observers.remove(key);
            }
        })
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Subject")
            .field("replay", &state.replay)
            .field("observers", &state.observers.len())
            .finish()
    }
}
