//! MutableProperty<V>: a directly settable observable value.
//!
//! Built straight on a replay-latest [`Subject`]; the subject's own delivery
//! lock is the only synchronization involved.

use std::fmt;

use crate::stream::{Stream, Subject};

use super::readonly::Property;
use super::traits::ObservableProperty;

/// Settable property. Clones are handles to the same value.
pub struct MutableProperty<V> {
    subject: Subject<V>,
}

impl<V> Clone for MutableProperty<V> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> MutableProperty<V> {
    /// Create a property holding `initial`.
    pub fn new(initial: V) -> Self {
        Self {
            subject: Subject::behavior(initial),
        }
    }

    /// The latest value.
    pub fn value(&self) -> V {
        self.subject
            .latest()
            .expect("behavior subject always holds a value")
    }

    /// Push a new value to every current and future observer.
    pub fn set(&self, value: V) {
        self.subject.send(value);
    }

    /// Set a new value and return the previous one.
    pub fn replace(&self, value: V) -> V {
        self.modify(|slot| std::mem::replace(slot, value))
    }

    /// Mutate the value in place, then notify observers.
    ///
    /// # Panics
    ///
    /// When `f` writes to this same property (through `set`, `replace` or
    /// `modify`); that write would otherwise be lost.
    #[track_caller]
    pub fn modify<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        self.subject
            .update(f)
            .expect("behavior subject always holds a value")
    }

    /// Current value followed by every later write.
    pub fn stream(&self) -> Stream<V> {
        self.subject.stream()
    }

    /// Number of live subscriptions on this property.
    pub fn observer_count(&self) -> usize {
        self.subject.observer_count()
    }

    /// A read-only view that keeps this property alive.
    pub fn read_only(&self) -> Property<V> {
        Property::capture(self.clone())
    }
}

impl<V: Clone + Send + Sync + 'static> ObservableProperty<V> for MutableProperty<V> {
    fn value(&self) -> V {
        MutableProperty::value(self)
    }

    fn stream(&self) -> Stream<V> {
        MutableProperty::stream(self)
    }
}

impl<V: Clone + Send + Sync + fmt::Debug + 'static> fmt::Debug for MutableProperty<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableProperty")
            .field("value", &self.value())
            .finish()
    }
}
