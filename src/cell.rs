//! ExclusiveCell<V>: single-slot storage behind a re-entrancy-checked lock.
//!
//! The lock is re-entrant so a thread already inside [`ExclusiveCell::with_lock`]
//! can read and mutate without deadlocking itself. What is *not* allowed is
//! touching the cell from inside one of its own mutation closures, or
//! mutating it while a read borrow or a publish step is in progress: the
//! state flags catch that and panic instead of silently re-entering.

use std::cell::{Cell, RefCell};
use std::fmt;

use parking_lot::ReentrantMutex;

struct CellState<V> {
    value: RefCell<V>,
    /// Set for the duration of a `mutate` closure.
    modifying: Cell<bool>,
    /// Set from the store through the end of the publish in `mutate_and_then`.
    publishing: Cell<bool>,
    /// Number of live `with` borrows on the owning thread.
    readers: Cell<usize>,
}

/// Lock-guarded single value with exclusive mutation.
pub struct ExclusiveCell<V> {
    lock: ReentrantMutex<CellState<V>>,
}

/// Clears a flag even if the guarded closure unwinds.
pub(crate) struct FlagGuard<'a>(&'a Cell<bool>);

impl<'a> FlagGuard<'a> {
    /// Raise `flag` until the guard drops.
    pub(crate) fn raise(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Decrements the reader count even if the read closure unwinds.
struct ReaderGuard<'a>(&'a Cell<usize>);

impl Drop for ReaderGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

#[cold]
#[track_caller]
pub(crate) fn exclusivity_violation(op: &str, during: &str) -> ! {
    panic!("exclusivity violation: {op} issued while {during}")
}

impl<V> ExclusiveCell<V> {
    /// Create a cell holding `value`.
    pub fn new(value: V) -> Self {
        Self {
            lock: ReentrantMutex::new(CellState {
                value: RefCell::new(value),
                modifying: Cell::new(false),
                publishing: Cell::new(false),
                readers: Cell::new(0),
            }),
        }
    }

    /// Copy the current value out.
    ///
    /// # Panics
    ///
    /// When called from inside this cell's own `mutate` closure.
    #[track_caller]
    pub fn read(&self) -> V
    where
        V: Clone,
    {
        self.with(|v| v.clone())
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// # Panics
    ///
    /// When called from inside this cell's own `mutate` closure.
    #[track_caller]
    pub fn with<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        let state = self.lock.lock();
        if state.modifying.get() {
            exclusivity_violation("read", "the cell is being mutated");
        }
        state.readers.set(state.readers.get() + 1);
        let _reader = ReaderGuard(&state.readers);
        let value = state.value.borrow();
        f(&*value)
    }

    /// Run `f` with exclusive mutable access to the value.
    ///
    /// # Panics
    ///
    /// When `f` itself (directly or through callbacks) reads or mutates this
    /// same cell, or when called from inside a `with` closure or the publish
    /// step of [`mutate_and_then`](Self::mutate_and_then).
    #[track_caller]
    pub fn mutate<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        let state = self.lock.lock();
        Self::check_mutable(&state);
        let _modifying = FlagGuard::raise(&state.modifying);
        let mut value = state.value.borrow_mut();
        f(&mut *value)
    }

    /// Mutate with `store`, then run `publish` as part of the same exclusive step.
    ///
    /// `publish` may read the cell (so observers can look at the value they
    /// were just handed), but any mutation of the cell before it returns,
    /// including another `mutate_and_then`, panics.
    #[track_caller]
    pub fn mutate_and_then<R>(
        &self,
        store: impl FnOnce(&mut V),
        publish: impl FnOnce() -> R,
    ) -> R {
        let state = self.lock.lock();
        Self::check_mutable(&state);
        let _publishing = FlagGuard::raise(&state.publishing);
        {
            let _modifying = FlagGuard::raise(&state.modifying);
            store(&mut *state.value.borrow_mut());
        }
        publish()
    }

    #[track_caller]
    fn check_mutable(state: &CellState<V>) {
        if state.modifying.get() {
            exclusivity_violation("mutate", "the cell is being mutated");
        }
        if state.publishing.get() {
            exclusivity_violation("mutate", "the cell is publishing a stored value");
        }
        if state.readers.get() > 0 {
            exclusivity_violation("mutate", "the cell is borrowed for reading");
        }
    }

    /// Hold the lock across `f`, so several steps look atomic to other threads.
    ///
    /// `f` may call [`read`](Self::read) and [`mutate`](Self::mutate) on this
    /// cell; other threads block until `f` returns.
    pub fn with_lock<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.lock.lock();
        f()
    }

    #[cfg(test)]
    fn is_modifying(&self) -> bool {
        self.lock.lock().modifying.get()
    }
}

impl<V: Default> Default for ExclusiveCell<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

impl<V: fmt::Debug> fmt::Debug for ExclusiveCell<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("ExclusiveCell");
        match self.lock.try_lock() {
            Some(state) if !state.modifying.get() => {
                dbg.field("value", &*state.value.borrow());
            }
            _ => {
                dbg.field("value", &format_args!("<locked>"));
            }
        }
        dbg.finish()
    }
}
