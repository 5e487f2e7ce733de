//! Composed<V>: a property derived from an arbitrary upstream stream.
//!
//! Ownership graph:
//!
//! - the property holds the cell strongly and the consumer-facing stream;
//! - the upstream subscription holds the cell *weakly* and the relay strongly;
//! - every consumer subscription holds the upstream guard, so the upstream
//!   stays attached while either the property or any consumer is alive.
//!
//! Once the property is gone the cell is freed and emissions go straight to
//! the relay. Once the consumers are gone too, the guard drops and the
//! upstream subscription is disposed.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::cell::ExclusiveCell;
use crate::config::ComposeConfig;
use crate::error::{PropertyError, Result};
use crate::stream::{Disposable, Stream, Subject};

// ---------------------------------------------------------------------------
// Emission
// ---------------------------------------------------------------------------

/// What the relay carries: a real value, or the bootstrap placeholder it
/// holds before the first upstream value arrives.
#[derive(Debug, Clone, PartialEq)]
enum Emission<V> {
    Value(V),
    Empty,
}

impl<V: Clone> Emission<V> {
    fn value(&self) -> Option<V> {
        match self {
            Emission::Value(v) => Some(v.clone()),
            Emission::Empty => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Upstream guard
// ---------------------------------------------------------------------------

/// Owns the upstream subscription; disposes it on drop.
struct UpstreamGuard {
    subscription: Mutex<Disposable>,
    label: String,
}

impl Drop for UpstreamGuard {
    fn drop(&mut self) {
        self.subscription.get_mut().dispose();
        debug!(label = %self.label, "composed property detached from upstream");
    }
}

// ---------------------------------------------------------------------------
// Composed
// ---------------------------------------------------------------------------

/// Cached view of an upstream stream.
pub(crate) struct Composed<V> {
    cell: Arc<ExclusiveCell<Option<V>>>,
    stream: Stream<V>,
}

impl<V> Clone for Composed<V> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            stream: self.stream.clone(),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> Composed<V> {
    /// Attach to `upstream`, which must deliver a value during `subscribe`.
    pub(crate) fn new(upstream: &Stream<V>, config: &ComposeConfig) -> Result<Self> {
        let composed = Self::attach(None, upstream, config);
        if composed.cell.with(Option::is_none) {
            warn!(
                label = %config.display_label(),
                "upstream went dormant without an initial value"
            );
            return Err(PropertyError::NoInitialValue {
                label: config.label.clone(),
            });
        }
        Ok(composed)
    }

    /// Start from `initial` and follow `values` afterwards.
    pub(crate) fn seeded(initial: V, values: &Stream<V>, config: &ComposeConfig) -> Self {
        Self::attach(Some(initial), values, config)
    }

    fn attach(seed: Option<V>, upstream: &Stream<V>, config: &ComposeConfig) -> Self {
        let label = config.display_label().to_owned();
        let relay = Subject::behavior(match &seed {
            Some(value) => Emission::Value(value.clone()),
            None => Emission::Empty,
        });
        let cell = Arc::new(ExclusiveCell::new(seed));

        let weak_cell = Arc::downgrade(&cell);
        let sink = relay.clone();
        let emit_label = label.clone();
        let subscription = upstream.subscribe(move |value: &V| match weak_cell.upgrade() {
            Some(cell) => {
                trace!(label = %emit_label, "relaying emission through cell");
                cell.mutate_and_then(
                    |slot| *slot = Some(value.clone()),
                    || sink.send(Emission::Value(value.clone())),
                );
            }
            None => {
                trace!(label = %emit_label, "cell released; relaying emission directly");
                sink.send(Emission::Value(value.clone()));
            }
        });
        debug!(label = %label, "composed property attached to upstream");

        let guard = Arc::new(UpstreamGuard {
            subscription: Mutex::new(subscription),
            label,
        });
        let values = relay.stream().filter_map(Emission::value);
        // Subscribing takes the cell lock first (when the cell is alive) so
        // the lock order matches the emission path: cell, then relay.
        let weak_cell = Arc::downgrade(&cell);
        let stream = Stream::new(move |observer| {
            let guard = guard.clone();
            let subscription = match weak_cell.upgrade() {
                Some(cell) => cell.with_lock(|| values.subscribe_observer(observer)),
                None => values.subscribe_observer(observer),
            };
            subscription.and(Disposable::new(move || drop(guard)))
        });

        Self { cell, stream }
    }

    /// Synchronous read of the cached value.
    pub(crate) fn value(&self) -> V {
        self.cell
            .read()
            .expect("composed cell is filled before construction returns")
    }

    /// Cached value followed by every later upstream value.
    pub(crate) fn stream(&self) -> Stream<V> {
        self.stream.clone()
    }
}
