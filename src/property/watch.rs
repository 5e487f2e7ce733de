//! Watch<V>: async view of a property through `tokio::sync::watch`.

use std::fmt;

use tokio::sync::watch;

use crate::stream::{Disposable, Stream};

/// A `tokio::sync::watch` receiver fed by a property's stream.
///
/// The bridge owns its subscription; dropping it detaches from the property.
pub struct Watch<V> {
    receiver: watch::Receiver<V>,
    _subscription: Disposable,
}

impl<V: Clone + Send + Sync + 'static> Watch<V> {
    pub(crate) fn attach(current: V, stream: &Stream<V>) -> Self {
        let (sender, mut receiver) = watch::channel(current);
        let subscription = stream.subscribe(move |value: &V| {
            sender.send_replace(value.clone());
        });
        // The replayed current value is not a change.
        receiver.borrow_and_update();
        Self {
            receiver,
            _subscription: subscription,
        }
    }

    /// Latest value seen by the bridge.
    pub fn current(&self) -> V {
        self.receiver.borrow().clone()
    }

    /// Whether a value arrived that [`changed`](Self::changed) has not yet returned.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Wait for the next change and return it.
    ///
    /// Returns `None` once the producer can no longer deliver values and the
    /// last one has been seen.
    pub async fn changed(&mut self) -> Option<V> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// A fresh receiver sharing this bridge's channel.
    pub fn receiver(&self) -> watch::Receiver<V> {
        self.receiver.clone()
    }
}

impl<V: fmt::Debug> fmt::Debug for Watch<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watch")
            .field("current", &*self.receiver.borrow())
            .finish_non_exhaustive()
    }
}
