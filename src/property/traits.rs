//! The ObservableProperty trait shared by every property flavor.

use crate::stream::Stream;

use super::watch::Watch;

/// A value that can be read synchronously and observed over time.
///
/// Implementors must make [`stream`](ObservableProperty::stream) deliver the
/// current value to each new subscriber first, then every later change in
/// order. Capture and compose construction rely on that.
pub trait ObservableProperty<V>: Send + Sync {
    /// The current value.
    fn value(&self) -> V;

    /// Stream of the current value followed by every change.
    fn stream(&self) -> Stream<V>;

    /// Bridge into a `tokio::sync::watch` channel for async consumers.
    fn watch(&self) -> Watch<V>
    where
        Self: Sized,
        V: Clone + Send + Sync + 'static,
    {
        Watch::attach(self.value(), &self.stream())
    }
}
