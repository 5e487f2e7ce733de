//! RAII subscription handles.

use std::fmt;

/// Handle to a live subscription.
///
/// Disposing runs the teardown exactly once. Dropping a handle that was never
/// disposed disposes it, so the usual way to keep a subscription alive is to
/// keep its handle.
#[must_use = "dropping a Disposable ends the subscription"]
pub struct Disposable {
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl Disposable {
    /// Wrap a teardown action.
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// A handle with nothing to tear down.
    pub fn empty() -> Self {
        Self { teardown: None }
    }

    /// Tear the subscription down. Idempotent.
    pub fn dispose(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }

    /// Whether the teardown has already run (always true for [`Disposable::empty`]).
    pub fn is_disposed(&self) -> bool {
        self.teardown.is_none()
    }

    /// Chain another handle so both are torn down together.
    pub fn and(mut self, mut other: Disposable) -> Self {
        let first = self.teardown.take();
        Disposable::new(move || {
            if let Some(first) = first {
                first();
            }
            other.dispose();
        })
    }
}

impl Drop for Disposable {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Disposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposable")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
