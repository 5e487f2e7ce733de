//! Observable properties: values readable now and observable over time.
//!
//! - [`MutableProperty`] — directly settable value.
//! - [`Property`] — read-only facade: constant, captured, or composed from a stream.
//! - [`ObservableProperty`] — the read/observe seam both implement.
//! - [`Watch`] — `tokio::sync::watch` bridge for async consumers.

mod composed;
pub mod mutable;
pub mod readonly;
pub mod traits;
pub mod watch;

pub use mutable::MutableProperty;
pub use readonly::Property;
pub use traits::ObservableProperty;
pub use watch::Watch;
