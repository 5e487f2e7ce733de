//! Push streams: the minimal collaborator the property core consumes.
//!
//! - [`Stream`] — cold stream described by a subscribe function, with
//!   `map` / `filter` / `filter_map` / `start_with` operators.
//! - [`Subject`] — hot multicast stream, optionally replaying its latest value.
//! - [`Disposable`] — RAII subscription handle.

pub mod disposable;
pub mod source;
pub mod subject;

pub use disposable::Disposable;
pub use source::{Observer, Stream};
pub use subject::{ObserverKey, Subject};
