//! # cellprop
//!
//! Observable property cells: values you can read synchronously right now and
//! observe as a stream of changes over time.
//!
//! ## Core Systems
//!
//! - **[`cell`]** — `ExclusiveCell`: single-slot storage with a lock that
//!   rejects re-entrant mutation
//! - **[`stream`]** — minimal push streams: `Stream`, `Subject`, `Disposable`
//! - **[`property`]** — `MutableProperty`, the read-only `Property` facade
//!   (constant, captured, composed), and the `Watch` async bridge
//! - **[`config`]** — `ComposeConfig` for composed properties
//! - **[`error`]** — `PropertyError`
//!
//! ## Example
//!
//! ```
//! use cellprop::{MutableProperty, Property};
//!
//! let count = MutableProperty::new(1);
//! let doubled = Property::compose(&count).unwrap().map(|v| v * 2);
//! count.set(21);
//! assert_eq!(doubled.value(), 42);
//! ```

// Foundation
pub mod cell;
pub mod config;
pub mod error;

// Streams
pub mod stream;

// Properties
pub mod property;

pub use cell::ExclusiveCell;
pub use config::ComposeConfig;
pub use error::{PropertyError, Result};
pub use property::{MutableProperty, ObservableProperty, Property, Watch};
pub use stream::{Disposable, Stream, Subject};
