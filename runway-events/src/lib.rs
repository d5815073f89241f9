//! Event dispatch for Runway.
//!
//! This crate provides the publish/subscribe primitive every Runway
//! observable is built on:
//! - [`EventBus`]: a per-instance listener table with hierarchical dispatch
//! - [`Handler`]: a shared handler handle, removable by identity
//! - [`Observable`]: the `on` / `off` / `trigger` capability
//! - [`Subscription`]: RAII guard that detaches a handler on drop
//! - [`eventify`]: attaches the capability to an arbitrary value
//!
//! Event names are space-separated lists of colon-segmented names.
//! Triggering `change:id` invokes the handlers of `change:id`, then those of
//! `change`, then the wildcard (`*`) handlers. Dispatch is synchronous: every
//! handler has returned by the time `trigger` returns.
//!
//! ```rust
//! use runway_events::{eventify, Eventified, Observable};
//! use serde_json::json;
//! use std::cell::Cell;
//!
//! let counter: Eventified<Cell<i64>> = eventify(Cell::new(0));
//! let _sub = counter.subscribe("bump", |target, args| {
//!     let by = args.first().and_then(|a| a.as_i64()).unwrap_or(1);
//!     target.set(target.get() + by);
//! });
//!
//! counter.trigger("bump:twice", &[json!(2)]);
//! assert_eq!(counter.get(), 2);
//! ```

mod bus;
mod eventify;
mod handler;
mod name;
mod observable;

pub use bus::EventBus;
pub use eventify::{Eventified, eventify};
pub use handler::Handler;
pub use name::{EventName, WILDCARD, levels, split_names};
pub use observable::{Observable, Subscription};

/// Result type alias using the crate's error type.
pub type EventResult<T> = std::result::Result<T, EventError>;

/// Errors produced by strict event-name parsing.
///
/// The bus itself never fails: empty entries in a name list are skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("event name is empty")]
    EmptyName,

    #[error("event name `{0}` contains whitespace")]
    Whitespace(String),
}
