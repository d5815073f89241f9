//! Observable object graphs for Runway.
//!
//! This crate builds reactive records and sequences on top of
//! [`runway_events`]:
//! - [`Entity`]: a record of reactive fields ([`Field`])
//! - [`Collection`]: an ordered sequence that reports membership changes
//! - [`EntityDef`] / [`CollectionDef`]: constructors with defaults,
//!   preprocessing and element-type conversion
//! - [`EntitySchema`] / [`CollectionSchema`]: the same definitions as data
//!
//! Containers wire themselves to the entities and collections they hold, so
//! a change deep in the graph surfaces on every ancestor. A collection held
//! in a field reports as `change:<field>`; everything else nested reports as
//! `sub:change`.
//!
//! ```rust
//! use runway_model::{Collection, Entity, Observable, Value};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let list = Entity::from_fields([("items", Value::from(Collection::new()))]);
//! let seen = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&seen);
//! let _sub = list.subscribe("change:items", move |_, _| counter.set(counter.get() + 1));
//!
//! let items = list.get("items").and_then(|v| v.as_collection().cloned());
//! if let Some(items) = items {
//!     items.push("milk");
//! }
//! assert_eq!(seen.get(), 1);
//! ```

mod bridge;
mod collection;
mod def;
mod entity;
mod error;
mod property;
mod schema;
mod snapshot;
mod value;

pub use collection::Collection;
pub use def::{CollectionDef, CollectionDefBuilder, ElementType, EntityDef, EntityDefBuilder, Record};
pub use entity::Entity;
pub use error::{ModelError, ModelResult};
pub use property::Field;
pub use schema::{CollectionSchema, ElementSchema, EntitySchema};
pub use value::{FieldChange, Value, is};

pub use runway_events::{Handler, Observable, Subscription, eventify};
