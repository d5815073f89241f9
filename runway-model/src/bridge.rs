//! Subscription bridging between containers and their children.
//!
//! Whenever a container starts holding an entity or collection it wires a
//! handler onto the child that re-triggers on the container; when it stops
//! holding it the returned [`Subscription`] is dropped and the handler is
//! detached with the same event names.
//!
//! | Container   | Child       | Child events         | Re-triggered as |
//! |-------------|-------------|----------------------|-----------------|
//! | entity field| collection  | `change`             | `change:<key>`  |
//! | entity field| collection  | `sub:change`         | `sub:change`    |
//! | entity field| entity      | `change sub:change`  | `sub:change`    |
//! | collection  | either      | `change sub:change`  | `sub:change`    |
//!
//! Handlers hold the container weakly, so a child never keeps its container
//! alive and cyclic containment does not leak.

use crate::collection::Collection;
use crate::entity::Entity;
use crate::value::Value;
use runway_events::{Observable, Subscription};
use tracing::debug;

pub(crate) const CHANGE: &str = "change";
pub(crate) const SUB_CHANGE: &str = "sub:change";
const NESTED: &str = "change sub:change";

/// Wiring for an entity field holding `value`.
pub(crate) fn field(owner: &Entity, key: &str, value: &Value) -> Option<Subscription> {
    match value {
        Value::Collection(child) => {
            debug!(field = key, "bridging collection field");
            let event = format!("{CHANGE}:{key}");
            let membership = {
                let owner = owner.downgrade();
                child.subscribe(CHANGE, move |_, args| {
                    if let Some(owner) = owner.upgrade() {
                        owner.trigger(&event, args);
                    }
                })
            };
            let elements = {
                let owner = owner.downgrade();
                child.subscribe(SUB_CHANGE, move |_, args| {
                    if let Some(owner) = owner.upgrade() {
                        owner.trigger(SUB_CHANGE, args);
                    }
                })
            };
            Some(Subscription::new(move || {
                drop(membership);
                drop(elements);
            }))
        }
        Value::Entity(child) => {
            debug!(field = key, "bridging entity field");
            let owner = owner.downgrade();
            Some(child.subscribe(NESTED, move |_, args| {
                if let Some(owner) = owner.upgrade() {
                    owner.trigger(SUB_CHANGE, args);
                }
            }))
        }
        Value::Data(_) | Value::Change(_) => None,
    }
}

/// Wiring for a collection slot holding `value`.
pub(crate) fn element(owner: &Collection, value: &Value) -> Option<Subscription> {
    let owner = owner.downgrade();
    let bubble = move |args: &[Value]| {
        if let Some(owner) = owner.upgrade() {
            owner.trigger(SUB_CHANGE, args);
        }
    };
    match value {
        Value::Entity(child) => {
            debug!("bridging entity element");
            Some(child.subscribe(NESTED, move |_, args| bubble(args)))
        }
        Value::Collection(child) => {
            debug!("bridging collection element");
            Some(child.subscribe(NESTED, move |_, args| bubble(args)))
        }
        Value::Data(_) | Value::Change(_) => None,
    }
}
