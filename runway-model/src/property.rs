//! Reactive fields.
//!
//! A field is installed once per entity and keeps its identity for the life
//! of the entity; only the value in its slot changes. Every assignment that
//! changes the value by identity:
//!
//! 1. detaches the wiring made for the previous value
//! 2. stores the new value
//! 3. triggers `change:<key>` on the owner with `(value, {old, key})`
//! 4. wires the new value if it is an entity or collection

use crate::bridge;
use crate::entity::{Entity, WeakEntity};
use crate::value::Value;
use runway_events::{Observable, Subscription};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

struct Slot {
    value: Value,
    wiring: Option<Subscription>,
}

pub(crate) struct Property {
    key: String,
    event: String,
    owner: WeakEntity,
    slot: RefCell<Slot>,
}

impl Property {
    /// Installs `value` without triggering anything.
    pub(crate) fn install(owner: &Entity, key: &str, value: Value) -> Rc<Self> {
        let wiring = bridge::field(owner, key, &value);
        Rc::new(Self {
            key: key.to_owned(),
            event: format!("{}:{key}", bridge::CHANGE),
            owner: owner.downgrade(),
            slot: RefCell::new(Slot { value, wiring }),
        })
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn get(&self) -> Value {
        self.slot.borrow().value.clone()
    }

    pub(crate) fn set(&self, value: Value) {
        let (old, stale) = {
            let mut slot = self.slot.borrow_mut();
            if slot.value.same(&value) {
                return;
            }
            let stale = slot.wiring.take();
            let old = std::mem::replace(&mut slot.value, value.clone());
            (old, stale)
        };
        drop(stale);

        let Some(owner) = self.owner.upgrade() else {
            return;
        };
        owner.trigger(&self.event, &[value.clone(), Value::change(old, &self.key)]);

        let wiring = bridge::field(&owner, &self.key, &value);
        let mut slot = self.slot.borrow_mut();
        // A handler may have re-assigned the field during the trigger; the
        // nested assignment already wired whatever the slot holds now.
        if slot.value.same(&value) && slot.wiring.is_none() {
            slot.wiring = wiring;
        }
    }

    /// Detaches the current wiring. Used when the owner is torn down.
    pub(crate) fn unwire(&self) {
        let stale = self.slot.borrow_mut().wiring.take();
        drop(stale);
    }
}

/// Accessor for one field of an entity.
///
/// Cloning shares the field; two accessors obtained for the same key of the
/// same entity are [`ptr_eq`](Self::ptr_eq).
#[derive(Clone)]
pub struct Field {
    prop: Rc<Property>,
}

impl Field {
    pub(crate) fn new(prop: Rc<Property>) -> Self {
        Self { prop }
    }

    /// Name of the field.
    #[must_use]
    pub fn key(&self) -> &str {
        self.prop.key()
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> Value {
        self.prop.get()
    }

    /// Assigns a value. Identity-equal assignments are ignored.
    pub fn set(&self, value: impl Into<Value>) {
        self.prop.set(value.into());
    }

    /// The entity owning this field, if it is still alive.
    #[must_use]
    pub fn owner(&self) -> Option<Entity> {
        self.prop.owner.upgrade()
    }

    /// Returns true if both accessors refer to the same field.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.prop, &other.prop)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("key", &self.prop.key)
            .field("value", &self.prop.slot.borrow().value)
            .finish()
    }
}
