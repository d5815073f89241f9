//! Observable records.

use crate::def::EntityDef;
use crate::error::ModelResult;
use crate::property::{Field, Property};
use crate::snapshot::Snapshot;
use crate::value::Value;
use runway_events::{EventBus, Handler, Observable};
use serde::{Serialize, Serializer};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

/// Installed fields in installation order.
#[derive(Default)]
struct FieldTable {
    order: Vec<Rc<Property>>,
    index: HashMap<String, usize>,
}

impl FieldTable {
    fn get(&self, key: &str) -> Option<&Rc<Property>> {
        self.index.get(key).map(|&idx| &self.order[idx])
    }
}

pub(crate) struct EntityInner {
    def: Option<EntityDef>,
    bus: EventBus<Entity, Value>,
    fields: RefCell<FieldTable>,
}

impl Drop for EntityInner {
    fn drop(&mut self) {
        for prop in &self.fields.get_mut().order {
            prop.unwire();
        }
    }
}

/// A record of reactive fields with its own event bus.
///
/// `Entity` is a handle: cloning shares the record, equality is identity.
///
/// Events triggered by the entity itself:
/// - `change:<key>` with `(value, {old, key})` on every effective assignment
///   (and therefore `change`, through hierarchical dispatch)
/// - `sub:change` with the nested event's arguments when a child entity, or
///   an element of a child collection, changes
/// - `change:<key>` with the collection's arguments when a collection held
///   in field `key` changes membership or order
#[derive(Clone)]
pub struct Entity {
    inner: Rc<EntityInner>,
}

#[derive(Clone)]
pub(crate) struct WeakEntity(Weak<EntityInner>);

impl WeakEntity {
    pub(crate) fn upgrade(&self) -> Option<Entity> {
        self.0.upgrade().map(|inner| Entity { inner })
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity {
    /// Creates an entity with no fields and no definition.
    #[must_use]
    pub fn new() -> Self {
        Self::with_def(None)
    }

    /// Creates an entity from a list of fields, installed in order.
    pub fn from_fields<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        let entity = Self::new();
        for (key, value) in fields {
            entity.install(key.as_ref(), value.into());
        }
        entity
    }

    /// Creates an entity from the members of a JSON object.
    ///
    /// Anything other than an object yields an entity without fields.
    #[must_use]
    pub fn from_json(record: serde_json::Value) -> Self {
        match record {
            serde_json::Value::Object(map) => Self::from_fields(map),
            _ => Self::new(),
        }
    }

    pub(crate) fn with_def(def: Option<EntityDef>) -> Self {
        Self {
            inner: Rc::new(EntityInner {
                def,
                bus: EventBus::new(),
                fields: RefCell::new(FieldTable::default()),
            }),
        }
    }

    /// Installs a field holding `value`.
    ///
    /// Returns false, leaving the existing field untouched, if a field with
    /// this name is already installed. Installation triggers no event.
    pub fn install(&self, key: &str, value: impl Into<Value>) -> bool {
        if self.has(key) {
            return false;
        }
        if key.chars().any(char::is_whitespace) {
            warn!(field = key, "field name contains whitespace; its change event cannot be subscribed by name");
        }
        let prop = Property::install(self, key, value.into());
        let mut fields = self.inner.fields.borrow_mut();
        let idx = fields.order.len();
        fields.order.push(prop);
        fields.index.insert(key.to_owned(), idx);
        debug!(field = key, "field installed");
        true
    }

    /// Current value of field `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.property(key).map(|prop| prop.get())
    }

    /// Assigns field `key`, installing it if it does not exist yet.
    ///
    /// Assigning an existing field triggers `change:<key>` unless the value
    /// is identical to the current one; installing triggers nothing.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.property(key) {
            Some(prop) => prop.set(value),
            None => {
                self.install(key, value);
            }
        }
    }

    /// The accessor of field `key`.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<Field> {
        self.property(key).map(Field::new)
    }

    /// Returns true if field `key` is installed.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.inner.fields.borrow().index.contains_key(key)
    }

    /// Field names in installation order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .fields
            .borrow()
            .order
            .iter()
            .map(|prop| prop.key().to_owned())
            .collect()
    }

    /// Field names and current values in installation order.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.props()
            .iter()
            .map(|prop| (prop.key().to_owned(), prop.get()))
            .collect()
    }

    /// Number of installed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.fields.borrow().order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The definition this entity was constructed from.
    #[must_use]
    pub fn def(&self) -> Option<&EntityDef> {
        self.inner.def.as_ref()
    }

    /// Returns true if this entity was constructed from `def`.
    #[must_use]
    pub fn is_instance_of(&self, def: &EntityDef) -> bool {
        self.def().is_some_and(|own| own.ptr_eq(def))
    }

    /// Returns true if both handles refer to the same entity.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Deep JSON snapshot. Fails on cyclic containment.
    pub fn to_json(&self) -> ModelResult<serde_json::Value> {
        Snapshot::default().entity(self)
    }

    /// The listener table.
    #[must_use]
    pub fn bus(&self) -> &EventBus<Entity, Value> {
        &self.inner.bus
    }

    pub(crate) fn downgrade(&self) -> WeakEntity {
        WeakEntity(Rc::downgrade(&self.inner))
    }

    pub(crate) fn as_ptr(&self) -> *const () {
        Rc::as_ptr(&self.inner).cast()
    }

    fn property(&self, key: &str) -> Option<Rc<Property>> {
        self.inner.fields.borrow().get(key).map(Rc::clone)
    }

    fn props(&self) -> Vec<Rc<Property>> {
        self.inner.fields.borrow().order.clone()
    }
}

impl Observable for Entity {
    type Arg = Value;

    fn on(&self, names: &str, handler: &Handler<Self, Value>) {
        self.inner.bus.on(names, handler);
    }

    fn off(&self, names: &str, handler: &Handler<Self, Value>) {
        self.inner.bus.off(names, handler);
    }

    fn trigger(&self, names: &str, args: &[Value]) {
        self.inner.bus.trigger(self, names, args);
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Entity {}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("def", &self.def().map(EntityDef::name))
            .field("fields", &self.keys())
            .finish()
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let json = self
            .to_json()
            .map_err(<S::Error as serde::ser::Error>::custom)?;
        json.serialize(serializer)
    }
}
